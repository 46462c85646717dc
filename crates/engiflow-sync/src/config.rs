use std::time::Duration;

/// Timings for collaboration and auto-save.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long a typing indicator lives without a fresh keystroke.
    pub typing_timeout: Duration,
    pub scratchpad_autosave: Duration,
    pub note_autosave: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            typing_timeout: Duration::from_millis(2000),
            scratchpad_autosave: Duration::from_millis(1000),
            note_autosave: Duration::from_millis(2000),
        }
    }
}

impl SyncConfig {
    pub fn from_millis(typing_timeout: u64, scratchpad_autosave: u64, note_autosave: u64) -> Self {
        Self {
            typing_timeout: Duration::from_millis(typing_timeout),
            scratchpad_autosave: Duration::from_millis(scratchpad_autosave),
            note_autosave: Duration::from_millis(note_autosave),
        }
    }
}
