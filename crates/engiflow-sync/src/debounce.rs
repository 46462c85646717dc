//! Trailing-edge debouncing for auto-save.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Runs only the most recently scheduled action, `delay` after it was
/// scheduled. Scheduling again before the delay elapses discards the
/// pending action.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Drop the pending action, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_action_runs() {
        let debouncer = Debouncer::new(Duration::from_secs(1));
        let last = Arc::new(AtomicUsize::new(0));

        for i in 1..=3 {
            let last = last.clone();
            debouncer.schedule(async move {
                last.store(i, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(400)).await;
        }
        assert_eq!(last.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(last.load(Ordering::SeqCst), 3);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_action_never_runs() {
        let debouncer = Debouncer::new(Duration::from_secs(2));
        let ran = Arc::new(AtomicUsize::new(0));
        let flag = ran.clone();
        debouncer.schedule(async move {
            flag.fetch_add(1, Ordering::SeqCst);
        });

        debouncer.cancel();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
