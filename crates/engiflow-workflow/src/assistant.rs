//! Generative text assistant: drafts review e-mails, summarizes document
//! history and converts notes.
//!
//! Everything produced here is advisory. Callers treat a failure as a
//! warning, never as a reason to undo a committed change.

use chrono::Utc;
use engiflow_core::error::EngiflowError;
use engiflow_core::models::document::{DocumentStatus, HistoryEntry, Reviewer};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("prompt encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<AssistantError> for EngiflowError {
    fn from(err: AssistantError) -> Self {
        EngiflowError::Assistant(err.to_string())
    }
}

/// A text-in, text-out model.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, AssistantError>> + Send;
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "contents": [{"parts": [{"text": prompt}]}]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: Value = response.json().await?;
        let text = result["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .filter(|t| !t.trim().is_empty())
            .ok_or(AssistantError::EmptyResponse)?;

        debug!(model = %self.model, chars = text.len(), "Model response received");
        Ok(text.to_string())
    }
}

/// Target format for [`Assistant::convert_note`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFormat {
    Markdown,
    PlainText,
}

impl NoteFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteFormat::Markdown => "markdown",
            NoteFormat::PlainText => "plaintext",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            NoteFormat::Markdown => {
                "GitHub Flavored Markdown. Preserve formatting like headings (if any), bold, italics, and lists."
            }
            NoteFormat::PlainText => {
                "Plain text. Remove all HTML tags and formatting, preserving line breaks for readability."
            }
        }
    }
}

/// Prompt builders over any [`TextGenerator`].
pub struct Assistant<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> Assistant<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// E-mail asking reviewers to look at a new revision.
    pub async fn review_email(
        &self,
        document_name: &str,
        reviewers: &[Reviewer],
        project_name: Option<&str>,
    ) -> Result<String, AssistantError> {
        let reviewer_lines = reviewers
            .iter()
            .map(|r| format!("- {} (Role: {:?})", r.email, r.role))
            .collect::<Vec<_>>()
            .join("\n");
        let project_line = project_name
            .map(|p| format!("It's part of the project: \"{p}\"."))
            .unwrap_or_default();

        let prompt = format!(
            "Generate a professional email to notify a team about a new document for review.\n\
             The document is named \"{document_name}\".\n\
             {project_line}\n\
             The reviewers are:\n\
             {reviewer_lines}\n\n\
             The email should have a clear subject line.\n\
             The body should inform them the document requires their attention on the EngiFlow platform and state their roles.\n\
             Keep it professional and concise. Sign off as \"EngiFlow System\".\n\
             Output only the full email content, including a subject line like \"Subject: ...\"."
        );
        self.generator.generate(&prompt).await
    }

    /// E-mail announcing a status change to everyone involved.
    pub async fn status_update_email(
        &self,
        document_name: &str,
        status: DocumentStatus,
        updated_by: &str,
        comment: Option<&str>,
        participants: &[String],
    ) -> Result<String, AssistantError> {
        let comment = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("No comment was provided.");
        let date = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
        debug!(recipients = participants.len(), "Drafting status e-mail");

        let prompt = format!(
            "Generate a professional email to notify participants about a status update for a document.\n\
             Document Name: \"{document_name}\"\n\
             New Status: {status}\n\
             Updated By: {updated_by}\n\
             Date: {date}\n\
             Comment: {comment}\n\n\
             The email should have a clear subject line indicating the document and its new status.\n\
             The body should summarize the update details.\n\
             Sign off as \"The EngiFlow System\".\n\
             Output only the full email content, including a subject line like \"Subject: ...\"."
        );
        self.generator.generate(&prompt).await
    }

    /// A few sentences describing a document's review journey.
    pub async fn document_summary(
        &self,
        document_name: &str,
        history: &[HistoryEntry],
    ) -> Result<String, AssistantError> {
        let history = serde_json::to_string_pretty(history)?;
        let prompt = format!(
            "Summarize the following document's activity. The document is named \"{document_name}\".\n\
             Its review history is: {history}.\n\
             Provide a brief, professional summary of the document's journey, key activities, and its current state based on the history.\n\
             Focus on the flow of statuses, who performed the actions, and any significant comments. Keep it to a few sentences."
        );
        self.generator.generate(&prompt).await
    }

    /// Convert a note's HTML body.
    pub async fn convert_note(
        &self,
        title: &str,
        html: &str,
        format: NoteFormat,
    ) -> Result<String, AssistantError> {
        let prompt = format!(
            "Convert the following note content from HTML to {target}.\n\
             Note Title: \"{title}\"\n\
             HTML Content:\n\
             ```html\n\
             {html}\n\
             ```\n\n\
             Instructions:\n\
             - The output should be only the converted content, without any explanations or surrounding text.\n\
             - Convert the content into {description}",
            target = format.as_str(),
            description = format.description(),
        );
        self.generator.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engiflow_core::models::document::ReviewerRole;
    use mockito::Matcher;
    use std::sync::Mutex;

    /// Records prompts and answers with a fixed text.
    #[derive(Default)]
    struct Recorder {
        prompts: Mutex<Vec<String>>,
    }

    impl TextGenerator for Recorder {
        async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("ok".into())
        }
    }

    fn last_prompt(assistant: &Assistant<Recorder>) -> String {
        assistant
            .generator()
            .prompts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn review_email_lists_reviewers_with_roles() {
        let assistant = Assistant::new(Recorder::default());
        let reviewers = vec![Reviewer {
            email: "r1@example.com".into(),
            role: ReviewerRole::Approver,
        }];
        assistant
            .review_email("Spec_A.pdf", &reviewers, Some("Bridge"))
            .await
            .unwrap();

        let prompt = last_prompt(&assistant);
        assert!(prompt.contains("\"Spec_A.pdf\""));
        assert!(prompt.contains("- r1@example.com (Role: Approver)"));
        assert!(prompt.contains("It's part of the project: \"Bridge\"."));
        assert!(prompt.contains("Sign off as \"EngiFlow System\""));
    }

    #[tokio::test]
    async fn status_email_defaults_missing_comment() {
        let assistant = Assistant::new(Recorder::default());
        assistant
            .status_update_email("Spec_A.pdf", DocumentStatus::Approved, "Rita", Some("  "), &[])
            .await
            .unwrap();

        let prompt = last_prompt(&assistant);
        assert!(prompt.contains("New Status: Approved"));
        assert!(prompt.contains("Comment: No comment was provided."));
    }

    #[tokio::test]
    async fn note_conversion_names_the_format() {
        let assistant = Assistant::new(Recorder::default());
        assistant
            .convert_note("Todo", "<b>x</b>", NoteFormat::PlainText)
            .await
            .unwrap();

        let prompt = last_prompt(&assistant);
        assert!(prompt.contains("from HTML to plaintext"));
        assert!(prompt.contains("<b>x</b>"));
        assert!(prompt.contains("Remove all HTML tags"));
    }

    #[tokio::test]
    async fn gemini_client_extracts_first_candidate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"parts": [{"text": "hello"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"Subject: Hi"}]}}]}"#)
            .create_async()
            .await;

        let client = GeminiClient::new("test-key".into(), Some(server.url()), None);
        let text = client.generate("hello").await.unwrap();

        assert_eq!(text, "Subject: Hi");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn gemini_client_reports_api_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        let client = GeminiClient::new("bad".into(), Some(server.url()), None);
        let err = client.generate("hello").await.unwrap_err();

        assert!(matches!(err, AssistantError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn gemini_client_rejects_empty_candidates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let client = GeminiClient::new("k".into(), Some(server.url()), None);
        let err = client.generate("hello").await.unwrap_err();

        assert!(matches!(err, AssistantError::EmptyResponse));
    }
}
