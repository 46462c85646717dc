//! Derived read models: dashboard, calendar and document search.
//!
//! Pure functions over already tenant-scoped collections.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::document::{Document, DocumentStatus, ReviewerRole};
use crate::models::task::{Task, TaskPriority};
use crate::models::user::same_email;
use crate::repository::{PaginatedResult, Pagination};

/// Public holidays shown on every calendar.
pub const HOLIDAYS: &[(&str, &str)] = &[
    ("2024-01-26", "Republic Day"),
    ("2024-03-25", "Holi"),
    ("2024-08-15", "Independence Day"),
    ("2024-10-02", "Gandhi Jayanti"),
    ("2024-11-01", "Diwali"),
    ("2025-01-26", "Republic Day"),
    ("2025-03-14", "Holi"),
    ("2025-08-15", "Independence Day"),
    ("2025-10-02", "Gandhi Jayanti"),
    ("2025-10-21", "Diwali"),
];

/// Latest revisions the user uploaded or is reviewing.
pub fn user_documents<'a>(documents: &'a [Document], email: &str) -> Vec<&'a Document> {
    documents
        .iter()
        .filter(|d| d.is_latest && d.involves(email))
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    /// Five most recent uploads, newest first.
    pub recent: Vec<String>,
    /// `In Review` documents with a reminder, soonest first.
    pub upcoming_reminders: Vec<(NaiveDate, String)>,
}

pub fn dashboard(documents: &[&Document]) -> DashboardSummary {
    let mut by_status: BTreeMap<&'static str, usize> =
        DocumentStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for doc in documents {
        *by_status.entry(doc.status.as_str()).or_default() += 1;
    }

    let mut recent: Vec<&&Document> = documents.iter().collect();
    recent.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
    let recent = recent.into_iter().take(5).map(|d| d.id.clone()).collect();

    let mut upcoming_reminders: Vec<(NaiveDate, String)> = documents
        .iter()
        .filter(|d| d.status == DocumentStatus::InReview)
        .filter_map(|d| d.reminder_date.map(|r| (r, d.id.clone())))
        .collect();
    upcoming_reminders.sort();

    DashboardSummary {
        total: documents.len(),
        by_status,
        recent,
        upcoming_reminders,
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CalendarEventType {
    Deadline,
    Upload,
    Task,
    Holiday,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: CalendarEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

/// Upload and deadline events for documents, the user's tasks and the
/// holiday list, grouped by day.
pub fn calendar(documents: &[&Document], tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<CalendarEvent>> {
    let mut events = Vec::new();

    for doc in documents {
        events.push(CalendarEvent {
            id: doc.id.clone(),
            date: doc.upload_date.date_naive(),
            title: doc.name.clone(),
            event_type: CalendarEventType::Upload,
            document_id: Some(doc.id.clone()),
            is_completed: None,
            priority: None,
        });
        if let Some(reminder) = doc.reminder_date {
            events.push(CalendarEvent {
                id: format!("{}-deadline", doc.id),
                date: reminder,
                title: doc.name.clone(),
                event_type: CalendarEventType::Deadline,
                document_id: Some(doc.id.clone()),
                is_completed: None,
                priority: None,
            });
        }
    }

    for task in tasks {
        events.push(CalendarEvent {
            id: task.id.clone(),
            date: task.date,
            title: task.title.clone(),
            event_type: CalendarEventType::Task,
            document_id: None,
            is_completed: Some(task.is_completed),
            priority: Some(task.priority),
        });
    }

    for (date, name) in HOLIDAYS {
        if let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            events.push(CalendarEvent {
                id: (*name).to_string(),
                date,
                title: (*name).to_string(),
                event_type: CalendarEventType::Holiday,
                document_id: None,
                is_completed: None,
                priority: None,
            });
        }
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.date).or_default().push(event);
    }
    by_date
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    /// Case-insensitive substring of the document name.
    pub text: Option<String>,
    pub status: Option<DocumentStatus>,
    /// Compared upper-cased.
    pub doc_type: Option<String>,
    pub project_code: Option<String>,
    pub uploader_email: Option<String>,
    pub approver_email: Option<String>,
    pub reviewer_role: Option<ReviewerRole>,
    pub uploaded_from: Option<NaiveDate>,
    /// Inclusive through the end of that day.
    pub uploaded_to: Option<NaiveDate>,
    pub sort: SortOrder,
}

impl DocumentQuery {
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !doc.name.to_lowercase().contains(&text.to_lowercase()) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != doc.status) {
            return false;
        }
        if let Some(doc_type) = &self.doc_type {
            if !doc.doc_type.eq_ignore_ascii_case(doc_type) {
                return false;
            }
        }
        if let Some(code) = &self.project_code {
            if doc.project_code.as_deref() != Some(code.as_str()) {
                return false;
            }
        }
        if let Some(uploader) = &self.uploader_email {
            if !doc.uploaded_by.has_email(uploader) {
                return false;
            }
        }
        if let Some(approver) = &self.approver_email {
            if !doc
                .reviewers
                .iter()
                .any(|r| r.role == ReviewerRole::Approver && same_email(&r.email, approver))
            {
                return false;
            }
        }
        if let Some(role) = self.reviewer_role {
            if !doc.reviewers.iter().any(|r| r.role == role) {
                return false;
            }
        }
        let uploaded = doc.upload_date.date_naive();
        if self.uploaded_from.is_some_and(|from| uploaded < from) {
            return false;
        }
        if self.uploaded_to.is_some_and(|to| uploaded > to) {
            return false;
        }
        true
    }
}

pub fn search(
    documents: &[Document],
    query: &DocumentQuery,
    pagination: &Pagination,
) -> PaginatedResult<Document> {
    let mut hits: Vec<Document> = documents
        .iter()
        .filter(|d| query.matches(d))
        .cloned()
        .collect();
    let key = |d: &Document| -> DateTime<Utc> { d.upload_date };
    match query.sort {
        SortOrder::Newest => hits.sort_by_key(|d| std::cmp::Reverse(key(d))),
        SortOrder::Oldest => hits.sort_by_key(key),
    }
    PaginatedResult::from_vec(hits, pagination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{DocumentDiscipline, Reviewer};
    use crate::models::user::{UserRole, UserSnapshot, UserStatus};
    use chrono::TimeZone;

    fn doc(id: &str, name: &str, status: DocumentStatus, day: u32) -> Document {
        Document {
            id: id.into(),
            name: name.into(),
            doc_type: "PDF".into(),
            uploaded_by: UserSnapshot {
                name: "Alice".into(),
                email: "alice@example.com".into(),
                photo_url: None,
                role: UserRole::Admin,
                organization_id: "org-a".into(),
                status: UserStatus::Active,
            },
            upload_date: Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap(),
            status,
            reviewers: vec![Reviewer {
                email: "bob@example.com".into(),
                role: ReviewerRole::Approver,
            }],
            password_hash: None,
            history: vec![],
            reminder_date: None,
            project_code: Some("P1".into()),
            version: 0,
            is_latest: true,
            file_url: None,
            discipline: DocumentDiscipline::Civil,
            organization_id: "org-a".into(),
            scratchpad_content: String::new(),
        }
    }

    #[test]
    fn dashboard_counts_every_status() {
        let docs = [
            doc("1", "a.pdf", DocumentStatus::Approved, 1),
            doc("2", "b.pdf", DocumentStatus::Approved, 2),
            doc("3", "c.pdf", DocumentStatus::InReview, 3),
        ];
        let refs: Vec<&Document> = docs.iter().collect();
        let summary = dashboard(&refs);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_status["Approved"], 2);
        assert_eq!(summary.by_status["Rejected"], 0);
        assert_eq!(summary.recent[0], "3");
    }

    #[test]
    fn reminders_only_for_documents_in_review() {
        let mut waiting = doc("1", "a.pdf", DocumentStatus::InReview, 1);
        waiting.reminder_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        let mut done = doc("2", "b.pdf", DocumentStatus::Approved, 2);
        done.reminder_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        let docs = [waiting, done];
        let refs: Vec<&Document> = docs.iter().collect();
        let summary = dashboard(&refs);
        assert_eq!(summary.upcoming_reminders.len(), 1);
        assert_eq!(summary.upcoming_reminders[0].1, "1");
    }

    #[test]
    fn calendar_groups_uploads_and_holidays() {
        let docs = [doc("1", "a.pdf", DocumentStatus::InReview, 1)];
        let refs: Vec<&Document> = docs.iter().collect();
        let days = calendar(&refs, &[]);
        let may_first = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(days[&may_first][0].event_type, CalendarEventType::Upload);
        let republic = NaiveDate::from_ymd_opt(2024, 1, 26).unwrap();
        assert_eq!(days[&republic][0].event_type, CalendarEventType::Holiday);
    }

    #[test]
    fn search_filters_and_sorts() {
        let docs = vec![
            doc("1", "Spec_A.pdf", DocumentStatus::InReview, 1),
            doc("2", "Spec_B.pdf", DocumentStatus::Approved, 2),
            doc("3", "Drawing.dwg", DocumentStatus::InReview, 3),
        ];
        let query = DocumentQuery {
            text: Some(" spec ".into()),
            ..Default::default()
        };
        let result = search(&docs, &query, &Pagination::default());
        let ids: Vec<&str> = result.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);

        let query = DocumentQuery {
            status: Some(DocumentStatus::InReview),
            sort: SortOrder::Oldest,
            ..Default::default()
        };
        let result = search(&docs, &query, &Pagination::default());
        let ids: Vec<&str> = result.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn search_date_range_is_inclusive() {
        let docs = vec![doc("1", "a.pdf", DocumentStatus::InReview, 5)];
        let day = NaiveDate::from_ymd_opt(2024, 5, 5);
        let query = DocumentQuery {
            uploaded_from: day,
            uploaded_to: day,
            ..Default::default()
        };
        assert_eq!(search(&docs, &query, &Pagination::default()).total, 1);
    }

    #[test]
    fn reviewer_email_matches_regardless_of_case() {
        let mut upper = doc("1", "a.pdf", DocumentStatus::InReview, 1);
        upper.reviewers[0].email = "Bob@Example.com".into();
        let docs = [upper];

        assert_eq!(user_documents(&docs, "bob@example.com").len(), 1);
        assert_eq!(
            docs[0].reviewer_role("bob@example.com"),
            Some(ReviewerRole::Approver)
        );
        let query = DocumentQuery {
            approver_email: Some("BOB@example.com".into()),
            uploader_email: Some("Alice@Example.com".into()),
            ..Default::default()
        };
        assert_eq!(search(&docs, &query, &Pagination::default()).total, 1);
    }
}
