//! Per-endpoint adapters onto a common field contract
//!
//! Each backend list endpoint names its fields differently. Instead of
//! scattering fallback chains through the normalizer, every [`SourceKind`]
//! gets one adapter that resolves a record into [`RawFields`]; the
//! normalizer only ever sees that contract.

use lms_types::{RawEvent, SourceKind};
use serde_json::Value;

/// Actor used when a log record names nobody
pub const SYSTEM_ACTOR: &str = "System";

/// Actor used when an enrollment or completion record names nobody
pub const UNKNOWN_USER: &str = "Unknown User";

/// Source-independent view of one record
#[derive(Debug, Clone, PartialEq)]
pub struct RawFields<'a> {
    /// Identifier from the source, already namespaced where needed
    pub id: Option<String>,

    /// Resolved actor name (never empty)
    pub actor: String,

    /// Text fields from most to least specific (`type` first)
    pub texts: Vec<String>,

    /// Free-text description shown to the viewer
    pub description: Option<String>,

    /// Label of the affected entity or module
    pub subject: Option<String>,

    /// Timestamp candidates in priority order
    pub timestamps: Vec<&'a Value>,

    /// Opaque post-change payload
    pub properties: Option<&'a Value>,
}

impl RawFields<'_> {
    /// Most specific text available, used for action-kind classification
    #[must_use]
    pub fn most_specific_text(&self) -> &str {
        self.texts.first().map_or("", String::as_str)
    }

    /// All text joined, used for severity classification
    #[must_use]
    pub fn combined_text(&self) -> String {
        self.texts.join(" ")
    }
}

/// Resolves records of one source shape into [`RawFields`]
pub trait SourceAdapter: Send + Sync {
    /// Which endpoint this adapter understands
    fn kind(&self) -> SourceKind;

    /// Map one record onto the common contract
    fn to_raw_fields<'a>(&self, record: &'a RawEvent) -> RawFields<'a>;
}

/// Adapter for audit/activity log rows
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAdapter;

/// Adapter for module enrollment rows
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentAdapter;

/// Adapter for module completion rows
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionAdapter;

/// Static adapter for a source kind
#[must_use]
pub fn adapter_for(kind: SourceKind) -> &'static dyn SourceAdapter {
    match kind {
        SourceKind::Log => &LogAdapter,
        SourceKind::Enrollment => &EnrollmentAdapter,
        SourceKind::Completion => &CompletionAdapter,
    }
}

impl SourceAdapter for LogAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Log
    }

    fn to_raw_fields<'a>(&self, record: &'a RawEvent) -> RawFields<'a> {
        let actor = record
            .text("user_name")
            .or_else(|| record.nested_text("causer", "name"))
            .unwrap_or_else(|| SYSTEM_ACTOR.to_string());

        let description = record.text("description");
        let texts = collect_texts(&[
            record.text("type"),
            record.text("action"),
            record.text("event"),
            description.clone(),
        ]);

        RawFields {
            id: record.text("id"),
            actor,
            texts,
            description: description
                .or_else(|| record.first_text(&["action", "event"])),
            subject: record.first_text(&[
                "subject_type",
                "model",
                "entity_type",
                "module",
                "module_title",
            ]),
            timestamps: timestamp_candidates(record, &["created_at", "logged_at", "timestamp"]),
            properties: record.properties(),
        }
    }
}

impl SourceAdapter for EnrollmentAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Enrollment
    }

    fn to_raw_fields<'a>(&self, record: &'a RawEvent) -> RawFields<'a> {
        let description = record.text("description");
        let kind_text = record.text("type").unwrap_or_else(|| "enrolled".to_string());

        RawFields {
            id: record.text("id").map(|id| format!("enrollment-{id}")),
            actor: learner_name(record),
            texts: collect_texts(&[Some(kind_text), description.clone()]),
            description,
            subject: module_label(record),
            timestamps: timestamp_candidates(record, &["enrolled_at", "created_at", "timestamp"]),
            properties: record.properties(),
        }
    }
}

impl SourceAdapter for CompletionAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Completion
    }

    fn to_raw_fields<'a>(&self, record: &'a RawEvent) -> RawFields<'a> {
        let description = record.text("description");
        let kind_text = record
            .first_text(&["type", "status"])
            .unwrap_or_else(|| "completed".to_string());

        RawFields {
            id: record.text("id").map(|id| format!("completion-{id}")),
            actor: learner_name(record),
            texts: collect_texts(&[Some(kind_text), description.clone()]),
            description,
            subject: module_label(record),
            timestamps: timestamp_candidates(record, &["completed_at", "created_at", "timestamp"]),
            properties: record.properties(),
        }
    }
}

fn learner_name(record: &RawEvent) -> String {
    record
        .text("user_name")
        .or_else(|| record.nested_text("user", "name"))
        .or_else(|| record.nested_text("causer", "name"))
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

fn module_label(record: &RawEvent) -> Option<String> {
    record
        .text("module_title")
        .or_else(|| record.nested_text("module", "title"))
        .or_else(|| record.text("module"))
}

fn collect_texts(candidates: &[Option<String>]) -> Vec<String> {
    candidates.iter().flatten().cloned().collect()
}

fn timestamp_candidates<'a>(record: &'a RawEvent, keys: &[&str]) -> Vec<&'a Value> {
    keys.iter().filter_map(|key| record.get(key)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_adapter_for_matches_kind() {
        for kind in SourceKind::ALL {
            assert_eq!(adapter_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_log_actor_fallback_chain() {
        let explicit = RawEvent::from(json!({"user_name": "Sari", "causer": {"name": "Admin"}}));
        let nested = RawEvent::from(json!({"causer": {"name": "Admin"}}));
        let absent = RawEvent::from(json!({}));

        assert_eq!(LogAdapter.to_raw_fields(&explicit).actor, "Sari");
        assert_eq!(LogAdapter.to_raw_fields(&nested).actor, "Admin");
        assert_eq!(LogAdapter.to_raw_fields(&absent).actor, SYSTEM_ACTOR);
    }

    #[test]
    fn test_log_texts_prefer_type() {
        let record = RawEvent::from(json!({
            "type": "download",
            "action": "updated",
            "event": "file.updated",
            "description": "Sertifikat diunduh"
        }));
        let fields = LogAdapter.to_raw_fields(&record);

        assert_eq!(fields.most_specific_text(), "download");
        assert_eq!(
            fields.combined_text(),
            "download updated file.updated Sertifikat diunduh"
        );
        assert_eq!(fields.description.as_deref(), Some("Sertifikat diunduh"));
    }

    #[test]
    fn test_log_description_falls_back_to_event() {
        let record = RawEvent::from(json!({ "event": "user.deleted" }));
        let fields = LogAdapter.to_raw_fields(&record);
        assert_eq!(fields.description.as_deref(), Some("user.deleted"));
        assert_eq!(fields.most_specific_text(), "user.deleted");
    }

    #[test]
    fn test_log_subject_and_timestamps() {
        let record = RawEvent::from(json!({
            "model": "Course",
            "module": "Onboarding",
            "logged_at": "2024-01-01T00:00:00Z",
            "created_at": "garbage"
        }));
        let fields = LogAdapter.to_raw_fields(&record);

        assert_eq!(fields.subject.as_deref(), Some("Course"));
        assert_eq!(
            fields.timestamps,
            vec![&json!("garbage"), &json!("2024-01-01T00:00:00Z")]
        );
    }

    #[test]
    fn test_enrollment_defaults() {
        let record = RawEvent::from(json!({
            "id": 12,
            "user": {"name": "Dewi"},
            "module": {"title": "K3 Dasar"},
            "enrolled_at": "2024-02-01T08:00:00Z"
        }));
        let fields = EnrollmentAdapter.to_raw_fields(&record);

        assert_eq!(fields.id.as_deref(), Some("enrollment-12"));
        assert_eq!(fields.actor, "Dewi");
        assert_eq!(fields.most_specific_text(), "enrolled");
        assert_eq!(fields.subject.as_deref(), Some("K3 Dasar"));
        assert_eq!(fields.timestamps.len(), 1);
    }

    #[test]
    fn test_enrollment_unknown_user() {
        let record = RawEvent::default();
        let fields = EnrollmentAdapter.to_raw_fields(&record);
        assert_eq!(fields.actor, UNKNOWN_USER);
        assert_eq!(fields.id, None);
    }

    #[test]
    fn test_completion_status_as_kind_text() {
        let record = RawEvent::from(json!({
            "id": "c-9",
            "user_name": "Rudi",
            "module_title": "Etika Bisnis",
            "status": "failed",
            "completed_at": 1_704_103_200
        }));
        let fields = CompletionAdapter.to_raw_fields(&record);

        assert_eq!(fields.id.as_deref(), Some("completion-c-9"));
        assert_eq!(fields.most_specific_text(), "failed");
        assert_eq!(fields.subject.as_deref(), Some("Etika Bisnis"));
    }

    #[test]
    fn test_completion_default_kind_text() {
        let record = RawEvent::default();
        let fields = CompletionAdapter.to_raw_fields(&record);
        assert_eq!(fields.most_specific_text(), "completed");
        assert_eq!(fields.actor, UNKNOWN_USER);
    }
}
