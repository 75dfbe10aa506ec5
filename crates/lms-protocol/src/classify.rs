//! Substring classification of free-text actions
//!
//! Both classifiers are ordered rule tables: the text is lower-cased once and
//! the first rule with any matching needle wins. Order matters, e.g. a text
//! mentioning both "delete" and "create" is critical, and one mentioning both
//! "reject" and "approve" is a warning. Indonesian needles ("pendaftaran",
//! "selesai", "gagal") sit next to their English counterparts because the
//! backend mixes both languages.

use lms_types::{ActionKind, Severity};

/// Action-kind rules, highest priority first
const ACTION_RULES: &[(ActionKind, &[&str])] = &[
    (ActionKind::Login, &["login"]),
    (ActionKind::Enrolled, &["enroll", "pendaftaran", "assigned"]),
    (ActionKind::Completed, &["complete", "selesai", "finish"]),
    (ActionKind::Failed, &["fail", "gagal", "reject"]),
    (ActionKind::Download, &["download"]),
    (ActionKind::Update, &["update", "edit"]),
];

/// Severity rules, highest priority first
const SEVERITY_RULES: &[(Severity, &[&str])] = &[
    (Severity::Critical, &["delete"]),
    (Severity::Warning, &["reject", "failed"]),
    (Severity::Success, &["create", "approve"]),
];

/// Classify the most specific text field of a record
///
/// Falls through to [`ActionKind::Other`] when nothing matches. Note that
/// "delete" is deliberately absent: deletions are only visible through
/// [`classify_severity`].
#[must_use]
pub fn classify_action(text: &str) -> ActionKind {
    first_match(ACTION_RULES, text).unwrap_or(ActionKind::Other)
}

/// Classify the combined text of a record into a severity tag
#[must_use]
pub fn classify_severity(text: &str) -> Severity {
    first_match(SEVERITY_RULES, text).unwrap_or(Severity::Info)
}

fn first_match<T: Copy>(rules: &[(T, &[&str])], text: &str) -> Option<T> {
    let haystack = text.to_lowercase();
    rules
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| haystack.contains(needle)))
        .map(|(tag, _)| *tag)
}
