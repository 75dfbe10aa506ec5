//! Classification enums and the unified activity record

use crate::TypesError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Backend list endpoint a record came from
///
/// Each source names its fields differently; the protocol layer has one
/// adapter per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Audit/activity log table
    Log,
    /// Module enrollment records
    Enrollment,
    /// Module completion records
    Completion,
}

impl SourceKind {
    /// All source kinds in fetch order
    pub const ALL: [Self; 3] = [Self::Log, Self::Enrollment, Self::Completion];

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Enrollment => "enrollment",
            Self::Completion => "completion",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" | "logs" | "audit" => Ok(Self::Log),
            "enrollment" | "enrollments" => Ok(Self::Enrollment),
            "completion" | "completions" => Ok(Self::Completion),
            _ => Err(TypesError::unknown("source kind", s)),
        }
    }
}

/// Coarse category of what an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Sign-in
    Login,
    /// Enrolled in (or assigned to) a module
    Enrolled,
    /// Finished a module
    Completed,
    /// Failed or rejected
    Failed,
    /// Downloaded material or a certificate
    Download,
    /// Edited something
    Update,
    /// Anything not matched by a rule
    Other,
}

impl ActionKind {
    /// Every variant in declaration order
    pub const ALL: [Self; 7] = [
        Self::Login,
        Self::Enrolled,
        Self::Completed,
        Self::Failed,
        Self::Download,
        Self::Update,
        Self::Other,
    ];

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Enrolled => "enrolled",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Download => "download",
            Self::Update => "update",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .or_else(|| (wanted == "info").then_some(Self::Other))
            .ok_or_else(|| TypesError::unknown("action kind", s))
    }
}

/// Risk/urgency tag used for visual styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Destructive change
    Critical,
    /// Rejection or failure
    Warning,
    /// Creation or approval
    Success,
    /// Everything else
    Info,
}

impl Severity {
    /// Every variant in declaration order
    pub const ALL: [Self; 4] = [Self::Critical, Self::Warning, Self::Success, Self::Info];

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str() == wanted)
            .ok_or_else(|| TypesError::unknown("severity", s))
    }
}

/// Display-ready activity produced by the normalizer
///
/// Instances are rebuilt on every fetch and never written back anywhere.
/// `relative_time` and `date_bucket` are only valid for the "now" they were
/// computed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedActivity {
    /// Unique within the batch it was produced in
    pub id: String,

    /// Endpoint the record came from
    pub source: SourceKind,

    /// Who performed the action
    pub actor: String,

    /// What kind of operation this was
    pub action_kind: ActionKind,

    /// How alarming it is
    pub severity: Severity,

    /// Affected entity or module; empty when the record names none
    pub subject_label: String,

    /// Best available free text from the record
    pub description: String,

    /// When it happened
    pub occurred_at: DateTime<Utc>,

    /// "Today", "Yesterday" or a weekday + date label
    pub date_bucket: String,

    /// Human relative time such as "5 menit yang lalu"
    pub relative_time: String,

    /// Opaque post-change payload carried through from the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("log", SourceKind::Log)]
    #[case("Audit", SourceKind::Log)]
    #[case("enrollments", SourceKind::Enrollment)]
    #[case("completion", SourceKind::Completion)]
    fn test_source_kind_from_str(#[case] input: &str, #[case] expected: SourceKind) {
        assert_eq!(input.parse::<SourceKind>().unwrap(), expected);
    }

    #[test]
    fn test_action_kind_info_alias() {
        assert_eq!("info".parse::<ActionKind>().unwrap(), ActionKind::Other);
        assert_eq!("UPDATE".parse::<ActionKind>().unwrap(), ActionKind::Update);
        assert!("delete".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
        let parsed: Severity = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(parsed, Severity::Warning);
    }

    #[test]
    fn test_display_matches_as_str() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
        for severity in Severity::ALL {
            assert_eq!(severity.to_string(), severity.as_str());
        }
        for source in SourceKind::ALL {
            assert_eq!(source.to_string(), source.as_str());
        }
    }

    proptest! {
        #[test]
        fn test_action_kind_parse_is_inverse_of_display(index in 0usize..7) {
            let kind = ActionKind::ALL[index];
            prop_assert_eq!(kind.to_string().parse::<ActionKind>().unwrap(), kind);
        }
    }
}
