//! Dashboard pages and the controller that loads them

mod controller;

pub use controller::{PageController, RefreshOutcome};

use lms_protocol::ActivityFilter;
use lms_types::{SourceKind, TypesError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The admin pages that show an activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// System audit log
    AuditLog,
    /// Latest enrollments, completions and log entries
    RecentActivity,
    /// Everything one user did
    UserActivityLog,
}

impl PageKind {
    /// All pages
    pub const ALL: [Self; 3] = [Self::AuditLog, Self::RecentActivity, Self::UserActivityLog];

    /// Sources fetched for this page, in fetch order
    #[must_use]
    pub const fn sources(self) -> &'static [SourceKind] {
        match self {
            Self::AuditLog => &[SourceKind::Log],
            Self::RecentActivity => &[
                SourceKind::Enrollment,
                SourceKind::Completion,
                SourceKind::Log,
            ],
            Self::UserActivityLog => &[
                SourceKind::Log,
                SourceKind::Enrollment,
                SourceKind::Completion,
            ],
        }
    }

    /// Page heading
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::AuditLog => "Log Audit",
            Self::RecentActivity => "Aktivitas Terbaru",
            Self::UserActivityLog => "Log Aktivitas Pengguna",
        }
    }

    /// Whether the page header shows an activity summary
    #[must_use]
    pub const fn shows_summary(self) -> bool {
        matches!(self, Self::RecentActivity)
    }

    /// Whether the page keeps only the newest `recent_limit` activities
    #[must_use]
    pub const fn is_truncated(self) -> bool {
        matches!(self, Self::RecentActivity)
    }

    /// Filter a freshly opened page starts with
    #[must_use]
    pub fn default_filter(self, actor: Option<&str>) -> ActivityFilter {
        match (self, actor) {
            (Self::UserActivityLog, Some(actor)) => ActivityFilter::all().with_actor(actor),
            _ => ActivityFilter::all(),
        }
    }

    /// Short CLI name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuditLog => "audit",
            Self::RecentActivity => "recent",
            Self::UserActivityLog => "user",
        }
    }
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "audit" | "audit_log" => Ok(Self::AuditLog),
            "recent" | "recent_activity" => Ok(Self::RecentActivity),
            "user" | "user_activity" | "user_activity_log" => Ok(Self::UserActivityLog),
            _ => Err(TypesError::unknown("page", s)),
        }
    }
}
