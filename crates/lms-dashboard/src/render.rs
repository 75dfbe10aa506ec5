//! Plain-text rendering of feeds for the terminal

use crate::state::{Notification, NotificationLevel};
use indexmap::IndexMap;
use lms_protocol::ActivitySummary;
use lms_types::{Locale, NormalizedActivity};
use std::fmt::Write;

/// Render grouped activities, one heading per date bucket
#[must_use]
pub fn render_feed(groups: &IndexMap<String, Vec<NormalizedActivity>>, locale: Locale) -> String {
    if groups.values().all(Vec::is_empty) {
        return match locale {
            Locale::Indonesian => "Tidak ada aktivitas\n",
            Locale::English => "No activity\n",
        }
        .to_string();
    }

    let mut out = String::new();
    for (bucket, activities) in groups {
        let _ = writeln!(out, "{bucket}");
        for activity in activities {
            let _ = writeln!(out, "  {}", render_line(activity));
        }
        out.push('\n');
    }
    out
}

/// One feed line: `[severity] relative_time actor - kind subject: description`
#[must_use]
pub fn render_line(activity: &NormalizedActivity) -> String {
    let mut line = format!(
        "[{:<8}] {:<22} {} - {}",
        activity.severity.as_str(),
        activity.relative_time,
        activity.actor,
        activity.action_kind
    );
    if !activity.subject_label.is_empty() {
        let _ = write!(line, " {}", activity.subject_label);
    }
    if !activity.description.is_empty() {
        let _ = write!(line, ": {}", activity.description);
    }
    line
}

/// Render the counts shown above the recent-activity feed
#[must_use]
pub fn render_summary(summary: &ActivitySummary, locale: Locale) -> String {
    let (total, today, actors, by_kind, by_severity) = match locale {
        Locale::Indonesian => ("Total", "Hari ini", "Pengguna", "Per jenis", "Per tingkat"),
        Locale::English => ("Total", "Today", "Users", "By kind", "By severity"),
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{total}: {}  {today}: {}  {actors}: {}",
        summary.total, summary.today, summary.distinct_actors
    );
    let _ = writeln!(out, "{by_kind}: {}", join_counts(&summary.by_kind));
    let _ = writeln!(out, "{by_severity}: {}", join_counts(&summary.by_severity));
    out
}

/// Render pending notifications, one per line
#[must_use]
pub fn render_notifications(notifications: &[Notification]) -> String {
    notifications
        .iter()
        .map(|notification| {
            let tag = match notification.level {
                NotificationLevel::Warning => "!",
                NotificationLevel::Error => "x",
            };
            format!("[{tag}] {}\n", notification.message)
        })
        .collect()
}

fn join_counts<K: std::fmt::Display>(counts: &IndexMap<K, usize>) -> String {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(key, count)| format!("{key}={count}"))
        .collect::<Vec<_>>()
        .join(" ")
}
