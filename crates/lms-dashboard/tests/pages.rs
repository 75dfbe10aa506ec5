//! Integration tests for page loading, polling and export

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use common::*;
use lms_core::Config;
use lms_dashboard::{
    FeedAction, ListQuery, NotificationLevel, PageController, PageKind, Poller, controller_for,
    export::{ExportFormat, export_page, write_activities},
    poller::MIN_PERIOD,
};
use lms_protocol::FilterChoice;
use lms_types::{ActionKind, Severity, SourceKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn full_stub() -> StubFetcher {
    StubFetcher::new()
        .with_response(SourceKind::Log, log_page())
        .with_response(SourceKind::Enrollment, enrollment_page())
        .with_response(SourceKind::Completion, completion_page())
}

fn ids(controller: &PageController<lms_protocol::FixedClock>) -> Vec<String> {
    controller
        .snapshot()
        .visible()
        .into_iter()
        .map(|activity| activity.id)
        .collect()
}

#[tokio::test]
async fn test_audit_log_page_only_fetches_logs() {
    let stub = Arc::new(full_stub());
    let controller = PageController::new(PageKind::AuditLog, stub.clone(), fixed_normalizer());

    let outcome = controller.refresh().await;

    assert_eq!(outcome.loaded, 3);
    assert!(outcome.failed.is_empty());
    assert_eq!(
        stub.calls().iter().map(|(source, _)| *source).collect::<Vec<_>>(),
        vec![SourceKind::Log]
    );
    assert_eq!(ids(&controller), vec!["103", "101", "102"]);

    let state = controller.snapshot();
    let deleted = state.activities().iter().find(|a| a.id == "101").unwrap();
    assert_eq!(deleted.severity, Severity::Critical);
    assert_eq!(deleted.action_kind, ActionKind::Other);
    assert_eq!(deleted.relative_time, "5 menit yang lalu");
    assert!(controller.summary().is_none());
}

#[tokio::test]
async fn test_recent_activity_merges_sources_and_truncates() {
    let controller = PageController::new(
        PageKind::RecentActivity,
        Arc::new(full_stub()),
        fixed_normalizer(),
    )
    .with_recent_limit(4);

    controller.refresh().await;

    assert_eq!(
        ids(&controller),
        vec!["103", "101", "completion-7", "102"]
    );

    let groups = controller.snapshot().grouped();
    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["Hari Ini"]);

    let summary = controller.summary().unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.today, 4);
    assert_eq!(summary.kind_count(ActionKind::Failed), 1);
    assert_eq!(summary.severity_count(Severity::Warning), 1);
}

#[tokio::test]
async fn test_recent_activity_without_limit_keeps_yesterday_group() {
    let controller = PageController::new(
        PageKind::RecentActivity,
        Arc::new(full_stub()),
        fixed_normalizer(),
    );

    controller.refresh().await;

    let groups = controller.snapshot().grouped();
    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["Hari Ini", "Kemarin"]);
    assert_eq!(groups["Kemarin"][0].id, "enrollment-7");
    assert_eq!(groups["Kemarin"][0].subject_label, "K3 Dasar");
}

#[tokio::test]
async fn test_failed_source_becomes_notification() {
    let stub = full_stub().with_failure(SourceKind::Completion, 503);
    let controller = PageController::new(PageKind::RecentActivity, Arc::new(stub), fixed_normalizer());

    let outcome = controller.refresh().await;

    assert_eq!(outcome.failed, vec![SourceKind::Completion]);
    let state = controller.snapshot();
    assert_eq!(state.activities().len(), 4);
    assert_eq!(state.notifications().len(), 1);
    assert_eq!(state.notifications()[0].level, NotificationLevel::Warning);
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_all_sources_failing_clears_list() {
    let stub = StubFetcher::new().with_failure(SourceKind::Log, 500);
    let controller = PageController::new(PageKind::AuditLog, Arc::new(stub), fixed_normalizer());

    let outcome = controller.refresh().await;

    assert_eq!(outcome.loaded, 0);
    let state = controller.snapshot();
    assert!(state.activities().is_empty());
    assert_eq!(state.notifications()[0].level, NotificationLevel::Error);
    assert!(state.notifications()[0].message.contains("Log Audit"));
}

#[tokio::test]
async fn test_non_list_response_is_a_source_failure() {
    let stub = full_stub().with_response(SourceKind::Enrollment, json!({"items": []}));
    let controller = PageController::new(
        PageKind::UserActivityLog,
        Arc::new(stub),
        fixed_normalizer(),
    );

    let outcome = controller.refresh().await;
    assert_eq!(outcome.failed, vec![SourceKind::Enrollment]);
    assert_eq!(outcome.loaded, 4);
}

#[tokio::test]
async fn test_user_page_filters_by_actor() {
    let stub = Arc::new(full_stub());
    let controller = controller_for(
        PageKind::UserActivityLog,
        &Config::default(),
        stub.clone(),
        Some("dewi"),
        Some("42"),
    );

    controller.refresh().await;
    let visible = controller.snapshot().visible();

    assert_eq!(visible.len(), 2);
    assert!(visible.iter().all(|a| a.actor == "Dewi"));
    assert!(
        stub.calls()
            .iter()
            .all(|(_, query)| query == &ListQuery::with_limit(100).for_user("42"))
    );
}

#[tokio::test]
async fn test_actor_name_is_not_sent_as_user_id() {
    let stub = Arc::new(full_stub());
    let controller = controller_for(
        PageKind::UserActivityLog,
        &Config::default(),
        stub.clone(),
        Some("Dewi"),
        None,
    );

    controller.refresh().await;

    assert_eq!(controller.snapshot().visible().len(), 2);
    assert!(
        stub.calls()
            .iter()
            .all(|(_, query)| query.user_id.is_none())
    );
}

#[tokio::test]
async fn test_filter_actions_after_refresh() {
    let controller = PageController::new(PageKind::RecentActivity, Arc::new(full_stub()), fixed_normalizer());
    controller.refresh().await;

    controller.dispatch(FeedAction::KindFilterChanged(FilterChoice::Only(ActionKind::Login)));
    assert_eq!(ids(&controller), vec!["102"]);

    controller.dispatch(FeedAction::KindFilterChanged(FilterChoice::All));
    controller.dispatch(FeedAction::SearchChanged("K3".to_string()));
    assert_eq!(ids(&controller), vec!["completion-7", "enrollment-7"]);
}

#[tokio::test]
async fn test_poll_merges_by_id() {
    let stub = Arc::new(full_stub());
    let controller = PageController::new(PageKind::AuditLog, stub.clone(), fixed_normalizer());
    controller.refresh().await;

    stub.set_response(
        SourceKind::Log,
        json!([
            {"id": 101, "event": "user.restored", "created_at": "2024-01-01T10:00:00Z"},
            {"id": 104, "event": "course.created", "created_at": "2024-01-01T10:01:00Z"}
        ]),
    );
    let outcome = controller.poll_once().await.unwrap();

    assert_eq!(outcome.loaded, 2);
    assert_eq!(ids(&controller), vec!["103", "104", "101", "102"]);
    let state = controller.snapshot();
    let replaced = state.activities().iter().find(|a| a.id == "101").unwrap();
    assert_eq!(replaced.severity, Severity::Info);
}

#[tokio::test]
async fn test_poll_failure_keeps_held_list_and_notifies() {
    let stub = Arc::new(full_stub());
    let controller = PageController::new(PageKind::AuditLog, stub.clone(), fixed_normalizer());
    controller.refresh().await;
    assert!(controller.snapshot().notifications().is_empty());

    stub.set_failure(SourceKind::Log, 502);
    let result = controller.poll_once().await;

    assert!(matches!(result, Err(lms_core::Error::Api { status: 502, .. })));
    let state = controller.snapshot();
    assert_eq!(state.activities().len(), 3);
    assert_eq!(state.notifications().len(), 1);
    assert_eq!(state.notifications()[0].level, NotificationLevel::Error);
    assert!(state.notifications()[0].message.contains("Log Audit"));

    // A repeated failure does not stack a second identical notice
    assert!(controller.poll_once().await.is_err());
    assert_eq!(controller.snapshot().notifications().len(), 1);
}

#[tokio::test]
async fn test_poll_with_failed_source_warns_and_merges_the_rest() {
    let stub = Arc::new(full_stub());
    let controller = PageController::new(PageKind::RecentActivity, stub.clone(), fixed_normalizer());
    controller.refresh().await;

    stub.set_failure(SourceKind::Completion, 503);
    stub.set_response(
        SourceKind::Log,
        json!([{"id": 104, "event": "course.created", "created_at": "2024-01-01T10:01:00Z"}]),
    );
    let outcome = controller.poll_once().await.unwrap();

    assert_eq!(outcome.failed, vec![SourceKind::Completion]);
    let state = controller.snapshot();
    assert_eq!(state.activities().len(), 6);
    assert!(state.activities().iter().any(|a| a.id == "104"));
    assert_eq!(state.notifications().len(), 1);
    assert_eq!(state.notifications()[0].level, NotificationLevel::Warning);
    assert!(state.notifications()[0].message.contains("completion"));
}

#[tokio::test(start_paused = true)]
async fn test_poller_ticks_until_stopped() {
    let stub = Arc::new(full_stub());
    let controller = Arc::new(PageController::new(
        PageKind::AuditLog,
        stub.clone(),
        fixed_normalizer(),
    ));

    let poller = Poller::new(Arc::clone(&controller), Duration::from_secs(30));
    let handle = poller.start();

    tokio::time::sleep(Duration::from_secs(65)).await;
    poller.stop();
    handle.await.unwrap();

    let stats = poller.stats();
    assert_eq!(stats.polls, 3);
    assert_eq!(stats.failures, 0);
    assert_eq!(stats.last_poll, Some(fixed_now()));
    assert_eq!(controller.snapshot().activities().len(), 3);
    assert_eq!(stub.calls().len(), 3);
}

#[tokio::test]
async fn test_export_visible_feed_as_csv() {
    let controller = PageController::new(PageKind::AuditLog, Arc::new(full_stub()), fixed_normalizer());
    controller.refresh().await;
    controller.dispatch(FeedAction::SeverityFilterChanged(FilterChoice::Only(Severity::Critical)));

    let mut out = Vec::new();
    write_activities(&mut out, ExportFormat::Csv, &controller.snapshot().visible()).unwrap();
    let text = String::from_utf8(out).unwrap();
    let rows: Vec<&str> = text.lines().collect();

    assert_eq!(rows.len(), 2);
    assert!(rows[1].starts_with("101,log,2024-01-01T10:00:00+00:00,Admin Utama,other,critical,User,"));
}

#[tokio::test(start_paused = true)]
async fn test_zero_period_poller_uses_minimum() {
    let controller = Arc::new(PageController::new(
        PageKind::AuditLog,
        Arc::new(full_stub()),
        fixed_normalizer(),
    ));

    let poller = Poller::new(Arc::clone(&controller), Duration::ZERO);
    assert_eq!(poller.period(), MIN_PERIOD);

    let handle = poller.start();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    poller.stop();
    handle.await.unwrap();

    assert_eq!(poller.stats().polls, 3);
}

#[tokio::test(start_paused = true)]
async fn test_poller_failures_reach_the_page() {
    let stub = Arc::new(full_stub());
    let controller = Arc::new(PageController::new(
        PageKind::AuditLog,
        stub.clone(),
        fixed_normalizer(),
    ));
    controller.refresh().await;
    stub.set_failure(SourceKind::Log, 500);

    let poller = Poller::new(Arc::clone(&controller), Duration::from_secs(10));
    let handle = poller.start();
    tokio::time::sleep(Duration::from_secs(15)).await;
    poller.stop();
    handle.await.unwrap();

    let stats = poller.stats();
    assert_eq!(stats.failures, 2);
    assert!(stats.last_error.is_some());
    let state = controller.snapshot();
    assert_eq!(state.activities().len(), 3);
    assert_eq!(state.notifications().len(), 1);
    assert_eq!(state.notifications()[0].level, NotificationLevel::Error);
}

#[tokio::test]
async fn test_export_with_failed_source_keeps_data_clean() {
    let stub = full_stub().with_failure(SourceKind::Completion, 503);
    let controller = PageController::new(PageKind::RecentActivity, Arc::new(stub), fixed_normalizer());
    controller.refresh().await;

    let mut out = Vec::new();
    let mut notices = Vec::new();
    export_page(&controller.snapshot(), ExportFormat::Csv, &mut out, &mut notices).unwrap();

    let mut reader = csv::Reader::from_reader(out.as_slice());
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| !row.iter().any(|field| field.contains("Gagal"))));

    let notices = String::from_utf8(notices).unwrap();
    assert!(notices.starts_with("[!] Gagal memuat data completion"));
}
