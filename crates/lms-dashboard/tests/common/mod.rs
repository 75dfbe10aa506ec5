//! Common test utilities and fixtures for integration tests

#![allow(dead_code, unreachable_pub)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use lms_core::{Error, Result};
use lms_dashboard::{ActivityFetcher, ListQuery};
use lms_protocol::{FixedClock, Normalizer, TimeDisplay};
use lms_types::SourceKind;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Instant every fixture is relative to
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0)
        .single()
        .unwrap_or_default()
}

/// Normalizer reading [`fixed_now`]
pub fn fixed_normalizer() -> Normalizer<FixedClock> {
    Normalizer::new(FixedClock::new(fixed_now()), TimeDisplay::default())
}

/// Audit log page as the backend returns it
pub fn log_page() -> Value {
    json!([
        {
            "id": 101,
            "event": "user.deleted",
            "causer": {"name": "Admin Utama"},
            "subject_type": "User",
            "created_at": "2024-01-01T10:00:00Z"
        },
        {
            "id": 102,
            "type": "login",
            "user_name": "Sari",
            "created_at": "2024-01-01T07:30:00Z"
        },
        {
            "id": 103,
            "description": "Pengaturan email diubah"
        }
    ])
}

/// Enrollment page wrapped in a `data` envelope
pub fn enrollment_page() -> Value {
    json!({
        "data": [
            {
                "id": 7,
                "user_name": "Dewi",
                "module_title": "K3 Dasar",
                "enrolled_at": "2023-12-31T15:00:00Z"
            }
        ],
        "meta": {"total": 1}
    })
}

/// Completion page as a bare array
pub fn completion_page() -> Value {
    json!([
        {
            "id": 7,
            "user": {"name": "Dewi"},
            "module": {"title": "K3 Dasar"},
            "status": "failed",
            "completed_at": 1_704_096_000
        }
    ])
}

/// Fetcher serving canned responses per source, recording every call
#[derive(Default)]
pub struct StubFetcher {
    responses: Mutex<HashMap<SourceKind, Value>>,
    failures: Mutex<HashMap<SourceKind, u16>>,
    calls: Mutex<Vec<(SourceKind, ListQuery)>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `source`; envelopes are unwrapped like the real client
    pub fn with_response(self, source: SourceKind, body: Value) -> Self {
        self.set_response(source, body);
        self
    }

    /// Fail `source` with an API error of `status`
    pub fn with_failure(self, source: SourceKind, status: u16) -> Self {
        self.failures.lock().insert(source, status);
        self
    }

    pub fn set_response(&self, source: SourceKind, body: Value) {
        self.responses.lock().insert(source, body);
    }

    pub fn set_failure(&self, source: SourceKind, status: u16) {
        self.failures.lock().insert(source, status);
    }

    pub fn clear_failure(&self, source: SourceKind) {
        self.failures.lock().remove(&source);
    }

    pub fn calls(&self) -> Vec<(SourceKind, ListQuery)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ActivityFetcher for StubFetcher {
    async fn fetch(&self, source: SourceKind, query: &ListQuery) -> Result<Value> {
        self.calls.lock().push((source, query.clone()));

        if let Some(status) = self.failures.lock().get(&source).copied() {
            return Err(Error::Api {
                status,
                message: "stubbed failure".to_string(),
            });
        }

        let body = self
            .responses
            .lock()
            .get(&source)
            .cloned()
            .unwrap_or_else(|| json!([]));
        Ok(lms_protocol::envelope::extract_list(body)?)
    }
}
