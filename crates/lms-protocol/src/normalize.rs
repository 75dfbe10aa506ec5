//! Heterogeneous records to [`NormalizedActivity`]
//!
//! The normalizer is stateless apart from its injected [`Clock`] and
//! [`TimeDisplay`]. It maps every input record to exactly one activity, in
//! input order; sorting, filtering and grouping happen downstream in
//! [`crate::feed`].

use crate::classify::{classify_action, classify_severity};
use crate::clock::{Clock, SystemClock};
use crate::error::{ProtocolError, ProtocolResult, json_type_name};
use crate::source::{RawFields, adapter_for};
use crate::time::{TimeDisplay, resolve_occurred_at};
use chrono::{DateTime, Utc};
use lms_types::{NormalizedActivity, RawEvent, SourceKind};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Converts raw endpoint payloads into display-ready activities
#[derive(Debug, Clone)]
pub struct Normalizer<C: Clock = SystemClock> {
    clock: C,
    display: TimeDisplay,
}

impl Default for Normalizer<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock, TimeDisplay::default())
    }
}

impl<C: Clock> Normalizer<C> {
    /// Create a normalizer reading "now" from `clock`
    #[must_use]
    pub const fn new(clock: C, display: TimeDisplay) -> Self {
        Self { clock, display }
    }

    /// The injected clock
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Display policy used for relative times and buckets
    #[must_use]
    pub const fn display(&self) -> TimeDisplay {
        self.display
    }

    /// Normalize a JSON array of records from `source`
    ///
    /// Elements that are not objects degrade to all-default activities.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidArgument`] if `raw` is not an array.
    pub fn normalize(
        &self,
        raw: &Value,
        source: SourceKind,
    ) -> ProtocolResult<Vec<NormalizedActivity>> {
        let Value::Array(items) = raw else {
            return Err(ProtocolError::invalid_argument(format!(
                "expected an array of {source} records, got {}",
                json_type_name(raw)
            )));
        };

        let records: Vec<RawEvent> = items.iter().cloned().map(RawEvent::from_value).collect();
        Ok(self.normalize_records(&records, source))
    }

    /// Normalize already-typed records; never fails
    #[must_use]
    pub fn normalize_records(
        &self,
        records: &[RawEvent],
        source: SourceKind,
    ) -> Vec<NormalizedActivity> {
        let now = self.clock.now();
        let adapter = adapter_for(source);
        let mut seen = HashSet::with_capacity(records.len());

        let activities: Vec<NormalizedActivity> = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let fields = adapter.to_raw_fields(record);
                let id = unique_id(fields.id.clone(), source, index, &mut seen);
                self.build(id, source, fields, now)
            })
            .collect();

        debug!(
            source = %source,
            records = activities.len(),
            "Normalized activity batch"
        );

        activities
    }

    /// Recompute `relative_time` and `date_bucket` against the current now
    ///
    /// Both labels are render-time values; held activities go stale as the
    /// clock advances.
    pub fn refresh_display(&self, activities: &mut [NormalizedActivity]) {
        let now = self.clock.now();
        for activity in activities {
            activity.relative_time = self.display.relative_time(activity.occurred_at, now);
            activity.date_bucket = self.display.date_bucket(activity.occurred_at, now);
        }
    }

    fn build(
        &self,
        id: String,
        source: SourceKind,
        fields: RawFields<'_>,
        now: DateTime<Utc>,
    ) -> NormalizedActivity {
        let occurred_at = resolve_occurred_at(&fields.timestamps, now);
        let action_kind = classify_action(fields.most_specific_text());
        let severity = classify_severity(&fields.combined_text());

        NormalizedActivity {
            id,
            source,
            actor: fields.actor,
            action_kind,
            severity,
            subject_label: fields.subject.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            occurred_at,
            date_bucket: self.display.date_bucket(occurred_at, now),
            relative_time: self.display.relative_time(occurred_at, now),
            properties: fields.properties.cloned(),
        }
    }
}

/// Source id if unused in this batch, otherwise a suffixed variant
fn unique_id(
    source_id: Option<String>,
    source: SourceKind,
    index: usize,
    seen: &mut HashSet<String>,
) -> String {
    let mut candidate = source_id.unwrap_or_else(|| format!("{source}-{index}"));
    while !seen.insert(candidate.clone()) {
        candidate = format!("{candidate}-{index}");
    }
    candidate
}
