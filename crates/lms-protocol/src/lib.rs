//! Activity normalization and feed shaping for the LMS admin dashboard
//!
//! Audit-log, enrollment and completion endpoints each return their own
//! record shape. This crate turns them into one sortable, filterable,
//! groupable [`NormalizedActivity`](lms_types::NormalizedActivity) model:
//!
//! - [`source`] maps each endpoint shape onto a common field contract
//! - [`classify`] derives action kind and severity from free text
//! - [`time`] resolves timestamps and renders relative times and day buckets
//! - [`normalize`] ties those together behind an injected [`clock::Clock`]
//! - [`feed`] filters, sorts, groups and merges normalized activities
//! - [`summary`] computes display-only aggregates
//! - [`envelope`] accepts both bare-array and `{ "data": [...] }` bodies
//!
//! Nothing here performs I/O.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod classify;
pub mod clock;
pub mod envelope;
pub mod error;
pub mod feed;
pub mod normalize;
pub mod source;
pub mod summary;
pub mod time;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ProtocolError, ProtocolResult};
pub use feed::{
    ActivityFilter, FilterChoice, KindFilter, SeverityFilter, filter_and_group,
    filter_and_group_by_date, flatten_groups, merge_batch, sort_by_recency,
};
pub use normalize::Normalizer;
pub use summary::ActivitySummary;
pub use time::TimeDisplay;
