//! Pure data types for the LMS activity feed
//!
//! Everything here is plain data: the heterogeneous [`RawEvent`] records the
//! backend returns, the closed classification enums, and the display-ready
//! [`NormalizedActivity`]. No I/O, no async.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod activity;
pub mod error;
pub mod locale;
pub mod raw;

// Re-export commonly used types
pub use activity::{ActionKind, NormalizedActivity, Severity, SourceKind};
pub use error::TypesError;
pub use locale::Locale;
pub use raw::RawEvent;
