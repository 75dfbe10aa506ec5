//! Error types for parsing feed enums

use thiserror::Error;

/// Errors produced while interpreting feed type values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// A string did not name any variant of the expected enum
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue {
        /// Which enum was being parsed
        kind: &'static str,
        /// The rejected input
        value: String,
    },
}

impl TypesError {
    /// Create a new unknown-value error
    #[must_use]
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            kind,
            value: value.into(),
        }
    }
}
