//! Unprocessed records as returned by the backend list endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single heterogeneous event record
///
/// Field names vary by endpoint (audit log, enrollment, completion), so the
/// record is kept as an untyped JSON object and read through the accessor
/// helpers below. A list element that is not an object becomes an empty
/// record rather than being dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Map<String, Value>);

impl RawEvent {
    /// Wrap an existing JSON object
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from any JSON value; non-objects yield an empty record
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }

    /// Raw access to a top-level field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a top-level field as display text
    ///
    /// Strings are trimmed and blank strings count as absent. Numbers are
    /// rendered with their JSON representation so numeric ids survive.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(value_as_text)
    }

    /// Read `outer.inner` as display text (e.g. `causer.name`)
    #[must_use]
    pub fn nested_text(&self, outer: &str, inner: &str) -> Option<String> {
        self.0
            .get(outer)
            .and_then(Value::as_object)
            .and_then(|object| object.get(inner))
            .and_then(value_as_text)
    }

    /// First non-blank text among `keys`, in order
    #[must_use]
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    /// Opaque payload describing the post-change state, if any
    #[must_use]
    pub fn properties(&self) -> Option<&Value> {
        self.0.get("properties").filter(|value| !value.is_null())
    }

    /// Whether the record carries no fields at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<Map<String, Value>> for RawEvent {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
