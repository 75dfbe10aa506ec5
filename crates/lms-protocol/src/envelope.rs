//! Response body shapes accepted from list endpoints
//!
//! Endpoints answer either with a bare JSON array or with `{ "data": [...] }`.

use crate::error::{ProtocolError, ProtocolResult, json_type_name};
use lms_types::RawEvent;
use serde_json::Value;

/// Unwrap a list response into its JSON array
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidArgument`] when the body is neither an
/// array nor an object whose `data` field is an array.
pub fn extract_list(body: Value) -> ProtocolResult<Value> {
    match body {
        Value::Array(_) => Ok(body),
        Value::Object(mut object) => match object.remove("data") {
            Some(data @ Value::Array(_)) => Ok(data),
            Some(other) => Err(ProtocolError::invalid_argument(format!(
                "response field 'data' is {}, expected an array",
                json_type_name(&other)
            ))),
            None => Err(ProtocolError::invalid_argument(
                "response object has no 'data' field",
            )),
        },
        other => Err(ProtocolError::invalid_argument(format!(
            "response body is {}, expected an array or an object with 'data'",
            json_type_name(&other)
        ))),
    }
}

/// Unwrap a list response into typed records
///
/// # Errors
///
/// Same conditions as [`extract_list`].
pub fn into_raw_events(body: Value) -> ProtocolResult<Vec<RawEvent>> {
    match extract_list(body)? {
        Value::Array(items) => Ok(items.into_iter().map(RawEvent::from_value).collect()),
        other => Err(ProtocolError::invalid_argument(format!(
            "expected an array, got {}",
            json_type_name(&other)
        ))),
    }
}
