//! Query-string encoding for listing and filter parameters.

use serde::Serialize;
use serde_json::Value;

use crate::error::{SdkError, SdkResult, ValidationFailure};

/// Flattens `params` into a percent-encoded query string.
///
/// `None` fields are omitted, scalars use their JSON text, and arrays or
/// nested objects are carried as compact JSON. Key order follows
/// serde_json's map ordering, so identical input yields identical output.
/// The caller appends the `?`.
pub fn encode<P: Serialize>(params: &P) -> SdkResult<String> {
    let value = serde_json::to_value(params).map_err(|e| {
        SdkError::Validation(ValidationFailure::message(format!(
            "query parameters failed to serialize: {e}"
        )))
    })?;

    let object = match value {
        Value::Object(object) => object,
        Value::Null => return Ok(String::new()),
        _ => {
            return Err(SdkError::Validation(ValidationFailure::message(
                "query parameters must serialize to an object",
            )))
        }
    };

    let mut pairs = Vec::with_capacity(object.len());
    for (key, value) in &object {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        };
        pairs.push(format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(&text)
        ));
    }

    Ok(pairs.join("&"))
}
