//! Error taxonomy shared by every fallible SDK operation.
//!
//! Each failure surfaces as one [`SdkError`] variant so callers branch on the
//! kind instead of matching message strings: configuration problems at
//! construction time, caller-side validation, network-level failures, API
//! rejections, protocol (decode) failures, and cancellation.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type SdkResult<T> = Result<T, SdkError>;

/// Top-level error type for the SDK.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Invalid configuration detected while building the client. Aggregates
    /// every violated field, never just the first.
    #[error("configuration error: {0}")]
    Configuration(ConfigErrors),

    /// Caller-side request-shape violation caught before any network call.
    #[error("{0}")]
    Validation(ValidationFailure),

    /// The exchange produced no usable HTTP response.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The API answered with a non-success status.
    #[error("API error: {0}")]
    Api(ApiError),

    /// A success response carried a body the expected type could not decode.
    #[error("protocol error: status {status} response failed to decode: {message}")]
    Protocol { status: u16, message: String },

    /// The caller's cancellation token fired before the exchange completed.
    #[error("request cancelled")]
    Cancelled,
}

impl SdkError {
    /// Builds a [`SdkError::Validation`] from a field error map.
    pub fn validation(errors: HashMap<String, Vec<String>>) -> Self {
        SdkError::Validation(ValidationFailure::new(errors))
    }

    /// Whether a retry could plausibly succeed: any network-level failure,
    /// or an API status of 408, 429, or 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Network(_) => true,
            SdkError::Api(api) => api.is_retryable(),
            _ => false,
        }
    }
}

/// Network-level failure: the request never produced an HTTP response.
///
/// Variants carry plain strings rather than transport-library types so test
/// dispatchers can produce them without a live socket.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    /// The attempt exceeded the configured timeout (connect, send, and
    /// receive combined).
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport-level failure (DNS, TLS, broken stream).
    #[error("transport failure: {0}")]
    Transport(String),
}

/// A classified non-success response from the API.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status of the failed exchange.
    pub status: u16,
    /// Message from the error envelope, or the status reason phrase when the
    /// body was not a parseable envelope.
    pub message: String,
    /// Correlation id from `X-Request-Id`, falling back to `Request-Id`.
    pub request_id: Option<String>,
    /// Field-level messages from the envelope, verbatim.
    pub errors: Option<HashMap<String, Vec<String>>>,
    /// Server-requested delay before retrying, from `Retry-After` seconds.
    pub retry_after: Option<Duration>,
    /// Unparsed body, kept for diagnostics when it was not a valid envelope.
    pub raw_body: Option<String>,
}

impl ApiError {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// 408, 429, and server errors may be retried; other 4xx are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self.status, 408 | 429) || self.is_server_error()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {}", self.message, self.status)?;
        if let Some(request_id) = &self.request_id {
            write!(f, ", request id {request_id}")?;
        }
        write!(f, ")")
    }
}

/// Field-level validation failure raised before a request leaves the process.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    /// Per-field messages, keyed by the field name the caller supplied.
    pub errors: HashMap<String, Vec<String>>,
    message: String,
}

impl ValidationFailure {
    /// Builds the failure, deriving a message that lists every field in
    /// sorted order.
    pub fn new(errors: HashMap<String, Vec<String>>) -> Self {
        let mut fields: Vec<_> = errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let detail = fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        let message = if detail.is_empty() {
            "request validation failed".to_string()
        } else {
            format!("request validation failed: {detail}")
        };
        Self { errors, message }
    }

    /// A failure with a bare message and no field map, e.g. a body that
    /// cannot be serialized.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: HashMap::new(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// One violated configuration rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Every configuration rule violated at construction time, in rule order.
#[derive(Debug, Clone, Default)]
pub struct ConfigErrors {
    pub errors: Vec<FieldError>,
}

impl ConfigErrors {
    pub fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16) -> ApiError {
        ApiError {
            status,
            message: "failed".to_string(),
            request_id: None,
            errors: None,
            retry_after: None,
            raw_body: None,
        }
    }

    #[test]
    fn test_status_range_helpers() {
        assert!(api_error(404).is_client_error());
        assert!(!api_error(404).is_server_error());
        assert!(api_error(503).is_server_error());
        assert!(!api_error(503).is_client_error());
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [408, 429, 500, 502, 503, 599] {
            assert!(api_error(status).is_retryable(), "{status} should be retryable");
        }
        for status in [400, 401, 403, 404, 422] {
            assert!(!api_error(status).is_retryable(), "{status} should be terminal");
        }
    }

    #[test]
    fn test_network_errors_are_retryable_terminal_kinds_are_not() {
        assert!(SdkError::Network(NetworkError::Timeout).is_retryable());
        assert!(SdkError::Network(NetworkError::Connect("refused".into())).is_retryable());
        assert!(!SdkError::Cancelled.is_retryable());
        assert!(!SdkError::Protocol { status: 200, message: "eof".into() }.is_retryable());
    }

    #[test]
    fn test_validation_message_lists_fields_in_sorted_order() {
        let mut errors = HashMap::new();
        errors.insert("email".to_string(), vec!["is invalid".to_string()]);
        errors.insert(
            "amount".to_string(),
            vec!["must be positive".to_string(), "is required".to_string()],
        );
        let failure = ValidationFailure::new(errors);
        assert_eq!(
            failure.to_string(),
            "request validation failed: amount: must be positive, is required; email: is invalid"
        );
    }

    #[test]
    fn test_config_errors_display_every_field() {
        let mut errors = ConfigErrors::default();
        errors.push("api_key", "API key is required");
        errors.push("timeout", "timeout must be greater than zero");
        let text = errors.to_string();
        assert!(text.contains("api_key: API key is required"));
        assert!(text.contains("timeout: timeout must be greater than zero"));
    }

    #[test]
    fn test_api_error_display_includes_status_and_request_id() {
        let mut error = api_error(422);
        error.request_id = Some("req_123".to_string());
        let text = error.to_string();
        assert!(text.contains("422"));
        assert!(text.contains("req_123"));
    }
}
