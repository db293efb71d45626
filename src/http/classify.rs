//! Classification of non-success responses into [`ApiError`].

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tracing::warn;

use crate::error::ApiError;
use crate::wire::ErrorResponse;

/// Correlation-id headers, checked in order.
const REQUEST_ID_HEADERS: [&str; 2] = ["X-Request-Id", "Request-Id"];

/// Builds the classified error for a non-success response.
///
/// The body is read as the standard error envelope when possible; otherwise
/// the message falls back to the status reason phrase and the raw body is
/// kept on the error for diagnostics.
pub fn classify_response(status: StatusCode, headers: &HeaderMap, body: &str) -> ApiError {
    let request_id = request_id(headers);
    let retry_after = retry_after(headers);

    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(envelope) => ApiError {
            status: status.as_u16(),
            message: envelope.message,
            request_id,
            errors: envelope.errors,
            retry_after,
            raw_body: None,
        },
        Err(parse_error) => {
            warn!(
                status = status.as_u16(),
                %parse_error,
                "error response body is not a standard envelope"
            );
            ApiError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("an error occurred")
                    .to_string(),
                request_id,
                errors: None,
                retry_after,
                raw_body: (!body.is_empty()).then(|| body.to_string()),
            }
        }
    }
}

fn request_id(headers: &HeaderMap) -> Option<String> {
    REQUEST_ID_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    })
}

/// `Retry-After` in its delta-seconds form; HTTP-date values are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_parses_the_standard_envelope() {
        let body = r#"{"message":"Invalid amount","errors":{"amount":["must be positive"]}}"#;
        let error = classify_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &headers(&[("X-Request-Id", "req_9")]),
            body,
        );
        assert_eq!(error.status, 422);
        assert_eq!(error.message, "Invalid amount");
        assert_eq!(error.request_id.as_deref(), Some("req_9"));
        assert_eq!(error.errors.as_ref().unwrap()["amount"], vec!["must be positive"]);
        assert!(error.raw_body.is_none());
    }

    #[test]
    fn test_request_id_falls_back_to_secondary_header() {
        let error = classify_response(
            StatusCode::BAD_REQUEST,
            &headers(&[("Request-Id", "req_2")]),
            r#"{"message":"Bad"}"#,
        );
        assert_eq!(error.request_id.as_deref(), Some("req_2"));
    }

    #[test]
    fn test_primary_request_id_header_wins() {
        let error = classify_response(
            StatusCode::BAD_REQUEST,
            &headers(&[("Request-Id", "fallback"), ("X-Request-Id", "primary")]),
            r#"{"message":"Bad"}"#,
        );
        assert_eq!(error.request_id.as_deref(), Some("primary"));
    }

    #[test]
    fn test_unparseable_body_falls_back_to_reason_phrase_and_keeps_body() {
        let error = classify_response(
            StatusCode::BAD_GATEWAY,
            &HeaderMap::new(),
            "<html>upstream died</html>",
        );
        assert_eq!(error.status, 502);
        assert_eq!(error.message, "Bad Gateway");
        assert_eq!(error.raw_body.as_deref(), Some("<html>upstream died</html>"));
    }

    #[test]
    fn test_empty_body_keeps_no_raw_body() {
        let error = classify_response(StatusCode::SERVICE_UNAVAILABLE, &HeaderMap::new(), "");
        assert_eq!(error.message, "Service Unavailable");
        assert!(error.raw_body.is_none());
    }

    #[test]
    fn test_retry_after_seconds_parsed() {
        let error = classify_response(
            StatusCode::TOO_MANY_REQUESTS,
            &headers(&[("Retry-After", "3")]),
            r#"{"message":"slow down"}"#,
        );
        assert_eq!(error.retry_after, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_http_date_retry_after_is_ignored() {
        let error = classify_response(
            StatusCode::TOO_MANY_REQUESTS,
            &headers(&[("Retry-After", "Wed, 21 Oct 2015 07:28:00 GMT")]),
            r#"{"message":"slow down"}"#,
        );
        assert!(error.retry_after.is_none());
    }

    #[test]
    fn test_envelope_without_field_errors() {
        let error = classify_response(
            StatusCode::NOT_FOUND,
            &HeaderMap::new(),
            r#"{"message":"Payment not found"}"#,
        );
        assert_eq!(error.message, "Payment not found");
        assert!(error.errors.is_none());
        assert!(!error.is_retryable());
    }
}
