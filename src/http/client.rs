//! Resilient dispatch: header assembly, the retry loop, and classification.

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::NotchpayConfig;
use crate::error::{SdkError, SdkResult, ValidationFailure};
use crate::http::classify::classify_response;
use crate::http::dispatch::{Dispatcher, RawRequest, RawResponse};
use crate::http::query;
use crate::http::retry::{RetryDecision, RetrySchedule};
use crate::observer::{TransportEvent, TransportObserver};

/// Secondary-authorization header for sensitive operations.
const GRANT_HEADER: &str = "x-grant";
/// Caller-supplied idempotency key, POST only.
const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

/// One logical exchange before retries: everything needed to rebuild the raw
/// request on each attempt.
struct Exchange<'a> {
    method: Method,
    path: &'a str,
    url: String,
    body: Option<String>,
    idempotency_key: Option<&'a str>,
}

/// The resilient transport under [`NotchpayClient`](crate::NotchpayClient).
///
/// Holds no mutable state; concurrent dispatches share only the read-only
/// configuration and the connection pool.
#[derive(Clone)]
pub(crate) struct NotchpayHttp {
    config: Arc<NotchpayConfig>,
    dispatcher: Arc<dyn Dispatcher>,
    observer: Arc<dyn TransportObserver>,
    schedule: RetrySchedule,
}

impl NotchpayHttp {
    pub(crate) fn new(
        config: Arc<NotchpayConfig>,
        dispatcher: Arc<dyn Dispatcher>,
        observer: Arc<dyn TransportObserver>,
    ) -> Self {
        let schedule = RetrySchedule::new(config.max_retries);
        Self { config, dispatcher, observer, schedule }
    }

    pub(crate) fn config(&self) -> &NotchpayConfig {
        &self.config
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> SdkResult<T> {
        let exchange = self.exchange(Method::GET, path, None, None, None);
        self.execute(exchange, cancel).await
    }

    pub(crate) async fn query<T, P>(
        &self,
        path: &str,
        params: &P,
        cancel: &CancellationToken,
    ) -> SdkResult<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let encoded = query::encode(params)?;
        let query_string = (!encoded.is_empty()).then_some(encoded);
        let exchange = self.exchange(Method::GET, path, query_string, None, None);
        self.execute(exchange, cancel).await
    }

    pub(crate) async fn post<T, B>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> SdkResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let body = serialize_body(body)?;
        let exchange = self.exchange(Method::POST, path, None, Some(body), idempotency_key);
        self.execute(exchange, cancel).await
    }

    pub(crate) async fn put<T, B>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> SdkResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let body = serialize_body(body)?;
        let exchange = self.exchange(Method::PUT, path, None, Some(body), None);
        self.execute(exchange, cancel).await
    }

    pub(crate) async fn delete(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> SdkResult<()> {
        let exchange = self.exchange(Method::DELETE, path, None, None, None);
        self.execute_raw(exchange, cancel).await.map(|_| ())
    }

    fn exchange<'a>(
        &self,
        method: Method,
        path: &'a str,
        query_string: Option<String>,
        body: Option<String>,
        idempotency_key: Option<&'a str>,
    ) -> Exchange<'a> {
        let mut url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        if let Some(query_string) = &query_string {
            url.push('?');
            url.push_str(query_string);
        }
        Exchange { method, path, url, body, idempotency_key }
    }

    fn headers(&self, exchange: &Exchange<'_>) -> SdkResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, header_value("api_key", &self.config.api_key)?);

        if let Some(private_key) = &self.config.private_key {
            headers.insert(GRANT_HEADER, header_value("private_key", private_key)?);
        }
        if exchange.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if exchange.method == Method::POST {
            if let Some(key) = exchange.idempotency_key {
                if !key.trim().is_empty() {
                    headers.insert(IDEMPOTENCY_HEADER, header_value("idempotency_key", key)?);
                }
            }
        }

        Ok(headers)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        exchange: Exchange<'_>,
        cancel: &CancellationToken,
    ) -> SdkResult<T> {
        let response = self.execute_raw(exchange, cancel).await?;
        decode_body(&response)
    }

    /// Runs the attempt loop until a success response, a terminal failure,
    /// or cancellation.
    async fn execute_raw(
        &self,
        exchange: Exchange<'_>,
        cancel: &CancellationToken,
    ) -> SdkResult<RawResponse> {
        let headers = self.headers(&exchange)?;
        let mut attempt: u32 = 1;

        loop {
            if self.config.enable_telemetry {
                self.observer.on_event(&TransportEvent::RequestStarted {
                    method: exchange.method.to_string(),
                    path: exchange.path.to_string(),
                    attempt,
                });
            }
            debug!(method = %exchange.method, path = exchange.path, attempt, "dispatching request");

            let raw_request = RawRequest {
                method: exchange.method.clone(),
                url: exchange.url.clone(),
                headers: headers.clone(),
                body: exchange.body.clone(),
            };

            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SdkError::Cancelled),
                outcome = self.dispatcher.dispatch(&raw_request) => outcome,
            };

            let failure = match outcome {
                Ok(response) => {
                    if self.config.enable_telemetry {
                        self.observer.on_event(&TransportEvent::RequestCompleted {
                            method: exchange.method.to_string(),
                            path: exchange.path.to_string(),
                            attempt,
                            status: response.status.as_u16(),
                            elapsed: started.elapsed(),
                        });
                    }
                    if response.status.is_success() {
                        debug!(
                            status = response.status.as_u16(),
                            path = exchange.path,
                            attempt,
                            "request succeeded"
                        );
                        return Ok(response);
                    }
                    SdkError::Api(classify_response(
                        response.status,
                        &response.headers,
                        &response.body,
                    ))
                }
                Err(network) => SdkError::Network(network),
            };

            match self.schedule.decide(attempt, &failure) {
                RetryDecision::Retry { delay } => {
                    let status = match &failure {
                        SdkError::Api(api) => Some(api.status),
                        _ => None,
                    };
                    self.observer.on_event(&TransportEvent::RetryScheduled {
                        attempt,
                        delay,
                        status,
                        error: failure.to_string(),
                    });
                    warn!(
                        attempt,
                        max_retries = self.schedule.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "retrying request"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(SdkError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                RetryDecision::GiveUp => {
                    error!(path = exchange.path, attempt, error = %failure, "request failed");
                    return Err(failure);
                }
            }
        }
    }
}

fn serialize_body<B: Serialize>(body: &B) -> SdkResult<String> {
    serde_json::to_string(body).map_err(|e| {
        SdkError::Validation(ValidationFailure::message(format!(
            "request body failed to serialize: {e}"
        )))
    })
}

fn decode_body<T: DeserializeOwned>(response: &RawResponse) -> SdkResult<T> {
    serde_json::from_str(&response.body).map_err(|e| SdkError::Protocol {
        status: response.status.as_u16(),
        message: e.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> SdkResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        SdkError::Validation(ValidationFailure::message(format!(
            "{name} contains characters that cannot be sent in a header"
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_for(config: NotchpayConfig) -> NotchpayHttp {
        use crate::http::dispatch::ReqwestDispatcher;
        use crate::observer::NoopObserver;

        let dispatcher = ReqwestDispatcher::new(config.timeout).unwrap();
        NotchpayHttp::new(Arc::new(config), Arc::new(dispatcher), Arc::new(NoopObserver))
    }

    #[test]
    fn test_url_joining_normalizes_slashes() {
        let mut config = NotchpayConfig::new("sb.key");
        config.base_url = "https://api.notchpay.co/".to_string();
        let http = http_for(config);

        let exchange = http.exchange(Method::GET, "/payments/pay_1", None, None, None);
        assert_eq!(exchange.url, "https://api.notchpay.co/payments/pay_1");

        let exchange = http.exchange(Method::GET, "payments", None, None, None);
        assert_eq!(exchange.url, "https://api.notchpay.co/payments");
    }

    #[test]
    fn test_query_string_is_appended_when_present() {
        let http = http_for(NotchpayConfig::new("sb.key"));
        let exchange =
            http.exchange(Method::GET, "/payments", Some("limit=10&page=2".to_string()), None, None);
        assert_eq!(exchange.url, "https://api.notchpay.co/payments?limit=10&page=2");
    }

    #[test]
    fn test_headers_carry_auth_and_content_negotiation() {
        let mut config = NotchpayConfig::new("sb.key");
        config.private_key = Some("pk.secret".to_string());
        let http = http_for(config);

        let exchange = http.exchange(
            Method::POST,
            "/payments",
            None,
            Some("{}".to_string()),
            Some("order-1"),
        );
        let headers = http.headers(&exchange).unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "sb.key");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(GRANT_HEADER).unwrap(), "pk.secret");
        assert_eq!(headers.get(IDEMPOTENCY_HEADER).unwrap(), "order-1");
    }

    #[test]
    fn test_idempotency_key_is_post_only_and_never_blank() {
        let http = http_for(NotchpayConfig::new("sb.key"));

        let put = http.exchange(Method::PUT, "/payments/p", None, Some("{}".into()), Some("k"));
        assert!(http.headers(&put).unwrap().get(IDEMPOTENCY_HEADER).is_none());

        let blank = http.exchange(Method::POST, "/payments", None, Some("{}".into()), Some("   "));
        assert!(http.headers(&blank).unwrap().get(IDEMPOTENCY_HEADER).is_none());

        let absent = http.exchange(Method::POST, "/payments", None, Some("{}".into()), None);
        assert!(http.headers(&absent).unwrap().get(IDEMPOTENCY_HEADER).is_none());
    }

    #[test]
    fn test_get_requests_send_no_content_type() {
        let http = http_for(NotchpayConfig::new("sb.key"));
        let exchange = http.exchange(Method::GET, "/payments", None, None, None);
        let headers = http.headers(&exchange).unwrap();
        assert!(headers.get(CONTENT_TYPE).is_none());
    }
}
