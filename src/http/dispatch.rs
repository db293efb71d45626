//! The raw exchange seam between the client and the HTTP stack.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

use crate::error::NetworkError;

/// One prepared attempt: absolute URL, headers, and an optional JSON body.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// The raw outcome of one attempt that reached the server.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Sends one raw exchange.
///
/// The production implementation is [`ReqwestDispatcher`]; tests substitute
/// implementations that return scripted outcomes.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: &RawRequest) -> Result<RawResponse, NetworkError>;
}

/// reqwest-backed [`Dispatcher`]: one pooled client, per-attempt timeout.
#[derive(Debug, Clone)]
pub struct ReqwestDispatcher {
    client: reqwest::Client,
}

impl ReqwestDispatcher {
    /// Builds the pooled client. `timeout` bounds each attempt end to end:
    /// connect, send, and body read.
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Dispatcher for ReqwestDispatcher {
    async fn dispatch(&self, request: &RawRequest) -> Result<RawResponse, NetworkError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(map_send_error)?;

        Ok(RawResponse { status, headers, body })
    }
}

fn map_send_error(error: reqwest::Error) -> NetworkError {
    if error.is_timeout() {
        NetworkError::Timeout
    } else if error.is_connect() {
        NetworkError::Connect(error.to_string())
    } else {
        NetworkError::Transport(error.to_string())
    }
}
