//! Client construction and the request surface.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::NotchpayConfig;
use crate::error::{SdkError, SdkResult};
use crate::http::client::NotchpayHttp;
use crate::http::dispatch::{Dispatcher, ReqwestDispatcher};
use crate::observer::{NoopObserver, TransportObserver};

/// Asynchronous client for the Notch Pay API.
///
/// Cheap to clone; clones share the connection pool and configuration. Every
/// request method takes the caller's [`CancellationToken`]; pass a fresh
/// token when cancellation is not needed.
///
/// ```no_run
/// use notchpay_sdk::prelude::*;
///
/// # async fn run() -> SdkResult<()> {
/// let client = NotchpayClient::new(NotchpayConfig::new("sb.test_key"))?;
/// let cancel = CancellationToken::new();
/// let balance: serde_json::Value = client.get("/balance", &cancel).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NotchpayClient {
    http: NotchpayHttp,
}

impl fmt::Debug for NotchpayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotchpayClient").finish_non_exhaustive()
    }
}

impl NotchpayClient {
    /// Starts the builder. `config` is validated in
    /// [`build`](NotchpayClientBuilder::build).
    pub fn builder(config: NotchpayConfig) -> NotchpayClientBuilder {
        NotchpayClientBuilder {
            config,
            dispatcher: None,
            observer: None,
        }
    }

    /// Builds a client from `config` with the default transport.
    pub fn new(config: NotchpayConfig) -> SdkResult<Self> {
        Self::builder(config).build()
    }

    /// The validated configuration this client runs with.
    pub fn config(&self) -> &NotchpayConfig {
        self.http.config()
    }

    /// GET `path` and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> SdkResult<T> {
        self.http.get(path, cancel).await
    }

    /// GET `path` with `params` encoded into the query string; `None`
    /// fields are omitted.
    pub async fn query<T, P>(
        &self,
        path: &str,
        params: &P,
        cancel: &CancellationToken,
    ) -> SdkResult<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        self.http.query(path, params, cancel).await
    }

    /// POST `body` to `path`. `idempotency_key`, when supplied, is sent as
    /// `X-Idempotency-Key` so the server can de-duplicate replays; keys are
    /// never generated on the caller's behalf.
    pub async fn post<T, B>(
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
        self.http.post(path, body, idempotency_key, cancel).await
    }

    /// PUT `body` to `path`.
    pub async fn put<T, B>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> SdkResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.http.put(path, body, cancel).await
    }

    /// DELETE `path`, ignoring any response body.
    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> SdkResult<()> {
        self.http.delete(path, cancel).await
    }
}

/// Builder for [`NotchpayClient`].
pub struct NotchpayClientBuilder {
    config: NotchpayConfig,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    observer: Option<Arc<dyn TransportObserver>>,
}

impl NotchpayClientBuilder {
    /// Observer receiving transport events; defaults to [`NoopObserver`].
    /// Closures taking `&TransportEvent` work directly.
    pub fn observer(mut self, observer: impl TransportObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Replaces the HTTP layer, e.g. with a scripted fake in tests.
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Validates the configuration and builds the client. Every violated
    /// rule is reported in one [`SdkError::Configuration`] value.
    pub fn build(self) -> SdkResult<NotchpayClient> {
        self.config.validate().map_err(SdkError::Configuration)?;

        let dispatcher: Arc<dyn Dispatcher> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(ReqwestDispatcher::new(self.config.timeout)?),
        };
        let observer = self
            .observer
            .unwrap_or_else(|| Arc::new(NoopObserver));

        Ok(NotchpayClient {
            http: NotchpayHttp::new(Arc::new(self.config), dispatcher, observer),
        })
    }
}
