//! Rust SDK core for the [Notch Pay](https://notchpay.co) API.
//!
//! This crate provides the resilient transport that sits under every Notch
//! Pay integration: configuration validation, authenticated JSON dispatch,
//! bounded retries with exponential backoff, error classification, and
//! first-class cancellation.
//!
//! # Architecture
//!
//! ```text
//! ── Layer 1: Core ───────────────────────────────────────────────
//!   config     validated settings (keys, base URL, timeout, retries)
//!   error      SdkError taxonomy shared by every operation
//!   wire       error envelope and pagination shapes
//!   observer   injected diagnostic hooks
//! ── Layer 2: Transport ──────────────────────────────────────────
//!   http       dispatch seam, retry schedule, classification, queries
//! ── Layer 3: Client ─────────────────────────────────────────────
//!   client     NotchpayClient builder and request surface
//! ```
//!
//! # Quickstart
//!
//! ```no_run
//! use notchpay_sdk::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct Balance {
//!     available: i64,
//!     currency: String,
//! }
//!
//! # async fn run() -> SdkResult<()> {
//! let client = NotchpayClient::new(NotchpayConfig::new("sb.test_key"))?;
//! let cancel = CancellationToken::new();
//! let balance: Balance = client.get("/balance", &cancel).await?;
//! println!("{} {}", balance.available, balance.currency);
//! # Ok(())
//! # }
//! ```
//!
//! Failed attempts are retried automatically when the failure is transient
//! (connection errors, timeouts, HTTP 408/429/5xx), honoring the server's
//! `Retry-After` when present and backing off exponentially otherwise. All
//! other failures surface immediately as one [`SdkError`] variant.

/// Validated client settings and their rules.
pub mod config;
/// Error taxonomy for every fallible operation.
pub mod error;
/// Resilient HTTP transport.
pub mod http;
/// Hosted API endpoints.
pub mod network;
/// Diagnostic event hooks.
pub mod observer;
/// Shared wire shapes (error envelope, pagination).
pub mod wire;

pub mod client;

pub use client::{NotchpayClient, NotchpayClientBuilder};
pub use config::{NotchpayConfig, ACCEPTED_KEY_PREFIXES};
pub use error::{
    ApiError, ConfigErrors, FieldError, NetworkError, SdkError, SdkResult, ValidationFailure,
};
pub use observer::{NoopObserver, TransportEvent, TransportObserver};
pub use tokio_util::sync::CancellationToken;
pub use wire::{ErrorResponse, Paginated, PaginationMeta};

/// Single-import convenience: `use notchpay_sdk::prelude::*;`.
pub mod prelude {
    pub use crate::client::{NotchpayClient, NotchpayClientBuilder};
    pub use crate::config::NotchpayConfig;
    pub use crate::error::{ApiError, NetworkError, SdkError, SdkResult};
    pub use crate::observer::{TransportEvent, TransportObserver};
    pub use crate::wire::{Paginated, PaginationMeta};
    pub use tokio_util::sync::CancellationToken;
}
