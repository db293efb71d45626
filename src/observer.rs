//! Diagnostic hooks for observing transport activity.
//!
//! The SDK never installs a tracing subscriber or metrics sink of its own;
//! it reports structured events to an injected [`TransportObserver`] and
//! leaves the plumbing to the host application.

use std::time::Duration;

/// One diagnostic event from the transport.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// An attempt is about to be dispatched. Emitted only when
    /// `enable_telemetry` is set.
    RequestStarted {
        method: String,
        path: String,
        /// 1-based attempt counter.
        attempt: u32,
    },

    /// An attempt produced an HTTP response. Emitted only when
    /// `enable_telemetry` is set.
    RequestCompleted {
        method: String,
        path: String,
        attempt: u32,
        status: u16,
        elapsed: Duration,
    },

    /// A retry was scheduled. Always emitted, before the delay is slept.
    RetryScheduled {
        /// Attempt that just failed, 1-based.
        attempt: u32,
        /// How long the transport will wait before the next attempt.
        delay: Duration,
        /// Status of the failed response, when one was received.
        status: Option<u16>,
        error: String,
    },
}

/// Receives [`TransportEvent`]s from a client.
///
/// Implementations must be cheap and non-blocking; events fire on the
/// request path.
pub trait TransportObserver: Send + Sync {
    fn on_event(&self, event: &TransportEvent);
}

/// Discards every event; the default when no observer is injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TransportObserver for NoopObserver {
    fn on_event(&self, _event: &TransportEvent) {}
}

impl<F> TransportObserver for F
where
    F: Fn(&TransportEvent) + Send + Sync,
{
    fn on_event(&self, event: &TransportEvent) {
        self(event)
    }
}
