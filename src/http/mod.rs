//! Resilient HTTP transport: the dispatch seam, retry schedule, error
//! classification, and query encoding.

pub mod classify;
pub mod dispatch;
pub mod query;
pub mod retry;

pub(crate) mod client;

pub use classify::classify_response;
pub use dispatch::{Dispatcher, RawRequest, RawResponse, ReqwestDispatcher};
pub use retry::{RetryDecision, RetrySchedule};
