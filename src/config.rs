//! Client configuration and its validation rules.

use std::time::Duration;

use crate::error::ConfigErrors;
use crate::network::DEFAULT_API_URL;

/// Key prefixes the API accepts, matched case-insensitively.
pub const ACCEPTED_KEY_PREFIXES: [&str; 4] = ["b.", "sb.", "pk.", "pk_test."];

/// Default per-attempt timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default retry budget after the first attempt.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound on the per-attempt timeout.
const MAX_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Upper bound on the retry budget.
const MAX_RETRIES_LIMIT: u32 = 10;

/// Settings for a [`NotchpayClient`](crate::NotchpayClient).
///
/// Construct with [`NotchpayConfig::new`] and adjust fields with struct
/// update syntax:
///
/// ```
/// use std::time::Duration;
/// use notchpay_sdk::NotchpayConfig;
///
/// let config = NotchpayConfig {
///     timeout: Duration::from_secs(10),
///     ..NotchpayConfig::new("sb.live_abc123")
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct NotchpayConfig {
    /// API key; must carry one of [`ACCEPTED_KEY_PREFIXES`].
    pub api_key: String,
    /// Secondary key sent as `X-Grant` on every request when set, for
    /// operations that require additional authorization (e.g. transfers).
    pub private_key: Option<String>,
    /// Base endpoint; absolute `http` or `https` URL.
    pub base_url: String,
    /// Budget for one attempt, covering connect, send, and receive. Retries
    /// each get a fresh budget.
    pub timeout: Duration,
    /// Additional attempts allowed after the first, at most 10.
    pub max_retries: u32,
    /// Emit per-attempt request lifecycle events to the observer.
    pub enable_telemetry: bool,
}

impl NotchpayConfig {
    /// Config with the given key and production defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Checks every rule and aggregates all violations; nothing
    /// short-circuits, so one call reports every problem at once.
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut errors = ConfigErrors::default();

        if self.api_key.trim().is_empty() {
            errors.push("api_key", "API key is required");
        } else if !has_accepted_prefix(&self.api_key) {
            // Checked against the raw key; the same bytes go on the wire.
            errors.push(
                "api_key",
                "API key must start with 'b.', 'sb.', 'pk.', or 'pk_test.'",
            );
        }

        if let Some(private_key) = &self.private_key {
            if private_key.trim().is_empty() {
                errors.push("private_key", "private key must not be blank when set");
            }
        }

        match reqwest::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => errors.push("base_url", "base_url must be an absolute http or https URL"),
        }

        if self.timeout.is_zero() {
            errors.push("timeout", "timeout must be greater than zero");
        } else if self.timeout > MAX_TIMEOUT {
            errors.push("timeout", "timeout must not exceed 5 minutes");
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            errors.push("max_retries", "max_retries must not exceed 10");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for NotchpayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            private_key: None,
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            enable_telemetry: false,
        }
    }
}

fn has_accepted_prefix(key: &str) -> bool {
    ACCEPTED_KEY_PREFIXES.iter().any(|prefix| {
        key.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
