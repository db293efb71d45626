//! Hosted API endpoints.

/// Production Notch Pay API endpoint. Sandbox traffic uses the same host
/// with an `sb.`-prefixed key.
pub const DEFAULT_API_URL: &str = "https://api.notchpay.co";
