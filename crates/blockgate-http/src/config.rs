//! Gateway client configuration.

use std::time::Duration;

/// Timeout used when none (or a non-positive one) is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint used when `RPC_URL` is unset.
pub const DEFAULT_RPC_URL: &str = "https://polygon-rpc.com/";

pub const RPC_URL_VAR: &str = "RPC_URL";
pub const TIMEOUT_SECONDS_VAR: &str = "TIMEOUT_SECONDS";

/// Configuration for `HttpGatewayClient`. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// A zero `request_timeout` is replaced with [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Self {
        let request_timeout = if request_timeout.is_zero() {
            DEFAULT_REQUEST_TIMEOUT
        } else {
            request_timeout
        };
        Self {
            endpoint: endpoint.into(),
            request_timeout,
        }
    }

    /// Read `RPC_URL` and `TIMEOUT_SECONDS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(RPC_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let timeout = lookup(TIMEOUT_SECONDS_VAR)
            .as_deref()
            .map(parse_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        Self::new(endpoint, timeout)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RPC_URL, DEFAULT_REQUEST_TIMEOUT)
    }
}

/// Whole seconds; non-positive or unparsable input falls back to the default.
pub fn parse_timeout_secs(raw: &str) -> Duration {
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs as u64),
        _ => {
            tracing::warn!(value = raw, "invalid timeout, using default");
            DEFAULT_REQUEST_TIMEOUT
        }
    }
}
