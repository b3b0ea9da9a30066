//! Process configuration, read once from the environment at startup.

use blockgate_http::config::{parse_timeout_secs, GatewayConfig};

pub const DEFAULT_PORT: u16 = 8080;

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `"info"` or `"info,blockgate_http=debug"`.
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

/// Everything the binary needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub port: u16,
    pub log: LogConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `PORT`, `LOG_LEVEL`, `LOG_JSON` and `BLOCKGATE_MODE`, plus the
    /// gateway's own `RPC_URL` / `TIMEOUT_SECONDS`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let release = lookup("BLOCKGATE_MODE").is_some_and(|m| m.eq_ignore_ascii_case("release"));
        let level = lookup("LOG_LEVEL")
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| if release { "info" } else { "debug" }.to_string());
        let json = lookup("LOG_JSON").is_some_and(|v| matches!(v.as_str(), "1" | "true" | "TRUE"));
        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            gateway: GatewayConfig::from_lookup(&lookup),
            port,
            log: LogConfig { level, json },
        }
    }

    /// Apply `--url` / `--timeout` command-line overrides.
    pub fn with_overrides(mut self, url: Option<String>, timeout: Option<String>) -> Self {
        let endpoint = url.unwrap_or(self.gateway.endpoint);
        let timeout = timeout
            .as_deref()
            .map(parse_timeout_secs)
            .unwrap_or(self.gateway.request_timeout);
        self.gateway = GatewayConfig::new(endpoint, timeout);
        self
    }
}
