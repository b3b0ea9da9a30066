//! Prometheus metrics for the REST server and its upstream RPC calls.

use std::time::Duration;

use axum::http::StatusCode;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use blockgate_core::reporter::{Outcome, Reporter};

/// Counters and latency histograms, registered on a private [`Registry`].
///
/// Cloning is cheap; every clone points at the same registry.
#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    /// API requests by route template, HTTP method and status code.
    api_requests: IntCounterVec,
    /// API request latency [s] by route template and HTTP method.
    api_request_duration: HistogramVec,
    /// Upstream calls by JSON-RPC method and outcome.
    rpc_requests: IntCounterVec,
    /// Failed upstream calls by JSON-RPC method and error kind.
    rpc_errors: IntCounterVec,
    /// Upstream call latency [s] by JSON-RPC method.
    rpc_request_duration: HistogramVec,
    /// Last chain height seen through `eth_blockNumber`.
    chain_height: IntGauge,
}

impl GatewayMetrics {
    pub fn register() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("blockgate".into()), None)?;

        let api_requests = IntCounterVec::new(
            Opts::new("api_requests_total", "Number of served API requests"),
            &["endpoint", "method", "status"],
        )?;
        let api_request_duration = HistogramVec::new(
            HistogramOpts::new("api_request_duration_seconds", "API request duration in seconds"),
            &["endpoint", "method"],
        )?;
        let rpc_requests = IntCounterVec::new(
            Opts::new("rpc_requests_total", "Number of JSON-RPC calls to the upstream node"),
            &["method", "status"],
        )?;
        let rpc_errors = IntCounterVec::new(
            Opts::new("rpc_errors_total", "Number of failed JSON-RPC calls by error kind"),
            &["method", "kind"],
        )?;
        let rpc_request_duration = HistogramVec::new(
            HistogramOpts::new("rpc_request_duration_seconds", "JSON-RPC call duration in seconds"),
            &["method"],
        )?;
        let chain_height = IntGauge::new("chain_height", "Latest block height reported upstream")?;

        registry.register(Box::new(api_requests.clone()))?;
        registry.register(Box::new(api_request_duration.clone()))?;
        registry.register(Box::new(rpc_requests.clone()))?;
        registry.register(Box::new(rpc_errors.clone()))?;
        registry.register(Box::new(rpc_request_duration.clone()))?;
        registry.register(Box::new(chain_height.clone()))?;

        Ok(Self {
            registry,
            api_requests,
            api_request_duration,
            rpc_requests,
            rpc_errors,
            rpc_request_duration,
            chain_height,
        })
    }

    pub fn record_api_request(
        &self,
        endpoint: &str,
        method: &str,
        status: StatusCode,
        elapsed: Duration,
    ) {
        self.api_requests
            .with_label_values(&[endpoint, method, status.as_str()])
            .inc();
        self.api_request_duration
            .with_label_values(&[endpoint, method])
            .observe(elapsed.as_secs_f64());
    }

    /// Text exposition format and its content type.
    pub fn encode(&self) -> Result<(String, Vec<u8>), prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((encoder.format_type().to_string(), buffer))
    }
}

impl Reporter for GatewayMetrics {
    fn record_outcome(&self, method: &str, outcome: Outcome) {
        self.rpc_requests
            .with_label_values(&[method, outcome.as_str()])
            .inc();
        if let Outcome::Failure(kind) = outcome {
            self.rpc_errors.with_label_values(&[method, kind.as_str()]).inc();
        }
    }

    fn record_duration(&self, method: &str, elapsed: Duration) {
        self.rpc_request_duration
            .with_label_values(&[method])
            .observe(elapsed.as_secs_f64());
    }

    fn record_block_height(&self, height: u64) {
        self.chain_height.set(i64::try_from(height).unwrap_or(i64::MAX));
    }
}
