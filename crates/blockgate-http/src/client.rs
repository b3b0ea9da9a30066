//! HTTP JSON-RPC gateway client backed by `reqwest`.
//!
//! One attempt per call: no retry, no backoff, no circuit breaker. Every
//! call runs under a per-request deadline handed straight to `reqwest`, and
//! dropping the returned future aborts the in-flight request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use blockgate_core::block::{parse_hex_quantity, Block};
use blockgate_core::client::{BlockchainClient, HealthReport};
use blockgate_core::error::{ErrorKind, GatewayError};
use blockgate_core::reporter::{NoopReporter, Outcome, Reporter};
use blockgate_core::request::{JsonRpcRequest, JsonRpcResponse};

use crate::config::GatewayConfig;
use crate::decode::decode_response;

pub(crate) const METHOD_BLOCK_NUMBER: &str = "eth_blockNumber";
pub(crate) const METHOD_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";

/// JSON-RPC gateway client for a single upstream endpoint.
///
/// Cheap to share: wrap it in an `Arc` and use it from any number of tasks.
/// The underlying connection pool is reused across calls.
pub struct HttpGatewayClient {
    config: GatewayConfig,
    http: reqwest::Client,
    reporter: Arc<dyn Reporter>,
}

impl HttpGatewayClient {
    /// Create a client that reports call outcomes to `reporter`.
    pub fn new(config: GatewayConfig, reporter: Arc<dyn Reporter>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder().build().map_err(|e| {
            GatewayError::internal("Failed to build HTTP client").with_source(e)
        })?;

        tracing::debug!(
            rpc_url = %config.endpoint,
            timeout_ms = config.request_timeout.as_millis() as u64,
            "initializing RPC gateway client"
        );

        Ok(Self {
            config,
            http,
            reporter,
        })
    }

    /// Create a client for `url` with the given timeout and no reporting.
    pub fn default_for(url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        Self::new(GatewayConfig::new(url, timeout), Arc::new(NoopReporter))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        &self.config.endpoint
    }

    /// Send one request and decode the reply into `JsonRpcResponse<T>`.
    ///
    /// `deadline` defaults to the configured request timeout.
    pub async fn call<T: DeserializeOwned>(
        &self,
        request: &JsonRpcRequest,
        deadline: Option<Duration>,
    ) -> Result<JsonRpcResponse<T>, GatewayError> {
        let start = Instant::now();
        let result = self.transport(request, deadline).await;
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(_) => Outcome::Success,
            Err(e) => Outcome::Failure(e.kind()),
        };
        self.reporter.record_outcome(&request.method, outcome);
        self.reporter.record_duration(&request.method, elapsed);

        result
    }

    async fn transport<T: DeserializeOwned>(
        &self,
        request: &JsonRpcRequest,
        deadline: Option<Duration>,
    ) -> Result<JsonRpcResponse<T>, GatewayError> {
        let method = request.method.as_str();
        let deadline = deadline.unwrap_or(self.config.request_timeout);

        let payload = serde_json::to_vec(request).map_err(|e| {
            GatewayError::internal("Failed to marshal JSON request").with_source(e)
        })?;

        let started = Instant::now();
        tracing::debug!(method, url = %self.config.endpoint, "sending RPC request");

        let resp = self
            .http
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(deadline)
            .body(payload)
            .send()
            .await
            .map_err(|e| classify_send_error(method, started.elapsed(), e))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| classify_body_error(method, started.elapsed(), e))?;

        tracing::debug!(
            method,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "received RPC response"
        );

        decode_response(method, status, &body)
    }

    /// Latest block number, exactly as the node formatted it.
    pub async fn get_latest_block_number(&self) -> Result<String, GatewayError> {
        let request = JsonRpcRequest::new(METHOD_BLOCK_NUMBER, vec![]);

        let number = self
            .call::<String>(&request, None)
            .await
            .and_then(|resp| match resp.into_result() {
                Some(number) if !number.is_empty() => Ok(number),
                _ => Err(GatewayError::internal("RPC response carried no block number")),
            })
            .map_err(|e| {
                tracing::error!(error = %e, "failed to get latest block number");
                rewrap(e, "Failed to get latest block number")
            })?;

        if let Some(height) = parse_hex_quantity(&number) {
            self.reporter.record_block_height(height);
        }
        tracing::debug!(block_number = %number, "received latest block number");
        Ok(number)
    }

    /// Block by tag or hex number, with full transaction objects.
    pub async fn get_block_by_number(&self, block_number: &str) -> Result<Block, GatewayError> {
        self.get_block_by_number_with(block_number, true).await
    }

    /// Block by tag or hex number; `include_transactions = false` returns
    /// transaction hashes only.
    pub async fn get_block_by_number_with(
        &self,
        block_number: &str,
        include_transactions: bool,
    ) -> Result<Block, GatewayError> {
        let request = JsonRpcRequest::new(
            METHOD_GET_BLOCK_BY_NUMBER,
            vec![Value::from(block_number), Value::from(include_transactions)],
        );

        let resp = self.call::<Block>(&request, None).await.map_err(|e| {
            tracing::error!(block_number, error = %e, "failed to get block by number");
            rewrap(e, format!("Failed to get block data for block {block_number}"))
                .with_context("block_number", block_number)
        })?;

        match resp.into_result() {
            Some(block) => Ok(block),
            None => {
                tracing::warn!(block_number, "block not found");
                Err(GatewayError::not_found("Block not found")
                    .with_context("block_number", block_number))
            }
        }
    }
}

/// Rewrap a transport failure as an upstream failure, keeping the cause.
///
/// A deadline expiry stays `timeout` so callers can still tell it apart
/// from a refused connection.
fn rewrap(cause: GatewayError, message: impl Into<String>) -> GatewayError {
    let kind = if cause.kind() == ErrorKind::Timeout {
        ErrorKind::Timeout
    } else {
        ErrorKind::Blockchain
    };
    GatewayError::wrap(cause, kind, message)
}

fn classify_send_error(method: &str, elapsed: Duration, err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        tracing::warn!(method, elapsed_ms = elapsed.as_millis() as u64, "RPC request timed out");
        return GatewayError::timeout("RPC request timed out")
            .with_source(err)
            .with_context("method", method);
    }
    tracing::error!(method, error = %err, "RPC request failed");
    GatewayError::internal("Failed to execute HTTP request")
        .with_source(err)
        .with_context("method", method)
}

fn classify_body_error(method: &str, elapsed: Duration, err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        tracing::warn!(method, elapsed_ms = elapsed.as_millis() as u64, "RPC response body timed out");
        return GatewayError::timeout("RPC request timed out")
            .with_source(err)
            .with_context("method", method);
    }
    GatewayError::internal("Failed to read response body")
        .with_source(err)
        .with_context("method", method)
}

#[async_trait]
impl BlockchainClient for HttpGatewayClient {
    async fn latest_block_number(&self) -> Result<String, GatewayError> {
        self.get_latest_block_number().await
    }

    async fn block_by_number(&self, block_number: &str) -> Result<Block, GatewayError> {
        self.get_block_by_number(block_number).await
    }

    async fn health_check(&self, budget: Duration) -> HealthReport {
        self.probe_health(budget).await
    }
}
