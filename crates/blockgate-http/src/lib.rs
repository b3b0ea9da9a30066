//! blockgate-http: reqwest-backed gateway client.
//!
//! [`HttpGatewayClient`] sends one JSON-RPC call per operation to a single
//! upstream endpoint, classifies every failure into a
//! [`blockgate_core::ErrorKind`], and implements
//! [`blockgate_core::BlockchainClient`] for routing layers.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use blockgate_core::TracingReporter;
//! use blockgate_http::{GatewayConfig, HttpGatewayClient};
//!
//! # async fn run() -> Result<(), blockgate_core::GatewayError> {
//! let reporter = Arc::new(TracingReporter);
//! let client = HttpGatewayClient::new(GatewayConfig::from_env(), reporter)?;
//! let latest = client.get_latest_block_number().await?;
//! let block = client.get_block_by_number(&latest).await?;
//! println!("{} has {} transactions", block.hash, block.transactions.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod decode;
pub mod health;

pub use client::HttpGatewayClient;
pub use config::{GatewayConfig, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RPC_URL};
pub use decode::decode_response;
