//! blockgate-core: foundation types for the Blockgate JSON-RPC gateway.
//!
//! # Overview
//!
//! Blockgate turns simple REST-style queries into JSON-RPC calls against a
//! single upstream node and normalizes every failure into a small typed
//! taxonomy. The core crate defines:
//!
//! - [`BlockchainClient`]: the async trait a routing layer consumes
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] / [`RpcErrorEnvelope`]: wire types
//! - [`GatewayError`] / [`ErrorKind`]: typed errors with a context bag
//! - [`Block`]: block and transaction records, hex fields untouched
//! - [`Reporter`]: injected outcome/latency reporting
//! - [`block_id`] and [`chains`]: identifier normalization and chain names

pub mod block;
pub mod block_id;
pub mod chains;
pub mod client;
pub mod error;
pub mod reporter;
pub mod request;

pub use block::{parse_hex_quantity, Block, BlockTransaction, Transaction};
pub use client::{BlockchainClient, HealthReport, HEALTH_CHECK_TIMEOUT};
pub use error::{BoxError, ErrorKind, GatewayError, GatewayResult};
pub use reporter::{
    InMemoryReporter, MethodStats, NoopReporter, Outcome, Reporter, ReporterSnapshot,
    TracingReporter,
};
pub use request::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcErrorEnvelope, RpcParam,
    JSONRPC_VERSION,
};
