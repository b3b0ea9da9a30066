//! JSON-RPC 2.0 wire types.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Protocol version tag carried by every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Correlation id used when the caller does not supply one.
pub const DEFAULT_REQUEST_ID: u64 = 1;

/// A single positional JSON-RPC parameter.
pub type RpcParam = Value;

/// A JSON-RPC 2.0 request.
///
/// `params` is always serialized, even when empty, so `eth_blockNumber`
/// goes out as `{"jsonrpc":"2.0","method":"eth_blockNumber","params":[],"id":1}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Vec<RpcParam>,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Create a request with the default correlation id.
    pub fn new(method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self::with_id(DEFAULT_REQUEST_ID, method, params)
    }

    /// Create a request with an explicit correlation id.
    pub fn with_id(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: method.into(),
            params,
            id,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC error: {} (code: {})", self.message, self.code)
    }
}

/// A JSON-RPC 2.0 response decoded into the caller's expected result shape.
///
/// `result` is `None` both when the key is absent and when it is `null`;
/// [`RpcErrorEnvelope::has_result`] tells the two apart. `id` is never
/// correlated, so any JSON value is accepted there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> JsonRpcResponse<T> {
    /// Take the decoded result, if any.
    pub fn into_result(self) -> Option<T> {
        self.result
    }
}

/// The generic error envelope probed on every 200 response.
///
/// Decoded independently of the typed result so that an embedded `error`
/// is seen even when the body also satisfies the expected result shape.
/// An `error` member that is not an error object counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcErrorEnvelope {
    #[serde(default, deserialize_with = "error_object")]
    pub error: Option<JsonRpcError>,
    /// Whether the body carried a `result` member at all, `null` included.
    #[serde(rename = "result", default, deserialize_with = "member_present")]
    pub has_result: bool,
}

impl RpcErrorEnvelope {
    /// The embedded error, if present with a non-zero code.
    pub fn into_error(self) -> Option<JsonRpcError> {
        self.error.filter(|e| e.code != 0)
    }
}

fn error_object<'de, D>(deserializer: D) -> Result<Option<JsonRpcError>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn member_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer).map(|_| true)
}
