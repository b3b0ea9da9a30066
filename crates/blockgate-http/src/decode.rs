//! Response decoding and failure classification for a received status/body.
//!
//! The body of a 200 response is decoded twice: once into the caller's
//! typed shape and once into the generic `{"error": {...}}` envelope. A
//! non-zero embedded error code wins over both a successful and a failed
//! typed decode, because nodes routinely answer protocol errors with 200.
//! A body carrying neither `result` nor an error object is an upstream
//! protocol violation, unlike an explicit `"result": null`.

use serde::de::DeserializeOwned;

use blockgate_core::error::GatewayError;
use blockgate_core::request::{JsonRpcResponse, RpcErrorEnvelope};

/// Classify an upstream reply and decode it into `JsonRpcResponse<T>`.
pub fn decode_response<T: DeserializeOwned>(
    method: &str,
    status: u16,
    body: &str,
) -> Result<JsonRpcResponse<T>, GatewayError> {
    if status != 200 {
        tracing::warn!(method, status, body, "non-200 response from RPC");
        return Err(GatewayError::blockchain(format!(
            "RPC server returned non-200 response: {status}"
        ))
        .with_context("status_code", status)
        .with_context("response", body));
    }

    let typed = serde_json::from_str::<JsonRpcResponse<T>>(body);

    let envelope = serde_json::from_str::<RpcErrorEnvelope>(body).ok();
    let has_result = envelope.as_ref().map_or(true, |env| env.has_result);

    if let Some(rpc_err) = envelope.and_then(RpcErrorEnvelope::into_error) {
        tracing::error!(
            method,
            error_code = rpc_err.code,
            error_message = %rpc_err.message,
            "RPC returned error"
        );
        let mut err = GatewayError::blockchain(rpc_err.to_string())
            .with_context("error_code", rpc_err.code)
            .with_context("error_message", rpc_err.message);
        if let Some(data) = rpc_err.data {
            err = err.with_context("error_data", data);
        }
        return Err(err);
    }

    let resp = typed.map_err(|e| {
        tracing::error!(method, error = %e, response = body, "failed to unmarshal response");
        GatewayError::internal("Failed to unmarshal JSON response")
            .with_source(e)
            .with_context("response", body)
    })?;

    if !has_result {
        tracing::error!(method, response = body, "RPC response carried neither result nor error");
        return Err(
            GatewayError::blockchain("RPC response carried neither result nor error")
                .with_context("response", body),
        );
    }

    Ok(resp)
}
