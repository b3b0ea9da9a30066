//! `net_version` health probe.

use std::time::Duration;

use blockgate_core::chains::chain_name;
use blockgate_core::client::{HealthReport, HEALTH_CHECK_TIMEOUT};
use blockgate_core::error::{ErrorKind, GatewayError};
use blockgate_core::request::JsonRpcRequest;

use crate::client::HttpGatewayClient;

pub(crate) const METHOD_NET_VERSION: &str = "net_version";

impl HttpGatewayClient {
    /// Issue `net_version` under `min(budget, 5s)` and describe the result.
    ///
    /// Never fails: an unreachable or misbehaving upstream yields an
    /// unhealthy report carrying the underlying error.
    pub async fn probe_health(&self, budget: Duration) -> HealthReport {
        tracing::debug!(url = %self.url(), "performing RPC health check");

        match self.network_id(budget.min(HEALTH_CHECK_TIMEOUT)).await {
            Ok(network_id) => {
                let name = chain_name(&network_id);
                HealthReport::connected(network_id, name)
            }
            Err(e) => {
                tracing::warn!(error = %e, "RPC health check failed");
                HealthReport::unreachable(e)
            }
        }
    }

    /// Raw `net_version` result; empty or absent counts as a failure.
    pub async fn network_id(&self, deadline: Duration) -> Result<String, GatewayError> {
        let request = JsonRpcRequest::new(METHOD_NET_VERSION, vec![]);
        let resp = self.call::<String>(&request, Some(deadline)).await?;

        match resp.into_result() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(GatewayError::new(ErrorKind::Blockchain, "empty network ID")
                .with_context("method", METHOD_NET_VERSION)),
        }
    }
}
