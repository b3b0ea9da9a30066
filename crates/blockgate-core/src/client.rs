//! The `BlockchainClient` trait, what a routing layer consumes.

use std::time::Duration;

use async_trait::async_trait;

use crate::block::Block;
use crate::error::GatewayError;

/// Deadline the health probe never exceeds, whatever budget the caller gives.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a health probe.
#[derive(Debug)]
pub struct HealthReport {
    pub healthy: bool,
    pub description: String,
    /// Raw `net_version` result, when the probe got that far.
    pub network_id: Option<String>,
    /// Resolved chain name; empty for unknown networks.
    pub chain_name: &'static str,
    /// Why the probe failed. Kept for logging, not for display.
    pub error: Option<GatewayError>,
}

impl HealthReport {
    /// A healthy report for `network_id`.
    pub fn connected(network_id: String, chain_name: &'static str) -> Self {
        let description = if chain_name.is_empty() {
            format!("Connected to RPC endpoint (Network ID: {network_id})")
        } else {
            format!("Connected to {chain_name} (Network ID: {network_id})")
        };
        Self {
            healthy: true,
            description,
            network_id: Some(network_id),
            chain_name,
            error: None,
        }
    }

    /// An unhealthy report caused by `error`.
    pub fn unreachable(error: GatewayError) -> Self {
        Self {
            healthy: false,
            description: "Failed to connect to RPC endpoint".to_string(),
            network_id: None,
            chain_name: "",
            error: Some(error),
        }
    }
}

/// Read-only blockchain queries exposed by a gateway.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one instance serves all concurrent
/// requests and can be stored as `Arc<dyn BlockchainClient>`.
#[async_trait]
pub trait BlockchainClient: Send + Sync + 'static {
    /// Latest block number as the node's hex string, unchanged.
    async fn latest_block_number(&self) -> Result<String, GatewayError>;

    /// Block by tag or `0x`-prefixed hex number, with full transactions.
    async fn block_by_number(&self, block_number: &str) -> Result<Block, GatewayError>;

    /// Probe upstream reachability within `min(budget, HEALTH_CHECK_TIMEOUT)`.
    async fn health_check(&self, budget: Duration) -> HealthReport;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_names_known_chain() {
        let report = HealthReport::connected("137".into(), "Polygon Mainnet");
        assert!(report.healthy);
        assert_eq!(report.description, "Connected to Polygon Mainnet (Network ID: 137)");
    }

    #[test]
    fn connected_falls_back_to_generic_text() {
        let report = HealthReport::connected("777".into(), "");
        assert_eq!(report.description, "Connected to RPC endpoint (Network ID: 777)");
        assert_eq!(report.network_id.as_deref(), Some("777"));
    }

    #[test]
    fn unreachable_keeps_error() {
        let report = HealthReport::unreachable(GatewayError::timeout("RPC request timed out"));
        assert!(!report.healthy);
        assert_eq!(report.description, "Failed to connect to RPC endpoint");
        assert!(report.error.unwrap().is_timeout());
    }
}
