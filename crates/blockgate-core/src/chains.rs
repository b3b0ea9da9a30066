//! Static network-id → chain-name lookup used by the health probe.

/// Human-readable chain name for a `net_version` network id.
///
/// Unknown ids map to an empty string.
pub fn chain_name(network_id: &str) -> &'static str {
    match network_id {
        "1" => "Ethereum Mainnet",
        "3" => "Ropsten Testnet",
        "4" => "Rinkeby Testnet",
        "5" => "Goerli Testnet",
        "42" => "Kovan Testnet",
        "56" => "Binance Smart Chain",
        "137" => "Polygon Mainnet",
        "42161" => "Arbitrum One",
        "10" => "Optimism",
        "8453" => "Base",
        "11155111" => "Sepolia Testnet",
        id if id.starts_with("2018") => "Ethereum Classic",
        _ => "",
    }
}
