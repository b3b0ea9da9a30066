//! blockgate: REST gateway and CLI for a single JSON-RPC blockchain node.
//!
//! Usage:
//! ```bash
//! # Serve the REST API (RPC_URL, TIMEOUT_SECONDS, PORT from the environment)
//! blockgate serve
//!
//! # One-shot queries
//! blockgate latest --url https://polygon-rpc.com/
//! blockgate block 20244522 --url https://polygon-rpc.com/
//! blockgate health --url https://polygon-rpc.com/ --timeout 3
//! ```

mod config;
mod logging;
mod metrics;
mod server;

use std::env;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use anyhow::Context;

use blockgate_core::block_id;
use blockgate_core::client::{BlockchainClient, HEALTH_CHECK_TIMEOUT};
use blockgate_core::reporter::TracingReporter;
use blockgate_http::HttpGatewayClient;

use crate::config::AppConfig;
use crate::metrics::GatewayMetrics;
use crate::server::AppState;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let config = AppConfig::from_env().with_overrides(
        parse_flag(&args[2..], "--url"),
        parse_flag(&args[2..], "--timeout"),
    );

    let result = match args[1].as_str() {
        "serve" => cmd_serve(config).await,
        "latest" => cmd_latest(config).await,
        "block" => cmd_block(config, &args[2..]).await,
        "health" => cmd_health(config).await,
        "version" | "--version" | "-V" => {
            println!("blockgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("blockgate {}", env!("CARGO_PKG_VERSION"));
    println!("REST gateway for a JSON-RPC blockchain node\n");
    println!("USAGE:");
    println!("    blockgate <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    serve          Serve the REST API");
    println!("    latest         Print the latest block number");
    println!("    block <ID>     Print a block (latest, decimal or 0x-hex)");
    println!("    health         Probe the RPC endpoint");
    println!("    version        Print version");
    println!("    help           Print this help\n");
    println!("FLAGS:");
    println!("    --url <URL>        RPC endpoint URL      [env: RPC_URL]");
    println!("    --timeout <SECS>   Request timeout       [env: TIMEOUT_SECONDS]\n");
    println!("ENVIRONMENT:");
    println!("    PORT, LOG_LEVEL, LOG_JSON, BLOCKGATE_MODE");
}

async fn cmd_serve(config: AppConfig) -> anyhow::Result<()> {
    logging::init_tracing(&config.log);
    tracing::info!(
        rpc_url = %config.gateway.endpoint,
        timeout_secs = config.gateway.request_timeout.as_secs(),
        port = config.port,
        "starting blockgate"
    );

    let metrics = Arc::new(GatewayMetrics::register().context("failed to register metrics")?);
    let client = HttpGatewayClient::new(config.gateway.clone(), metrics.clone())
        .context("failed to create RPC client")?;

    let state = AppState {
        client: Arc::new(client),
        metrics,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    server::serve(addr, state).await
}

fn one_shot_client(config: &AppConfig) -> anyhow::Result<HttpGatewayClient> {
    logging::init_tracing(&config.log);
    HttpGatewayClient::new(config.gateway.clone(), Arc::new(TracingReporter))
        .context("failed to create RPC client")
}

async fn cmd_latest(config: AppConfig) -> anyhow::Result<()> {
    let client = one_shot_client(&config)?;
    let number = client.get_latest_block_number().await?;
    println!("{}", serde_json::json!({ "blockNumber": number }));
    Ok(())
}

async fn cmd_block(config: AppConfig, args: &[String]) -> anyhow::Result<()> {
    let raw = positional(args).context("block identifier is required")?;
    let id = block_id::normalize(raw)?;

    let client = one_shot_client(&config)?;
    let block = client.get_block_by_number(&id).await?;
    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(())
}

async fn cmd_health(config: AppConfig) -> anyhow::Result<()> {
    let client = one_shot_client(&config)?;
    let report = client.health_check(HEALTH_CHECK_TIMEOUT).await;

    println!("  Endpoint: {}", client.url());
    println!("  Healthy:  {}", report.healthy);
    println!("  Status:   {}", report.description);
    match report.error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

/// First argument that is neither a `--flag` nor a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
            continue;
        }
        return Some(arg.as_str());
    }
    None
}
