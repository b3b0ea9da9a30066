//! End-to-end tests against a mock JSON-RPC upstream.

use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::{json, Value};

use blockgate_core::{BlockchainClient, ErrorKind, InMemoryReporter, JsonRpcRequest};
use blockgate_http::{GatewayConfig, HttpGatewayClient};

const BLOCK_BODY: &str = r#"{
    "jsonrpc":"2.0",
    "id":1,
    "result":{
        "number":"0x134e82a",
        "hash":"0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef",
        "parentHash":"0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890",
        "nonce":"0x0000000000000000",
        "sha3Uncles":"0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
        "logsBloom":"0x00",
        "transactionsRoot":"0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
        "stateRoot":"0xd7f8974fb5ac78d9ac099b9ad5018bedc2ce0a72dad1827a1709da30580f0544",
        "receiptsRoot":"0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
        "miner":"0x0000000000000000000000000000000000000000",
        "difficulty":"0x0",
        "totalDifficulty":"0x0",
        "extraData":"0x",
        "size":"0x1000",
        "gasLimit":"0x1000000",
        "gasUsed":"0x500000",
        "timestamp":"0x60123456",
        "transactions":[],
        "uncles":[]
    }
}"#;

fn client_for(server: &MockServer, timeout: Duration) -> (HttpGatewayClient, Arc<InMemoryReporter>) {
    let reporter = Arc::new(InMemoryReporter::new());
    let client = HttpGatewayClient::new(GatewayConfig::new(server.base_url(), timeout), reporter.clone())
        .unwrap();
    (client, reporter)
}

#[tokio::test]
async fn latest_block_number_passes_hex_through() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .header("content-type", "application/json")
                .json_body(json!({
                    "jsonrpc": "2.0",
                    "method": "eth_blockNumber",
                    "params": [],
                    "id": 1
                }));
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"jsonrpc":"2.0","id":1,"result":"0x134e82a"}"#);
        })
        .await;

    let (client, reporter) = client_for(&server, Duration::from_secs(10));
    let number = client.get_latest_block_number().await.unwrap();

    assert_eq!(number, "0x134e82a");
    mock.assert_async().await;

    let snap = reporter.snapshot();
    assert_eq!(snap.methods["eth_blockNumber"].success, 1);
    assert_eq!(snap.methods["eth_blockNumber"].observations, 1);
    assert_eq!(snap.block_height, Some(0x134e82a));
}

#[tokio::test]
async fn latest_block_number_keeps_odd_formatting() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200)
                .body(r#"{"jsonrpc":"2.0","id":1,"result":"0x00AbC"}"#);
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(10));
    assert_eq!(client.get_latest_block_number().await.unwrap(), "0x00AbC");
}

#[tokio::test]
async fn non_200_is_blockchain_error_with_status_and_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(500).body(r#"{"error": "Internal server error"}"#);
        })
        .await;

    let (client, reporter) = client_for(&server, Duration::from_secs(10));
    let err = client.get_latest_block_number().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Blockchain);
    assert_eq!(err.message(), "Failed to get latest block number");
    assert_eq!(err.context_value("status_code"), Some(&Value::from(500)));
    assert_eq!(
        err.context_value("response"),
        Some(&Value::from(r#"{"error": "Internal server error"}"#))
    );
    assert!(std::error::Error::source(&err).is_some());

    let snap = reporter.snapshot();
    assert_eq!(snap.methods["eth_blockNumber"].error, 1);
    assert_eq!(snap.methods["eth_blockNumber"].errors_by_kind["blockchain_error"], 1);
    assert_eq!(snap.block_height, None);
}

#[tokio::test]
async fn embedded_rpc_error_with_200_is_blockchain_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid block number"}}"#,
            );
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(10));
    let err = client.get_block_by_number("0xzz").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Blockchain);
    assert_eq!(err.context_value("error_code"), Some(&Value::from(-32602)));
    assert_eq!(err.context_value("block_number"), Some(&Value::from("0xzz")));
}

#[tokio::test]
async fn block_by_number_decodes_record() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).json_body(json!({
                "jsonrpc": "2.0",
                "method": "eth_getBlockByNumber",
                "params": ["0x134e82a", true],
                "id": 1
            }));
            then.status(200).body(BLOCK_BODY);
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(10));
    let block = client.get_block_by_number("0x134e82a").await.unwrap();

    mock.assert_async().await;
    assert_eq!(block.number, "0x134e82a");
    assert_eq!(
        block.hash,
        "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef"
    );
    assert_eq!(block.gas_limit, "0x1000000");
    assert!(block.transactions.is_empty());
}

#[tokio::test]
async fn block_by_number_without_transactions_sends_false() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).json_body(json!({
                "jsonrpc": "2.0",
                "method": "eth_getBlockByNumber",
                "params": ["latest", false],
                "id": 1
            }));
            then.status(200)
                .body(r#"{"jsonrpc":"2.0","id":1,"result":{"number":"0x5","transactions":["0xaa"]}}"#);
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(10));
    let block = client.get_block_by_number_with("latest", false).await.unwrap();

    mock.assert_async().await;
    assert_eq!(block.transactions[0].hash(), "0xaa");
}

#[tokio::test]
async fn null_block_is_not_found_with_identifier() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#);
        })
        .await;

    let (client, reporter) = client_for(&server, Duration::from_secs(10));
    let err = client.get_block_by_number("0x134e82a").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(
        err.context_value("block_number"),
        Some(&Value::from("0x134e82a"))
    );
    // The upstream call itself succeeded.
    assert_eq!(reporter.snapshot().methods["eth_getBlockByNumber"].success, 1);
}

#[tokio::test]
async fn block_reply_without_result_is_blockchain_not_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body(r#"{"jsonrpc":"2.0","id":1}"#);
        })
        .await;

    let (client, reporter) = client_for(&server, Duration::from_secs(10));
    let err = client.get_block_by_number("0x10").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Blockchain);
    assert!(!err.has_kind(ErrorKind::NotFound));
    assert_eq!(err.context_value("block_number"), Some(&Value::from("0x10")));
    let stats = &reporter.snapshot().methods["eth_getBlockByNumber"];
    assert_eq!(stats.errors_by_kind["blockchain_error"], 1);
}

#[tokio::test]
async fn pending_block_decodes_with_null_fields() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).json_body(json!({
                "jsonrpc": "2.0",
                "method": "eth_getBlockByNumber",
                "params": ["pending", true],
                "id": 1
            }));
            then.status(200).body(
                r#"{"jsonrpc":"2.0","id":1,"result":{
                    "number":null,"hash":null,"nonce":null,"miner":null,"logsBloom":null,
                    "parentHash":"0xabc","timestamp":"0x6012",
                    "transactions":[{
                        "blockHash":null,"blockNumber":null,"transactionIndex":null,
                        "hash":"0xaa","from":"0x01","to":"0x02","value":"0x0"
                    }],
                    "uncles":[]
                }}"#,
            );
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(10));
    let block = client.get_block_by_number("pending").await.unwrap();

    assert_eq!(block.number, "");
    assert_eq!(block.hash, "");
    assert_eq!(block.parent_hash, "0xabc");
    assert_eq!(block.transactions.len(), 1);
    assert_eq!(block.transactions[0].hash(), "0xaa");
}

#[tokio::test]
async fn non_integer_response_id_is_tolerated() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body(r#"{"jsonrpc":"2.0","id":1.5,"result":"0x2a"}"#);
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(10));
    assert_eq!(client.get_latest_block_number().await.unwrap(), "0x2a");
}

#[tokio::test]
async fn malformed_body_surfaces_as_blockchain_with_internal_cause() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body("<html>bad gateway</html>");
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(10));
    let err = client.get_latest_block_number().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Blockchain);
    assert!(err.has_kind(ErrorKind::Internal));
    assert_eq!(
        err.context_value("response"),
        Some(&Value::from("<html>bad gateway</html>"))
    );
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200)
                .delay(Duration::from_millis(1500))
                .body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#);
        })
        .await;

    let (client, reporter) = client_for(&server, Duration::from_millis(200));
    let err = client.get_latest_block_number().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.is_timeout());
    assert_eq!(
        reporter.snapshot().methods["eth_blockNumber"].errors_by_kind["timeout_error"],
        1
    );
}

#[tokio::test]
async fn explicit_deadline_overrides_configured_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200)
                .delay(Duration::from_millis(1500))
                .body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#);
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(30));
    let request = JsonRpcRequest::new("eth_blockNumber", vec![]);
    let err = client
        .call::<String>(&request, Some(Duration::from_millis(200)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn refused_connection_is_internal_not_timeout() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client =
        HttpGatewayClient::default_for(format!("http://127.0.0.1:{port}"), Duration::from_secs(5))
            .unwrap();

    let request = JsonRpcRequest::new("eth_blockNumber", vec![]);
    let err = client.call::<String>(&request, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(!err.is_timeout());

    let err = client.get_latest_block_number().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Blockchain);
    assert!(err.has_kind(ErrorKind::Internal));
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn health_check_names_polygon() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).json_body(json!({
                "jsonrpc": "2.0",
                "method": "net_version",
                "params": [],
                "id": 1
            }));
            then.status(200).body(r#"{"jsonrpc":"2.0","id":1,"result":"137"}"#);
        })
        .await;

    let (client, reporter) = client_for(&server, Duration::from_secs(10));
    let report = client.health_check(Duration::from_secs(30)).await;

    mock.assert_async().await;
    assert!(report.healthy);
    assert!(report.description.contains("Polygon Mainnet"));
    assert_eq!(report.network_id.as_deref(), Some("137"));
    assert!(report.error.is_none());
    assert_eq!(reporter.snapshot().methods["net_version"].success, 1);
}

#[tokio::test]
async fn health_check_unknown_network_is_generic() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body(r#"{"jsonrpc":"2.0","id":1,"result":"31337"}"#);
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(10));
    let report = client.health_check(Duration::from_secs(1)).await;

    assert!(report.healthy);
    assert_eq!(report.description, "Connected to RPC endpoint (Network ID: 31337)");
    assert_eq!(report.chain_name, "");
}

#[tokio::test]
async fn health_check_empty_network_id_is_unhealthy() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body(r#"{"jsonrpc":"2.0","id":1,"result":""}"#);
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(10));
    let report = client.health_check(Duration::from_secs(1)).await;

    assert!(!report.healthy);
    assert_eq!(report.description, "Failed to connect to RPC endpoint");
    assert_eq!(report.error.unwrap().kind(), ErrorKind::Blockchain);
}

#[tokio::test]
async fn health_check_respects_caller_budget() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200)
                .delay(Duration::from_millis(1500))
                .body(r#"{"jsonrpc":"2.0","id":1,"result":"1"}"#);
        })
        .await;

    let (client, _) = client_for(&server, Duration::from_secs(30));
    let report = client.health_check(Duration::from_millis(200)).await;

    assert!(!report.healthy);
    assert!(report.error.unwrap().is_timeout());
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#);
        })
        .await;

    let (client, reporter) = client_for(&server, Duration::from_secs(10));
    let client = Arc::new(client);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get_latest_block_number().await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "0x10");
    }

    mock.assert_hits_async(8).await;
    assert_eq!(reporter.snapshot().methods["eth_blockNumber"].success, 8);
}
