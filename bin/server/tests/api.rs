//! Route behavior: status codes and response bodies.
//!
//! The router runs against in-memory [`FakeNode`]s, so these tests need no
//! network.


use alloy_primitives::{address, Address};
use axum::http::StatusCode;
use client::test_utils::FakeNode;
use serde_json::json;
use setup::{app, get, post_json, tokens};
use std::sync::Arc;

const HOLDER: Address = address!("0000000000000000000000000000000000000001");
const BLOCKED: Address = address!("0000000000000000000000000000000000000002");

fn node() -> Arc<FakeNode> {
    Arc::new(
        FakeNode::new("http://node")
            .with_balance(HOLDER, tokens(100))
            .with_revert_for(BLOCKED),
    )
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(vec![node()]).await, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Polygon Token API");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = get(app(vec![node()]).await, "/api/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Endpoint not found", "success": false}));
}

#[tokio::test]
async fn test_get_balance() {
    let (status, body) = get(
        app(vec![node()]).await,
        "/api/get_balance?address=0x0000000000000000000000000000000000000001",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "address": "0x0000000000000000000000000000000000000001",
            "success": true,
            "balance_wei": "100000000000000000000",
            "balance_formatted": 100.0,
        })
    );
}

#[tokio::test]
async fn test_get_balance_validation() {
    let node = node();

    let (status, body) = get(app(vec![node.clone()]).await, "/api/get_balance").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Address parameter is required");

    let (status, body) = get(app(vec![node.clone()]).await, "/api/get_balance?address=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Address parameter is required");

    let (status, body) = get(
        app(vec![node.clone()]).await,
        "/api/get_balance?address=0x123",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Ethereum address");
    assert_eq!(body["success"], false);

    assert_eq!(node.call_count(), 0);
}

#[tokio::test]
async fn test_get_balance_revert_is_still_200() {
    let (status, body) = get(
        app(vec![node()]).await,
        "/api/get_balance?address=0x0000000000000000000000000000000000000002",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Smart contract error");
    assert_eq!(body["error_code"], "CONTRACT_REJECTED");
    assert!(body.get("balance_wei").is_none());
}

#[tokio::test]
async fn test_batch() {
    let (status, body) = post_json(
        app(vec![node()]).await,
        "/api/get_balance_batch",
        r#"{"addresses": [
            "0x0000000000000000000000000000000000000002",
            "0x0000000000000000000000000000000000000001"
        ]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let balances = body["balances"].as_array().unwrap();
    assert_eq!(balances[0]["address"], "0x0000000000000000000000000000000000000002");
    assert_eq!(balances[0]["error_code"], "CONTRACT_REJECTED");
    assert_eq!(balances[1]["address"], "0x0000000000000000000000000000000000000001");
    assert_eq!(balances[1]["balance_formatted"], 100.0);
}

#[tokio::test]
async fn test_batch_validation() {
    let node = node();

    for body in [
        "",
        "not json",
        "{}",
        r#"{"addresses": []}"#,
        r#"{"addresses": "0x0000000000000000000000000000000000000001"}"#,
    ] {
        let (status, response) =
            post_json(app(vec![node.clone()]).await, "/api/get_balance_batch", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body = {body:?}");
        assert_eq!(response["error"], "Addresses array is required", "body = {body:?}");
    }

    let (status, response) = post_json(
        app(vec![node.clone()]).await,
        "/api/get_balance_batch",
        r#"{"addresses": ["0x0000000000000000000000000000000000000001", "0xnope"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid Ethereum address: 0xnope");

    let (status, response) = post_json(
        app(vec![node.clone()]).await,
        "/api/get_balance_batch",
        r#"{"addresses": [42]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid Ethereum address: 42");

    assert_eq!(node.call_count(), 0);
}

#[tokio::test]
async fn test_token_info() {
    let (status, body) = get(app(vec![node()]).await, "/api/get_token_info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "symbol": "TBY",
            "name": "TestToken",
            "totalSupply": "1000000000000000000000",
            "totalSupply_formatted": 1000.0,
            "decimals": 18,
            "address": FakeNode::CONTRACT.to_checksum(None),
        })
    );
}

#[tokio::test]
async fn test_token_info_upstream_failure() {
    let failing = Arc::new(FakeNode::new("http://node").with_failing_calls());
    let (status, body) = get(app(vec![failing]).await, "/api/get_token_info").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "RPC call failed");
    assert!(body.get("symbol").is_none());
}

#[tokio::test]
async fn test_top_holders() {
    let (status, body) = get(app(vec![node()]).await, "/api/get_top").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["requested_count"], 10);
    assert_eq!(body["count"], 3);

    let holders = body["top_holders"].as_array().unwrap();
    assert_eq!(holders.len(), 3);
    assert!(holders[0]["address"].is_string());
    assert!(holders[0]["balance"].is_number());
    assert!(holders[0].get("last_transaction_date").is_none());

    let (_, body) = get(app(vec![node()]).await, "/api/get_top?n=2").await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["requested_count"], 2);
}

#[tokio::test]
async fn test_top_holders_with_transactions() {
    let (status, body) = get(
        app(vec![node()]).await,
        "/api/get_top_with_transactions?n=1000",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["requested_count"], 1000);

    let dates: Vec<&str> = body["top_holders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["last_transaction_date"].as_str().unwrap())
        .collect();
    assert!(dates.windows(2).all(|w| w[0] > w[1]));
}

#[tokio::test]
async fn test_top_holders_validation() {
    for route in ["/api/get_top", "/api/get_top_with_transactions"] {
        let (status, body) = get(app(vec![node()]).await, &format!("{route}?n=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Parameter n must be integer");

        for n in ["0", "1001", "-1"] {
            let (status, body) = get(app(vec![node()]).await, &format!("{route}?n={n}")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Parameter n must be between 1 and 1000");
        }
    }
}
