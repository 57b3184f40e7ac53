//! Integration tests for the token registry endpoints.
//!
//! Run with: `cargo test --test test_dex_tokens`

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{create_test_app, create_unconfigured_app, send, StubRouter};

const CAKE_ADDRESS: &str = "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82";

fn cake_body() -> Value {
    json!({
        "chainId": 56,
        "decimals": 18,
        "symbol": "CAKE",
        "name": "PancakeSwap Token",
        "usdtPrice": "2.50",
        "address": CAKE_ADDRESS,
    })
}

fn bnb_body() -> Value {
    json!({
        "chainId": "56",
        "decimals": "18",
        "symbol": "BNB",
        "name": "BNB",
        "usdtPrice": 612.5,
        "isNative": true,
    })
}

async fn list(app: &axum::Router) -> Vec<Value> {
    let (status, body) = send(app, Method::GET, "/dexTokens", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Tokens fetched successfully");
    body["tokens"].as_array().cloned().unwrap_or_default()
}

// ============================================================================
// Create / List
// ============================================================================

#[tokio::test]
async fn test_create_then_list_round_trip() {
    let app = create_test_app(Arc::new(StubRouter::default()));

    let (status, body) = send(&app, Method::POST, "/dexTokens", Some(cake_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Token added successfully");
    let id = body["_id"].as_str().expect("generated id").to_string();
    assert_eq!(id.len(), 24);

    let tokens = list(&app).await;
    assert_eq!(tokens.len(), 1);
    let cake = &tokens[0];
    assert_eq!(cake["_id"], id);
    assert_eq!(cake["symbol"], "CAKE");
    assert_eq!(cake["chainId"], 56);
    assert_eq!(cake["decimals"], 18);
    assert_eq!(cake["isNative"], false);
    assert_eq!(cake["isToken"], true);
    assert_eq!(cake["address"], CAKE_ADDRESS);
    assert_eq!(cake["usdtPrice"], "2.50");
}

#[tokio::test]
async fn test_duplicate_symbol_rejected_and_store_unchanged() {
    let app = create_test_app(Arc::new(StubRouter::default()));

    let (status, _) = send(&app, Method::POST, "/dexTokens", Some(cake_body())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, "/dexTokens", Some(cake_body())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
    assert!(body.get("error").is_none());

    assert_eq!(list(&app).await.len(), 1);
}

#[tokio::test]
async fn test_native_token_without_address() {
    let app = create_test_app(Arc::new(StubRouter::default()));

    let (status, _) = send(&app, Method::POST, "/dexTokens", Some(bnb_body())).await;
    assert_eq!(status, StatusCode::CREATED);

    let tokens = list(&app).await;
    assert_eq!(tokens[0]["isNative"], true);
    assert_eq!(tokens[0]["isToken"], false);
    assert!(tokens[0].get("address").is_none());
    assert_eq!(tokens[0]["chainId"], 56);
}

#[tokio::test]
async fn test_contract_token_without_address_rejected() {
    let app = create_test_app(Arc::new(StubRouter::default()));

    let mut body = cake_body();
    body.as_object_mut().unwrap().remove("address");

    let (status, response) = send(&app, Method::POST, "/dexTokens", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].as_str().unwrap().contains("address"));
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn test_create_missing_fields() {
    let app = create_test_app(Arc::new(StubRouter::default()));

    let (status, body) =
        send(&app, Method::POST, "/dexTokens", Some(json!({ "symbol": "CAKE" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Missing required fields"));
}

#[tokio::test]
async fn test_create_chain_id_beyond_int64_is_bad_request() {
    let app = create_test_app(Arc::new(StubRouter::default()));

    let mut body = cake_body();
    body["chainId"] = json!(u64::MAX);

    let (status, response) = send(&app, Method::POST, "/dexTokens", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].as_str().unwrap().starts_with("chainId"));
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn test_create_malformed_json() {
    let app = create_test_app(Arc::new(StubRouter::default()));

    let (status, body) =
        send(&app, Method::POST, "/dexTokens", Some(json!({ "chainId": [56] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_then_second_delete_not_found() {
    let app = create_test_app(Arc::new(StubRouter::default()));
    send(&app, Method::POST, "/dexTokens", Some(cake_body())).await;

    let (status, body) =
        send(&app, Method::DELETE, "/dexTokens", Some(json!({ "symbol": "CAKE" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token deleted successfully");
    assert_eq!(body["count"], 1);

    let (status, body) =
        send(&app, Method::DELETE, "/dexTokens", Some(json!({ "symbol": "CAKE" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().starts_with("Token not found"));
}

#[tokio::test]
async fn test_delete_unknown_symbol_leaves_store_unchanged() {
    let app = create_test_app(Arc::new(StubRouter::default()));
    send(&app, Method::POST, "/dexTokens", Some(cake_body())).await;

    let (status, _) =
        send(&app, Method::DELETE, "/dexTokens", Some(json!({ "symbol": "NOPE" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(list(&app).await.len(), 1);
}

#[tokio::test]
async fn test_delete_requires_symbol() {
    let app = create_test_app(Arc::new(StubRouter::default()));

    let (status, body) = send(&app, Method::DELETE, "/dexTokens", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: symbol");
}

// ============================================================================
// Patch
// ============================================================================

#[tokio::test]
async fn test_patch_logo_changes_only_that_field() {
    let app = create_test_app(Arc::new(StubRouter::default()));
    send(&app, Method::POST, "/dexTokens", Some(cake_body())).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/dexTokens/CAKE",
        Some(json!({ "logoURI": "https://x" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token updated successfully");
    assert_eq!(body["count"], 1);

    let tokens = list(&app).await;
    let cake = &tokens[0];
    assert_eq!(cake["logoURI"], "https://x");
    assert_eq!(cake["name"], "PancakeSwap Token");
    assert_eq!(cake["address"], CAKE_ADDRESS);
    assert_eq!(cake["usdtPrice"], "2.50");
}

#[tokio::test]
async fn test_patch_unknown_symbol() {
    let app = create_test_app(Arc::new(StubRouter::default()));

    let (status, _) =
        send(&app, Method::PATCH, "/dexTokens/NOPE", Some(json!({ "name": "Nope" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_empty_or_unknown_fields_rejected() {
    let app = create_test_app(Arc::new(StubRouter::default()));
    send(&app, Method::POST, "/dexTokens", Some(cake_body())).await;

    let (status, _) = send(&app, Method::PATCH, "/dexTokens/CAKE", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        send(&app, Method::PATCH, "/dexTokens/CAKE", Some(json!({ "color": "pink" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_cannot_break_native_invariant() {
    let app = create_test_app(Arc::new(StubRouter::default()));
    send(&app, Method::POST, "/dexTokens", Some(bnb_body())).await;

    // Native record gaining an address without switching kind.
    let (status, _) = send(
        &app,
        Method::PATCH,
        "/dexTokens/BNB",
        Some(json!({ "address": CAKE_ADDRESS })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let tokens = list(&app).await;
    assert!(tokens[0].get("address").is_none());
}

// ============================================================================
// Unconfigured Store
// ============================================================================

#[tokio::test]
async fn test_registry_without_store_is_server_error() {
    let app = create_unconfigured_app();

    let (status, body) = send(&app, Method::GET, "/dexTokens", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error fetching tokens");
    assert!(body["error"].as_str().unwrap().contains("MONGODB_URI"));
}
