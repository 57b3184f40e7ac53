//! Common utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use tower::ServiceExt;

use pancake_dex_gateway::{
    create_app,
    ethereum::{ChainClient, PancakeSmartRouter, SmartRouter},
    services::{RegistryService, SwapService, TokenCatalog},
    store::{InMemoryTokenStore, MongoTokenStore},
    types::{Currency, Pool, Route, SwapCallParameters, SwapOptions, Trade, TradePolicy},
    AppError, AppState, Result, SMART_ROUTER_ADDRESS,
};

/// Token list URL nothing listens on.
pub const UNREACHABLE_TOKEN_LIST: &str = "http://127.0.0.1:1/pancakeswap-top-100.json";

// ============================================================================
// Stub Router
// ============================================================================

/// Router returning twice the input amount through one V2 pool.
#[derive(Default)]
pub struct StubRouter {
    calls: AtomicUsize,
    /// Fail route discovery as an unreachable node would.
    pub fail: bool,
}

impl StubRouter {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    /// Number of router calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmartRouter for StubRouter {
    async fn v2_candidate_pools(&self, a: &Currency, b: &Currency) -> Result<Vec<Pool>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Transport("connection refused".into()));
        }
        Ok(vec![Pool::V2 {
            address: Address::repeat_byte(0x11),
            token0: a.wrapped(),
            token1: b.wrapped(),
            reserve0: U256::from(1_000_000u64),
            reserve1: U256::from(1_000_000u64),
        }])
    }

    async fn v3_candidate_pools(&self, _a: &Currency, _b: &Currency) -> Result<Vec<Pool>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![])
    }

    async fn best_trade(
        &self,
        input: &Currency,
        amount_in: U256,
        output: &Currency,
        pools: &[Pool],
        policy: &TradePolicy,
    ) -> Result<Trade> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Trade {
            trade_type: policy.trade_type,
            input: input.clone(),
            output: output.clone(),
            input_amount: amount_in,
            output_amount: amount_in * U256::from(2u64),
            route: Route { pools: pools.to_vec(), path: vec![input.wrapped(), output.wrapped()] },
        })
    }

    fn swap_call_parameters(
        &self,
        trade: &Trade,
        _options: &SwapOptions,
    ) -> Result<SwapCallParameters> {
        let value = if trade.input.is_native() { trade.input_amount } else { U256::ZERO };
        Ok(SwapCallParameters {
            to: SMART_ROUTER_ADDRESS,
            calldata: Bytes::from(vec![0xac, 0x96, 0x50, 0xd8]),
            value,
        })
    }

    async fn estimate_gas(&self, _from: Address, _params: &SwapCallParameters) -> Result<u64> {
        Ok(180_000)
    }
}

// ============================================================================
// In-process App
// ============================================================================

/// App backed by an in-memory registry and the given router.
pub fn create_test_app(router: Arc<StubRouter>) -> Router {
    let registry = RegistryService::new(Arc::new(InMemoryTokenStore::new()));
    let swaps = SwapService::new(router);
    let catalog = TokenCatalog::new(UNREACHABLE_TOKEN_LIST).expect("catalog");

    create_app(AppState::new(Some(registry), Some(swaps), catalog))
}

/// App with neither a token store nor an RPC endpoint configured.
pub fn create_unconfigured_app() -> Router {
    let catalog = TokenCatalog::new(UNREACHABLE_TOKEN_LIST).expect("catalog");
    create_app(AppState::new(None, None, catalog))
}

/// Send one request and decode the JSON response.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json =
        if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("json") };

    (status, json)
}

// ============================================================================
// Infrastructure
// ============================================================================

/// Helper to create a MongoDB store on a throwaway database.
pub async fn create_test_mongo_store() -> Option<MongoTokenStore> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let uri = std::env::var("MONGODB_URI").ok().filter(|v| !v.is_empty())?;
    let database = format!("dex_gateway_test_{}", ObjectId::new().to_hex());

    MongoTokenStore::connect(&uri, &database).await.ok()
}

/// Helper to create a swap service against a live BSC node.
pub fn create_live_swap_service() -> Option<SwapService> {
    let _ = dotenvy::dotenv();

    let rpc_url = std::env::var("BSC_RPC_URL")
        .or_else(|_| std::env::var("QUICKNODE_RPC_URL"))
        .ok()
        .filter(|v| !v.is_empty())?;

    let client = Arc::new(ChainClient::new(&rpc_url).ok()?);
    Some(SwapService::new(Arc::new(PancakeSmartRouter::new(client))))
}

/// Skip test if MongoDB is not configured.
#[macro_export]
macro_rules! skip_if_no_mongo {
    () => {
        match common::create_test_mongo_store().await {
            Some(store) => store,
            None => {
                eprintln!("Skipping test: MONGODB_URI not set");
                return;
            }
        }
    };
}

/// Skip test if no BSC RPC endpoint is configured.
#[macro_export]
macro_rules! skip_if_no_rpc {
    () => {
        match common::create_live_swap_service() {
            Some(service) => service,
            None => {
                eprintln!("Skipping test: BSC_RPC_URL or QUICKNODE_RPC_URL not set");
                return;
            }
        }
    };
}
