//! Data Transfer Objects for API requests and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::types::{LooseNumber, TokenDescriptor, TokenRecord, UnsignedTransaction};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok".to_string(), version: env!("CARGO_PKG_VERSION").to_string() }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Registry entry as served by `GET /dexTokens`; `_id` is rendered as hex.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub chain_id: u64,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
    pub is_native: bool,
    pub is_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usdt_price: Option<String>,
}

impl From<TokenRecord> for TokenView {
    fn from(record: TokenRecord) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()),
            chain_id: record.chain_id,
            decimals: record.decimals,
            symbol: record.symbol,
            name: record.name,
            is_native: record.is_native,
            is_token: record.is_token,
            address: record.address,
            logo_uri: record.logo_uri,
            usdt_price: record.usdt_price,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenListResponse {
    pub message: String,
    pub tokens: Vec<TokenView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCreatedResponse {
    pub message: String,
    #[serde(rename = "_id")]
    pub id: String,
}

/// Response of delete and patch: affected record count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub message: String,
    pub count: u64,
}

// ============================================================================
// Swap / Quote
// ============================================================================

/// Body of `POST /swap`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub swap_to: Option<TokenDescriptor>,
    pub swap_from: Option<TokenDescriptor>,
    pub amount: Option<LooseNumber>,
    /// Account that signs the transaction and receives the output.
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapResponse {
    pub message: String,
    pub transaction: UnsignedTransaction,
}

/// Body of `POST /quote`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub swap_from: Option<TokenDescriptor>,
    pub swap_to: Option<TokenDescriptor>,
    pub user_amount: Option<LooseNumber>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub message: String,
    pub quote: String,
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog entries are served exactly as the token list carries them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub success: bool,
    pub count: usize,
    pub tokens: Vec<Value>,
}

impl From<Vec<Value>> for CatalogResponse {
    fn from(tokens: Vec<Value>) -> Self {
        Self { success: true, count: tokens.len(), tokens }
    }
}

// ============================================================================
// Failures
// ============================================================================

/// Error body: `{message}` for caller mistakes, `{message, error}` otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct ApiFailure {
    #[serde(skip)]
    pub status: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiFailure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), error: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Registry failure: client errors carry their own message, backend
    /// errors are reported under `context` with the cause attached.
    pub fn from_registry(context: &str, err: AppError) -> Self {
        let status = err.status_code();
        if status.is_client_error() {
            Self::new(status, err.to_string())
        } else {
            tracing::error!(error = %err, "{}", context);
            Self::new(status, context).with_error(err.to_string())
        }
    }

    /// Swap/quote failure: always 400, the cause attached.
    pub fn from_router(context: &str, err: AppError) -> Self {
        tracing::warn!(error = %err, "{}", context);
        Self::bad_request(context).with_error(err.to_string())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
