//! API route handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use super::dto::{
    ApiFailure, CatalogResponse, CountResponse, HealthResponse, QuoteRequest, QuoteResponse,
    SwapRequest, SwapResponse, TokenCreatedResponse, TokenListResponse, TokenView,
};
use super::AppState;
use crate::error::AppError;
use crate::services::{CreateTokenRequest, DeleteTokenRequest, TokenPatchRequest};
use crate::types::LooseNumber;

const MISSING_SWAP_FIELDS: &str = "Missing required fields: swapTo, swapFrom, amount, address";
const SWAP_FAILED: &str = "Error creating swap transaction";
const QUOTE_FAILED: &str = "Error fetching quote for swap";
const LIST_FAILED: &str = "Error fetching tokens";
const ADD_FAILED: &str = "Error adding token";
const DELETE_FAILED: &str = "Error deleting token";
const UPDATE_FAILED: &str = "Error updating token";

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/swap", post(create_swap))
        .route("/quote", post(get_quote))
        .route("/tokens", get(list_catalog_tokens))
        .route("/dexTokens", get(list_tokens).post(add_token).delete(delete_token))
        .route("/dexTokens/:symbol", patch(update_token))
        .with_state(state)
}

/// Malformed JSON on a registry endpoint is a validation error.
fn invalid_body(context: &str, rejection: JsonRejection) -> ApiFailure {
    ApiFailure::from_registry(
        context,
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text())),
    )
}

fn present_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn present_amount(value: Option<LooseNumber>) -> Option<String> {
    value.filter(|v| !v.is_blank()).map(|v| v.as_decimal_string())
}

/// GET /health - Check API health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

// ============================================================================
// Swap / Quote
// ============================================================================

/// POST /swap - Build an unsigned router transaction
async fn create_swap(
    State(state): State<AppState>,
    payload: Result<Json<SwapRequest>, JsonRejection>,
) -> Result<Json<SwapResponse>, ApiFailure> {
    let Json(request) = payload
        .map_err(|e| ApiFailure::from_router(SWAP_FAILED, AppError::Validation(e.body_text())))?;

    let (Some(swap_to), Some(swap_from), Some(amount), Some(address)) = (
        request.swap_to,
        request.swap_from,
        present_amount(request.amount),
        present_text(request.address),
    ) else {
        return Err(ApiFailure::bad_request(MISSING_SWAP_FIELDS));
    };

    let swaps = state.swaps().map_err(|e| ApiFailure::from_router(SWAP_FAILED, e))?;
    let transaction = swaps
        .build_swap_transaction(&swap_from, &swap_to, &amount, &address)
        .await
        .map_err(|e| ApiFailure::from_router(SWAP_FAILED, e))?;

    Ok(Json(SwapResponse {
        message: "Swap transaction created successfully".to_string(),
        transaction,
    }))
}

/// POST /quote - Quote the output amount of a swap
async fn get_quote(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse>, ApiFailure> {
    let Json(request) = payload
        .map_err(|e| ApiFailure::from_router(QUOTE_FAILED, AppError::Validation(e.body_text())))?;

    let (Some(swap_from), Some(swap_to), Some(amount)) =
        (request.swap_from, request.swap_to, present_amount(request.user_amount))
    else {
        return Err(ApiFailure::bad_request("Missing required fields"));
    };

    let swaps = state.swaps().map_err(|e| ApiFailure::from_router(QUOTE_FAILED, e))?;
    let quote = swaps
        .quote(&swap_from, &swap_to, &amount)
        .await
        .map_err(|e| ApiFailure::from_router(QUOTE_FAILED, e))?;

    Ok(Json(QuoteResponse { message: "Quote fetched successfully".to_string(), quote }))
}

// ============================================================================
// Catalog
// ============================================================================

/// GET /tokens - BSC tokens of the PancakeSwap token list
async fn list_catalog_tokens(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(state.catalog().list_catalog_tokens().await.into())
}

// ============================================================================
// Token Registry
// ============================================================================

/// GET /dexTokens - List registered tokens
async fn list_tokens(
    State(state): State<AppState>,
) -> Result<Json<TokenListResponse>, ApiFailure> {
    let registry = state.registry().map_err(|e| ApiFailure::from_registry(LIST_FAILED, e))?;
    let tokens = registry.list().await.map_err(|e| ApiFailure::from_registry(LIST_FAILED, e))?;

    Ok(Json(TokenListResponse {
        message: "Tokens fetched successfully".to_string(),
        tokens: tokens.into_iter().map(TokenView::from).collect(),
    }))
}

/// POST /dexTokens - Register a token
async fn add_token(
    State(state): State<AppState>,
    payload: Result<Json<CreateTokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenCreatedResponse>), ApiFailure> {
    let Json(request) = payload.map_err(|e| invalid_body(ADD_FAILED, e))?;

    let registry = state.registry().map_err(|e| ApiFailure::from_registry(ADD_FAILED, e))?;
    let id =
        registry.create(request).await.map_err(|e| ApiFailure::from_registry(ADD_FAILED, e))?;

    let body =
        TokenCreatedResponse { message: "Token added successfully".to_string(), id: id.to_hex() };
    Ok((StatusCode::CREATED, Json(body)))
}

/// DELETE /dexTokens - Remove a token by symbol
async fn delete_token(
    State(state): State<AppState>,
    payload: Result<Json<DeleteTokenRequest>, JsonRejection>,
) -> Result<Json<CountResponse>, ApiFailure> {
    let Json(request) = payload.map_err(|e| invalid_body(DELETE_FAILED, e))?;

    let registry = state.registry().map_err(|e| ApiFailure::from_registry(DELETE_FAILED, e))?;
    let count =
        registry.delete(request).await.map_err(|e| ApiFailure::from_registry(DELETE_FAILED, e))?;

    Ok(Json(CountResponse { message: "Token deleted successfully".to_string(), count }))
}

/// PATCH /dexTokens/:symbol - Update fields of a token
async fn update_token(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    payload: Result<Json<TokenPatchRequest>, JsonRejection>,
) -> Result<Json<CountResponse>, ApiFailure> {
    let Json(request) = payload.map_err(|e| invalid_body(UPDATE_FAILED, e))?;

    let registry = state.registry().map_err(|e| ApiFailure::from_registry(UPDATE_FAILED, e))?;
    let count = registry
        .patch(&symbol, request)
        .await
        .map_err(|e| ApiFailure::from_registry(UPDATE_FAILED, e))?;

    Ok(Json(CountResponse { message: "Token updated successfully".to_string(), count }))
}
