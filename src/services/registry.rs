//! Registry Service: validation in front of the Token Store.
//!
//! Request bodies are checked here before any storage call. Records that
//! reach the store always satisfy the native/token invariants, including
//! after a patch.

use std::str::FromStr;
use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::store::TokenStore;
use crate::types::{parse_address, LooseNumber, TokenPatch, TokenRecord};

/// Read-validate-write rounds before a contended patch is reported as a conflict.
const PATCH_ATTEMPTS: u32 = 3;

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /dexTokens`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    pub chain_id: Option<LooseNumber>,
    pub decimals: Option<LooseNumber>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub usdt_price: Option<LooseNumber>,
    pub is_native: Option<bool>,
    pub address: Option<String>,
    #[serde(rename = "logoURI")]
    pub logo_uri: Option<String>,
}

/// Body of `DELETE /dexTokens`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteTokenRequest {
    pub symbol: Option<String>,
}

/// Body of `PATCH /dexTokens/:symbol`. Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenPatchRequest {
    pub chain_id: Option<LooseNumber>,
    pub decimals: Option<LooseNumber>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub is_native: Option<bool>,
    pub is_token: Option<bool>,
    pub address: Option<String>,
    #[serde(rename = "logoURI")]
    pub logo_uri: Option<String>,
    pub usdt_price: Option<LooseNumber>,
}

impl TokenPatchRequest {
    pub fn is_empty(&self) -> bool {
        *self == TokenPatchRequest::default()
    }

    /// Check field formats and normalize into a [`TokenPatch`].
    pub fn normalize(self) -> Result<TokenPatch> {
        let is_native = match (self.is_native, self.is_token) {
            (Some(native), Some(token)) if native == token => {
                return Err(AppError::Validation(
                    "isNative and isToken cannot have the same value".into(),
                ));
            }
            (Some(native), _) => Some(native),
            (None, Some(token)) => Some(!token),
            (None, None) => None,
        };

        Ok(TokenPatch {
            chain_id: self.chain_id.as_ref().map(parse_chain_id).transpose()?,
            decimals: self.decimals.as_ref().map(parse_decimals).transpose()?,
            symbol: self.symbol.as_deref().map(|s| required_text("symbol", s)).transpose()?,
            name: self.name.as_deref().map(|s| required_text("name", s)).transpose()?,
            is_native,
            address: self.address.as_deref().map(checksum_address).transpose()?,
            logo_uri: self.logo_uri,
            usdt_price: self.usdt_price.as_ref().map(parse_usdt_price).transpose()?,
            clear_address: false,
        })
    }
}

// ============================================================================
// Field Validation
// ============================================================================

/// Chain ids are stored as BSON int64, so the range stops at `i64::MAX`.
fn parse_chain_id(value: &LooseNumber) -> Result<u64> {
    match value.as_u64() {
        Some(chain_id) if chain_id > 0 && i64::try_from(chain_id).is_ok() => Ok(chain_id),
        _ => Err(AppError::Validation(format!(
            "chainId must be an integer between 1 and {}",
            i64::MAX
        ))),
    }
}

fn parse_decimals(value: &LooseNumber) -> Result<u8> {
    value
        .as_u64()
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| AppError::Validation("decimals must be an integer between 0 and 255".into()))
}

fn parse_usdt_price(value: &LooseNumber) -> Result<String> {
    let text = value.as_decimal_string();
    let price = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| AppError::Validation(format!("usdtPrice must be a decimal number: {}", text)))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::Validation("usdtPrice cannot be negative".into()));
    }
    Ok(text)
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

fn checksum_address(value: &str) -> Result<String> {
    Ok(parse_address(value)?.to_checksum(None))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn present_number(value: &Option<LooseNumber>) -> Option<&LooseNumber> {
    value.as_ref().filter(|v| !v.is_blank())
}

// ============================================================================
// Registry Service
// ============================================================================

/// Validating front of the token registry.
#[derive(Clone)]
pub struct RegistryService {
    store: Arc<dyn TokenStore>,
}

impl RegistryService {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// All registered tokens, in insertion order.
    pub async fn list(&self) -> Result<Vec<TokenRecord>> {
        self.store.list_all().await
    }

    /// Validate and register a new token; returns its generated id.
    pub async fn create(&self, request: CreateTokenRequest) -> Result<ObjectId> {
        let record = Self::build_record(request)?;

        if self.store.find_by_symbol(&record.symbol).await?.is_some() {
            return Err(AppError::DuplicateKey(record.symbol));
        }

        let symbol = record.symbol.clone();
        let id = self.store.insert(record).await?;
        info!(symbol = %symbol, id = %id, "Token added to registry");
        Ok(id)
    }

    /// Remove the token registered under the request's symbol; returns the removed count.
    pub async fn delete(&self, request: DeleteTokenRequest) -> Result<u64> {
        let symbol = present(&request.symbol)
            .ok_or_else(|| AppError::Validation("Missing required field: symbol".into()))?;

        let count = self.store.delete_by_symbol(symbol).await?;
        if count == 0 {
            return Err(AppError::NotFound(symbol.to_string()));
        }

        info!(symbol = %symbol, "Token deleted from registry");
        Ok(count)
    }

    /// Apply a partial update; returns the modified count.
    ///
    /// The patch is validated against a fresh read of the record and written
    /// conditionally on that read. If another writer changed the record's kind
    /// in between, the whole round is repeated.
    pub async fn patch(&self, symbol: &str, request: TokenPatchRequest) -> Result<u64> {
        let symbol = symbol.trim();
        if symbol.is_empty() || request.is_empty() {
            return Err(AppError::Validation("Missing required fields".into()));
        }

        let requested = request.normalize()?;

        for attempt in 1..=PATCH_ATTEMPTS {
            let current = self
                .store
                .find_by_symbol(symbol)
                .await?
                .ok_or_else(|| AppError::NotFound(symbol.to_string()))?;

            let mut patch = requested.clone();
            // Switching to native drops the contract address.
            if patch.is_native == Some(true)
                && patch.address.is_none()
                && current.address.is_some()
            {
                patch.clear_address = true;
            }

            let mut merged = current.clone();
            patch.apply_to(&mut merged);
            merged.validate()?;

            if let Some(new_symbol) = patch.symbol.as_deref() {
                if new_symbol != symbol && self.store.find_by_symbol(new_symbol).await?.is_some() {
                    return Err(AppError::DuplicateKey(new_symbol.to_string()));
                }
            }

            let outcome = self.store.patch_by_symbol(symbol, &current, &patch).await?;
            if outcome.matched > 0 {
                info!(symbol = %symbol, modified = outcome.modified, "Token updated in registry");
                return Ok(outcome.modified);
            }

            debug!(symbol = %symbol, attempt, "Token changed during update, re-reading");
        }

        warn!(symbol = %symbol, "Giving up on contended token update");
        Err(AppError::Conflict(symbol.to_string()))
    }

    fn build_record(request: CreateTokenRequest) -> Result<TokenRecord> {
        let is_native = request.is_native.unwrap_or(false);

        let mut missing = Vec::new();
        if present_number(&request.chain_id).is_none() {
            missing.push("chainId");
        }
        if present_number(&request.decimals).is_none() {
            missing.push("decimals");
        }
        if present(&request.symbol).is_none() {
            missing.push("symbol");
        }
        if present(&request.name).is_none() {
            missing.push("name");
        }
        if present_number(&request.usdt_price).is_none() {
            missing.push("usdtPrice");
        }
        if !is_native && present(&request.address).is_none() {
            missing.push("address");
        }
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let (Some(chain_id), Some(decimals), Some(symbol), Some(name), Some(usdt_price)) = (
            present_number(&request.chain_id),
            present_number(&request.decimals),
            present(&request.symbol),
            present(&request.name),
            present_number(&request.usdt_price),
        ) else {
            return Err(AppError::Validation("Missing required fields".into()));
        };

        let chain_id = parse_chain_id(chain_id)?;
        let decimals = parse_decimals(decimals)?;
        let usdt_price = parse_usdt_price(usdt_price)?;

        let mut record = if is_native {
            TokenRecord::native(chain_id, decimals, symbol.to_string(), name.to_string())
        } else {
            let address = present(&request.address).unwrap_or_default();
            TokenRecord::token(
                chain_id,
                decimals,
                symbol.to_string(),
                name.to_string(),
                parse_address(address)?,
            )
        };
        record.usdt_price = Some(usdt_price);
        record.logo_uri = present(&request.logo_uri).map(str::to_string);

        record.validate()?;
        Ok(record)
    }
}
