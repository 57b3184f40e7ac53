//! External token catalog.
//!
//! Reads the PancakeSwap top-100 token list and serves its BSC entries. The
//! catalog is best-effort: any failure yields an empty list.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::ethereum::constants::BSC_CHAIN_ID;

/// PancakeSwap top-100 token list.
pub const PANCAKESWAP_TOKEN_LIST_URL: &str =
    "https://tokens.pancakeswap.finance/pancakeswap-top-100.json";

// ============================================================================
// Token List Document (tokenlists.org schema)
// ============================================================================

/// Token list document. Entries stay untyped and are served as published.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenListResponse {
    #[serde(default)]
    pub name: String,
    pub tokens: Vec<Value>,
}

impl TokenListResponse {
    /// Entries whose `chainId` is BSC, in list order.
    pub fn into_bsc_tokens(self) -> Vec<Value> {
        self.tokens.into_iter().filter(is_bsc_entry).collect()
    }
}

fn is_bsc_entry(entry: &Value) -> bool {
    entry.get("chainId").and_then(Value::as_u64) == Some(BSC_CHAIN_ID)
}

// ============================================================================
// Token Catalog
// ============================================================================

/// Client for the external token list.
#[derive(Clone)]
pub struct TokenCatalog {
    client: reqwest::Client,
    token_list_url: String,
}

impl TokenCatalog {
    /// Create a catalog reading from `token_list_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token_list_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, token_list_url: token_list_url.into() })
    }

    /// BSC tokens of the list; empty when the list cannot be fetched or parsed.
    pub async fn list_catalog_tokens(&self) -> Vec<Value> {
        match self.fetch().await {
            Ok(tokens) => {
                info!(count = tokens.len(), "Fetched PancakeSwap token list");
                tokens
            }
            Err(e) => {
                warn!(url = %self.token_list_url, error = %e, "Token list unavailable, serving empty catalog");
                Vec::new()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(&self.token_list_url)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to fetch token list: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Transport(format!(
                "Token list API returned status: {}",
                response.status()
            )));
        }

        let token_list: TokenListResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse token list: {}", e)))?;

        Ok(token_list.into_bsc_tokens())
    }
}
