//! Application state shared across API handlers

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{Config, StoreBackend};
use crate::error::{AppError, Result};
use crate::ethereum::{ChainClient, PancakeSmartRouter};
use crate::services::{RegistryService, SwapService, TokenCatalog};
use crate::store::{InMemoryTokenStore, MongoTokenStore, TokenStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: Option<RegistryService>,
    swaps: Option<SwapService>,
    catalog: TokenCatalog,
}

impl AppState {
    /// Assemble state from already built services.
    ///
    /// A missing registry or swap service makes the matching endpoints fail
    /// on use instead of preventing startup.
    pub fn new(
        registry: Option<RegistryService>,
        swaps: Option<SwapService>,
        catalog: TokenCatalog,
    ) -> Self {
        Self { inner: Arc::new(AppStateInner { registry, swaps, catalog }) }
    }

    /// Build every service from configuration.
    ///
    /// # Errors
    /// Returns `AppError::Config` for a malformed RPC URL or MongoDB URI.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Option<Arc<dyn TokenStore>> = match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory token store");
                Some(Arc::new(InMemoryTokenStore::new()))
            }
            StoreBackend::MongoDb => match &config.mongodb_uri {
                Some(uri) => Some(Arc::new(MongoTokenStore::connect(uri, &config.database).await?)),
                None => {
                    warn!("MONGODB_URI not set, token registry endpoints are disabled");
                    None
                }
            },
        };

        let swaps = match &config.rpc_url {
            Some(rpc_url) => {
                let client = Arc::new(ChainClient::new(rpc_url)?);
                let router = Arc::new(PancakeSmartRouter::new(client));
                Some(SwapService::new(router).with_gas_estimation(config.estimate_gas))
            }
            None => {
                warn!("BSC_RPC_URL not set, swap and quote endpoints are disabled");
                None
            }
        };

        let catalog = TokenCatalog::new(config.token_list_url.clone())?;

        Ok(Self::new(store.map(RegistryService::new), swaps, catalog))
    }

    /// Registry service, or a storage error when no store is configured.
    pub fn registry(&self) -> Result<&RegistryService> {
        self.inner.registry.as_ref().ok_or_else(|| {
            AppError::Storage("token store is not configured (set MONGODB_URI)".into())
        })
    }

    /// Swap service, or a router error when no RPC endpoint is configured.
    pub fn swaps(&self) -> Result<&SwapService> {
        self.inner.swaps.as_ref().ok_or_else(|| {
            AppError::Collaborator("BSC RPC endpoint is not configured (set BSC_RPC_URL)".into())
        })
    }

    pub fn catalog(&self) -> &TokenCatalog {
        &self.inner.catalog
    }
}
