//! BSC RPC client.

use alloy::{
    network::Ethereum,
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionRequest,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::{AppError, Result};

pub type HttpProvider = RootProvider<Ethereum>;

/// Read-only BSC node access shared by the router.
///
/// The node's chain id is asked once and cached; the router refuses to quote
/// against anything but BSC mainnet.
#[derive(Clone)]
pub struct ChainClient {
    provider: Arc<HttpProvider>,
    rpc_url: String,
    chain_id: Arc<OnceCell<u64>>,
}

impl ChainClient {
    /// Build a client for `rpc_url`. Only the URL is checked here; the node is
    /// first contacted by the router.
    pub fn new(rpc_url: &str) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid RPC URL: {}", rpc_url)))?;

        #[allow(deprecated)]
        let provider = ProviderBuilder::new().connect_http(url).root().clone();

        tracing::info!(rpc_url = %rpc_url, "BSC RPC endpoint configured");

        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: rpc_url.to_string(),
            chain_id: Arc::new(OnceCell::new()),
        })
    }

    /// Chain id reported by the node, cached after the first answer.
    pub async fn chain_id(&self) -> Result<u64> {
        self.chain_id
            .get_or_try_init(|| async {
                let chain_id = self.provider.get_chain_id().await?;
                tracing::info!(chain_id, rpc_url = %self.rpc_url, "BSC node reachable");
                Ok(chain_id)
            })
            .await
            .copied()
    }

    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }

    /// Gas the node expects `tx` to use when sent from its `from` account.
    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64> {
        Ok(self.provider.estimate_gas(tx.clone()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_rpc_url_is_config_error() {
        let result = ChainClient::new("not a url");
        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("not a url")));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_not_cached() {
        let client = ChainClient::new("http://127.0.0.1:1").unwrap();
        assert!(client.chain_id().await.is_err());
        assert!(client.chain_id.get().is_none());
    }
}
