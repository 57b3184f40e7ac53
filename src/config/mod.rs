//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::AppError;
use crate::services::catalog::PANCAKESWAP_TOKEN_LIST_URL;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default MongoDB database name.
pub const DEFAULT_DATABASE: &str = "tradewallet";

/// Which backend holds the token registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// MongoDB collection (persistent).
    #[default]
    MongoDb,
    /// Process-local store, lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid token store backend: {}", s)),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// BSC JSON-RPC endpoint URL. Swap and quote fail at first use when unset.
    pub rpc_url: Option<String>,
    /// MongoDB connection string. Registry endpoints fail at first use when unset.
    pub mongodb_uri: Option<String>,
    /// MongoDB database holding the `tokens` collection.
    pub database: String,
    /// Registry backend.
    pub store_backend: StoreBackend,
    /// HTTP listening port.
    pub port: u16,
    /// External token list served by `GET /tokens`.
    pub token_list_url: String,
    /// Attach a gas estimate to built swap transactions.
    pub estimate_gas: bool,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            mongodb_uri: None,
            database: DEFAULT_DATABASE.to_string(),
            store_backend: StoreBackend::default(),
            port: DEFAULT_PORT,
            token_list_url: PANCAKESWAP_TOKEN_LIST_URL.to_string(),
            estimate_gas: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Recognized environment variables (all optional):
    /// - `BSC_RPC_URL` (or `QUICKNODE_RPC_URL`): BSC JSON-RPC endpoint
    /// - `MONGODB_URI`: MongoDB connection string
    /// - `MONGODB_DATABASE`: database name (default: tradewallet)
    /// - `TOKEN_STORE`: `mongodb` or `memory` (default: mongodb)
    /// - `PORT`: listening port (default: 3001)
    /// - `TOKEN_LIST_URL`: external token list document
    /// - `ESTIMATE_GAS`: `true` to attach gas estimates (default: false)
    /// - `LOG_LEVEL`: Logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let rpc_url = non_empty_var("BSC_RPC_URL").or_else(|| non_empty_var("QUICKNODE_RPC_URL"));
        let mongodb_uri = non_empty_var("MONGODB_URI");
        let database = non_empty_var("MONGODB_DATABASE").unwrap_or(defaults.database);

        let store_backend = match non_empty_var("TOKEN_STORE") {
            Some(value) => value.parse::<StoreBackend>().map_err(AppError::Config)?,
            None => defaults.store_backend,
        };

        let port = match non_empty_var("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("Invalid PORT: {}", value)))?,
            None => defaults.port,
        };

        let token_list_url = non_empty_var("TOKEN_LIST_URL").unwrap_or(defaults.token_list_url);

        let estimate_gas = match non_empty_var("ESTIMATE_GAS") {
            Some(value) => parse_bool(&value)
                .ok_or_else(|| AppError::Config(format!("Invalid ESTIMATE_GAS: {}", value)))?,
            None => defaults.estimate_gas,
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            rpc_url,
            mongodb_uri,
            database,
            store_backend,
            port,
            token_list_url,
            estimate_gas,
            log_level,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.database, "tradewallet");
        assert_eq!(config.store_backend, StoreBackend::MongoDb);
        assert!(config.rpc_url.is_none());
        assert!(config.mongodb_uri.is_none());
        assert!(!config.estimate_gas);
    }

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("mongodb".parse::<StoreBackend>().unwrap(), StoreBackend::MongoDb);
        assert_eq!("Mongo".parse::<StoreBackend>().unwrap(), StoreBackend::MongoDb);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
