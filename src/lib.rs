//! PancakeSwap DEX Gateway Library
//!
//! An HTTP backend in front of PancakeSwap on BNB Smart Chain.
//! Builds ready-to-sign swap transactions, quotes swaps and keeps a custom
//! token registry in MongoDB.
//!
//! # Features
//!
//! - **Swap Transactions**: Route through PancakeSwap V2/V3 pools and encode Smart Router calldata
//! - **Quotes**: Best-route output amount for a token pair
//! - **Token Registry**: Create, list, patch and delete registry entries keyed by symbol
//! - **Token Catalog**: BSC entries of the PancakeSwap top-100 token list
//!
//! # Example
//!
//! ```rust,ignore
//! use pancake_dex_gateway::{http, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let state = http::AppState::from_config(&config).await?;
//!     http::start_server(state, config.port).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ethereum;
pub mod http;
pub mod services;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use ethereum::constants::*;
pub use http::{create_app, AppState};
