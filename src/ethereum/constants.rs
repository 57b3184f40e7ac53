//! BNB Smart Chain constants.
//!
//! Contains the chain ID, base tokens and PancakeSwap contract addresses.

use alloy::primitives::{address, Address};

// ============================================================================
// Chain
// ============================================================================

/// BNB Smart Chain mainnet chain ID.
pub const BSC_CHAIN_ID: u64 = 56;

/// Symbol of the native asset.
pub const NATIVE_SYMBOL: &str = "BNB";

/// Decimals of the native asset.
pub const NATIVE_DECIMALS: u8 = 18;

// ============================================================================
// Base Tokens (BSC Mainnet)
// ============================================================================

/// Wrapped BNB, the pool-side representation of the native asset.
pub const WBNB_ADDRESS: Address = address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");

/// Binance-Peg BSC-USD (USDT).
pub const USDT_ADDRESS: Address = address!("55d398326f99059fF775485246999027B3197955");

/// Binance-Peg BUSD.
pub const BUSD_ADDRESS: Address = address!("e9e7CEA3DedcA5984780Bafc599bD69ADd087D56");

/// PancakeSwap Token (CAKE).
pub const CAKE_ADDRESS: Address = address!("0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82");

/// Intermediate tokens tried for two-hop routes.
pub const BASE_TOKENS: [Address; 4] = [WBNB_ADDRESS, USDT_ADDRESS, BUSD_ADDRESS, CAKE_ADDRESS];

// ============================================================================
// PancakeSwap Addresses (BSC Mainnet)
// ============================================================================

/// PancakeSwap V2 Factory.
pub const PANCAKE_V2_FACTORY: Address = address!("cA143Ce32Fe78f1f7019d7d551a6402fC5350c73");

/// PancakeSwap V3 Factory.
pub const PANCAKE_V3_FACTORY: Address = address!("0BFbCF9fa4f9C56B0F40a671Ad40E0805A091865");

/// PancakeSwap V3 QuoterV2.
pub const PANCAKE_V3_QUOTER: Address = address!("B048Bbc1Ee6b733FFfCFb9e9CeF7375518e25997");

/// PancakeSwap Smart Router (routes V2 and V3 pools).
pub const SMART_ROUTER_ADDRESS: Address = address!("13f4EA83D0bd40E75C8222255bc855a974568Dd4");

/// Smart Router placeholder recipient meaning "the router itself".
pub const ROUTER_ADDRESS_THIS: Address = address!("0000000000000000000000000000000000000002");
