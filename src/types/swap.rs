//! Swap-related types.

use alloy::primitives::{Address, Bytes, U256};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};

use super::token::Currency;

/// Direction of the amount the caller fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    /// Input amount is exact, output floats.
    ExactInput,
    /// Output amount is exact, input floats.
    ExactOutput,
}

/// Constraints passed to the router when searching for the best trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradePolicy {
    /// Maximum pools a single route may cross.
    pub max_hops: usize,
    /// Maximum routes the input may be split across.
    pub max_splits: usize,
    pub trade_type: TradeType,
}

impl Default for TradePolicy {
    fn default() -> Self {
        Self { max_hops: 2, max_splits: 2, trade_type: TradeType::ExactInput }
    }
}

/// PancakeSwap protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolVersion {
    V2,
    V3,
}

/// A liquidity pool the router may trade through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pool {
    /// Constant-product pair with its current reserves.
    V2 { address: Address, token0: Address, token1: Address, reserve0: U256, reserve1: U256 },
    /// Concentrated-liquidity pool.
    V3 { address: Address, token0: Address, token1: Address, fee: u32, liquidity: u128 },
}

impl Pool {
    pub fn version(&self) -> PoolVersion {
        match self {
            Pool::V2 { .. } => PoolVersion::V2,
            Pool::V3 { .. } => PoolVersion::V3,
        }
    }

    pub fn address(&self) -> Address {
        match self {
            Pool::V2 { address, .. } | Pool::V3 { address, .. } => *address,
        }
    }

    pub fn tokens(&self) -> (Address, Address) {
        match self {
            Pool::V2 { token0, token1, .. } | Pool::V3 { token0, token1, .. } => (*token0, *token1),
        }
    }

    pub fn involves(&self, token: Address) -> bool {
        let (token0, token1) = self.tokens();
        token0 == token || token1 == token
    }

    /// The token on the other side of `token`, if the pool holds it.
    pub fn other(&self, token: Address) -> Option<Address> {
        let (token0, token1) = self.tokens();
        if token == token0 {
            Some(token1)
        } else if token == token1 {
            Some(token0)
        } else {
            None
        }
    }
}

/// An ordered sequence of pools from the input token to the output token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pools: Vec<Pool>,
    /// Token path, one longer than `pools`.
    pub path: Vec<Address>,
}

impl Route {
    /// Protocol of the route; routes never mix versions.
    pub fn version(&self) -> Option<PoolVersion> {
        self.pools.first().map(Pool::version)
    }
}

/// Route as reported in logs.
#[derive(Debug, Clone)]
pub struct RouteSummary {
    pub protocol: PoolVersion,
    pub path: Vec<String>,
    /// Fee tiers of each V3 hop.
    pub fee_tiers: Vec<u32>,
}

impl From<&Route> for RouteSummary {
    fn from(route: &Route) -> Self {
        Self {
            protocol: route.version().unwrap_or(PoolVersion::V2),
            path: route.path.iter().map(|a| a.to_checksum(None)).collect(),
            fee_tiers: route
                .pools
                .iter()
                .filter_map(|p| match p {
                    Pool::V3 { fee, .. } => Some(*fee),
                    Pool::V2 { .. } => None,
                })
                .collect(),
        }
    }
}

/// Best trade returned by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub trade_type: TradeType,
    pub input: Currency,
    pub output: Currency,
    pub input_amount: U256,
    pub output_amount: U256,
    pub route: Route,
}

impl Trade {
    /// Minimum output after applying a slippage tolerance in percent.
    pub fn minimum_output(&self, slippage_percent: Decimal) -> U256 {
        // Basis points keep the arithmetic in U256.
        let bps = (slippage_percent * Decimal::from(100)).trunc().to_u64().unwrap_or(0);
        let keep = U256::from(10_000 - bps.min(10_000));
        let denominator = U256::from(10_000u64);

        match self.output_amount.checked_mul(keep) {
            Some(scaled) => scaled / denominator,
            None => self.output_amount / denominator * keep,
        }
    }
}

/// Options for encoding a trade into router calldata.
#[derive(Debug, Clone)]
pub struct SwapOptions {
    pub recipient: Address,
    /// Slippage tolerance in percent (1 means 1%).
    pub slippage_tolerance: Decimal,
    /// Unix timestamp after which the router reverts.
    pub deadline: u64,
}

/// Calldata produced by the router for a trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapCallParameters {
    /// Router contract to call.
    pub to: Address,
    pub calldata: Bytes,
    /// Native value to attach.
    pub value: U256,
}

/// Ready-to-sign transaction returned by `POST /swap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Sender and recipient of the swap.
    pub account: String,
    /// Router contract address.
    pub to: String,
    /// Calldata (hex encoded).
    pub data: String,
    /// Native value in wei (decimal string).
    pub value: String,
    /// Estimated gas units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
}

impl UnsignedTransaction {
    pub fn new(account: Address, params: &SwapCallParameters) -> Self {
        Self {
            account: account.to_checksum(None),
            to: params.to.to_checksum(None),
            data: format!("0x{}", alloy::hex::encode(&params.calldata)),
            value: params.value.to_string(),
            gas: None,
        }
    }
}
