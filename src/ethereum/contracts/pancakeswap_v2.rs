//! PancakeSwap V2 contract bindings.

use alloy::sol;

pub use crate::ethereum::constants::PANCAKE_V2_FACTORY;

/// Swap fee of every V2 pair, in basis points.
pub const V2_FEE_BPS: u64 = 25;

// PancakeSwap V2 Factory interface
sol! {
    #[sol(rpc)]
    interface IPancakeV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

// PancakeSwap V2 Pair interface
sol! {
    #[sol(rpc)]
    interface IPancakeV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}
