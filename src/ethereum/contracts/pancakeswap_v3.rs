//! PancakeSwap V3 contract bindings.

use alloy::sol;

pub use crate::ethereum::constants::{PANCAKE_V3_FACTORY, PANCAKE_V3_QUOTER};

/// Fee tiers deployed on PancakeSwap V3 (in hundredths of a basis point).
pub mod fee_tiers {
    /// 0.01% fee tier.
    pub const FEE_LOWEST: u32 = 100;
    /// 0.05% fee tier.
    pub const FEE_LOW: u32 = 500;
    /// 0.25% fee tier.
    pub const FEE_MEDIUM: u32 = 2500;
    /// 1.00% fee tier.
    pub const FEE_HIGH: u32 = 10000;

    /// All available fee tiers.
    pub const ALL_FEES: [u32; 4] = [FEE_LOWEST, FEE_LOW, FEE_MEDIUM, FEE_HIGH];
}

// PancakeSwap V3 Factory interface
sol! {
    #[sol(rpc)]
    interface IPancakeV3Factory {
        function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool);
    }
}

// PancakeSwap V3 Pool interface
sol! {
    #[sol(rpc)]
    interface IPancakeV3Pool {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function liquidity() external view returns (uint128);
    }
}

// PancakeSwap V3 QuoterV2 interface
sol! {
    #[sol(rpc)]
    interface IQuoterV2 {
        struct QuoteExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint256 amountIn;
            uint24 fee;
            uint160 sqrtPriceLimitX96;
        }

        function quoteExactInputSingle(QuoteExactInputSingleParams memory params)
            external
            returns (
                uint256 amountOut,
                uint160 sqrtPriceX96After,
                uint32 initializedTicksCrossed,
                uint256 gasEstimate
            );
    }
}
