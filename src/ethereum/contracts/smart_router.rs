//! PancakeSwap Smart Router bindings.
//!
//! The Smart Router executes V2 and V3 swaps behind one address and batches
//! calls through `multicall` with a deadline.

use alloy::sol;

pub use crate::ethereum::constants::{ROUTER_ADDRESS_THIS, SMART_ROUTER_ADDRESS};

sol! {
    #[sol(rpc)]
    interface ISmartRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactInputParams {
            bytes path;
            address recipient;
            uint256 amountIn;
            uint256 amountOutMinimum;
        }

        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to
        ) external payable returns (uint256 amountOut);

        function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
        function exactInput(ExactInputParams calldata params) external payable returns (uint256 amountOut);

        function unwrapWETH9(uint256 amountMinimum, address recipient) external payable;

        function multicall(uint256 deadline, bytes[] calldata data) external payable returns (bytes[] memory results);
    }
}
