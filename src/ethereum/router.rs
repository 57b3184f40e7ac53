//! Smart order router backed by on-chain PancakeSwap state.
//!
//! [`SmartRouter`] is the seam between the swap façade and whatever finds
//! routes and builds calldata. [`PancakeSmartRouter`] is the production
//! implementation: it discovers V2 pairs and V3 pools for the token pair and
//! for the pair through a few base tokens, prices every route of up to
//! `max_hops` pools, and encodes the best one for the PancakeSwap Smart Router.

use std::sync::Arc;

use alloy::{
    primitives::{aliases::U24, Address, Bytes, U160, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use async_trait::async_trait;
use futures::future::try_join_all;

use crate::{
    error::{AppError, Result},
    ethereum::{
        contracts::{
            pancakeswap_v2::{IPancakeV2Factory, IPancakeV2Pair, PANCAKE_V2_FACTORY, V2_FEE_BPS},
            pancakeswap_v3::{
                fee_tiers, IPancakeV3Factory, IPancakeV3Pool, IQuoterV2, PANCAKE_V3_FACTORY,
                PANCAKE_V3_QUOTER,
            },
            smart_router::{ISmartRouter, ROUTER_ADDRESS_THIS, SMART_ROUTER_ADDRESS},
            BASE_TOKENS,
        },
        constants::BSC_CHAIN_ID,
        ChainClient,
    },
    types::{
        Currency, Pool, PoolVersion, Route, SwapCallParameters, SwapOptions, Trade, TradePolicy,
        TradeType,
    },
};

/// Route discovery and calldata construction.
///
/// Implementations may call out to the network; the façade treats every error
/// they return as a failed (unroutable) request.
#[async_trait]
pub trait SmartRouter: Send + Sync {
    /// Candidate V2 pairs that could take part in a trade between `a` and `b`.
    async fn v2_candidate_pools(&self, a: &Currency, b: &Currency) -> Result<Vec<Pool>>;

    /// Candidate V3 pools that could take part in a trade between `a` and `b`.
    async fn v3_candidate_pools(&self, a: &Currency, b: &Currency) -> Result<Vec<Pool>>;

    /// Best trade for `amount_in` of `input` into `output` through `pools`.
    async fn best_trade(
        &self,
        input: &Currency,
        amount_in: U256,
        output: &Currency,
        pools: &[Pool],
        policy: &TradePolicy,
    ) -> Result<Trade>;

    /// Encode a trade into a router call.
    fn swap_call_parameters(
        &self,
        trade: &Trade,
        options: &SwapOptions,
    ) -> Result<SwapCallParameters>;

    /// Gas units the call would consume when sent from `from`.
    async fn estimate_gas(&self, from: Address, params: &SwapCallParameters) -> Result<u64>;
}

/// PancakeSwap router reading pools from BSC.
#[derive(Clone)]
pub struct PancakeSmartRouter {
    client: Arc<ChainClient>,
}

impl PancakeSmartRouter {
    /// Create a router on top of a chain client.
    pub fn new(client: Arc<ChainClient>) -> Self {
        Self { client }
    }

    /// Refuse to route against a node that is not on BSC.
    async fn ensure_bsc(&self) -> Result<()> {
        let chain_id = self.client.chain_id().await?;
        if chain_id != BSC_CHAIN_ID {
            return Err(AppError::Collaborator(format!(
                "RPC node is on chain {}, expected {}",
                chain_id, BSC_CHAIN_ID
            )));
        }
        Ok(())
    }

    /// Look up a V2 pair and its reserves; `None` when the pair does not exist.
    async fn fetch_v2_pair(&self, token_a: Address, token_b: Address) -> Result<Option<Pool>> {
        let factory = IPancakeV2Factory::new(PANCAKE_V2_FACTORY, self.client.provider().clone());
        let pair: Address = factory.getPair(token_a, token_b).call().await?;

        if pair == Address::ZERO {
            return Ok(None);
        }

        let contract = IPancakeV2Pair::new(pair, self.client.provider().clone());
        let token0: Address = contract.token0().call().await?;
        let reserves = contract.getReserves().call().await?;
        let token1 = if token0 == token_a { token_b } else { token_a };

        Ok(Some(Pool::V2 {
            address: pair,
            token0,
            token1,
            reserve0: U256::from(reserves.reserve0),
            reserve1: U256::from(reserves.reserve1),
        }))
    }

    /// Look up a V3 pool; `None` when it does not exist or holds no liquidity.
    async fn fetch_v3_pool(
        &self,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Option<Pool>> {
        let factory = IPancakeV3Factory::new(PANCAKE_V3_FACTORY, self.client.provider().clone());
        let pool: Address = factory.getPool(token_a, token_b, U24::from(fee)).call().await?;

        if pool == Address::ZERO {
            return Ok(None);
        }

        let contract = IPancakeV3Pool::new(pool, self.client.provider().clone());
        let liquidity: u128 = contract.liquidity().call().await?;
        if liquidity == 0 {
            return Ok(None);
        }

        let token0: Address = contract.token0().call().await?;
        let token1 = if token0 == token_a { token_b } else { token_a };

        Ok(Some(Pool::V3 { address: pool, token0, token1, fee, liquidity }))
    }

    /// Output of one hop.
    async fn quote_hop(&self, pool: &Pool, token_in: Address, amount_in: U256) -> Result<U256> {
        match pool {
            Pool::V2 { token0, reserve0, reserve1, .. } => {
                let (reserve_in, reserve_out) =
                    if token_in == *token0 { (*reserve0, *reserve1) } else { (*reserve1, *reserve0) };
                v2_amount_out(amount_in, reserve_in, reserve_out)
            }
            Pool::V3 { fee, .. } => {
                let token_out = pool.other(token_in).ok_or(AppError::PoolNotFound)?;
                let quoter = IQuoterV2::new(PANCAKE_V3_QUOTER, self.client.provider().clone());
                let params = IQuoterV2::QuoteExactInputSingleParams {
                    tokenIn: token_in,
                    tokenOut: token_out,
                    amountIn: amount_in,
                    fee: U24::from(*fee),
                    sqrtPriceLimitX96: U160::ZERO,
                };
                let result = quoter.quoteExactInputSingle(params).call().await?;
                Ok(result.amountOut)
            }
        }
    }

    /// Output of a whole route.
    async fn quote_route(&self, route: &Route, amount_in: U256) -> Result<U256> {
        let mut amount = amount_in;
        for (pool, token_in) in route.pools.iter().zip(route.path.iter()) {
            amount = self.quote_hop(pool, *token_in, amount).await?;
            if amount == U256::ZERO {
                return Err(AppError::InsufficientLiquidity);
            }
        }
        Ok(amount)
    }
}

#[async_trait]
impl SmartRouter for PancakeSmartRouter {
    async fn v2_candidate_pools(&self, a: &Currency, b: &Currency) -> Result<Vec<Pool>> {
        self.ensure_bsc().await?;
        let pairs = candidate_pairs(a.wrapped(), b.wrapped());
        let pools = try_join_all(pairs.iter().map(|(x, y)| self.fetch_v2_pair(*x, *y))).await?;
        let pools: Vec<Pool> = pools.into_iter().flatten().collect();

        tracing::debug!(count = pools.len(), "Fetched V2 candidate pools");
        Ok(pools)
    }

    async fn v3_candidate_pools(&self, a: &Currency, b: &Currency) -> Result<Vec<Pool>> {
        self.ensure_bsc().await?;
        let pairs = candidate_pairs(a.wrapped(), b.wrapped());
        let lookups = pairs.iter().flat_map(|(x, y)| {
            fee_tiers::ALL_FEES.iter().map(move |fee| self.fetch_v3_pool(*x, *y, *fee))
        });
        let pools = try_join_all(lookups).await?;
        let pools: Vec<Pool> = pools.into_iter().flatten().collect();

        tracing::debug!(count = pools.len(), "Fetched V3 candidate pools");
        Ok(pools)
    }

    async fn best_trade(
        &self,
        input: &Currency,
        amount_in: U256,
        output: &Currency,
        pools: &[Pool],
        policy: &TradePolicy,
    ) -> Result<Trade> {
        if policy.trade_type != TradeType::ExactInput {
            return Err(AppError::Collaborator("Only exact-input trades are supported".into()));
        }

        let routes = enumerate_routes(pools, input.wrapped(), output.wrapped(), policy.max_hops);
        if routes.is_empty() {
            return Err(AppError::PoolNotFound);
        }

        // A single route is always within the split budget.
        let mut best: Option<(Route, U256)> = None;
        for route in routes {
            match self.quote_route(&route, amount_in).await {
                Ok(amount_out) => {
                    if best.as_ref().map_or(true, |(_, current)| amount_out > *current) {
                        best = Some((route, amount_out));
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, path = ?route.path, "Skipping unquotable route");
                }
            }
        }

        let (route, output_amount) = best.ok_or(AppError::InsufficientLiquidity)?;

        tracing::info!(
            protocol = ?route.version(),
            hops = route.pools.len(),
            amount_in = %amount_in,
            amount_out = %output_amount,
            "Best trade found"
        );

        Ok(Trade {
            trade_type: policy.trade_type,
            input: input.clone(),
            output: output.clone(),
            input_amount: amount_in,
            output_amount,
            route,
        })
    }

    fn swap_call_parameters(
        &self,
        trade: &Trade,
        options: &SwapOptions,
    ) -> Result<SwapCallParameters> {
        encode_swap(trade, options)
    }

    async fn estimate_gas(&self, from: Address, params: &SwapCallParameters) -> Result<u64> {
        let tx = TransactionRequest::default()
            .from(from)
            .to(params.to)
            .input(params.calldata.clone().into())
            .value(params.value);
        self.client.estimate_gas(&tx).await
    }
}

/// Token pairs worth probing: the direct pair plus each leg through a base token.
fn candidate_pairs(a: Address, b: Address) -> Vec<(Address, Address)> {
    let mut pairs = vec![(a, b)];
    for base in BASE_TOKENS {
        if base == a || base == b {
            continue;
        }
        pairs.push((a, base));
        pairs.push((base, b));
    }
    pairs
}

/// All single-protocol routes from `token_in` to `token_out` of at most `max_hops` pools.
fn enumerate_routes(
    pools: &[Pool],
    token_in: Address,
    token_out: Address,
    max_hops: usize,
) -> Vec<Route> {
    let mut routes = Vec::new();
    if token_in == token_out || max_hops == 0 {
        return routes;
    }

    for pool in pools.iter().filter(|p| p.involves(token_in)) {
        let Some(mid) = pool.other(token_in) else { continue };

        if mid == token_out {
            routes.push(Route { pools: vec![pool.clone()], path: vec![token_in, token_out] });
            continue;
        }

        if max_hops < 2 {
            continue;
        }

        for second in pools.iter().filter(|p| {
            p.version() == pool.version() && p.address() != pool.address() && p.involves(mid)
        }) {
            if second.other(mid) == Some(token_out) {
                routes.push(Route {
                    pools: vec![pool.clone(), second.clone()],
                    path: vec![token_in, mid, token_out],
                });
            }
        }
    }

    routes
}

/// Constant-product output with the V2 swap fee.
fn v2_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    if reserve_in == U256::ZERO || reserve_out == U256::ZERO {
        return Err(AppError::InsufficientLiquidity);
    }

    let fee_factor = U256::from(10_000 - V2_FEE_BPS);
    let overflow = || AppError::NumericOverflow("V2 quote exceeds uint256".into());

    let amount_in_with_fee = amount_in.checked_mul(fee_factor).ok_or_else(overflow)?;
    let numerator = amount_in_with_fee.checked_mul(reserve_out).ok_or_else(overflow)?;
    let denominator = reserve_in
        .checked_mul(U256::from(10_000u64))
        .and_then(|v| v.checked_add(amount_in_with_fee))
        .ok_or_else(overflow)?;

    Ok(numerator / denominator)
}

/// V3 path encoding: token (20 bytes) | fee (3 bytes) | token ...
fn encode_v3_path(route: &Route) -> Result<Bytes> {
    let mut encoded = Vec::with_capacity(20 + route.pools.len() * 23);
    encoded.extend_from_slice(route.path[0].as_slice());

    for (pool, token) in route.pools.iter().zip(route.path.iter().skip(1)) {
        let Pool::V3 { fee, .. } = pool else {
            return Err(AppError::Collaborator("V3 path contains a V2 pool".into()));
        };
        encoded.extend_from_slice(&fee.to_be_bytes()[1..]);
        encoded.extend_from_slice(token.as_slice());
    }

    Ok(Bytes::from(encoded))
}

/// Build the Smart Router multicall for a trade.
fn encode_swap(trade: &Trade, options: &SwapOptions) -> Result<SwapCallParameters> {
    let route = &trade.route;
    if route.pools.is_empty() || route.path.len() != route.pools.len() + 1 {
        return Err(AppError::Collaborator("Trade has an empty or malformed route".into()));
    }

    let amount_out_min = trade.minimum_output(options.slippage_tolerance);
    let native_out = trade.output.is_native();
    // Native output lands in the router first and is unwrapped to the recipient.
    let swap_recipient = if native_out { ROUTER_ADDRESS_THIS } else { options.recipient };

    let swap_call: Vec<u8> = match route.version() {
        Some(PoolVersion::V2) => ISmartRouter::swapExactTokensForTokensCall {
            amountIn: trade.input_amount,
            amountOutMin: amount_out_min,
            path: route.path.clone(),
            to: swap_recipient,
        }
        .abi_encode(),
        Some(PoolVersion::V3) if route.pools.len() == 1 => {
            let Pool::V3 { fee, .. } = &route.pools[0] else {
                return Err(AppError::Collaborator("V3 route contains a V2 pool".into()));
            };
            ISmartRouter::exactInputSingleCall {
                params: ISmartRouter::ExactInputSingleParams {
                    tokenIn: route.path[0],
                    tokenOut: route.path[1],
                    fee: U24::from(*fee),
                    recipient: swap_recipient,
                    amountIn: trade.input_amount,
                    amountOutMinimum: amount_out_min,
                    sqrtPriceLimitX96: U160::ZERO,
                },
            }
            .abi_encode()
        }
        Some(PoolVersion::V3) => ISmartRouter::exactInputCall {
            params: ISmartRouter::ExactInputParams {
                path: encode_v3_path(route)?,
                recipient: swap_recipient,
                amountIn: trade.input_amount,
                amountOutMinimum: amount_out_min,
            },
        }
        .abi_encode(),
        None => return Err(AppError::PoolNotFound),
    };

    let mut calls = vec![Bytes::from(swap_call)];
    if native_out {
        calls.push(Bytes::from(
            ISmartRouter::unwrapWETH9Call {
                amountMinimum: amount_out_min,
                recipient: options.recipient,
            }
            .abi_encode(),
        ));
    }

    let calldata =
        ISmartRouter::multicallCall { deadline: U256::from(options.deadline), data: calls }
            .abi_encode();

    let value = if trade.input.is_native() { trade.input_amount } else { U256::ZERO };

    Ok(SwapCallParameters { to: SMART_ROUTER_ADDRESS, calldata: Bytes::from(calldata), value })
}
