//! Swap/Quote façade over the smart order router.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::SystemTime;

use crate::{
    error::{AppError, Result},
    ethereum::SmartRouter,
    types::{
        format_units, parse_address, parse_units, RouteSummary, SwapCallParameters, SwapOptions,
        TokenDescriptor, Trade, TradePolicy, UnsignedTransaction,
    },
};

/// Slippage tolerance applied to built swaps, in percent.
pub const DEFAULT_SLIPPAGE_PERCENT: Decimal = Decimal::ONE;

/// Seconds until a built swap expires.
pub const DEADLINE_SECS: u64 = 1200;

/// Get current Unix timestamp in seconds.
/// Returns 0 if system time is before Unix epoch (should never happen in practice).
fn current_timestamp() -> u64 {
    SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Service turning token descriptors and human amounts into quotes and
/// ready-to-sign router transactions.
#[derive(Clone)]
pub struct SwapService {
    router: Arc<dyn SmartRouter>,
    policy: TradePolicy,
    slippage_tolerance: Decimal,
    estimate_gas: bool,
}

impl SwapService {
    /// Create a new swap service with the default policy (2 hops, 2 splits, exact input).
    pub fn new(router: Arc<dyn SmartRouter>) -> Self {
        Self {
            router,
            policy: TradePolicy::default(),
            slippage_tolerance: DEFAULT_SLIPPAGE_PERCENT,
            estimate_gas: false,
        }
    }

    /// Attach a gas estimate to built transactions.
    pub fn with_gas_estimation(mut self, enabled: bool) -> Self {
        self.estimate_gas = enabled;
        self
    }

    /// Expected output for `amount` of `from`, as an exact decimal string.
    pub async fn quote(
        &self,
        from: &TokenDescriptor,
        to: &TokenDescriptor,
        amount: &str,
    ) -> Result<String> {
        let trade = self.find_trade(from, to, amount).await?;
        Ok(format_units(trade.output_amount, trade.output.decimals()))
    }

    /// Build the router transaction swapping `amount` of `from` into `to` for `recipient`.
    pub async fn build_swap_transaction(
        &self,
        from: &TokenDescriptor,
        to: &TokenDescriptor,
        amount: &str,
        recipient: &str,
    ) -> Result<UnsignedTransaction> {
        let recipient = parse_address(recipient)?;
        let trade = self.find_trade(from, to, amount).await?;

        let options = SwapOptions {
            recipient,
            slippage_tolerance: self.slippage_tolerance,
            deadline: current_timestamp() + DEADLINE_SECS,
        };
        let params = self.router.swap_call_parameters(&trade, &options)?;

        let mut tx = UnsignedTransaction::new(recipient, &params);
        if self.estimate_gas {
            tx.gas = self.estimate(recipient, &params).await;
        }

        tracing::info!(
            account = %tx.account,
            router = %tx.to,
            value = %tx.value,
            "Swap transaction built"
        );

        Ok(tx)
    }

    /// Gas estimate; a failed estimate leaves the field out.
    async fn estimate(&self, from: Address, params: &SwapCallParameters) -> Option<String> {
        match self.router.estimate_gas(from, params).await {
            Ok(gas) => Some(gas.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Gas estimation failed");
                None
            }
        }
    }

    /// Normalize both sides, fetch candidate pools and ask the router for the best trade.
    async fn find_trade(
        &self,
        from: &TokenDescriptor,
        to: &TokenDescriptor,
        amount: &str,
    ) -> Result<Trade> {
        let input = from.to_currency()?;
        let output = to.to_currency()?;

        if input.wrapped() == output.wrapped() {
            return Err(AppError::Validation("swapFrom and swapTo must be different tokens".into()));
        }

        let amount_in = parse_units(amount, input.decimals())?;
        if amount_in == U256::ZERO {
            return Err(AppError::Validation("Amount must be greater than zero".into()));
        }

        tracing::info!(
            from = %input.symbol(),
            to = %output.symbol(),
            amount = %amount,
            "Finding best trade"
        );

        let (v2_pools, v3_pools) = tokio::try_join!(
            self.router.v2_candidate_pools(&input, &output),
            self.router.v3_candidate_pools(&input, &output),
        )?;

        let pools: Vec<_> = v2_pools.into_iter().chain(v3_pools).collect();
        let trade = self.router.best_trade(&input, amount_in, &output, &pools, &self.policy).await?;

        let summary = RouteSummary::from(&trade.route);
        tracing::debug!(protocol = ?summary.protocol, path = ?summary.path, "Route selected");

        Ok(trade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethereum::constants::{CAKE_ADDRESS, SMART_ROUTER_ADDRESS, USDT_ADDRESS};
    use crate::types::{Currency, LooseNumber, Pool, Route, TradeType};
    use alloy::primitives::Bytes;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const RECIPIENT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    /// Router doubling every input through one V2 pool.
    #[derive(Default)]
    struct DoublingRouter {
        calls: AtomicUsize,
        last_policy: Mutex<Option<TradePolicy>>,
        last_options: Mutex<Option<SwapOptions>>,
        fail_gas: bool,
    }

    #[async_trait]
    impl SmartRouter for DoublingRouter {
        async fn v2_candidate_pools(&self, a: &Currency, b: &Currency) -> Result<Vec<Pool>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Pool::V2 {
                address: Address::repeat_byte(0xaa),
                token0: a.wrapped(),
                token1: b.wrapped(),
                reserve0: U256::from(1u64),
                reserve1: U256::from(1u64),
            }])
        }

        async fn v3_candidate_pools(&self, _a: &Currency, _b: &Currency) -> Result<Vec<Pool>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn best_trade(
            &self,
            input: &Currency,
            amount_in: U256,
            output: &Currency,
            pools: &[Pool],
            policy: &TradePolicy,
        ) -> Result<Trade> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_policy.lock().unwrap() = Some(*policy);
            Ok(Trade {
                trade_type: policy.trade_type,
                input: input.clone(),
                output: output.clone(),
                input_amount: amount_in,
                output_amount: amount_in * U256::from(2u64),
                route: Route {
                    pools: pools.to_vec(),
                    path: vec![input.wrapped(), output.wrapped()],
                },
            })
        }

        fn swap_call_parameters(
            &self,
            trade: &Trade,
            options: &SwapOptions,
        ) -> Result<SwapCallParameters> {
            *self.last_options.lock().unwrap() = Some(options.clone());
            let value = if trade.input.is_native() { trade.input_amount } else { U256::ZERO };
            Ok(SwapCallParameters {
                to: SMART_ROUTER_ADDRESS,
                calldata: Bytes::from(vec![0xac, 0x96, 0x50, 0xd8]),
                value,
            })
        }

        async fn estimate_gas(&self, _from: Address, _params: &SwapCallParameters) -> Result<u64> {
            if self.fail_gas {
                Err(AppError::Rpc("execution reverted".into()))
            } else {
                Ok(150_000)
            }
        }
    }

    fn token(symbol: &str, address: Address, decimals: u64) -> TokenDescriptor {
        TokenDescriptor {
            chain_id: LooseNumber::Int(56),
            decimals: LooseNumber::Int(decimals),
            symbol: symbol.into(),
            name: symbol.into(),
            is_native: false,
            address: Some(address.to_checksum(None)),
        }
    }

    fn bnb() -> TokenDescriptor {
        TokenDescriptor {
            chain_id: LooseNumber::Int(56),
            decimals: LooseNumber::Int(18),
            symbol: "BNB".into(),
            name: "BNB".into(),
            is_native: true,
            address: None,
        }
    }

    // ============================================================================
    // Quote
    // ============================================================================

    #[tokio::test]
    async fn test_quote_formats_output_with_output_decimals() {
        let router = Arc::new(DoublingRouter::default());
        let service = SwapService::new(router.clone());

        let quote = service
            .quote(&token("CAKE", CAKE_ADDRESS, 18), &token("USDT", USDT_ADDRESS, 6), "1.5")
            .await
            .unwrap();

        // 1.5 CAKE = 1.5e18 units, doubled and read with 6 decimals.
        assert_eq!(quote, "3000000000000");
        assert_eq!(router.calls.load(Ordering::SeqCst), 3);

        let policy = router.last_policy.lock().unwrap().unwrap();
        assert_eq!(policy.max_hops, 2);
        assert_eq!(policy.max_splits, 2);
        assert_eq!(policy.trade_type, TradeType::ExactInput);
    }

    #[tokio::test]
    async fn test_quote_rejects_same_token() {
        let router = Arc::new(DoublingRouter::default());
        let service = SwapService::new(router.clone());
        let cake = token("CAKE", CAKE_ADDRESS, 18);

        let err = service.quote(&cake, &cake, "1").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_quote_rejects_zero_and_malformed_amounts() {
        let router = Arc::new(DoublingRouter::default());
        let service = SwapService::new(router.clone());
        let (cake, usdt) = (token("CAKE", CAKE_ADDRESS, 18), token("USDT", USDT_ADDRESS, 18));

        assert!(service.quote(&cake, &usdt, "0").await.is_err());
        assert!(service.quote(&cake, &usdt, "abc").await.is_err());
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
    }

    // ============================================================================
    // Build Swap Transaction
    // ============================================================================

    #[tokio::test]
    async fn test_build_swap_transaction_native_input() {
        let router = Arc::new(DoublingRouter::default());
        let service = SwapService::new(router.clone());

        let tx = service
            .build_swap_transaction(&bnb(), &token("CAKE", CAKE_ADDRESS, 18), "0.1", RECIPIENT)
            .await
            .unwrap();

        assert_eq!(tx.account, RECIPIENT);
        assert_eq!(tx.to, SMART_ROUTER_ADDRESS.to_checksum(None));
        assert_eq!(tx.data, "0xac9650d8");
        assert_eq!(tx.value, "100000000000000000");
        assert!(tx.gas.is_none());

        let options = router.last_options.lock().unwrap().clone().unwrap();
        assert_eq!(options.slippage_tolerance, Decimal::ONE);
        assert!(options.deadline >= current_timestamp() + DEADLINE_SECS - 5);
    }

    #[tokio::test]
    async fn test_build_swap_transaction_invalid_recipient() {
        let router = Arc::new(DoublingRouter::default());
        let service = SwapService::new(router.clone());

        let result = service
            .build_swap_transaction(&bnb(), &token("CAKE", CAKE_ADDRESS, 18), "1", "0x1234")
            .await;
        assert!(matches!(result, Err(AppError::InvalidAddress(_))));
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_build_swap_transaction_with_gas_estimate() {
        let service =
            SwapService::new(Arc::new(DoublingRouter::default())).with_gas_estimation(true);

        let tx = service
            .build_swap_transaction(&token("CAKE", CAKE_ADDRESS, 18), &bnb(), "1", RECIPIENT)
            .await
            .unwrap();
        assert_eq!(tx.gas.as_deref(), Some("150000"));
        assert_eq!(tx.value, "0");
    }

    #[tokio::test]
    async fn test_failed_gas_estimate_is_omitted() {
        let router = DoublingRouter { fail_gas: true, ..Default::default() };
        let service = SwapService::new(Arc::new(router)).with_gas_estimation(true);

        let tx = service
            .build_swap_transaction(&token("CAKE", CAKE_ADDRESS, 18), &bnb(), "1", RECIPIENT)
            .await
            .unwrap();
        assert!(tx.gas.is_none());
    }
}
