pub mod common;
pub mod constants;
pub mod instruction;
pub mod swqos;
pub mod trading;
pub mod utils;

use crate::common::{BlockhashCache, EngineConfig, LedgerRpc, SolanaRpcClient};
use crate::instruction::{utils::jupiter::JupiterClient, JupiterVenue, PumpFunVenue, RaydiumAmmV4Venue};
use crate::swqos::{jito::JitoClient, RelayClient};
use crate::trading::{
    FeeDistributor, Notifier, SettlementSubmitter, SwapCoordinator, SwapIntent, SwapOutcome,
    SwapVenue, UserProfileProvider, UserSwapRequest,
};
use anyhow::Result;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::{info, warn};

pub use crate::trading::{SwapDirection, SwapError, SwapReceipt};

/// Swap engine
///
/// Wires the ledger RPC, the blockhash cache, the Jito relay and the venues
/// (Raydium AMM v4, then pump.fun, then Jupiter) into one coordinator. Cheap
/// to share behind an `Arc`; every call is independent.
pub struct SwapEngine {
    pub config: EngineConfig,
    pub ledger: Arc<dyn LedgerRpc>,
    pub blockhash_cache: Arc<BlockhashCache>,
    pub coordinator: Arc<SwapCoordinator>,
}

impl SwapEngine {
    /// Connect to `config.rpc_url` and the configured Jito region.
    pub async fn new(config: EngineConfig) -> Result<Self> {
        let rpc = Arc::new(SolanaRpcClient::new_with_commitment(
            config.rpc_url.clone(),
            config.commitment,
        ));
        let relay = Arc::new(JitoClient::new(config.jito_region, config.jito_auth_token.clone())?);
        Self::with_components(config, rpc, relay).await
    }

    /// Build on caller-supplied ledger and relay implementations.
    pub async fn with_components(
        config: EngineConfig,
        ledger: Arc<dyn LedgerRpc>,
        relay: Arc<dyn RelayClient>,
    ) -> Result<Self> {
        let blockhash_cache =
            Arc::new(BlockhashCache::new(ledger.clone(), config.blockhash_refresh_interval));
        // 首次刷新失败不阻塞启动，后台任务会继续重试
        if let Err(e) = blockhash_cache.refresh().await {
            warn!(error = %e, "initial blockhash fetch failed");
        }
        blockhash_cache.start();

        let jupiter = JupiterClient::new(config.jupiter_api_url.clone())?;
        let venues: Vec<Arc<dyn SwapVenue>> = vec![
            Arc::new(RaydiumAmmV4Venue::new(ledger.clone())),
            Arc::new(PumpFunVenue::new(ledger.clone())),
            Arc::new(JupiterVenue::new(jupiter, ledger.clone())),
        ];

        let submitter =
            SettlementSubmitter::new(relay, config.bundle_poll_interval, config.bundle_max_attempts);
        let fees = FeeDistributor::new(config.treasury, config.protocol_fee_basis_points);
        let coordinator = SwapCoordinator::new(
            venues,
            ledger.clone(),
            blockhash_cache.clone(),
            fees,
            submitter,
        )
        .with_min_reserve_lamports(config.min_reserve_lamports)
        .with_compute_budget(config.compute_unit_limit, config.compute_unit_price);

        info!(
            rpc_url = %config.rpc_url,
            jito_region = %config.jito_region,
            treasury = %config.treasury,
            "swap engine ready"
        );
        Ok(Self { config, ledger, blockhash_cache, coordinator: Arc::new(coordinator) })
    }

    pub async fn execute_swap(&self, intent: &SwapIntent) -> SwapOutcome {
        self.coordinator.execute_swap(intent).await
    }

    /// Turn a decimal amount typed by a user into a request in base units.
    pub async fn user_request(
        &self,
        user_id: impl Into<String>,
        mint: Pubkey,
        amount: &str,
        direction: SwapDirection,
    ) -> Result<UserSwapRequest> {
        UserSwapRequest::from_ui_amount(self.ledger.as_ref(), user_id, mint, amount, direction).await
    }

    pub async fn execute_for_user(
        &self,
        profiles: &dyn UserProfileProvider,
        notifier: &dyn Notifier,
        request: &UserSwapRequest,
    ) -> SwapOutcome {
        self.coordinator.execute_for_user(profiles, notifier, request).await
    }
}
