//! 交易协调器
//!
//! One swap walks `BUILD_QUOTE → PREFLIGHT_BALANCE → BUILD_FEE_TX → SIMULATE →
//! SUBMIT → CONFIRM → DONE`; the first failing stage ends the attempt.

use crate::common::{BlockhashCache, LedgerRpc};
use crate::trading::common::build_swap_transaction;
use crate::trading::core::{
    errors::{SwapError, SwapStage},
    params::SwapIntent,
    traits::{SwapVenue, VenueKind, VenueOutcome, VenueQuote},
};
use crate::trading::fee::FeeDistributor;
use crate::trading::lifecycle::{Notifier, SwapOutcome, UserProfileProvider, UserSwapRequest};
use crate::trading::submitter::{SettlementBundle, SettlementSubmitter};
use solana_sdk::{signature::Signature, signer::Signer, transaction::VersionedTransaction};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Everything a successful swap reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub signature: Signature,
    pub venue: VenueKind,
    pub input_amount: u64,
    pub estimated_output_amount: u64,
    pub fee_lamports: u64,
}

pub struct SwapCoordinator {
    venues: Vec<Arc<dyn SwapVenue>>,
    rpc: Arc<dyn LedgerRpc>,
    blockhash_cache: Arc<BlockhashCache>,
    fees: FeeDistributor,
    submitter: SettlementSubmitter,
    min_reserve_lamports: u64,
    compute_unit_limit: Option<u32>,
    compute_unit_price: Option<u64>,
}

impl SwapCoordinator {
    /// `venues` are tried in the given order.
    pub fn new(
        venues: Vec<Arc<dyn SwapVenue>>,
        rpc: Arc<dyn LedgerRpc>,
        blockhash_cache: Arc<BlockhashCache>,
        fees: FeeDistributor,
        submitter: SettlementSubmitter,
    ) -> Self {
        Self {
            venues,
            rpc,
            blockhash_cache,
            fees,
            submitter,
            min_reserve_lamports: crate::constants::trade::MIN_RESERVE_LAMPORTS,
            compute_unit_limit: None,
            compute_unit_price: None,
        }
    }

    pub fn with_min_reserve_lamports(mut self, lamports: u64) -> Self {
        self.min_reserve_lamports = lamports;
        self
    }

    pub fn with_compute_budget(mut self, unit_limit: Option<u32>, unit_price: Option<u64>) -> Self {
        self.compute_unit_limit = unit_limit;
        self.compute_unit_price = unit_price;
        self
    }

    pub fn venues(&self) -> impl Iterator<Item = VenueKind> + '_ {
        self.venues.iter().map(|venue| venue.kind())
    }

    /// Library entry point: every failure collapses into an unsuccessful
    /// outcome; the typed error only reaches the logs.
    pub async fn execute_swap(&self, intent: &SwapIntent) -> SwapOutcome {
        match self.run(intent).await {
            Ok(receipt) => SwapOutcome {
                success: true,
                signature: Some(receipt.signature),
                input_amount: receipt.input_amount,
                estimated_output_amount: receipt.estimated_output_amount,
                balance: None,
            },
            Err(SwapError::InsufficientFunds { balance, .. }) => {
                SwapOutcome { balance: Some(balance), ..SwapOutcome::failed() }
            }
            Err(_) => SwapOutcome::failed(),
        }
    }

    /// Load the user's profile, swap with a freshly derived key and notify.
    pub async fn execute_for_user(
        &self,
        profiles: &dyn UserProfileProvider,
        notifier: &dyn Notifier,
        request: &UserSwapRequest,
    ) -> SwapOutcome {
        let outcome = match profiles.load_profile(&request.user_id).await {
            Ok(profile) => match profile.keypair() {
                Ok(payer) => {
                    let intent = SwapIntent::new(
                        payer,
                        request.mint,
                        request.amount,
                        request.direction,
                        profile.slippage_basis_points,
                        profile.tip_lamports,
                        profile.referral_chain.clone(),
                    );
                    self.execute_swap(&intent).await
                }
                Err(e) => {
                    error!(user_id = %request.user_id, error = %e, "unusable secret key in profile");
                    SwapOutcome::failed()
                }
            },
            Err(e) => {
                error!(user_id = %request.user_id, error = %e, "failed to load user profile");
                SwapOutcome::failed()
            }
        };

        if let Err(e) = notifier.notify(&request.user_id, outcome.clone()).await {
            warn!(user_id = %request.user_id, error = %e, "notifier failed");
        }
        outcome
    }

    /// Run the state machine, keeping the typed failure.
    pub async fn run(&self, intent: &SwapIntent) -> Result<SwapReceipt, SwapError> {
        let started = Instant::now();
        let mut stage = SwapStage::BuildQuote;
        let result = self.run_stages(intent, &mut stage).await;
        match &result {
            Ok(receipt) => info!(
                mint = %intent.mint,
                direction = %intent.direction,
                venue = %receipt.venue,
                signature = %receipt.signature,
                elapsed = ?started.elapsed(),
                "swap {}",
                SwapStage::Done
            ),
            Err(e) => error!(
                mint = %intent.mint,
                direction = %intent.direction,
                stage = %stage,
                kind = e.kind(),
                error = %e,
                elapsed = ?started.elapsed(),
                "swap {}",
                SwapStage::Failed
            ),
        }
        result
    }

    async fn run_stages(
        &self,
        intent: &SwapIntent,
        stage: &mut SwapStage,
    ) -> Result<SwapReceipt, SwapError> {
        validate_intent(intent)?;
        let payer = intent.payer.pubkey();

        enter(stage, SwapStage::BuildQuote);
        let quote = self.select_quote(intent).await?;
        let fee_base = if intent.is_buy() { quote.input_amount } else { quote.estimated_output_amount };
        let fee_lamports = self.fees.protocol_fee(fee_base);

        if intent.is_buy() {
            enter(stage, SwapStage::PreflightBalance);
            let balance = self.rpc.get_balance(&payer).await.map_err(SwapError::rpc)?;
            let required = fee_lamports
                .saturating_add(intent.tip_lamports)
                .saturating_add(quote.input_amount)
                .saturating_add(self.min_reserve_lamports);
            if balance < required {
                return Err(SwapError::InsufficientFunds { balance, required });
            }
            debug!(balance, required, "balance preflight passed");
        }

        let blockhash = self.blockhash_cache.require()?;
        let tip = if intent.tip_lamports > 0 {
            let tip_account = self
                .submitter
                .relay()
                .tip_account()
                .map_err(|e| SwapError::Transaction(format!("{:#}", e)))?;
            Some((tip_account, intent.tip_lamports))
        } else {
            None
        };
        let swap_tx = build_swap_transaction(
            &intent.payer,
            &quote.instructions,
            &quote.address_lookup_tables,
            blockhash,
            tip,
            self.compute_unit_price,
            self.compute_unit_limit,
        )
        .map_err(|e| SwapError::Transaction(format!("{:#}", e)))?;

        enter(stage, SwapStage::BuildFeeTx);
        let fee_tx = self
            .fees
            .build_fee_transaction(&intent.payer, fee_lamports, &intent.referral_chain, blockhash)
            .map_err(|e| SwapError::Transaction(format!("{:#}", e)))?;
        let bundle = SettlementBundle::new(swap_tx, fee_tx)?;

        enter(stage, SwapStage::Simulate);
        for transaction in bundle.transactions() {
            self.simulate(transaction).await?;
        }

        enter(stage, SwapStage::Submit);
        let bundle_id = self.submitter.submit(&bundle).await?;
        info!(%bundle_id, transactions = bundle.len(), "bundle submitted");

        enter(stage, SwapStage::Confirm);
        self.submitter.poll_status(&bundle_id).await?;

        enter(stage, SwapStage::Done);
        Ok(SwapReceipt {
            signature: bundle.swap_signature(),
            venue: quote.venue,
            input_amount: quote.input_amount,
            estimated_output_amount: quote.estimated_output_amount,
            fee_lamports,
        })
    }

    /// 按优先级依次尝试各流动性来源
    ///
    /// An error from any venue but the last is downgraded to "unavailable".
    pub async fn select_quote(&self, intent: &SwapIntent) -> Result<VenueQuote, SwapError> {
        let last = self.venues.len().saturating_sub(1);
        for (index, venue) in self.venues.iter().enumerate() {
            match venue.try_build(intent).await {
                Ok(VenueOutcome::Quote(quote)) => {
                    info!(
                        venue = %venue.kind(),
                        input_amount = quote.input_amount,
                        estimated_output_amount = quote.estimated_output_amount,
                        "venue selected"
                    );
                    return Ok(quote);
                }
                Ok(VenueOutcome::Unavailable(reason)) => {
                    debug!(venue = %venue.kind(), %reason, "venue unavailable");
                }
                Err(e) if index == last => return Err(e),
                Err(e) => {
                    warn!(venue = %venue.kind(), error = %e, "venue failed, falling back");
                }
            }
        }
        Err(SwapError::NoLiquidity)
    }

    async fn simulate(&self, transaction: &VersionedTransaction) -> Result<(), SwapError> {
        let report = self.rpc.simulate_transaction(transaction).await.map_err(SwapError::rpc)?;
        if report.is_ok() {
            debug!(units = ?report.units_consumed, "simulation ok");
            Ok(())
        } else {
            Err(SwapError::SimulationFailed { diagnostic: report.diagnostic() })
        }
    }
}

fn enter(stage: &mut SwapStage, next: SwapStage) {
    debug!(from = %stage, to = %next, "swap stage");
    *stage = next;
}

fn validate_intent(intent: &SwapIntent) -> Result<(), SwapError> {
    if intent.amount == 0 {
        return Err(SwapError::InvalidIntent("amount must be positive".to_string()));
    }
    if intent.slippage_basis_points > crate::constants::trade::BASIS_POINTS_DENOMINATOR {
        return Err(SwapError::InvalidIntent(format!(
            "slippage {} bps exceeds 100%",
            intent.slippage_basis_points
        )));
    }
    Ok(())
}
