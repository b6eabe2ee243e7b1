//! 用户侧生命周期协作者
//!
//! The engine does not own user data or chat formatting. It reads a profile
//! through [`UserProfileProvider`] and hands the terminal [`SwapOutcome`] to a
//! [`Notifier`].

use anyhow::{anyhow, Result};
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signature::Signature};
use std::fmt;
use std::sync::Arc;

use crate::common::ledger_rpc::LedgerRpc;
use crate::constants::SOL_DECIMALS;
use crate::trading::core::params::{ReferralChain, SwapDirection};
use crate::utils::token::{get_token_decimals, ui_amount_to_base_units};

/// Stored per-user trading preferences.
#[derive(Clone)]
pub struct UserProfile {
    /// Base58-encoded 64-byte secret key
    pub secret_key: String,
    pub slippage_basis_points: u64,
    pub tip_lamports: u64,
    pub referral_chain: ReferralChain,
}

impl fmt::Debug for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserProfile")
            .field("slippage_basis_points", &self.slippage_basis_points)
            .field("tip_lamports", &self.tip_lamports)
            .field("referral_chain", &self.referral_chain)
            .finish_non_exhaustive()
    }
}

impl UserProfile {
    /// Fresh keypair for one call; never cached.
    pub fn keypair(&self) -> Result<Arc<Keypair>> {
        keypair_from_base58(&self.secret_key).map(Arc::new)
    }
}

/// What a user asked for, before the profile is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSwapRequest {
    pub user_id: String,
    pub mint: Pubkey,
    /// Base units of the input side
    pub amount: u64,
    pub direction: SwapDirection,
}

impl UserSwapRequest {
    /// Build a request from a decimal string such as `"0.05"`.
    ///
    /// Buys are denominated in SOL; sells read the mint's decimals from the
    /// ledger.
    pub async fn from_ui_amount(
        rpc: &dyn LedgerRpc,
        user_id: impl Into<String>,
        mint: Pubkey,
        amount: &str,
        direction: SwapDirection,
    ) -> Result<Self> {
        let decimals = match direction {
            SwapDirection::Buy => SOL_DECIMALS,
            SwapDirection::Sell => get_token_decimals(rpc, &mint).await?,
        };
        let amount = ui_amount_to_base_units(amount, decimals)
            .ok_or_else(|| anyhow!("invalid amount {:?} for {} decimals", amount, decimals))?;
        Ok(Self { user_id: user_id.into(), mint, amount, direction })
    }
}

/// Terminal result of one swap, the only thing the caller sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapOutcome {
    pub success: bool,
    pub signature: Option<Signature>,
    pub input_amount: u64,
    pub estimated_output_amount: u64,
    /// Current wallet balance, reported only on insufficient funds
    pub balance: Option<u64>,
}

impl SwapOutcome {
    pub fn failed() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
pub trait UserProfileProvider: Send + Sync {
    async fn load_profile(&self, user_id: &str) -> Result<UserProfile>;
}

/// 结果通知
///
/// A failing notifier is logged by the caller; it never changes the outcome.
pub trait Notifier: Send + Sync {
    fn notify(&self, user_id: &str, outcome: SwapOutcome) -> futures::future::BoxFuture<'static, Result<()>>;
}

/// Notifier that drops every outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _user_id: &str, _outcome: SwapOutcome) -> futures::future::BoxFuture<'static, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Decode a base58 secret key without panicking on malformed input.
pub fn keypair_from_base58(secret_key: &str) -> Result<Keypair> {
    let bytes = bs58::decode(secret_key.trim())
        .into_vec()
        .map_err(|e| anyhow!("secret key is not valid base58: {}", e))?;
    Keypair::try_from(bytes.as_slice()).map_err(|e| anyhow!("invalid secret key bytes: {}", e))
}
