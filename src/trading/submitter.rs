//! Bundle submission and landing confirmation.

use crate::swqos::{BundleStatus, RelayClient};
use crate::swqos::jito::MAX_BUNDLE_TRANSACTIONS;
use crate::trading::core::errors::SwapError;
use solana_sdk::{signature::Signature, transaction::VersionedTransaction};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Signed transactions submitted as one relay bundle, swap first.
///
/// The relay only groups them for its auction; each transaction can still
/// land or fail on its own.
#[derive(Debug, Clone)]
pub struct SettlementBundle {
    transactions: Vec<VersionedTransaction>,
}

impl SettlementBundle {
    pub fn new(
        swap: VersionedTransaction,
        fee: Option<VersionedTransaction>,
    ) -> Result<Self, SwapError> {
        if swap.signatures.is_empty() {
            return Err(SwapError::Transaction("swap transaction is not signed".to_string()));
        }
        let mut transactions = Vec::with_capacity(2);
        transactions.push(swap);
        transactions.extend(fee);
        Ok(Self { transactions })
    }

    pub fn transactions(&self) -> &[VersionedTransaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Signature reported to the user: always the swap's, never the fee's.
    pub fn swap_signature(&self) -> Signature {
        self.transactions
            .first()
            .and_then(|tx| tx.signatures.first())
            .copied()
            .unwrap_or_default()
    }
}

pub struct SettlementSubmitter {
    relay: Arc<dyn RelayClient>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl SettlementSubmitter {
    pub fn new(relay: Arc<dyn RelayClient>, poll_interval: Duration, max_attempts: u32) -> Self {
        Self { relay, poll_interval, max_attempts: max_attempts.max(1) }
    }

    pub fn relay(&self) -> &Arc<dyn RelayClient> {
        &self.relay
    }

    pub async fn submit(&self, bundle: &SettlementBundle) -> Result<String, SwapError> {
        if bundle.len() > MAX_BUNDLE_TRANSACTIONS {
            return Err(SwapError::Transaction(format!(
                "bundle of {} transactions exceeds relay limit",
                bundle.len()
            )));
        }
        self.relay
            .send_bundle(bundle.transactions())
            .await
            .map_err(|e| SwapError::RelayRejected(format!("{:#}", e)))
    }

    /// 轮询 bundle 状态直到落地、被拒绝或次数耗尽
    ///
    /// A failed status request counts as an attempt and is treated as pending.
    pub async fn poll_status(&self, bundle_id: &str) -> Result<u32, SwapError> {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.poll_interval).await;
            match self.relay.get_bundle_status(bundle_id).await {
                Ok(BundleStatus::Landed) => {
                    debug!(bundle_id, attempt, "bundle landed");
                    return Ok(attempt);
                }
                Ok(BundleStatus::Rejected) => {
                    return Err(SwapError::RelayRejected(format!(
                        "bundle {} failed on attempt {}",
                        bundle_id, attempt
                    )));
                }
                Ok(BundleStatus::Pending) => {
                    debug!(bundle_id, attempt, "bundle pending");
                }
                Err(e) => {
                    warn!(bundle_id, attempt, error = %e, "bundle status check failed");
                }
            }
        }
        Err(SwapError::RelayTimeout { attempts: self.max_attempts })
    }
}
