pub mod jito;
pub mod serialization;

use anyhow::Result;
use solana_sdk::{pubkey::Pubkey, transaction::VersionedTransaction};

pub use jito::types::BundleStatus;

/// Bundle relay (block-engine auction).
///
/// Submission only groups the transactions for the auction; it gives no
/// ledger-level atomicity between them.
#[async_trait::async_trait]
pub trait RelayClient: Send + Sync {
    /// Submit the transactions as one bundle, returning the relay's bundle id.
    async fn send_bundle(&self, transactions: &[VersionedTransaction]) -> Result<String>;

    async fn get_bundle_status(&self, bundle_id: &str) -> Result<BundleStatus>;

    /// Account the tip transfer must pay for the relay to accept the bundle.
    fn tip_account(&self) -> Result<Pubkey>;
}
