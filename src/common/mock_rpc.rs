//! In-memory ledger for tests and dry runs.
//!
//! Implements [`LedgerRpc`] over plain maps so venues, the blockhash cache
//! and the coordinator can be exercised without a validator:
//!
//! ```rust
//! use sol_swap_engine::common::mock_rpc::MockLedger;
//! use solana_sdk::pubkey::Pubkey;
//!
//! let ledger = MockLedger::new();
//! let wallet = Pubkey::new_unique();
//! ledger.set_balance(wallet, 1_000_000_000);
//! ```

use crate::common::ledger_rpc::{AccountFilter, LedgerRpc, SimulationReport};
use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, transaction::VersionedTransaction,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Call counters, for asserting which RPC paths a flow touched.
#[derive(Debug, Default)]
pub struct MockCallCounts {
    pub get_program_accounts: AtomicUsize,
    pub simulate_transaction: AtomicUsize,
    pub get_balance: AtomicUsize,
    pub get_latest_blockhash: AtomicUsize,
}

#[derive(Default)]
pub struct MockLedger {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    balances: Mutex<HashMap<Pubkey, u64>>,
    token_accounts: Mutex<HashMap<(Pubkey, Pubkey), Vec<Pubkey>>>,
    /// `None` entries fail the corresponding fetch
    blockhashes: Mutex<VecDeque<Option<Hash>>>,
    fallback_blockhash: Mutex<Option<Hash>>,
    simulation_error: Mutex<Option<SimulationReport>>,
    simulated: Mutex<Vec<VersionedTransaction>>,
    pub calls: MockCallCounts,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, address: Pubkey, account: Account) {
        self.accounts.lock().insert(address, account);
    }

    /// Store `data` as an account owned by `owner`.
    pub fn set_account_data(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        let account =
            Account { lamports: 1_000_000, data, owner, executable: false, rent_epoch: 0 };
        self.set_account(address, account);
    }

    pub fn set_balance(&self, address: Pubkey, lamports: u64) {
        self.balances.lock().insert(address, lamports);
    }

    pub fn set_token_accounts(&self, owner: Pubkey, mint: Pubkey, accounts: Vec<Pubkey>) {
        self.token_accounts.lock().insert((owner, mint), accounts);
    }

    /// Queue the next blockhash fetches; `None` makes that fetch fail.
    pub fn push_blockhash(&self, hash: Option<Hash>) {
        self.blockhashes.lock().push_back(hash);
    }

    /// Returned once the queue is drained.
    pub fn set_blockhash(&self, hash: Hash) {
        *self.fallback_blockhash.lock() = Some(hash);
    }

    /// Every later simulation reports this error.
    pub fn fail_simulation(&self, err: &str, logs: Vec<String>) {
        *self.simulation_error.lock() =
            Some(SimulationReport { err: Some(err.to_string()), logs, units_consumed: None });
    }

    pub fn simulated_transactions(&self) -> Vec<VersionedTransaction> {
        self.simulated.lock().clone()
    }
}

#[async_trait::async_trait]
impl LedgerRpc for MockLedger {
    async fn get_latest_blockhash(&self) -> Result<Hash> {
        self.calls.get_latest_blockhash.fetch_add(1, Ordering::SeqCst);
        match self.blockhashes.lock().pop_front() {
            Some(Some(hash)) => Ok(hash),
            Some(None) => Err(anyhow!("mock: blockhash fetch failed")),
            None => (*self.fallback_blockhash.lock())
                .ok_or_else(|| anyhow!("mock: no blockhash configured")),
        }
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>> {
        Ok(self.accounts.lock().get(pubkey).cloned())
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        self.calls.get_program_accounts.fetch_add(1, Ordering::SeqCst);
        let accounts = self.accounts.lock();
        let mut matched: Vec<(Pubkey, Vec<u8>)> = accounts
            .iter()
            .filter(|(_, account)| account.owner == *program_id)
            .filter(|(_, account)| filters.iter().all(|f| f.matches(&account.data)))
            .map(|(address, account)| (*address, account.data.clone()))
            .collect();
        matched.sort_by_key(|(address, _)| *address);
        Ok(matched)
    }

    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        let accounts = self.accounts.lock();
        Ok(pubkeys.iter().map(|key| accounts.get(key).cloned()).collect())
    }

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationReport> {
        self.calls.simulate_transaction.fetch_add(1, Ordering::SeqCst);
        self.simulated.lock().push(transaction.clone());
        Ok(self.simulation_error.lock().clone().unwrap_or_default())
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<Pubkey>> {
        Ok(self.token_accounts.lock().get(&(*owner, *mint)).cloned().unwrap_or_default())
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64> {
        self.calls.get_balance.fetch_add(1, Ordering::SeqCst);
        Ok(self.balances.lock().get(pubkey).copied().unwrap_or(0))
    }
}
