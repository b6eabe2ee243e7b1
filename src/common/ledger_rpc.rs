//! Ledger RPC seam.
//!
//! Venues, the blockhash cache and the coordinator only see [`LedgerRpc`], so
//! tests can drive them with in-memory ledgers. The production implementation
//! is the nonblocking `RpcClient`.

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use solana_account_decoder::{UiAccountData, UiAccountEncoding};
use solana_client::rpc_filter::Memcmp;
use solana_commitment_config::CommitmentConfig;
use solana_rpc_client_api::{
    config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSimulateTransactionConfig},
    filter::RpcFilterType,
    request::TokenAccountsFilter,
};
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, transaction::VersionedTransaction,
};

use super::SolanaRpcClient;

/// Server-side filter for `getProgramAccounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    DataSize(u64),
    Memcmp { offset: usize, bytes: Vec<u8> },
}

impl AccountFilter {
    pub fn memcmp_pubkey(offset: usize, key: &Pubkey) -> Self {
        AccountFilter::Memcmp { offset, bytes: key.to_bytes().to_vec() }
    }

    /// Local evaluation, same semantics as the RPC node.
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            AccountFilter::DataSize(size) => data.len() as u64 == *size,
            AccountFilter::Memcmp { offset, bytes } => data
                .get(*offset..offset.saturating_add(bytes.len()))
                .is_some_and(|window| window == bytes.as_slice()),
        }
    }

    fn to_rpc_filter(&self) -> RpcFilterType {
        match self {
            AccountFilter::DataSize(size) => RpcFilterType::DataSize(*size),
            AccountFilter::Memcmp { offset, bytes } => {
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(*offset, bytes))
            }
        }
    }
}

/// Outcome of a dry run. `err == None` means the transaction would succeed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

impl SimulationReport {
    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }

    /// Error plus the tail of the program logs, for diagnostics.
    pub fn diagnostic(&self) -> String {
        let tail: Vec<&str> =
            self.logs.iter().rev().take(5).rev().map(String::as_str).collect();
        match &self.err {
            Some(err) if tail.is_empty() => err.clone(),
            Some(err) => format!("{} | logs: {}", err, tail.join(" / ")),
            None => String::new(),
        }
    }
}

#[async_trait::async_trait]
pub trait LedgerRpc: Send + Sync {
    async fn get_latest_blockhash(&self) -> Result<Hash>;

    /// `Ok(None)` when the account does not exist.
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>>;

    /// Raw data of every account owned by `program_id` passing all `filters`.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>>;

    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Account>>>;

    async fn simulate_transaction(&self, transaction: &VersionedTransaction)
        -> Result<SimulationReport>;

    /// Token accounts of `owner` holding `mint`.
    async fn get_token_accounts_by_owner(&self, owner: &Pubkey, mint: &Pubkey)
        -> Result<Vec<Pubkey>>;

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64>;
}

#[async_trait::async_trait]
impl LedgerRpc for SolanaRpcClient {
    async fn get_latest_blockhash(&self) -> Result<Hash> {
        Ok(SolanaRpcClient::get_latest_blockhash(self).await?)
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>> {
        let response = self.get_account_with_commitment(pubkey, self.commitment()).await?;
        Ok(response.value)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters.iter().map(AccountFilter::to_rpc_filter).collect()),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                data_slice: None,
                commitment: None,
                min_context_slot: None,
            },
            with_context: None,
            sort_results: None,
        };
        let accounts = self
            .get_program_ui_accounts_with_config(program_id, config)
            .await
            .map_err(|e| {
                let message = e.to_string();
                if message.contains("excluded from account secondary indexes") {
                    anyhow!(
                        "RPC node does not index program {} for getProgramAccounts; \
                         use a provider with secondary indexes enabled",
                        program_id
                    )
                } else {
                    anyhow!("getProgramAccounts failed: {}", message)
                }
            })?;

        Ok(accounts
            .into_iter()
            .filter_map(|(address, account)| match &account.data {
                UiAccountData::Binary(encoded, _) => {
                    STANDARD.decode(encoded).ok().map(|data| (address, data))
                }
                _ => None,
            })
            .collect())
    }

    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        Ok(SolanaRpcClient::get_multiple_accounts(self, pubkeys).await?)
    }

    async fn simulate_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationReport> {
        let config = RpcSimulateTransactionConfig {
            replace_recent_blockhash: true,
            commitment: Some(CommitmentConfig::processed()),
            ..Default::default()
        };
        let response = self.simulate_transaction_with_config(transaction, config).await?;
        Ok(SimulationReport {
            err: response.value.err.map(|e| format!("{:?}", e)),
            logs: response.value.logs.unwrap_or_default(),
            units_consumed: response.value.units_consumed,
        })
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<Pubkey>> {
        let accounts = SolanaRpcClient::get_token_accounts_by_owner(
            self,
            owner,
            TokenAccountsFilter::Mint(*mint),
        )
        .await?;
        accounts
            .into_iter()
            .map(|keyed| {
                keyed
                    .pubkey
                    .parse::<Pubkey>()
                    .map_err(|e| anyhow!("invalid token account {}: {}", keyed.pubkey, e))
            })
            .collect()
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64> {
        Ok(SolanaRpcClient::get_balance(self, pubkey).await?)
    }
}
