use crate::{
    common::{spl_token::decode_token_account_amount, AccountFilter, LedgerRpc},
    constants::WSOL_MINT,
    instruction::utils::raydium_amm_v4_types::{
        amm_info_decode, AmmInfo, AMM_INFO_SIZE, COIN_MINT_OFFSET, PC_MINT_OFFSET,
    },
};
use anyhow::{anyhow, Result};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

/// Constants related to program accounts and authorities
pub mod accounts {
    use solana_sdk::{instruction::AccountMeta, pubkey, pubkey::Pubkey};

    pub const AUTHORITY: Pubkey = pubkey!("5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1");
    pub const RAYDIUM_AMM_V4: Pubkey = pubkey!("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8");

    pub const AUTHORITY_META: AccountMeta =
        AccountMeta { pubkey: AUTHORITY, is_signer: false, is_writable: false };
}

pub const SWAP_BASE_IN_DISCRIMINATOR: u8 = 9;

/// Pool 状态（链上 `AmmStatus`）
pub mod pool_status {
    pub const UNINITIALIZED: u64 = 0;
    pub const INITIALIZED: u64 = 1;
    pub const DISABLED: u64 = 2;
    pub const WITHDRAW_ONLY: u64 = 3;
    pub const LIQUIDITY_ONLY: u64 = 4;
    pub const ORDER_BOOK_ONLY: u64 = 5;
    pub const SWAP_ONLY: u64 = 6;
    pub const WAITING_TRADE: u64 = 7;
}

/// Statuses under which the program accepts `SwapBaseIn`.
pub fn is_pool_tradeable(amm_info: &AmmInfo) -> bool {
    matches!(
        amm_info.status,
        pool_status::INITIALIZED | pool_status::SWAP_ONLY | pool_status::WAITING_TRADE
    )
}

/// Which pool side holds wrapped SOL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSide {
    Coin,
    Pc,
}

/// A pool with its tradable reserves resolved.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub address: Pubkey,
    pub info: AmmInfo,
    pub native_side: NativeSide,
    /// Vault balance minus pending PnL
    pub coin_reserve: u64,
    pub pc_reserve: u64,
}

impl PoolSnapshot {
    pub fn native_reserve(&self) -> u64 {
        match self.native_side {
            NativeSide::Coin => self.coin_reserve,
            NativeSide::Pc => self.pc_reserve,
        }
    }

    pub fn token_reserve(&self) -> u64 {
        match self.native_side {
            NativeSide::Coin => self.pc_reserve,
            NativeSide::Pc => self.coin_reserve,
        }
    }
}

/// `getProgramAccounts` with one mint pinned at each side offset.
async fn find_pools_at(
    rpc: &dyn LedgerRpc,
    first: (usize, &Pubkey),
    second: (usize, &Pubkey),
) -> Result<Vec<(Pubkey, AmmInfo)>> {
    let filters = [
        AccountFilter::DataSize(AMM_INFO_SIZE as u64),
        AccountFilter::memcmp_pubkey(first.0, first.1),
        AccountFilter::memcmp_pubkey(second.0, second.1),
    ];
    let accounts = rpc.get_program_accounts(&accounts::RAYDIUM_AMM_V4, &filters).await?;
    Ok(accounts
        .into_iter()
        .filter_map(|(address, data)| amm_info_decode(&data).map(|info| (address, info)))
        .collect())
}

/// 查找 mint/WSOL 交易对的 pool
///
/// Token as coin with wSOL as pc first; the reversed pairing only when the
/// first search finds nothing.
pub async fn find_wsol_pools_by_mint(
    rpc: &dyn LedgerRpc,
    mint: &Pubkey,
) -> Result<Vec<(Pubkey, AmmInfo)>> {
    let pools = find_pools_at(rpc, (COIN_MINT_OFFSET, mint), (PC_MINT_OFFSET, &WSOL_MINT)).await?;
    if !pools.is_empty() {
        return Ok(pools);
    }
    debug!(%mint, "no coin-side pool, trying mint as pc");
    find_pools_at(rpc, (PC_MINT_OFFSET, mint), (COIN_MINT_OFFSET, &WSOL_MINT)).await
}

/// Resolve vault balances for `pools` in one batch and return the tradeable
/// pool with the deepest wSOL side.
pub async fn select_deepest_pool(
    rpc: &dyn LedgerRpc,
    pools: Vec<(Pubkey, AmmInfo)>,
) -> Result<Option<PoolSnapshot>> {
    let pools: Vec<(Pubkey, AmmInfo)> =
        pools.into_iter().filter(|(_, info)| is_pool_tradeable(info)).collect();
    if pools.is_empty() {
        return Ok(None);
    }

    let vaults: Vec<Pubkey> =
        pools.iter().flat_map(|(_, info)| [info.token_coin, info.token_pc]).collect();
    let vault_accounts = rpc.get_multiple_accounts(&vaults).await?;
    if vault_accounts.len() != vaults.len() {
        return Err(anyhow!(
            "expected {} vault accounts, rpc returned {}",
            vaults.len(),
            vault_accounts.len()
        ));
    }

    let mut best: Option<PoolSnapshot> = None;
    for ((address, info), vault_pair) in pools.into_iter().zip(vault_accounts.chunks(2)) {
        let coin_amount = vault_pair[0].as_ref().and_then(|a| decode_token_account_amount(&a.data));
        let pc_amount = vault_pair[1].as_ref().and_then(|a| decode_token_account_amount(&a.data));
        let (Some(coin_amount), Some(pc_amount)) = (coin_amount, pc_amount) else {
            debug!(pool = %address, "pool vault missing, skipping");
            continue;
        };
        let native_side = if info.pc_mint == WSOL_MINT { NativeSide::Pc } else { NativeSide::Coin };
        let snapshot = PoolSnapshot {
            address,
            coin_reserve: coin_amount.saturating_sub(info.out_put.need_take_pnl_coin),
            pc_reserve: pc_amount.saturating_sub(info.out_put.need_take_pnl_pc),
            info,
            native_side,
        };
        if best.as_ref().is_none_or(|b| snapshot.native_reserve() > b.native_reserve()) {
            best = Some(snapshot);
        }
    }
    Ok(best)
}

/// Serum/OpenBook vault signer: `create_program_address([market, nonce_le])`.
pub fn get_vault_signer(market: &Pubkey, nonce: u64, serum_program: &Pubkey) -> Result<Pubkey> {
    Pubkey::create_program_address(&[market.as_ref(), &nonce.to_le_bytes()], serum_program)
        .map_err(|e| anyhow!("invalid vault signer nonce {} for market {}: {}", nonce, market, e))
}
