//! 统一的 Token 工具函数
//!
//! Amount conversion from user-facing decimal strings to on-chain base units,
//! plus mint decimals lookup for both token programs. No floating point.

use crate::common::ledger_rpc::LedgerRpc;
use anyhow::{anyhow, Result};
use solana_sdk::pubkey::Pubkey;
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Mint;

/// Parse `"0.01"` with 9 decimals into `10_000_000`.
///
/// Returns `None` for malformed input, more fractional digits than
/// `decimals`, or values that do not fit in u64.
pub fn ui_amount_to_base_units(amount: &str, decimals: u8) -> Option<u64> {
    let amount = amount.trim();
    if amount.is_empty() {
        return None;
    }
    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > decimals as usize
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let scale = 10u64.checked_pow(decimals as u32)?;
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut frac_units: u64 = if fraction.is_empty() { 0 } else { fraction.parse().ok()? };
    for _ in fraction.len()..decimals as usize {
        frac_units = frac_units.checked_mul(10)?;
    }
    whole.checked_mul(scale)?.checked_add(frac_units)
}

/// Decimals of a raw mint account, classic Token first, then Token-2022
/// (whose mints may carry extensions past the base layout).
pub fn decode_mint_decimals(data: &[u8]) -> Option<u8> {
    if let Ok(mint) = Mint::unpack(data) {
        return Some(mint.decimals);
    }
    use spl_token_2022::extension::StateWithExtensions;
    use spl_token_2022::state::Mint as Mint2022;
    StateWithExtensions::<Mint2022>::unpack(data).ok().map(|mint| mint.base.decimals)
}

/// 获取代币精度
pub async fn get_token_decimals(rpc: &dyn LedgerRpc, mint: &Pubkey) -> Result<u8> {
    let account = rpc
        .get_account(mint)
        .await?
        .ok_or_else(|| anyhow!("mint account {} not found", mint))?;
    decode_mint_decimals(&account.data).ok_or_else(|| {
        anyhow!(
            "无法解析 mint 账户数据: {} (数据长度: {}, owner: {})",
            mint,
            account.data.len(),
            account.owner
        )
    })
}

#[cfg(test)]
pub(crate) fn packed_mint(decimals: u8) -> Vec<u8> {
    let mint = Mint { decimals, is_initialized: true, supply: 1_000_000, ..Default::default() };
    let mut data = vec![0u8; Mint::LEN];
    Mint::pack(mint, &mut data).unwrap();
    data
}

/// Token-2022 mint with an empty extension area: base mint, zero padding up
/// to the account length, then the `Mint` account type byte.
#[cfg(test)]
pub(crate) fn packed_mint_2022(decimals: u8) -> Vec<u8> {
    let mut data = packed_mint(decimals);
    data.resize(spl_token_2022::state::Account::LEN, 0);
    data.push(spl_token_2022::extension::AccountType::Mint as u8);
    data
}
