//! Bonding curve account for the Pump.fun Solana Program
//!
//! # Layout
//!
//! | offset | field |
//! |---|---|
//! | 0..8 | anchor discriminator |
//! | 8..16 | `virtual_token_reserves` |
//! | 16..24 | `virtual_sol_reserves` |
//! | 24..32 | `real_token_reserves` |
//! | 32..40 | `real_sol_reserves` |
//! | 40..48 | `token_total_supply` |
//! | 48 | `complete` |
//! | 49..81 | `creator` |
//!
//! The state is read fresh for every quote; reserves move every block.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::constants::LAMPORTS_PER_SOL;
use crate::instruction::utils::pumpfun::global_constants::{RESERVED_TOKENS, TOKEN_DECIMALS};
use crate::utils::calc::pumpfun::{get_buy_token_amount_from_sol_amount, get_sell_min_sol_output};

pub const BONDING_CURVE_DISCRIMINATOR: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];

const RESERVES_END: usize = 48;
const COMPLETE_OFFSET: usize = 48;
const CREATOR_RANGE: std::ops::Range<usize> = 49..81;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BondingCurveState {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    /// Curve migrated to an AMM; trading through it is closed
    pub complete: bool,
    /// Absent on accounts shorter than the current layout
    pub creator: Option<Pubkey>,
}

#[inline]
fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset + 8)?;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}

impl BondingCurveState {
    /// Decode raw account bytes. `None` when the data is too short for the
    /// five reserve fields.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < RESERVES_END {
            return None;
        }
        let creator = data
            .get(CREATOR_RANGE)
            .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
            .map(Pubkey::new_from_array);
        Some(Self {
            virtual_token_reserves: read_u64(data, 8)?,
            virtual_sol_reserves: read_u64(data, 16)?,
            real_token_reserves: read_u64(data, 24)?,
            real_sol_reserves: read_u64(data, 32)?,
            token_total_supply: read_u64(data, 40)?,
            complete: data.get(COMPLETE_OFFSET).is_some_and(|b| *b != 0),
            creator,
        })
    }

    /// Inverse of [`decode`](Self::decode), used to seed in-memory ledgers.
    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = vec![0u8; CREATOR_RANGE.end];
        data[..8].copy_from_slice(&BONDING_CURVE_DISCRIMINATOR);
        data[8..16].copy_from_slice(&self.virtual_token_reserves.to_le_bytes());
        data[16..24].copy_from_slice(&self.virtual_sol_reserves.to_le_bytes());
        data[24..32].copy_from_slice(&self.real_token_reserves.to_le_bytes());
        data[32..40].copy_from_slice(&self.real_sol_reserves.to_le_bytes());
        data[40..48].copy_from_slice(&self.token_total_supply.to_le_bytes());
        data[COMPLETE_OFFSET] = self.complete as u8;
        if let Some(creator) = self.creator {
            data[CREATOR_RANGE].copy_from_slice(creator.as_ref());
        }
        data
    }

    /// Pricing is undefined without SOL on the virtual side.
    pub fn is_priceable(&self) -> bool {
        self.virtual_sol_reserves > 0 && self.virtual_token_reserves > 0
    }

    pub fn get_buy_token_amount(&self, sol_amount: u64) -> Option<u64> {
        get_buy_token_amount_from_sol_amount(
            self.virtual_sol_reserves,
            self.virtual_token_reserves,
            sol_amount,
        )
    }

    pub fn get_sell_min_sol_output(&self, token_amount: u64, slippage_basis_points: u64) -> Option<u64> {
        get_sell_min_sol_output(
            self.virtual_sol_reserves,
            self.virtual_token_reserves,
            token_amount,
            slippage_basis_points,
        )
    }

    // Display-only statistics below; never feed these back into a quote.

    /// Price of one whole token in SOL.
    pub fn price_in_sol(&self) -> f64 {
        if self.virtual_token_reserves == 0 {
            return 0.0;
        }
        let sol = self.virtual_sol_reserves as f64 / LAMPORTS_PER_SOL as f64;
        let tokens = self.virtual_token_reserves as f64 / 10f64.powi(TOKEN_DECIMALS as i32);
        sol / tokens
    }

    /// Share of the sellable supply already bought, 0..=100.
    pub fn progress_percent(&self) -> f64 {
        let initial = self.token_total_supply.saturating_sub(RESERVED_TOKENS);
        if initial == 0 {
            return 0.0;
        }
        let left = self.real_token_reserves.saturating_sub(RESERVED_TOKENS);
        (100.0 - left as f64 * 100.0 / initial as f64).clamp(0.0, 100.0)
    }

    pub fn market_cap_sol(&self) -> f64 {
        let supply = self.token_total_supply as f64 / 10f64.powi(TOKEN_DECIMALS as i32);
        self.price_in_sol() * supply
    }
}
