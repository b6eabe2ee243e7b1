//! Raydium AMM V4 (Raydium Liquidity Pool V4) 账户布局
//!
//! - `AmmInfo`: pool state, 752 bytes, borsh-compatible
//! - `MarketStateV3`: OpenBook/Serum market the pool trades against, 388 bytes,
//!   decoded at fixed offsets

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Fees {
    pub min_separate_numerator: u64,
    pub min_separate_denominator: u64,
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
    pub pnl_numerator: u64,
    pub pnl_denominator: u64,
    pub swap_fee_numerator: u64,
    pub swap_fee_denominator: u64,
}

/// Pool accounting; only the pending PnL is used for pricing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct OutPutData {
    pub need_take_pnl_coin: u64,
    pub need_take_pnl_pc: u64,
    pub total_pnl_pc: u64,
    pub total_pnl_coin: u64,
    pub pool_open_time: u64,
    pub punish_pc_amount: u64,
    pub punish_coin_amount: u64,
    pub orderbook_to_init_time: u64,
    pub swap_coin_in_amount: u128,
    pub swap_pc_out_amount: u128,
    pub swap_take_pc_fee: u64,
    pub swap_pc_in_amount: u128,
    pub swap_coin_out_amount: u128,
    pub swap_take_coin_fee: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AmmInfo {
    pub status: u64,
    pub nonce: u64,
    pub order_num: u64,
    pub depth: u64,
    pub coin_decimals: u64,
    pub pc_decimals: u64,
    pub state: u64,
    pub reset_flag: u64,
    pub min_size: u64,
    pub vol_max_cut_ratio: u64,
    pub amount_wave: u64,
    pub coin_lot_size: u64,
    pub pc_lot_size: u64,
    pub min_price_multiplier: u64,
    pub max_price_multiplier: u64,
    pub sys_decimal_value: u64,
    pub fees: Fees,
    pub out_put: OutPutData,
    /// Pool vault holding the coin (base) side
    pub token_coin: Pubkey,
    /// Pool vault holding the pc (quote) side
    pub token_pc: Pubkey,
    pub coin_mint: Pubkey,
    pub pc_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub open_orders: Pubkey,
    pub market: Pubkey,
    /// OpenBook/Serum program owning `market`
    pub serum_dex: Pubkey,
    pub target_orders: Pubkey,
    pub withdraw_queue: Pubkey,
    pub token_temp_lp: Pubkey,
    pub amm_owner: Pubkey,
    pub lp_amount: u64,
    pub client_order_id: u64,
    pub padding: [u64; 2],
}

pub const AMM_INFO_SIZE: usize = 752;

/// 16 × u64 + Fees (64) + OutPutData (144) + token_coin + token_pc
pub const COIN_MINT_OFFSET: usize = 400;
pub const PC_MINT_OFFSET: usize = COIN_MINT_OFFSET + 32;

pub fn amm_info_decode(data: &[u8]) -> Option<AmmInfo> {
    if data.len() < AMM_INFO_SIZE {
        return None;
    }
    borsh::from_slice::<AmmInfo>(&data[..AMM_INFO_SIZE]).ok()
}

pub const MARKET_STATE_V3_SIZE: usize = 388;

// Offsets include the 5-byte "serum" head padding.
const MARKET_OWN_ADDRESS_OFFSET: usize = 13;
const MARKET_VAULT_SIGNER_NONCE_OFFSET: usize = 45;
const MARKET_COIN_VAULT_OFFSET: usize = 117;
const MARKET_PC_VAULT_OFFSET: usize = 165;
const MARKET_EVENT_QUEUE_OFFSET: usize = 253;
const MARKET_BIDS_OFFSET: usize = 285;
const MARKET_ASKS_OFFSET: usize = 317;

/// The market accounts a v4 swap has to pass through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketStateV3 {
    pub own_address: Pubkey,
    pub vault_signer_nonce: u64,
    pub coin_vault: Pubkey,
    pub pc_vault: Pubkey,
    pub event_queue: Pubkey,
    pub bids: Pubkey,
    pub asks: Pubkey,
}

fn read_pubkey(data: &[u8], offset: usize) -> Option<Pubkey> {
    let bytes: [u8; 32] = data.get(offset..offset + 32)?.try_into().ok()?;
    Some(Pubkey::new_from_array(bytes))
}

impl MarketStateV3 {
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < MARKET_STATE_V3_SIZE {
            return None;
        }
        let nonce = data.get(MARKET_VAULT_SIGNER_NONCE_OFFSET..MARKET_VAULT_SIGNER_NONCE_OFFSET + 8)?;
        Some(Self {
            own_address: read_pubkey(data, MARKET_OWN_ADDRESS_OFFSET)?,
            vault_signer_nonce: u64::from_le_bytes(nonce.try_into().ok()?),
            coin_vault: read_pubkey(data, MARKET_COIN_VAULT_OFFSET)?,
            pc_vault: read_pubkey(data, MARKET_PC_VAULT_OFFSET)?,
            event_queue: read_pubkey(data, MARKET_EVENT_QUEUE_OFFSET)?,
            bids: read_pubkey(data, MARKET_BIDS_OFFSET)?,
            asks: read_pubkey(data, MARKET_ASKS_OFFSET)?,
        })
    }

    /// Raw account bytes with the fields above filled in; everything else zero.
    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = vec![0u8; MARKET_STATE_V3_SIZE];
        data[..5].copy_from_slice(b"serum");
        data[MARKET_STATE_V3_SIZE - 7..].copy_from_slice(b"padding");
        let mut put = |offset: usize, key: &Pubkey| {
            data[offset..offset + 32].copy_from_slice(key.as_ref());
        };
        put(MARKET_OWN_ADDRESS_OFFSET, &self.own_address);
        put(MARKET_COIN_VAULT_OFFSET, &self.coin_vault);
        put(MARKET_PC_VAULT_OFFSET, &self.pc_vault);
        put(MARKET_EVENT_QUEUE_OFFSET, &self.event_queue);
        put(MARKET_BIDS_OFFSET, &self.bids);
        put(MARKET_ASKS_OFFSET, &self.asks);
        data[MARKET_VAULT_SIGNER_NONCE_OFFSET..MARKET_VAULT_SIGNER_NONCE_OFFSET + 8]
            .copy_from_slice(&self.vault_signer_nonce.to_le_bytes());
        data
    }
}
