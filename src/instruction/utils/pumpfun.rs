//! pump.fun program accounts, PDAs and curve constants.

use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};

pub mod seeds {
    pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";
    pub const CREATOR_VAULT_SEED: &[u8] = b"creator-vault";
    pub const USER_VOLUME_ACCUMULATOR_SEED: &[u8] = b"user_volume_accumulator";
    pub const GLOBAL_VOLUME_ACCUMULATOR_SEED: &[u8] = b"global_volume_accumulator";
    pub const FEE_CONFIG_SEED: &[u8] = b"fee_config";
}

pub mod global_constants {
    use solana_sdk::{instruction::AccountMeta, pubkey, pubkey::Pubkey};

    pub const INITIAL_VIRTUAL_TOKEN_RESERVES: u64 = 1_073_000_000_000_000;
    pub const INITIAL_VIRTUAL_SOL_RESERVES: u64 = 30_000_000_000;
    pub const INITIAL_REAL_TOKEN_RESERVES: u64 = 793_100_000_000_000;
    pub const TOKEN_TOTAL_SUPPLY: u64 = 1_000_000_000_000_000;
    /// Tokens held back for the migration pool (206.9M at 6 decimals).
    pub const RESERVED_TOKENS: u64 = 206_900_000_000_000;
    pub const TOKEN_DECIMALS: u8 = 6;

    pub const GLOBAL_ACCOUNT: Pubkey = pubkey!("4wTV1YmiEkRvAtNtsSGPtUrqRYQMe5SKy2uB4Jjaxnjf");
    pub const FEE_RECIPIENT: Pubkey = pubkey!("CebN5WGQ4jvEPvsVU4EoHEpgzq1VV7AbicfhtW4xC9iM");

    pub const GLOBAL_ACCOUNT_META: AccountMeta =
        AccountMeta { pubkey: GLOBAL_ACCOUNT, is_signer: false, is_writable: false };
    pub const FEE_RECIPIENT_META: AccountMeta =
        AccountMeta { pubkey: FEE_RECIPIENT, is_signer: false, is_writable: true };
}

pub mod accounts {
    use solana_sdk::{instruction::AccountMeta, pubkey, pubkey::Pubkey};

    pub const PUMPFUN: Pubkey = pubkey!("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");
    pub const EVENT_AUTHORITY: Pubkey = pubkey!("Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1");
    pub const FEE_PROGRAM: Pubkey = pubkey!("pfeeUxB6jkeY1Hxd7CsFCAjcbHA9rWtchMGdZ6VojVZ");

    pub const PUMPFUN_META: AccountMeta =
        AccountMeta { pubkey: PUMPFUN, is_signer: false, is_writable: false };
    pub const EVENT_AUTHORITY_META: AccountMeta =
        AccountMeta { pubkey: EVENT_AUTHORITY, is_signer: false, is_writable: false };
    pub const FEE_PROGRAM_META: AccountMeta =
        AccountMeta { pubkey: FEE_PROGRAM, is_signer: false, is_writable: false };
}

pub const BUY_DISCRIMINATOR: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];
pub const SELL_DISCRIMINATOR: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];

pub fn get_bonding_curve_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::BONDING_CURVE_SEED, mint.as_ref()], &accounts::PUMPFUN)
        .0
}

pub fn get_creator_vault_pda(creator: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[seeds::CREATOR_VAULT_SEED, creator.as_ref()],
        &accounts::PUMPFUN,
    )
    .0
}

pub fn get_user_volume_accumulator_pda(user: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[seeds::USER_VOLUME_ACCUMULATOR_SEED, user.as_ref()],
        &accounts::PUMPFUN,
    )
    .0
}

pub fn get_global_volume_accumulator_pda() -> Pubkey {
    Pubkey::find_program_address(&[seeds::GLOBAL_VOLUME_ACCUMULATOR_SEED], &accounts::PUMPFUN).0
}

pub fn get_fee_config_pda() -> Pubkey {
    Pubkey::find_program_address(
        &[seeds::FEE_CONFIG_SEED, accounts::PUMPFUN.as_ref()],
        &accounts::FEE_PROGRAM,
    )
    .0
}

pub fn global_volume_accumulator_meta() -> AccountMeta {
    AccountMeta::new_readonly(get_global_volume_accumulator_pda(), false)
}

pub fn fee_config_meta() -> AccountMeta {
    AccountMeta::new_readonly(get_fee_config_pda(), false)
}

/// Instruction payload: `discriminator | amount | bound`, all little endian.
pub fn encode_trade_data(discriminator: [u8; 8], amount: u64, bound: u64) -> [u8; 24] {
    let mut data = [0u8; 24];
    data[..8].copy_from_slice(&discriminator);
    data[8..16].copy_from_slice(&amount.to_le_bytes());
    data[16..24].copy_from_slice(&bound.to_le_bytes());
    data
}
