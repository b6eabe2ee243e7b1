use solana_sdk::{instruction::AccountMeta, pubkey, pubkey::Pubkey};

pub const SYSTEM_PROGRAM: Pubkey = pubkey!("11111111111111111111111111111111");
pub const TOKEN_PROGRAM: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const COMPUTE_BUDGET_PROGRAM: Pubkey = pubkey!("ComputeBudget111111111111111111111111111111");

pub const SYSTEM_PROGRAM_META: AccountMeta =
    AccountMeta { pubkey: SYSTEM_PROGRAM, is_signer: false, is_writable: false };

pub const TOKEN_PROGRAM_META: AccountMeta =
    AccountMeta { pubkey: TOKEN_PROGRAM, is_signer: false, is_writable: false };

/// Default protocol treasury receiving the fee share no referrer claims.
pub const DEFAULT_TREASURY: Pubkey = pubkey!("7G5fW5Np81rJz268CdbC8hFMdFe5BNEmeGoJHzC6DJrL");
