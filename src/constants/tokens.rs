//! 常用代币常量定义

use solana_sdk::pubkey;

pub use solana_sdk::pubkey::Pubkey;

/// Wrapped SOL mint, the native side of every swap this engine routes.
pub const WSOL_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

/// Native SOL decimals
pub const SOL_DECIMALS: u8 = 9;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
