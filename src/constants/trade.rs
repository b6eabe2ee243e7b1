//! 手续费、推荐返佣与交易默认值

/// Bot fee before the user discount, in percent.
pub const BOT_FEE_PERCENT: u64 = 1;

/// Discount granted to every user on the bot fee, in percent.
pub const USER_DISCOUNT_PERCENT: u64 = 10;

/// Effective protocol fee: 1% * (100 - 10)% = 0.9% = 90 bps.
pub const DEFAULT_PROTOCOL_FEE_BASIS_POINTS: u64 =
    BOT_FEE_PERCENT * (100 - USER_DISCOUNT_PERCENT);

/// Referral payout schedule in hundredths of a percent: 35%, 3%, 1.5%, 1%, 0.5%.
pub const REFERRAL_SCHEDULE_CENTI_PERCENT: [u64; 5] = [3_500, 300, 150, 100, 50];

pub const MAX_REFERRAL_DEPTH: usize = REFERRAL_SCHEDULE_CENTI_PERCENT.len();

/// 100% expressed in hundredths of a percent.
pub const FULL_CENTI_PERCENT: u64 = 10_000;

/// Lamports kept back on a buy so the wallet can still pay rent and fees (0.003 SOL).
pub const MIN_RESERVE_LAMPORTS: u64 = 3_000_000;

pub const BASIS_POINTS_DENOMINATOR: u64 = 10_000;

/// Default slippage (10%).
pub const DEFAULT_SLIPPAGE_BASIS_POINTS: u64 = 1_000;

pub const DEFAULT_BLOCKHASH_REFRESH_MS: u64 = 1_000;
