use crate::constants::trade::{MAX_REFERRAL_DEPTH, REFERRAL_SCHEDULE_CENTI_PERCENT};
use solana_sdk::{pubkey::Pubkey, signature::Keypair};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapDirection {
    /// SOL → token
    Buy,
    /// token → SOL
    Sell,
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapDirection::Buy => write!(f, "buy"),
            SwapDirection::Sell => write!(f, "sell"),
        }
    }
}

/// One referrer and its share of the protocol fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralEdge {
    pub payout: Pubkey,
    /// Hundredths of a percent: 3_500 = 35%
    pub centi_percent: u64,
}

/// Ordered ancestors of a user, closest first, at most five deep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferralChain {
    edges: Vec<ReferralEdge>,
}

impl ReferralChain {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assign the fixed payout schedule to `ancestors`, dropping anything
    /// beyond the fifth level.
    pub fn from_ancestors(ancestors: &[Pubkey]) -> Self {
        let edges = ancestors
            .iter()
            .take(MAX_REFERRAL_DEPTH)
            .zip(REFERRAL_SCHEDULE_CENTI_PERCENT)
            .map(|(payout, centi_percent)| ReferralEdge { payout: *payout, centi_percent })
            .collect();
        Self { edges }
    }

    pub fn edges(&self) -> &[ReferralEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// A single swap request. Built once per request and never mutated.
#[derive(Clone)]
pub struct SwapIntent {
    pub payer: Arc<Keypair>,
    pub mint: Pubkey,
    /// Base units of the input side: lamports on buy, token units on sell
    pub amount: u64,
    pub direction: SwapDirection,
    pub slippage_basis_points: u64,
    pub tip_lamports: u64,
    pub referral_chain: ReferralChain,
}

impl SwapIntent {
    pub fn new(
        payer: Arc<Keypair>,
        mint: Pubkey,
        amount: u64,
        direction: SwapDirection,
        slippage_basis_points: u64,
        tip_lamports: u64,
        referral_chain: ReferralChain,
    ) -> Self {
        Self { payer, mint, amount, direction, slippage_basis_points, tip_lamports, referral_chain }
    }

    pub fn is_buy(&self) -> bool {
        self.direction == SwapDirection::Buy
    }
}

impl fmt::Debug for SwapIntent {
    // Key material stays out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use solana_sdk::signer::Signer;
        f.debug_struct("SwapIntent")
            .field("payer", &self.payer.pubkey())
            .field("mint", &self.mint)
            .field("amount", &self.amount)
            .field("direction", &self.direction)
            .field("slippage_basis_points", &self.slippage_basis_points)
            .field("tip_lamports", &self.tip_lamports)
            .field("referrers", &self.referral_chain.len())
            .finish()
    }
}
