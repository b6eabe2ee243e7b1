use super::{errors::SwapError, params::SwapIntent};
use solana_sdk::{instruction::Instruction, message::AddressLookupTableAccount};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VenueKind {
    /// Raydium Liquidity Pool V4
    RaydiumAmmV4,
    /// pump.fun bonding curve
    PumpFun,
    /// Jupiter aggregator
    Jupiter,
}

impl fmt::Display for VenueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VenueKind::RaydiumAmmV4 => "raydium_amm_v4",
            VenueKind::PumpFun => "pumpfun",
            VenueKind::Jupiter => "jupiter",
        };
        f.write_str(name)
    }
}

/// Ready-to-sign swap produced by one venue.
#[derive(Debug, Clone)]
pub struct VenueQuote {
    pub venue: VenueKind,
    /// Base units actually spent (lamports on buy, token units on sell)
    pub input_amount: u64,
    /// Expected (or, for bounded venues, minimum) output in base units
    pub estimated_output_amount: u64,
    pub instructions: Vec<Instruction>,
    pub address_lookup_tables: Vec<AddressLookupTableAccount>,
}

#[derive(Debug, Clone)]
pub enum VenueOutcome {
    Quote(VenueQuote),
    /// Expected miss (no pool, no curve); the coordinator moves on.
    Unavailable(String),
}

/// 流动性来源
///
/// Venues are tried in list order; adding one is a list insertion.
#[async_trait::async_trait]
pub trait SwapVenue: Send + Sync {
    fn kind(&self) -> VenueKind;

    async fn try_build(&self, intent: &SwapIntent) -> Result<VenueOutcome, SwapError>;
}
