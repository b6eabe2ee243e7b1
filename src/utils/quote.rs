/// Quote result shared by the on-chain venues so the coordinator can log
/// them in one shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteExactInResult {
    /// Output amount for an exact-in swap (in smallest units).
    pub amount_out: u64,
    /// Total fee amount paid (in input token units, smallest units).
    pub fee_amount: u64,
    /// Price impact against the pre-trade spot price, in basis points.
    pub price_impact_bps: Option<u64>,
}
