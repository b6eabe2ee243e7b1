//! Raydium AMM v4 constant-product math (`SwapBaseIn`).

use super::big_num::{mul_div_ceil, to_u64, U256};
use crate::constants::trade::BASIS_POINTS_DENOMINATOR;
use crate::utils::quote::QuoteExactInResult;

/// Output of an exact-in swap against `reserve_in`/`reserve_out`.
///
/// The pool takes `ceil(amount_in * fee_numerator / fee_denominator)` from the
/// input first, then applies `x * y = k` to the remainder.
pub fn compute_swap_amount(
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_numerator: u64,
    fee_denominator: u64,
) -> Option<QuoteExactInResult> {
    if reserve_in == 0 || reserve_out == 0 || fee_denominator == 0 {
        return None;
    }
    let fee_amount = mul_div_ceil(amount_in, fee_numerator, fee_denominator)?;
    let amount_in_less_fee = amount_in.checked_sub(fee_amount)?;

    let numerator = U256::from(reserve_out) * U256::from(amount_in_less_fee);
    let denominator = U256::from(reserve_in) + U256::from(amount_in_less_fee);
    let amount_out = to_u64(numerator / denominator)?;

    // spot = amount_in_less_fee * reserve_out / reserve_in
    let spot = U256::from(amount_in_less_fee) * U256::from(reserve_out) / U256::from(reserve_in);
    let price_impact_bps = if spot.is_zero() {
        None
    } else {
        let lost = spot - U256::from(amount_out);
        to_u64(lost * U256::from(BASIS_POINTS_DENOMINATOR) / spot)
    };

    Some(QuoteExactInResult { amount_out, fee_amount, price_impact_bps })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_charges_fee_then_constant_product() {
        let q = compute_swap_amount(1_000_000, 100_000_000, 200_000_000, 25, 10_000).unwrap();
        assert_eq!(q.fee_amount, 2_500);
        // 200e6 * 997_500 / (100e6 + 997_500)
        assert_eq!(q.amount_out, 1_975_296);
        assert!(q.price_impact_bps.unwrap() > 0);
    }

    #[test]
    fn empty_pool_has_no_quote() {
        assert!(compute_swap_amount(1, 0, 10, 25, 10_000).is_none());
        assert!(compute_swap_amount(1, 10, 0, 25, 10_000).is_none());
        assert!(compute_swap_amount(1, 10, 10, 25, 0).is_none());
    }
}
