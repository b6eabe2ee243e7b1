use super::big_num::mul_div_floor;
use crate::constants::trade::BASIS_POINTS_DENOMINATOR;

/// Upper bound a buyer is willing to spend: `floor(amount * (1 + slippage))`.
pub fn calculate_with_slippage_buy(amount: u64, slippage_basis_points: u64) -> u64 {
    let factor = BASIS_POINTS_DENOMINATOR.saturating_add(slippage_basis_points);
    mul_div_floor(amount, factor, BASIS_POINTS_DENOMINATOR).unwrap_or(u64::MAX)
}

/// Lower bound a seller accepts: `floor(amount * (1 - slippage))`, 0 once slippage reaches 100%.
pub fn calculate_with_slippage_sell(amount: u64, slippage_basis_points: u64) -> u64 {
    let factor = BASIS_POINTS_DENOMINATOR.saturating_sub(slippage_basis_points);
    mul_div_floor(amount, factor, BASIS_POINTS_DENOMINATOR).unwrap_or(0)
}
