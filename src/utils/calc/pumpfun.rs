//! Bonding-curve quote math. Integer only; see `BondingCurveState` for the
//! display statistics that are allowed to use floats.

use super::big_num::{to_u64, U256};
use crate::constants::trade::BASIS_POINTS_DENOMINATOR;

/// Tokens received for `sol_amount` lamports: `floor(sol * vToken / vSol)`.
///
/// Returns `None` when the curve cannot price the input, i.e. when
/// `vSol == 0` or the input is at least the whole virtual SOL side.
pub fn get_buy_token_amount_from_sol_amount(
    virtual_sol_reserves: u64,
    virtual_token_reserves: u64,
    sol_amount: u64,
) -> Option<u64> {
    if virtual_sol_reserves == 0 || sol_amount >= virtual_sol_reserves {
        return None;
    }
    let out = U256::from(sol_amount) * U256::from(virtual_token_reserves)
        / U256::from(virtual_sol_reserves);
    to_u64(out)
}

/// Minimum lamports accepted when selling `token_amount`:
/// `floor(token * (1 - slippage) * vSol / vToken)`.
pub fn get_sell_min_sol_output(
    virtual_sol_reserves: u64,
    virtual_token_reserves: u64,
    token_amount: u64,
    slippage_basis_points: u64,
) -> Option<u64> {
    if virtual_token_reserves == 0 {
        return None;
    }
    let keep = BASIS_POINTS_DENOMINATOR.saturating_sub(slippage_basis_points);
    let numerator =
        U256::from(token_amount) * U256::from(keep) * U256::from(virtual_sol_reserves);
    let denominator = U256::from(BASIS_POINTS_DENOMINATOR) * U256::from(virtual_token_reserves);
    to_u64(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V_SOL: u64 = 30_000_000_000;
    const V_TOKEN: u64 = 1_073_000_000_000_000;

    #[test]
    fn buy_quote_matches_reference_curve() {
        let out = get_buy_token_amount_from_sol_amount(V_SOL, V_TOKEN, 10_000_000).unwrap();
        assert_eq!(out, 357_666_666_666);
    }

    #[test]
    fn buy_quote_rejects_unpriceable_input() {
        assert_eq!(get_buy_token_amount_from_sol_amount(0, V_TOKEN, 1), None);
        assert_eq!(get_buy_token_amount_from_sol_amount(V_SOL, V_TOKEN, V_SOL), None);
    }

    #[test]
    fn sell_quote_applies_slippage_before_division() {
        // 1_000_000 tokens (1 token at 6 decimals) with 10% slippage
        let min = get_sell_min_sol_output(V_SOL, V_TOKEN, 1_000_000, 1_000).unwrap();
        assert_eq!(min, 25);
        assert_eq!(get_sell_min_sol_output(V_SOL, 0, 1, 0), None);
        assert_eq!(get_sell_min_sol_output(V_SOL, V_TOKEN, 1_000_000, 10_000), Some(0));
    }

    proptest::proptest! {
        #[test]
        fn buy_never_drains_the_token_side(
            v_sol in 1u64..=u64::MAX,
            v_token in 1u64..=u64::MAX,
            sol in 1u64..=u64::MAX,
        ) {
            if let Some(out) = get_buy_token_amount_from_sol_amount(v_sol, v_token, sol) {
                proptest::prop_assert!(sol < v_sol);
                proptest::prop_assert!(out < v_token);
            }
        }

        #[test]
        fn sell_bound_shrinks_with_slippage(
            token in 0u64..1_000_000_000_000,
            low in 0u64..=10_000,
            high in 0u64..=10_000,
        ) {
            let (low, high) = if low <= high { (low, high) } else { (high, low) };
            let loose = get_sell_min_sol_output(V_SOL, V_TOKEN, token, high).unwrap();
            let tight = get_sell_min_sol_output(V_SOL, V_TOKEN, token, low).unwrap();
            proptest::prop_assert!(loose <= tight);
        }
    }
}
