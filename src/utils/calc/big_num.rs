//! Fixed-width wide integers for on-chain amount math.
//!
//! Reserve products (u64 * u64 * bps) overflow u128, so every quote is
//! computed in `U256` and narrowed back to u64 at the end.
use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

/// Narrow a `U256` to u64, `None` when it does not fit.
#[inline]
pub fn to_u64(value: U256) -> Option<u64> {
    if value > U256::from(u64::MAX) { None } else { Some(value.low_u64()) }
}

/// `floor(a * b / c)` in 256-bit precision. `None` on a zero divisor or a u64 overflow.
#[inline]
pub fn mul_div_floor(a: u64, b: u64, c: u64) -> Option<u64> {
    if c == 0 {
        return None;
    }
    to_u64(U256::from(a) * U256::from(b) / U256::from(c))
}

/// `ceil(a * b / c)` in 256-bit precision.
#[inline]
pub fn mul_div_ceil(a: u64, b: u64, c: u64) -> Option<u64> {
    if c == 0 {
        return None;
    }
    let c = U256::from(c);
    to_u64((U256::from(a) * U256::from(b) + c - U256::one()) / c)
}
