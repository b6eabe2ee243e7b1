pub mod jupiter;
pub mod pumpfun;
pub mod raydium_amm_v4;
pub mod utils;

pub use jupiter::JupiterVenue;
pub use pumpfun::PumpFunVenue;
pub use raydium_amm_v4::RaydiumAmmV4Venue;
