pub mod jupiter;
pub mod pumpfun;
pub mod raydium_amm_v4;

// types
pub mod raydium_amm_v4_types;
