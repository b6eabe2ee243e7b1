pub mod big_num;
pub mod common;
pub mod pumpfun;
pub mod raydium_amm_v4;
