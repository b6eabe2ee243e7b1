pub mod blockhash_cache;
pub mod bonding_curve;
pub mod ledger_rpc;
pub mod mock_rpc;
pub mod spl_token;
pub mod types;

pub use blockhash_cache::BlockhashCache;
pub use ledger_rpc::{AccountFilter, LedgerRpc, SimulationReport};
pub use types::*;

pub type SolanaRpcClient = solana_client::nonblocking::rpc_client::RpcClient;
pub type AnyResult<T> = anyhow::Result<T>;
