use super::traits::VenueKind;
use std::fmt;

/// Coordinator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStage {
    BuildQuote,
    PreflightBalance,
    BuildFeeTx,
    Simulate,
    Submit,
    Confirm,
    Done,
    Failed,
}

impl fmt::Display for SwapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapStage::BuildQuote => "BUILD_QUOTE",
            SwapStage::PreflightBalance => "PREFLIGHT_BALANCE",
            SwapStage::BuildFeeTx => "BUILD_FEE_TX",
            SwapStage::Simulate => "SIMULATE",
            SwapStage::Submit => "SUBMIT",
            SwapStage::Confirm => "CONFIRM",
            SwapStage::Done => "DONE",
            SwapStage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Why a swap attempt failed. Venue unavailability is not here: it is a
/// normal [`VenueOutcome`](super::VenueOutcome) that drives fallback.
#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    #[error("invalid swap intent: {0}")]
    InvalidIntent(String),

    #[error("no venue could quote the swap")]
    NoLiquidity,

    #[error("{venue} venue failed: {message}")]
    Venue { venue: VenueKind, message: String },

    #[error("recent blockhash not available yet")]
    MetadataUnavailable,

    #[error("insufficient funds: balance {balance} lamports, need {required}")]
    InsufficientFunds { balance: u64, required: u64 },

    #[error("simulation failed: {diagnostic}")]
    SimulationFailed { diagnostic: String },

    #[error("bundle rejected by relay: {0}")]
    RelayRejected(String),

    #[error("bundle not landed after {attempts} status checks")]
    RelayTimeout { attempts: u32 },

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("transaction build failed: {0}")]
    Transaction(String),
}

impl SwapError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SwapError::InvalidIntent(_) => "invalid_intent",
            SwapError::NoLiquidity => "no_liquidity",
            SwapError::Venue { .. } => "venue_error",
            SwapError::MetadataUnavailable => "metadata_unavailable",
            SwapError::InsufficientFunds { .. } => "insufficient_funds",
            SwapError::SimulationFailed { .. } => "simulation_error",
            SwapError::RelayRejected(_) => "relay_rejected",
            SwapError::RelayTimeout { .. } => "relay_timeout",
            SwapError::Rpc(_) => "rpc_error",
            SwapError::Transaction(_) => "transaction_error",
        }
    }

    /// A fresh attempt may succeed without any change on the caller's side.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SwapError::MetadataUnavailable | SwapError::RelayTimeout { .. } | SwapError::Rpc(_)
        )
    }

    pub(crate) fn rpc(err: anyhow::Error) -> Self {
        SwapError::Rpc(format!("{:#}", err))
    }
}
