pub mod common;
pub mod coordinator;
pub mod core;
pub mod fee;
pub mod lifecycle;
pub mod submitter;

pub use coordinator::{SwapCoordinator, SwapReceipt};
pub use core::{
    ReferralChain, ReferralEdge, SwapDirection, SwapError, SwapIntent, SwapStage, SwapVenue,
    VenueKind, VenueOutcome, VenueQuote,
};
pub use fee::FeeDistributor;
pub use lifecycle::{
    keypair_from_base58, NoopNotifier, Notifier, SwapOutcome, UserProfile,
    UserProfileProvider, UserSwapRequest,
};
pub use submitter::{SettlementBundle, SettlementSubmitter};
