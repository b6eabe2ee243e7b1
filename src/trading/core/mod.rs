pub mod errors;
pub mod params;
pub mod traits;

pub use errors::{SwapError, SwapStage};
pub use params::{ReferralChain, ReferralEdge, SwapDirection, SwapIntent};
pub use traits::{SwapVenue, VenueKind, VenueOutcome, VenueQuote};
