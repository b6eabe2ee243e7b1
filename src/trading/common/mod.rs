pub mod transaction_builder;
pub mod wsol_manager;

pub use transaction_builder::{
    build_swap_transaction, build_versioned_transaction, compute_budget_instructions,
};
pub use wsol_manager::{close_wsol, create_wsol_ata, handle_wsol};
