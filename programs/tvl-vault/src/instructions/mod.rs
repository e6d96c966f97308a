// =============================================================================
// Instructions Module
// =============================================================================
// Every instruction of the TVL vault program, grouped by the role that calls
// it.
// =============================================================================

// Setup
pub mod initialize_depositor;
pub mod initialize_feed;
pub mod initialize_vault;

// Depositor operations
pub mod execute_deposit;
pub mod request_deposit;
pub mod request_withdraw;
pub mod transfer_shares;
pub mod withdraw;

// Oracle operations
pub mod append_tvl;

// Executor operations
pub mod advance_batch;
pub mod retrieve_liquidity;
pub mod settle_batch;

// Claimer operations
pub mod claim_fees;
pub mod sweep_dust;

// Admin operations
pub mod admin;
pub mod roles;

// Read-only
pub mod views;

// The #[derive(Accounts)] macro generates helper types that need to be at crate root
pub use admin::*;
pub use advance_batch::*;
pub use append_tvl::*;
pub use claim_fees::*;
pub use execute_deposit::*;
pub use initialize_depositor::*;
pub use initialize_feed::*;
pub use initialize_vault::*;
pub use request_deposit::*;
pub use request_withdraw::*;
pub use retrieve_liquidity::*;
pub use roles::*;
pub use settle_batch::*;
pub use sweep_dust::*;
pub use transfer_shares::*;
pub use views::*;
pub use withdraw::*;
