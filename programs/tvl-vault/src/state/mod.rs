// =============================================================================
// State Module
// =============================================================================
// Account structures and events of the TVL vault program.
// =============================================================================

pub mod access_control;
pub mod depositor;
pub mod events;
pub mod tvl_feed;
pub mod vault;
pub mod withdraw_batch;

pub use access_control::*;
pub use depositor::*;
pub use events::*;
pub use tvl_feed::*;
pub use vault::*;
pub use withdraw_batch::*;
