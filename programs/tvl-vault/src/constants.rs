// =============================================================================
// TVL Vault Protocol Constants
// =============================================================================
// Fixed-point precision, time units, PDA seeds and the bounds every
// configurable vault parameter is validated against.
// =============================================================================

// =============================================================================
// FIXED-POINT PRECISION
// =============================================================================

/// Internal precision used for every TVL, fee and share computation
pub const PRECISION_DECIMALS: u8 = 18;

/// 1.0 in 18-decimal fixed point
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Total basis points (100%)
pub const BPS_DENOMINATOR: u128 = 10_000;

// =============================================================================
// TIME
// =============================================================================

pub const ONE_HOUR: i64 = 60 * 60;
pub const ONE_DAY: i64 = ONE_HOUR * 24;

/// Seconds in a 365-day year, the denominator of the per-second maintenance rate
pub const SECONDS_PER_YEAR: u128 = 31_536_000;

// =============================================================================
// PDA SEEDS
// =============================================================================

/// Full seed: ["vault", asset_mint]
pub const VAULT_SEED: &[u8] = b"vault";

/// Token account holding the vault's custody of the base asset
/// Full seed: ["vault_token", vault]
pub const VAULT_TOKEN_SEED: &[u8] = b"vault_token";

/// Full seed: ["access_control", vault]
pub const ACCESS_CONTROL_SEED: &[u8] = b"access_control";

/// Full seed: ["tvl_feed", asset_mint]
pub const TVL_FEED_SEED: &[u8] = b"tvl_feed";

/// Full seed: ["tvl_entry", feed, index (u64 LE)]
pub const TVL_ENTRY_SEED: &[u8] = b"tvl_entry";

/// Full seed: ["depositor", vault, owner]
pub const DEPOSITOR_SEED: &[u8] = b"depositor";

/// Full seed: ["withdraw_batch", vault, batch_id (u64 LE)]
pub const WITHDRAW_BATCH_SEED: &[u8] = b"withdraw_batch";

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum role grants an AccessControl account can hold
pub const MAX_ROLE_GRANTS: usize = 16;

/// Batch ids start at 1; 0 is never a valid batch
pub const FIRST_BATCH_ID: u64 = 1;

/// Share units locked to the null holder on the very first deposit when
/// `lock_bootstrap_shares` is enabled (1e-9 of a share)
pub const BOOTSTRAP_LOCKED_SHARES: u128 = 1_000_000_000;

/// Entries returned per `get_last_tvl_entries` call (Solana return data is 1 KiB)
pub const MAX_RETURNED_ENTRIES: usize = 20;

/// Maintenance fee cap: 5% per year
pub const MAX_MAINTENANCE_FEE_BPS: u16 = 500;

/// Performance fee cap: 50% of gain
pub const MAX_PERFORMANCE_FEE_BPS: u16 = 5_000;

pub const MAX_WITHDRAW_TIMELOCK: i64 = 30 * ONE_DAY;
pub const MAX_REQUEST_VALIDITY: i64 = 7 * ONE_DAY;
pub const MAX_FRESHNESS_WINDOW: i64 = 7 * ONE_DAY;

// =============================================================================
// DEFAULTS
// =============================================================================

pub const DEFAULT_REQUEST_VALIDITY: i64 = ONE_HOUR;
pub const DEFAULT_WITHDRAW_TIMELOCK: i64 = ONE_DAY;
pub const DEFAULT_FRESHNESS_WINDOW: i64 = ONE_DAY;
