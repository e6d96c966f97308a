// =============================================================================
// TVL Vault Error Codes
// =============================================================================
// Every failure aborts the whole instruction; retrying is the caller's job.
// Errors are grouped by kind so clients can tell a permission problem from a
// stale oracle or a request that simply is not ready yet.
// =============================================================================

use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    // =========================================================================
    // Authorization
    // =========================================================================
    /// Signer does not hold the role this instruction requires
    #[msg("Unauthorized - signer does not hold the required role")]
    Unauthorized,

    #[msg("Invalid token account owner")]
    InvalidTokenAccountOwner,

    #[msg("Token account mint does not match the vault asset")]
    InvalidAssetMint,

    #[msg("Account does not belong to this vault")]
    InvalidVaultAccount,

    #[msg("TVL entry does not belong to this feed")]
    InvalidTvlEntry,

    #[msg("Withdraw batch does not match the request")]
    InvalidBatch,

    // =========================================================================
    // State Conflicts
    // =========================================================================
    #[msg("Vault is paused")]
    VaultPaused,

    #[msg("Feed is already bound to a vault")]
    FeedAlreadyBound,

    /// append called before any vault bound the feed
    #[msg("Feed is not bound to a vault")]
    FeedNotBound,

    #[msg("A deposit request is already pending")]
    DepositRequestPending,

    #[msg("Deposit request is already confirmed")]
    DepositAlreadyConfirmed,

    #[msg("A withdraw request is already pending")]
    WithdrawRequestPending,

    #[msg("Batch is already settled")]
    BatchAlreadySettled,

    #[msg("Previous batch is not settled")]
    PreviousBatchNotSettled,

    /// cancel_withdraw once the request's batch has closed
    #[msg("Batch already resolved or closed for cancellation")]
    BatchResolvedOrOngoing,

    #[msg("Fee already claimed for this timestamp")]
    AlreadyClaimed,

    #[msg("Role is already granted")]
    RoleAlreadyGranted,

    #[msg("Role is not granted")]
    RoleNotGranted,

    #[msg("Cannot revoke the last admin")]
    LastAdmin,

    #[msg("Access control is full")]
    RoleCapacityReached,

    // =========================================================================
    // Staleness
    // =========================================================================
    #[msg("TVL data is older than the freshness window")]
    StaleTvlData,

    #[msg("Deposit request has expired")]
    DepositRequestExpired,

    // =========================================================================
    // Validation
    // =========================================================================
    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Amount is below minimum deposit")]
    BelowMinimumDeposit,

    #[msg("Deposit would exceed the maximum TVL")]
    ExceedsMaxTVL,

    #[msg("Token decimals above 18 are not supported")]
    UnsupportedDecimals,

    #[msg("Insufficient shares")]
    InsufficientShares,

    #[msg("Account is not whitelisted")]
    NotWhitelisted,

    #[msg("Settlement rate must be greater than zero")]
    InvalidRate,

    #[msg("Fee exceeds maximum allowed")]
    FeeExceedsMax,

    #[msg("Invalid duration")]
    InvalidDuration,

    #[msg("Max TVL cannot be zero or below the latest fresh TVL")]
    InvalidMaxTvl,

    #[msg("Invalid address")]
    InvalidAddress,

    #[msg("Received tokens do not cover the batch")]
    InsufficientTokensForBatch,

    /// A conversion truncated to zero
    #[msg("Calculated amount is zero")]
    ZeroCalculated,

    #[msg("Entry count must be greater than zero")]
    InvalidEntryCount,

    // =========================================================================
    // Consistency
    // =========================================================================
    /// Reference supply given by the oracle is not the vault's current supply
    #[msg("Reference supply does not match current total supply")]
    SupplyMismatch,

    #[msg("TVL entry is not the latest entry")]
    NotLatestEntry,

    #[msg("TVL entry does not match the bound index")]
    BoundEntryMismatch,

    #[msg("Share ledger totals are inconsistent")]
    ShareLedgerMismatch,

    // =========================================================================
    // Not Found / Not Ready
    // =========================================================================
    #[msg("No deposit request")]
    NoDepositRequest,

    #[msg("Deposit request is not confirmed")]
    DepositNotConfirmed,

    #[msg("No withdraw request")]
    NoWithdrawRequest,

    #[msg("Withdraw timelock has not elapsed")]
    TimelockNotElapsed,

    #[msg("Batch is not settled")]
    BatchNotSettled,

    #[msg("No closed batch to settle")]
    NoBatchToSettle,

    #[msg("Index out of bounds")]
    IndexOutOfBounds,

    #[msg("No TVL data reported yet")]
    NoTvlData,

    #[msg("Nothing to retrieve")]
    NothingToRetrieve,

    #[msg("No dust to sweep")]
    NoDustToSweep,

    #[msg("Settled withdrawals are still outstanding")]
    WithdrawalsOutstanding,

    #[msg("Insufficient liquidity reserved for withdrawal")]
    InsufficientLiquidity,

    // =========================================================================
    // Math
    // =========================================================================
    #[msg("Math overflow - calculation exceeded maximum value")]
    MathOverflow,

    #[msg("Math underflow - result would be negative")]
    MathUnderflow,

    #[msg("Division by zero")]
    DivisionByZero,

    #[msg("Overflow while normalizing to 18 decimals")]
    OverflowOnNormalization,
}
