// =============================================================================
// TVL Vault - Oracle-priced pooled liquidity vault
// =============================================================================
//
// Users deposit a base asset and receive shares whose value tracks a TVL
// figure reported by an oracle:
// - Deposits are two-phase: request, oracle confirmation bound to one ledger
//   entry and its supply snapshot, then execution at that fixed price
// - Withdrawals escrow shares into batches that the executor settles at a
//   per-batch rate, paid out after a timelock
// - Maintenance and performance fees are minted as shares to a fee recipient
//
// This is the main entry point for the TVL vault Anchor program.
// =============================================================================

pub mod constants;
pub mod error;
pub mod instructions;
pub mod math;
pub mod state;
pub mod token_cpi;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

use anchor_lang::prelude::*;

pub use constants::*;
pub use error::*;
pub use instructions::*;
pub use state::*;

declare_id!("8RGc3TFtQ5KWdfwK9f4HhMosJrdA25G6NhpGruRYPfLw");

#[program]
pub mod tvl_vault {
    use super::*;

    // =========================================================================
    // Setup
    // =========================================================================

    /// Create the TVL history ledger for an asset
    ///
    /// # Arguments
    /// * `feed_decimals` - Decimals of every value the oracle will report (max 18)
    pub fn initialize_feed(ctx: Context<InitializeFeed>, feed_decimals: u8) -> Result<()> {
        instructions::initialize_feed::handler_initialize_feed(ctx, feed_decimals)
    }

    /// Create a vault for an asset and bind the asset's feed to it
    ///
    /// Creates:
    /// - Vault account (configuration and share ledger)
    /// - Vault token account (holds the asset)
    /// - AccessControl account (signer becomes Admin)
    /// - Withdraw batch #1
    pub fn initialize_vault(ctx: Context<InitializeVault>, params: VaultParams) -> Result<()> {
        instructions::initialize_vault::handler_initialize_vault(ctx, params)
    }

    /// Create the Depositor record for `owner`
    pub fn initialize_depositor(ctx: Context<InitializeDepositor>, owner: Pubkey) -> Result<()> {
        instructions::initialize_depositor::handler_initialize_depositor(ctx, owner)
    }

    // =========================================================================
    // Depositor Operations
    // =========================================================================

    /// Open a deposit request for the oracle to confirm
    pub fn request_deposit(ctx: Context<RequestDeposit>) -> Result<()> {
        instructions::request_deposit::handler_request_deposit(ctx)
    }

    /// Execute a confirmed deposit
    ///
    /// # Arguments
    /// * `amount` - Asset units to transfer; shares are minted for what arrives
    pub fn execute_deposit(ctx: Context<ExecuteDeposit>, amount: u64) -> Result<()> {
        instructions::execute_deposit::handler_execute_deposit(ctx, amount)
    }

    /// Escrow shares into the current withdraw batch
    pub fn request_withdraw(ctx: Context<UpdateWithdrawRequest>, shares: u128) -> Result<()> {
        instructions::request_withdraw::handler_request_withdraw(ctx, shares)
    }

    /// Return escrowed shares while the request's batch is still open
    pub fn cancel_withdraw(ctx: Context<UpdateWithdrawRequest>) -> Result<()> {
        instructions::request_withdraw::handler_cancel_withdraw(ctx)
    }

    /// Pay out a settled withdraw request after its timelock
    pub fn withdraw(ctx: Context<Withdraw>) -> Result<()> {
        instructions::withdraw::handler_withdraw(ctx)
    }

    pub fn transfer_shares(ctx: Context<TransferShares>, shares: u128) -> Result<()> {
        instructions::transfer_shares::handler_transfer_shares(ctx, shares)
    }

    // =========================================================================
    // Oracle Operations
    // =========================================================================

    /// Append a TVL report at the vault's current supply
    pub fn append_tvl(ctx: Context<AppendTvl>, value: u128) -> Result<()> {
        instructions::append_tvl::handler_append_tvl(ctx, value)
    }

    /// Append a TVL report and confirm a pending deposit against it
    ///
    /// # Arguments
    /// * `value` - TVL in feed decimals
    /// * `reference_supply` - Supply `value` was computed at; must equal the current supply
    pub fn append_tvl_for_deposit(
        ctx: Context<AppendTvlForDeposit>,
        value: u128,
        reference_supply: u128,
    ) -> Result<()> {
        instructions::append_tvl::handler_append_tvl_for_deposit(ctx, value, reference_supply)
    }

    // =========================================================================
    // Executor Operations
    // =========================================================================

    /// Close the current batch and open the next one
    pub fn advance_batch(ctx: Context<AdvanceBatch>) -> Result<()> {
        instructions::advance_batch::handler_advance_batch(ctx)
    }

    /// Settle the oldest unsettled batch
    ///
    /// # Arguments
    /// * `asset_amount` - Asset units transferred from the executor
    /// * `rate` - Price of one whole share in feed decimals
    pub fn settle_batch(ctx: Context<SettleBatch>, asset_amount: u64, rate: u128) -> Result<()> {
        instructions::settle_batch::handler_settle_batch(ctx, asset_amount, rate)
    }

    /// Move liquidity above the withdrawal reserve and buffer to the executor
    pub fn retrieve_liquidity(ctx: Context<RetrieveLiquidity>) -> Result<()> {
        instructions::retrieve_liquidity::handler_retrieve_liquidity(ctx)
    }

    // =========================================================================
    // Claimer Operations
    // =========================================================================

    pub fn claim_maintenance_fee(ctx: Context<ClaimFee>) -> Result<()> {
        instructions::claim_fees::handler_claim_maintenance_fee(ctx)
    }

    pub fn claim_performance_fee(ctx: Context<ClaimFee>) -> Result<()> {
        instructions::claim_fees::handler_claim_performance_fee(ctx)
    }

    /// Send the leftover withdrawal reserve to the fee recipient
    pub fn sweep_dust(ctx: Context<SweepDust>) -> Result<()> {
        instructions::sweep_dust::handler_sweep_dust(ctx)
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    pub fn grant_role(ctx: Context<ManageRole>, role: Role, member: Pubkey) -> Result<()> {
        instructions::roles::handler_grant_role(ctx, role, member)
    }

    /// The last Admin cannot be revoked
    pub fn revoke_role(ctx: Context<ManageRole>, role: Role, member: Pubkey) -> Result<()> {
        instructions::roles::handler_revoke_role(ctx, role, member)
    }

    /// Pause or unpause deposits and withdraw requests
    pub fn set_paused(ctx: Context<UpdateVaultConfig>, paused: bool) -> Result<()> {
        instructions::admin::handler_set_paused(ctx, paused)
    }

    /// Change the annual maintenance fee (max 500 bps)
    ///
    /// Fees accrued under the old rate are minted first.
    pub fn set_maintenance_fee(ctx: Context<UpdateFeeRate>, fee_bps: u16) -> Result<()> {
        instructions::admin::handler_set_maintenance_fee(ctx, fee_bps)
    }

    /// Change the performance fee (max 5000 bps of gain)
    ///
    /// Fees accrued under the old rate are minted first.
    pub fn set_performance_fee(ctx: Context<UpdateFeeRate>, fee_bps: u16) -> Result<()> {
        instructions::admin::handler_set_performance_fee(ctx, fee_bps)
    }

    /// Change the deposit cap
    ///
    /// # Constraints
    /// - Cannot be zero
    /// - Cannot be below the latest TVL while that report is fresh
    pub fn set_max_tvl(ctx: Context<UpdateMaxTvl>, max_tvl: u128) -> Result<()> {
        instructions::admin::handler_set_max_tvl(ctx, max_tvl)
    }

    /// Applies to new withdraw requests only
    pub fn set_withdraw_timelock(ctx: Context<UpdateVaultConfig>, timelock: i64) -> Result<()> {
        instructions::admin::handler_set_withdraw_timelock(ctx, timelock)
    }

    pub fn set_freshness_window(ctx: Context<UpdateVaultConfig>, window: i64) -> Result<()> {
        instructions::admin::handler_set_freshness_window(ctx, window)
    }

    pub fn set_request_validity(ctx: Context<UpdateVaultConfig>, validity: i64) -> Result<()> {
        instructions::admin::handler_set_request_validity(ctx, validity)
    }

    pub fn set_min_deposit(ctx: Context<UpdateVaultConfig>, min_deposit: u64) -> Result<()> {
        instructions::admin::handler_set_min_deposit(ctx, min_deposit)
    }

    pub fn set_liquidity_buffer(ctx: Context<UpdateVaultConfig>, buffer: u64) -> Result<()> {
        instructions::admin::handler_set_liquidity_buffer(ctx, buffer)
    }

    pub fn set_whitelist_enabled(ctx: Context<UpdateVaultConfig>, enabled: bool) -> Result<()> {
        instructions::admin::handler_set_whitelist_enabled(ctx, enabled)
    }

    pub fn set_whitelisted(
        ctx: Context<SetWhitelisted>,
        owner: Pubkey,
        whitelisted: bool,
    ) -> Result<()> {
        instructions::admin::handler_set_whitelisted(ctx, owner, whitelisted)
    }

    pub fn set_fee_recipient(ctx: Context<UpdateVaultConfig>, fee_recipient: Pubkey) -> Result<()> {
        instructions::admin::handler_set_fee_recipient(ctx, fee_recipient)
    }

    // =========================================================================
    // Read-only
    // =========================================================================

    pub fn get_withdraw_status(ctx: Context<GetWithdrawStatus>) -> Result<WithdrawStatus> {
        instructions::views::handler_get_withdraw_status(ctx)
    }

    /// Price of one whole share in 18 decimals (1.0 while no shares exist)
    pub fn get_share_price(ctx: Context<GetSharePrice>) -> Result<u128> {
        instructions::views::handler_get_share_price(ctx)
    }

    pub fn get_tvl_entry(ctx: Context<GetTvlEntry>, index: u64) -> Result<TvlRecord> {
        instructions::views::handler_get_tvl_entry(ctx, index)
    }

    /// Up to 20 most recent entries, newest first
    ///
    /// The entry accounts are passed as remaining accounts in the same order.
    pub fn get_last_tvl_entries(ctx: Context<GetTvlEntries>, count: u64) -> Result<Vec<TvlRecord>> {
        instructions::views::handler_get_last_tvl_entries(ctx, count)
    }
}
