// =============================================================================
// Execute Deposit Instruction
// =============================================================================
// Step 3 of the deposit protocol. Consumes the depositor's confirmed request
// and mints shares for what the vault actually received.
//
// Flow:
// 1. Validate amount >= min_deposit
// 2. Consume the confirmed request (cleared before any transfer)
// 3. Load the ledger entry the request was bound to
// 4. Transfer the asset user -> vault, measuring the balance delta
// 5. Cap check and share calculation against the bound (value, supply) pair
//
// Share calculation:
// - Bound supply 0: shares = received amount in 18 decimals (1:1)
// - Otherwise:      shares = received_18 * supply_snapshot / tvl_18
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{DepositExecuted, Depositor, TvlEntry, TvlFeed, Vault};
use crate::token_cpi::transfer_measured;

#[derive(Accounts)]
pub struct ExecuteDeposit<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    pub owner: Signer<'info>,

    // =========================================================================
    // Vault Accounts
    // =========================================================================

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = feed @ VaultError::InvalidVaultAccount,
        has_one = asset_mint @ VaultError::InvalidAssetMint,
        has_one = vault_token_account @ VaultError::InvalidVaultAccount,
        constraint = !vault.is_paused @ VaultError::VaultPaused
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump = depositor.bump,
        has_one = owner @ VaultError::Unauthorized
    )]
    pub depositor: Account<'info, Depositor>,

    pub feed: Account<'info, TvlFeed>,

    /// The entry the oracle confirmed this deposit against
    pub bound_entry: Account<'info, TvlEntry>,

    // =========================================================================
    // Token Accounts
    // =========================================================================

    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = user_token_account.mint == asset_mint.key() @ VaultError::InvalidAssetMint,
        constraint = user_token_account.owner == owner.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub user_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub vault_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler_execute_deposit(ctx: Context<ExecuteDeposit>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    // =========================================================================
    // Input Validation
    // =========================================================================

    require!(amount > 0, VaultError::InvalidAmount);
    require!(
        amount >= ctx.accounts.vault.min_deposit,
        VaultError::BelowMinimumDeposit
    );

    // =========================================================================
    // Consume the confirmed request
    // =========================================================================

    let bound_index = ctx.accounts.depositor.take_confirmed_deposit(now)?;

    let feed_key = ctx.accounts.feed.key();
    ctx.accounts
        .feed
        .check_entry(&feed_key, &ctx.accounts.bound_entry, bound_index)?;
    let bound = ctx.accounts.bound_entry.record;

    // =========================================================================
    // Transfer: User -> Vault
    // =========================================================================

    let received = transfer_measured(
        &ctx.accounts.token_program,
        &ctx.accounts.asset_mint,
        &ctx.accounts.user_token_account,
        &mut ctx.accounts.vault_token_account,
        ctx.accounts.owner.to_account_info(),
        amount,
    )?;

    if received < amount {
        msg!("Requested {} but vault received {}", amount, received);
    }

    // =========================================================================
    // Mint shares against the bound entry
    // =========================================================================

    let vault = &mut ctx.accounts.vault;
    let depositor = &mut ctx.accounts.depositor;

    let outcome = vault.execute_deposit(depositor, &bound, received, now)?;

    msg!("Deposit executed against TVL #{}", bound_index);
    msg!("Amount received: {}", received);
    msg!("Shares minted: {}", outcome.shares);
    if outcome.locked_shares > 0 {
        msg!("Bootstrap shares locked: {}", outcome.locked_shares);
    }
    msg!("New total shares: {}", vault.total_shares);

    emit!(DepositExecuted {
        vault: vault.key(),
        owner: depositor.owner,
        bound_index,
        requested_amount: amount,
        received_amount: received,
        shares_minted: outcome.shares,
        locked_shares: outcome.locked_shares,
        total_shares_after: vault.total_shares,
        ts: now,
    });

    Ok(())
}
