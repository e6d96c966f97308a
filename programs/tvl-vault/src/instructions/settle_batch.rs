// =============================================================================
// Settle Batch Instruction (Executor only)
// =============================================================================
// Assigns the settlement rate of the oldest unsettled batch (the one just
// below current) and funds it. The executor transfers `asset_amount`; what the
// vault actually receives must cover total_shares * rate in asset units.
// The received amount joins the withdrawal reserve.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{AccessControl, BatchSettled, Role, Vault, WithdrawBatch};
use crate::token_cpi::transfer_measured;

#[derive(Accounts)]
pub struct SettleBatch<'info> {
    #[account(
        constraint = access_control.has_role(Role::Executor, &executor.key()) @ VaultError::Unauthorized
    )]
    pub executor: Signer<'info>,

    pub access_control: Account<'info, AccessControl>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = access_control @ VaultError::InvalidVaultAccount,
        has_one = asset_mint @ VaultError::InvalidAssetMint,
        has_one = vault_token_account @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [
            WITHDRAW_BATCH_SEED,
            vault.key().as_ref(),
            &vault.current_batch_id.saturating_sub(1).to_le_bytes()
        ],
        bump = batch.bump
    )]
    pub batch: Account<'info, WithdrawBatch>,

    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = executor_token_account.mint == asset_mint.key() @ VaultError::InvalidAssetMint,
        constraint = executor_token_account.owner == executor.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub executor_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub vault_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// `rate` is the price of one whole share in feed decimals
pub fn handler_settle_batch(ctx: Context<SettleBatch>, asset_amount: u64, rate: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    require!(asset_amount > 0, VaultError::InvalidAmount);

    let required = ctx
        .accounts
        .vault
        .settlement_requirement(&ctx.accounts.batch, rate)?;

    msg!(
        "Settling batch {} ({} shares) at rate {}",
        ctx.accounts.batch.batch_id,
        ctx.accounts.batch.total_shares,
        rate
    );
    msg!("Required: {}, offered: {}", required, asset_amount);

    // =========================================================================
    // Transfer: Executor -> Vault
    // =========================================================================

    let received = transfer_measured(
        &ctx.accounts.token_program,
        &ctx.accounts.asset_mint,
        &ctx.accounts.executor_token_account,
        &mut ctx.accounts.vault_token_account,
        ctx.accounts.executor.to_account_info(),
        asset_amount,
    )?;

    // =========================================================================
    // Record the settlement
    // =========================================================================

    let vault = &mut ctx.accounts.vault;
    let batch = &mut ctx.accounts.batch;

    vault.settle_batch(batch, rate, received, now)?;

    msg!("Batch {} settled, received {}", batch.batch_id, received);
    msg!("Available for withdrawal: {}", vault.available_for_withdrawal);

    emit!(BatchSettled {
        vault: vault.key(),
        batch_id: batch.batch_id,
        rate,
        total_shares: batch.total_shares,
        required_amount: required,
        received_amount: received,
        ts: now,
    });

    Ok(())
}
