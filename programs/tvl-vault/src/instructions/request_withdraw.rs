// =============================================================================
// Withdraw Request Instructions
// =============================================================================
// request_withdraw - escrow shares into the current batch
// cancel_withdraw  - return them while that batch is still open
//
// The timelock in force at request time is stored on the request, so later
// changes to the vault timelock never apply to it.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{Depositor, Vault, WithdrawBatch, WithdrawCancelled, WithdrawRequested};

#[derive(Accounts)]
pub struct UpdateWithdrawRequest<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump = depositor.bump,
        has_one = owner @ VaultError::Unauthorized
    )]
    pub depositor: Account<'info, Depositor>,

    /// The batch currently accepting requests
    #[account(
        mut,
        seeds = [WITHDRAW_BATCH_SEED, vault.key().as_ref(), &vault.current_batch_id.to_le_bytes()],
        bump = current_batch.bump
    )]
    pub current_batch: Account<'info, WithdrawBatch>,
}

pub fn handler_request_withdraw(ctx: Context<UpdateWithdrawRequest>, shares: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let vault = &mut ctx.accounts.vault;
    let depositor = &mut ctx.accounts.depositor;
    let batch = &mut ctx.accounts.current_batch;

    vault.request_withdraw(depositor, batch, shares, now)?;

    msg!(
        "Withdraw of {} shares requested by {} in batch {}",
        shares,
        depositor.owner,
        batch.batch_id
    );
    msg!("Unlocks at {}", now.saturating_add(vault.withdraw_timelock));

    emit!(WithdrawRequested {
        vault: vault.key(),
        owner: depositor.owner,
        batch_id: batch.batch_id,
        shares,
        timelock: vault.withdraw_timelock,
        ts: now,
    });

    Ok(())
}

pub fn handler_cancel_withdraw(ctx: Context<UpdateWithdrawRequest>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let vault = &mut ctx.accounts.vault;
    let depositor = &mut ctx.accounts.depositor;
    let batch = &mut ctx.accounts.current_batch;

    let request = vault.cancel_withdraw(depositor, batch)?;

    msg!(
        "Withdraw of {} shares cancelled by {}",
        request.shares,
        depositor.owner
    );

    emit!(WithdrawCancelled {
        vault: vault.key(),
        owner: depositor.owner,
        batch_id: request.batch_id,
        shares: request.shares,
        ts: now,
    });

    Ok(())
}
