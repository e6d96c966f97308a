// =============================================================================
// Advance Batch Instruction (Executor only)
// =============================================================================
// Closes the current batch to new requests and opens the next one. Requires
// the previous batch to be settled. A current batch with no shares is left
// open and the call is a no-op.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{AccessControl, BatchAdvanced, Role, Vault, WithdrawBatch};

#[derive(Accounts)]
pub struct AdvanceBatch<'info> {
    #[account(
        mut,
        constraint = access_control.has_role(Role::Executor, &executor.key()) @ VaultError::Unauthorized
    )]
    pub executor: Signer<'info>,

    pub access_control: Account<'info, AccessControl>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = access_control @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [WITHDRAW_BATCH_SEED, vault.key().as_ref(), &vault.current_batch_id.to_le_bytes()],
        bump = current_batch.bump
    )]
    pub current_batch: Account<'info, WithdrawBatch>,

    /// The batch that becomes current
    #[account(
        init_if_needed,
        payer = executor,
        space = 8 + WithdrawBatch::INIT_SPACE,
        seeds = [
            WITHDRAW_BATCH_SEED,
            vault.key().as_ref(),
            &vault.current_batch_id.saturating_add(1).to_le_bytes()
        ],
        bump
    )]
    pub next_batch: Account<'info, WithdrawBatch>,

    pub system_program: Program<'info, System>,
}

pub fn handler_advance_batch(ctx: Context<AdvanceBatch>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let closed = &ctx.accounts.current_batch;

    let next_batch_id = ctx.accounts.vault.current_batch_id.saturating_add(1);
    let next_batch = &mut ctx.accounts.next_batch;
    if next_batch.vault == Pubkey::default() {
        next_batch.set_inner(WithdrawBatch {
            vault: vault_key,
            batch_id: next_batch_id,
            bump: ctx.bumps.next_batch,
            ..WithdrawBatch::default()
        });
    }

    let vault = &mut ctx.accounts.vault;
    if !vault.advance_batch(closed)? {
        msg!("Batch {} is empty, nothing to advance", closed.batch_id);
        return Ok(());
    }

    msg!(
        "Batch {} closed with {} shares, batch {} is open",
        closed.batch_id,
        closed.total_shares,
        vault.current_batch_id
    );

    emit!(BatchAdvanced {
        vault: vault_key,
        closed_batch_id: closed.batch_id,
        closed_batch_shares: closed.total_shares,
        current_batch_id: vault.current_batch_id,
        ts: now,
    });

    Ok(())
}
