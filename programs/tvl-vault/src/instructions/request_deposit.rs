// =============================================================================
// Request Deposit Instruction
// =============================================================================
// Step 1 of the deposit protocol. Opens a deposit request that the oracle must
// confirm (append_tvl_for_deposit) before `expires_at`. An expired request is
// replaced silently.
//
// First-time depositors get their Depositor account created here.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{DepositRequested, Depositor, Vault};

#[derive(Accounts)]
pub struct RequestDeposit<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        constraint = !vault.is_paused @ VaultError::VaultPaused
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + Depositor::INIT_SPACE,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub depositor: Account<'info, Depositor>,

    pub system_program: Program<'info, System>,
}

pub fn handler_request_deposit(ctx: Context<RequestDeposit>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault = &ctx.accounts.vault;
    let vault_key = vault.key();
    let owner_key = ctx.accounts.owner.key();

    let depositor = &mut ctx.accounts.depositor;
    if depositor.owner == Pubkey::default() {
        depositor.set_inner(Depositor::new(vault_key, owner_key, ctx.bumps.depositor));
    }

    vault.require_allowed(depositor)?;

    let expires_at = depositor.request_deposit(now, vault.request_validity)?;

    msg!("Deposit requested by {}, valid until {}", owner_key, expires_at);

    emit!(DepositRequested {
        vault: vault_key,
        owner: owner_key,
        expires_at,
        ts: now,
    });

    Ok(())
}
