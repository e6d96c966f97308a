use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::{Depositor, Vault};

/// Creates the share ledger record of `owner`. Anyone may pay for it.
#[derive(Accounts)]
#[instruction(owner: Pubkey)]
pub struct InitializeDepositor<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        init,
        payer = payer,
        space = 8 + Depositor::INIT_SPACE,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.as_ref()],
        bump
    )]
    pub depositor: Account<'info, Depositor>,

    pub system_program: Program<'info, System>,
}

pub fn handler_initialize_depositor(ctx: Context<InitializeDepositor>, owner: Pubkey) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();
    ctx.accounts
        .depositor
        .set_inner(Depositor::new(vault_key, owner, ctx.bumps.depositor));

    msg!("Depositor {} registered with vault {}", owner, vault_key);

    Ok(())
}
