use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{Depositor, SharesTransferred, Vault};

/// Move free shares between two depositors of the same vault
#[derive(Accounts)]
pub struct TransferShares<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump = from.bump,
        has_one = owner @ VaultError::Unauthorized
    )]
    pub from: Account<'info, Depositor>,

    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), to.owner.as_ref()],
        bump = to.bump,
        constraint = to.key() != from.key() @ VaultError::InvalidAddress
    )]
    pub to: Account<'info, Depositor>,
}

pub fn handler_transfer_shares(ctx: Context<TransferShares>, shares: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let vault = &ctx.accounts.vault;
    let from = &mut ctx.accounts.from;
    let to = &mut ctx.accounts.to;

    vault.transfer_shares(from, to, shares)?;

    msg!("Transferred {} shares from {} to {}", shares, from.owner, to.owner);

    emit!(SharesTransferred {
        vault: vault.key(),
        from: from.owner,
        to: to.owner,
        shares,
        ts: now,
    });

    Ok(())
}
