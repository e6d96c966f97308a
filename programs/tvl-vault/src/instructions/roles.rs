// =============================================================================
// Role Management
// =============================================================================
// Admins grant and revoke (role, member) pairs on the vault's AccessControl.
// The last Admin grant can never be revoked.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{AccessControl, Role, RoleUpdated, Vault};

#[derive(Accounts)]
pub struct ManageRole<'info> {
    #[account(
        constraint = access_control.has_role(Role::Admin, &admin.key()) @ VaultError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = access_control @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub access_control: Account<'info, AccessControl>,
}

pub fn handler_grant_role(ctx: Context<ManageRole>, role: Role, member: Pubkey) -> Result<()> {
    ctx.accounts.access_control.grant(role, member)?;

    msg!("Granted {:?} to {}", role, member);

    emit!(RoleUpdated {
        vault: ctx.accounts.vault.key(),
        role,
        member,
        granted: true,
    });

    Ok(())
}

pub fn handler_revoke_role(ctx: Context<ManageRole>, role: Role, member: Pubkey) -> Result<()> {
    ctx.accounts.access_control.revoke(role, &member)?;

    msg!("Revoked {:?} from {}", role, member);

    emit!(RoleUpdated {
        vault: ctx.accounts.vault.key(),
        role,
        member,
        granted: false,
    });

    Ok(())
}
