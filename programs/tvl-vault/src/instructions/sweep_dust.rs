use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{AccessControl, DustSwept, Role, Vault};
use crate::token_cpi::transfer_from_vault;

/// Claimer sends the part of the withdrawal reserve no settled request can
/// claim to the fee recipient.
#[derive(Accounts)]
pub struct SweepDust<'info> {
    #[account(
        constraint = access_control.has_role(Role::Claimer, &claimer.key()) @ VaultError::Unauthorized
    )]
    pub claimer: Signer<'info>,

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

    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = recipient_token_account.mint == asset_mint.key() @ VaultError::InvalidAssetMint,
        constraint = recipient_token_account.owner == vault.fee_recipient @ VaultError::InvalidTokenAccountOwner
    )]
    pub recipient_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub vault_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler_sweep_dust(ctx: Context<SweepDust>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let vault = &mut ctx.accounts.vault;
    let dust = vault.take_dust()?;

    let vault_key = vault.key();
    let recipient = vault.fee_recipient;
    let asset_mint_key = vault.asset_mint;
    let bump = [vault.bump];

    msg!("Sweeping {} from the withdrawal reserve to {}", dust, recipient);

    let signer_seeds = Vault::get_vault_signer_seeds(&asset_mint_key, &bump);
    transfer_from_vault(
        &ctx.accounts.token_program,
        &ctx.accounts.asset_mint,
        &ctx.accounts.vault_token_account,
        &ctx.accounts.recipient_token_account,
        ctx.accounts.vault.to_account_info(),
        &signer_seeds,
        dust,
    )?;

    emit!(DustSwept {
        vault: vault_key,
        recipient,
        amount: dust,
        ts: now,
    });

    Ok(())
}
