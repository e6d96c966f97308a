use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{AccessControl, LiquidityRetrieved, Role, Vault};
use crate::token_cpi::transfer_from_vault;

/// Executor pulls deposited liquidity for deployment, leaving the withdrawal
/// reserve and the configured buffer in the vault.
#[derive(Accounts)]
pub struct RetrieveLiquidity<'info> {
    #[account(
        constraint = access_control.has_role(Role::Executor, &executor.key()) @ VaultError::Unauthorized
    )]
    pub executor: Signer<'info>,

    pub access_control: Account<'info, AccessControl>,

    #[account(
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
        constraint = executor_token_account.mint == asset_mint.key() @ VaultError::InvalidAssetMint,
        constraint = executor_token_account.owner == executor.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub executor_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub vault_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler_retrieve_liquidity(ctx: Context<RetrieveLiquidity>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault = &ctx.accounts.vault;

    let amount = vault.retrievable_liquidity(ctx.accounts.vault_token_account.amount);
    require!(amount > 0, VaultError::NothingToRetrieve);

    msg!(
        "Retrieving {} (balance {}, reserved {}, buffer {})",
        amount,
        ctx.accounts.vault_token_account.amount,
        vault.available_for_withdrawal,
        vault.liquidity_buffer
    );

    let bump = [vault.bump];
    let signer_seeds = Vault::get_vault_signer_seeds(&vault.asset_mint, &bump);
    transfer_from_vault(
        &ctx.accounts.token_program,
        &ctx.accounts.asset_mint,
        &ctx.accounts.vault_token_account,
        &ctx.accounts.executor_token_account,
        vault.to_account_info(),
        &signer_seeds,
        amount,
    )?;

    emit!(LiquidityRetrieved {
        vault: vault.key(),
        executor: ctx.accounts.executor.key(),
        amount,
        ts: now,
    });

    Ok(())
}
