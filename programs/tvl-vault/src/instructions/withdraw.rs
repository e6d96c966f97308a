// =============================================================================
// Withdraw Instruction
// =============================================================================
// Pays out a withdraw request once its batch is settled and its timelock has
// elapsed.
//
// Flow:
// 1. Check the request is ready (timelock, batch settled)
// 2. payout = shares * batch rate, truncated to asset units
// 3. Clear the request, release the payout from the withdrawal reserve
//    and burn the escrowed shares
// 4. Transfer vault -> user, signed by the vault PDA
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{Depositor, Vault, WithdrawBatch, Withdrawn};
use crate::token_cpi::transfer_from_vault;

#[derive(Accounts)]
pub struct Withdraw<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = asset_mint @ VaultError::InvalidAssetMint,
        has_one = vault_token_account @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump = depositor.bump,
        has_one = owner @ VaultError::Unauthorized
    )]
    pub depositor: Account<'info, Depositor>,

    /// The batch of the depositor's request
    #[account(
        constraint = batch.vault == vault.key() @ VaultError::InvalidBatch
    )]
    pub batch: Account<'info, WithdrawBatch>,

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

pub fn handler_withdraw(ctx: Context<Withdraw>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    // =========================================================================
    // Update bookkeeping before the transfer
    // =========================================================================

    let vault = &mut ctx.accounts.vault;
    let depositor = &mut ctx.accounts.depositor;

    let (request, payout) = vault.complete_withdraw(depositor, &ctx.accounts.batch, now)?;

    msg!(
        "Withdrawing {} shares from batch {} at rate {}",
        request.shares,
        request.batch_id,
        ctx.accounts.batch.rate
    );
    msg!("Payout: {}", payout);

    let vault_key = vault.key();
    let owner_key = depositor.owner;
    let asset_mint_key = vault.asset_mint;
    let bump = [vault.bump];

    // =========================================================================
    // Transfer: Vault -> User
    // =========================================================================

    let signer_seeds = Vault::get_vault_signer_seeds(&asset_mint_key, &bump);
    transfer_from_vault(
        &ctx.accounts.token_program,
        &ctx.accounts.asset_mint,
        &ctx.accounts.vault_token_account,
        &ctx.accounts.user_token_account,
        ctx.accounts.vault.to_account_info(),
        &signer_seeds,
        payout,
    )?;

    emit!(Withdrawn {
        vault: vault_key,
        owner: owner_key,
        batch_id: request.batch_id,
        shares_burned: request.shares,
        amount: payout,
        ts: now,
    });

    Ok(())
}
