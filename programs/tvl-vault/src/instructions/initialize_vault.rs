// =============================================================================
// Initialize Vault Instruction
// =============================================================================
// Creates a vault for one asset mint.
//
// Creates:
// - Vault account (configuration, share ledger totals, fee counters)
// - Vault token account (custody of the asset, owned by the vault PDA)
// - AccessControl account (the creator is granted Admin)
// - WithdrawBatch #1 (the first open batch)
//
// and binds the asset's TVL feed to the new vault. A feed can be bound once.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::state::{AccessControl, Role, TvlFeed, Vault, VaultParams, WithdrawBatch};

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    /// Pays for every account and becomes the first Admin
    #[account(mut)]
    pub admin: Signer<'info>,

    // =========================================================================
    // Vault Accounts (PDAs created by this instruction)
    // =========================================================================

    #[account(
        init,
        payer = admin,
        space = 8 + Vault::INIT_SPACE,
        seeds = [VAULT_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        init,
        payer = admin,
        token::mint = asset_mint,
        token::authority = vault,
        token::token_program = token_program,
        seeds = [VAULT_TOKEN_SEED, vault.key().as_ref()],
        bump
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        init,
        payer = admin,
        space = 8 + AccessControl::INIT_SPACE,
        seeds = [ACCESS_CONTROL_SEED, vault.key().as_ref()],
        bump
    )]
    pub access_control: Account<'info, AccessControl>,

    #[account(
        init,
        payer = admin,
        space = 8 + WithdrawBatch::INIT_SPACE,
        seeds = [WITHDRAW_BATCH_SEED, vault.key().as_ref(), &FIRST_BATCH_ID.to_le_bytes()],
        bump
    )]
    pub first_batch: Account<'info, WithdrawBatch>,

    // =========================================================================
    // Asset and Feed
    // =========================================================================

    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        seeds = [TVL_FEED_SEED, asset_mint.key().as_ref()],
        bump = feed.bump
    )]
    pub feed: Account<'info, TvlFeed>,

    // =========================================================================
    // Programs
    // =========================================================================

    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler_initialize_vault(ctx: Context<InitializeVault>, params: VaultParams) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let feed_key = ctx.accounts.feed.key();
    let admin_key = ctx.accounts.admin.key();

    // =========================================================================
    // Vault
    // =========================================================================

    let mut vault = Vault::new(
        ctx.accounts.asset_mint.key(),
        ctx.accounts.asset_mint.decimals,
        feed_key,
        ctx.accounts.feed.decimals,
        params,
        now,
    )?;
    vault.vault_token_account = ctx.accounts.vault_token_account.key();
    vault.access_control = ctx.accounts.access_control.key();
    vault.bump = ctx.bumps.vault;
    vault.vault_token_bump = ctx.bumps.vault_token_account;
    ctx.accounts.vault.set_inner(vault);

    ctx.accounts.feed.bind(vault_key)?;

    // =========================================================================
    // Access control and first batch
    // =========================================================================

    let access_control = &mut ctx.accounts.access_control;
    access_control.vault = vault_key;
    access_control.bump = ctx.bumps.access_control;
    access_control.grant(Role::Admin, admin_key)?;

    ctx.accounts.first_batch.set_inner(WithdrawBatch {
        vault: vault_key,
        batch_id: FIRST_BATCH_ID,
        bump: ctx.bumps.first_batch,
        ..WithdrawBatch::default()
    });

    msg!("Vault initialized: {}", vault_key);
    msg!("Asset mint: {}", ctx.accounts.asset_mint.key());
    msg!("Feed: {} ({} decimals)", feed_key, ctx.accounts.feed.decimals);
    msg!("Max TVL: {}", params.max_tvl);
    msg!(
        "Fees: maintenance {} bps/year, performance {} bps",
        params.maintenance_fee_bps,
        params.performance_fee_bps
    );
    msg!("Admin: {}", admin_key);

    Ok(())
}
