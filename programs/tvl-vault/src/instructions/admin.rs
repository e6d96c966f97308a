// =============================================================================
// Admin Instructions
// =============================================================================
// Configuration setters callable by any Admin grant. Every change emits
// VaultConfigUpdated with the old and new value.
//
// Fee-rate changes settle the fee accrued under the old rate first, so a rate
// change never applies retroactively.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::instructions::claim_fees::mint_fee_shares;
use crate::state::{
    AccessControl, ConfigField, Depositor, FeeAccrual, FeeKind, FeeRecipientUpdated, Role,
    TvlEntry, TvlFeed, Vault, VaultConfigUpdated, WhitelistUpdated,
};

fn log_config_update(vault: Pubkey, field: ConfigField, old_value: u128, new_value: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    msg!("{:?} updated: {} -> {}", field, old_value, new_value);

    emit!(VaultConfigUpdated {
        vault,
        field,
        old_value,
        new_value,
        ts: now,
    });

    Ok(())
}

// =============================================================================
// Plain Setters
// =============================================================================

#[derive(Accounts)]
pub struct UpdateVaultConfig<'info> {
    #[account(
        constraint = access_control.has_role(Role::Admin, &admin.key()) @ VaultError::Unauthorized
    )]
    pub admin: Signer<'info>,

    pub access_control: Account<'info, AccessControl>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = access_control @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,
}

/// Pausing blocks new deposits and withdraw requests. Exits stay open.
pub fn handler_set_paused(ctx: Context<UpdateVaultConfig>, paused: bool) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    if vault.is_paused == paused {
        msg!(
            "Vault is already {}",
            if paused { "paused" } else { "unpaused" }
        );
        return Ok(());
    }

    let old = std::mem::replace(&mut vault.is_paused, paused);

    msg!(
        "Vault {} by admin {}",
        if paused { "PAUSED" } else { "UNPAUSED" },
        ctx.accounts.admin.key()
    );

    log_config_update(vault.key(), ConfigField::Paused, old.into(), paused.into())
}

pub fn handler_set_withdraw_timelock(ctx: Context<UpdateVaultConfig>, timelock: i64) -> Result<()> {
    Vault::validate_withdraw_timelock(timelock)?;

    let vault = &mut ctx.accounts.vault;
    let old = std::mem::replace(&mut vault.withdraw_timelock, timelock);

    log_config_update(
        vault.key(),
        ConfigField::WithdrawTimelock,
        old as u128,
        timelock as u128,
    )
}

pub fn handler_set_freshness_window(ctx: Context<UpdateVaultConfig>, window: i64) -> Result<()> {
    Vault::validate_freshness_window(window)?;

    let vault = &mut ctx.accounts.vault;
    let old = std::mem::replace(&mut vault.tvl_freshness_window, window);

    log_config_update(
        vault.key(),
        ConfigField::FreshnessWindow,
        old as u128,
        window as u128,
    )
}

pub fn handler_set_request_validity(ctx: Context<UpdateVaultConfig>, validity: i64) -> Result<()> {
    Vault::validate_request_validity(validity)?;

    let vault = &mut ctx.accounts.vault;
    let old = std::mem::replace(&mut vault.request_validity, validity);

    log_config_update(
        vault.key(),
        ConfigField::RequestValidity,
        old as u128,
        validity as u128,
    )
}

pub fn handler_set_min_deposit(ctx: Context<UpdateVaultConfig>, min_deposit: u64) -> Result<()> {
    require!(min_deposit > 0, VaultError::InvalidAmount);

    let vault = &mut ctx.accounts.vault;
    let old = std::mem::replace(&mut vault.min_deposit, min_deposit);

    log_config_update(
        vault.key(),
        ConfigField::MinDeposit,
        old.into(),
        min_deposit.into(),
    )
}

pub fn handler_set_liquidity_buffer(ctx: Context<UpdateVaultConfig>, buffer: u64) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let old = std::mem::replace(&mut vault.liquidity_buffer, buffer);

    log_config_update(
        vault.key(),
        ConfigField::LiquidityBuffer,
        old.into(),
        buffer.into(),
    )
}

pub fn handler_set_whitelist_enabled(ctx: Context<UpdateVaultConfig>, enabled: bool) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let old = std::mem::replace(&mut vault.whitelist_enabled, enabled);

    log_config_update(
        vault.key(),
        ConfigField::WhitelistEnabled,
        old.into(),
        enabled.into(),
    )
}

/// The new recipient needs a Depositor record before the next fee claim
pub fn handler_set_fee_recipient(ctx: Context<UpdateVaultConfig>, fee_recipient: Pubkey) -> Result<()> {
    require!(
        fee_recipient != Pubkey::default(),
        VaultError::InvalidAddress
    );

    let vault = &mut ctx.accounts.vault;
    let old = std::mem::replace(&mut vault.fee_recipient, fee_recipient);

    msg!("Fee recipient: {} -> {}", old, fee_recipient);

    emit!(FeeRecipientUpdated {
        vault: vault.key(),
        old_recipient: old,
        new_recipient: fee_recipient,
    });

    Ok(())
}

// =============================================================================
// Cap
// =============================================================================

#[derive(Accounts)]
pub struct UpdateMaxTvl<'info> {
    #[account(
        constraint = access_control.has_role(Role::Admin, &admin.key()) @ VaultError::Unauthorized
    )]
    pub admin: Signer<'info>,

    pub access_control: Account<'info, AccessControl>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = access_control @ VaultError::InvalidVaultAccount,
        has_one = feed @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,

    pub feed: Account<'info, TvlFeed>,

    pub latest_entry: Option<Account<'info, TvlEntry>>,
}

/// The new cap (feed decimals) may not be below the latest TVL while it is fresh
pub fn handler_set_max_tvl(ctx: Context<UpdateMaxTvl>, max_tvl: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let feed_key = ctx.accounts.feed.key();
    let latest = ctx
        .accounts
        .feed
        .latest_record(&feed_key, ctx.accounts.latest_entry.as_deref())?;

    let vault = &mut ctx.accounts.vault;
    let old = vault.set_max_tvl(max_tvl, latest.as_ref(), now)?;

    log_config_update(vault.key(), ConfigField::MaxTvl, old, max_tvl)
}

// =============================================================================
// Fee Rates
// =============================================================================

#[derive(Accounts)]
pub struct UpdateFeeRate<'info> {
    #[account(
        constraint = access_control.has_role(Role::Admin, &admin.key()) @ VaultError::Unauthorized
    )]
    pub admin: Signer<'info>,

    pub access_control: Account<'info, AccessControl>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = access_control @ VaultError::InvalidVaultAccount,
        has_one = feed @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,

    pub feed: Account<'info, TvlFeed>,

    pub latest_entry: Option<Account<'info, TvlEntry>>,

    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), vault.fee_recipient.as_ref()],
        bump = fee_recipient.bump
    )]
    pub fee_recipient: Account<'info, Depositor>,
}

pub fn handler_set_maintenance_fee(ctx: Context<UpdateFeeRate>, fee_bps: u16) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let feed_key = ctx.accounts.feed.key();
    let latest = ctx
        .accounts
        .feed
        .latest_record(&feed_key, ctx.accounts.latest_entry.as_deref())?;

    let old = ctx.accounts.vault.maintenance_fee_bps;
    let accrual = ctx
        .accounts
        .vault
        .set_maintenance_fee(fee_bps, latest.as_ref(), now)?;

    if accrual != FeeAccrual::default() {
        mint_fee_shares(
            &mut ctx.accounts.vault,
            &mut ctx.accounts.fee_recipient,
            FeeKind::Maintenance,
            accrual,
            now,
        )?;
    }

    log_config_update(
        ctx.accounts.vault.key(),
        ConfigField::MaintenanceFee,
        old.into(),
        fee_bps.into(),
    )
}

pub fn handler_set_performance_fee(ctx: Context<UpdateFeeRate>, fee_bps: u16) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let feed_key = ctx.accounts.feed.key();
    let latest = ctx
        .accounts
        .feed
        .latest_record(&feed_key, ctx.accounts.latest_entry.as_deref())?;

    let old = ctx.accounts.vault.performance_fee_bps;
    let accrual = ctx
        .accounts
        .vault
        .set_performance_fee(fee_bps, latest.as_ref(), now)?;

    if accrual != FeeAccrual::default() {
        mint_fee_shares(
            &mut ctx.accounts.vault,
            &mut ctx.accounts.fee_recipient,
            FeeKind::Performance,
            accrual,
            now,
        )?;
    }

    log_config_update(
        ctx.accounts.vault.key(),
        ConfigField::PerformanceFee,
        old.into(),
        fee_bps.into(),
    )
}

// =============================================================================
// Whitelist
// =============================================================================

#[derive(Accounts)]
#[instruction(owner: Pubkey)]
pub struct SetWhitelisted<'info> {
    #[account(
        mut,
        constraint = access_control.has_role(Role::Admin, &admin.key()) @ VaultError::Unauthorized
    )]
    pub admin: Signer<'info>,

    pub access_control: Account<'info, AccessControl>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = access_control @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        init_if_needed,
        payer = admin,
        space = 8 + Depositor::INIT_SPACE,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.as_ref()],
        bump
    )]
    pub depositor: Account<'info, Depositor>,

    pub system_program: Program<'info, System>,
}

pub fn handler_set_whitelisted(
    ctx: Context<SetWhitelisted>,
    owner: Pubkey,
    whitelisted: bool,
) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();

    let depositor = &mut ctx.accounts.depositor;
    if depositor.owner == Pubkey::default() {
        depositor.set_inner(Depositor::new(vault_key, owner, ctx.bumps.depositor));
    }
    depositor.whitelisted = whitelisted;

    msg!(
        "{} {} the whitelist",
        owner,
        if whitelisted { "added to" } else { "removed from" }
    );

    emit!(WhitelistUpdated {
        vault: vault_key,
        owner,
        whitelisted,
    });

    Ok(())
}
