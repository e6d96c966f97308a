// =============================================================================
// TVL Report Instructions (Oracle only)
// =============================================================================
// append_tvl              - record the vault's value at the current supply
// append_tvl_for_deposit  - record a value and confirm one pending deposit
//                           against the new entry
//
// Each report creates the next TvlEntry PDA of the feed. Entries are never
// rewritten, so a confirmed deposit always prices against the pair it was
// bound to.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{
    AccessControl, DepositConfirmed, Depositor, Role, TvlAppended, TvlEntry, TvlFeed, Vault,
};

#[derive(Accounts)]
pub struct AppendTvl<'info> {
    #[account(
        mut,
        constraint = access_control.has_role(Role::Oracle, &oracle.key()) @ VaultError::Unauthorized
    )]
    pub oracle: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = feed @ VaultError::InvalidVaultAccount,
        has_one = access_control @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,

    pub access_control: Account<'info, AccessControl>,

    #[account(
        mut,
        seeds = [TVL_FEED_SEED, feed.asset_mint.as_ref()],
        bump = feed.bump
    )]
    pub feed: Account<'info, TvlFeed>,

    /// The next entry of the feed
    #[account(
        init,
        payer = oracle,
        space = 8 + TvlEntry::INIT_SPACE,
        seeds = [TVL_ENTRY_SEED, feed.key().as_ref(), &feed.entry_count.to_le_bytes()],
        bump
    )]
    pub entry: Account<'info, TvlEntry>,

    pub system_program: Program<'info, System>,
}

pub fn handler_append_tvl(ctx: Context<AppendTvl>, value: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let feed_key = ctx.accounts.feed.key();
    let supply = ctx.accounts.vault.total_shares;

    let index = ctx
        .accounts
        .feed
        .append(feed_key, &mut ctx.accounts.entry, value, supply, now)?;
    ctx.accounts.entry.bump = ctx.bumps.entry;

    msg!("TVL #{}: value {} at supply {}", index, value, supply);

    emit!(TvlAppended {
        feed: feed_key,
        index,
        value,
        supply_snapshot: supply,
        ts: now,
        depositor: None,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct AppendTvlForDeposit<'info> {
    #[account(
        mut,
        constraint = access_control.has_role(Role::Oracle, &oracle.key()) @ VaultError::Unauthorized
    )]
    pub oracle: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump,
        has_one = feed @ VaultError::InvalidVaultAccount,
        has_one = access_control @ VaultError::InvalidVaultAccount
    )]
    pub vault: Account<'info, Vault>,

    pub access_control: Account<'info, AccessControl>,

    #[account(
        mut,
        seeds = [TVL_FEED_SEED, feed.asset_mint.as_ref()],
        bump = feed.bump
    )]
    pub feed: Account<'info, TvlFeed>,

    #[account(
        init,
        payer = oracle,
        space = 8 + TvlEntry::INIT_SPACE,
        seeds = [TVL_ENTRY_SEED, feed.key().as_ref(), &feed.entry_count.to_le_bytes()],
        bump
    )]
    pub entry: Account<'info, TvlEntry>,

    /// The depositor whose pending request is confirmed
    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), depositor.owner.as_ref()],
        bump = depositor.bump
    )]
    pub depositor: Account<'info, Depositor>,

    pub system_program: Program<'info, System>,
}

/// `reference_supply` is the vault supply the oracle priced `value` against.
/// It must still be the vault's supply when this instruction executes.
pub fn handler_append_tvl_for_deposit(
    ctx: Context<AppendTvlForDeposit>,
    value: u128,
    reference_supply: u128,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault.key();
    let feed_key = ctx.accounts.feed.key();
    let supply = ctx.accounts.vault.total_shares;

    // =========================================================================
    // Append the entry
    // =========================================================================

    let index = ctx.accounts.feed.append_for_deposit(
        feed_key,
        &mut ctx.accounts.entry,
        value,
        reference_supply,
        supply,
        now,
    )?;
    ctx.accounts.entry.bump = ctx.bumps.entry;

    // =========================================================================
    // Bind the pending deposit to it
    // =========================================================================

    let depositor = &mut ctx.accounts.depositor;
    depositor.confirm_deposit(index, now)?;

    msg!(
        "TVL #{}: value {} at supply {}, confirms deposit of {}",
        index,
        value,
        supply,
        depositor.owner
    );

    emit!(TvlAppended {
        feed: feed_key,
        index,
        value,
        supply_snapshot: supply,
        ts: now,
        depositor: Some(depositor.owner),
    });
    emit!(DepositConfirmed {
        vault: vault_key,
        owner: depositor.owner,
        bound_index: index,
        ts: now,
    });

    Ok(())
}
