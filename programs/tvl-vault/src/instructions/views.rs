// =============================================================================
// Read-only Instructions
// =============================================================================
// Nothing here mutates state. Clients simulate these instructions and read the
// Anchor return value.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{Depositor, TvlEntry, TvlFeed, TvlRecord, Vault, WithdrawBatch, WithdrawStatus};

// =============================================================================
// Withdraw Status
// =============================================================================

#[derive(Accounts)]
pub struct GetWithdrawStatus<'info> {
    pub vault: Account<'info, Vault>,

    #[account(
        constraint = depositor.vault == vault.key() @ VaultError::InvalidVaultAccount
    )]
    pub depositor: Account<'info, Depositor>,

    /// Batch of the live request; required while a request exists
    pub batch: Option<Account<'info, WithdrawBatch>>,
}

pub fn handler_get_withdraw_status(ctx: Context<GetWithdrawStatus>) -> Result<WithdrawStatus> {
    let now = Clock::get()?.unix_timestamp;
    let vault = &ctx.accounts.vault;
    let vault_key = vault.key();

    let batch = ctx.accounts.batch.as_deref();
    if let Some(batch) = batch {
        require_keys_eq!(batch.vault, vault_key, VaultError::InvalidBatch);
    }

    ctx.accounts
        .depositor
        .withdraw_status(batch, vault.feed_decimals, vault.asset_decimals, now)
}

// =============================================================================
// Share Price
// =============================================================================

#[derive(Accounts)]
pub struct GetSharePrice<'info> {
    #[account(has_one = feed @ VaultError::InvalidVaultAccount)]
    pub vault: Account<'info, Vault>,

    pub feed: Account<'info, TvlFeed>,

    pub latest_entry: Option<Account<'info, TvlEntry>>,
}

/// Price of one whole share in 18 decimals
pub fn handler_get_share_price(ctx: Context<GetSharePrice>) -> Result<u128> {
    let now = Clock::get()?.unix_timestamp;
    let vault = &ctx.accounts.vault;
    let feed_key = ctx.accounts.feed.key();

    match ctx
        .accounts
        .feed
        .latest_record(&feed_key, ctx.accounts.latest_entry.as_deref())?
    {
        Some(latest) => vault.share_price(&latest, now),
        None => {
            require!(vault.total_shares == 0, VaultError::NoTvlData);
            Ok(PRECISION)
        }
    }
}

// =============================================================================
// Ledger Entries
// =============================================================================

#[derive(Accounts)]
pub struct GetTvlEntry<'info> {
    pub feed: Account<'info, TvlFeed>,

    pub entry: Account<'info, TvlEntry>,
}

pub fn handler_get_tvl_entry(ctx: Context<GetTvlEntry>, index: u64) -> Result<TvlRecord> {
    let feed_key = ctx.accounts.feed.key();
    ctx.accounts
        .feed
        .check_entry(&feed_key, &ctx.accounts.entry, index)?;

    Ok(ctx.accounts.entry.record)
}

/// The feed's entries are passed as remaining accounts, newest first
#[derive(Accounts)]
pub struct GetTvlEntries<'info> {
    pub feed: Account<'info, TvlFeed>,
}

fn load_entry(info: &AccountInfo) -> Result<TvlEntry> {
    require_keys_eq!(*info.owner, crate::ID, VaultError::InvalidTvlEntry);
    let data = info.try_borrow_data()?;
    TvlEntry::try_deserialize(&mut &data[..])
}

pub fn handler_get_last_tvl_entries(
    ctx: Context<GetTvlEntries>,
    count: u64,
) -> Result<Vec<TvlRecord>> {
    let feed = &ctx.accounts.feed;
    let feed_key = feed.key();

    let indices = feed.last_entry_indices(count)?;
    require!(
        ctx.remaining_accounts.len() >= indices.len(),
        VaultError::InvalidEntryCount
    );

    indices
        .iter()
        .zip(ctx.remaining_accounts.iter())
        .map(|(&index, info)| {
            let entry = load_entry(info)?;
            feed.check_entry(&feed_key, &entry, index)?;
            Ok(entry.record)
        })
        .collect()
}
