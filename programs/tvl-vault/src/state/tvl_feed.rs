// =============================================================================
// TVL History Ledger
// =============================================================================
// The feed is an append-only history of oracle reports. Each report lives in
// its own TvlEntry PDA keyed by (feed, index), so a record can never be
// rewritten and any historical index can be loaded on its own.
//
// Every record carries the vault's total share supply at the moment it was
// written. Deposits are priced against a (value, supply) pair from one fixed
// index, never against "whatever is latest".
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::MAX_RETURNED_ENTRIES;
use crate::error::VaultError;
use crate::math;

#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Debug, InitSpace,
)]
pub struct TvlRecord {
    /// Reported TVL in the feed's own decimals
    pub value: u128,
    pub timestamp: i64,
    /// Vault total supply when the value was recorded
    pub supply_snapshot: u128,
}

impl TvlRecord {
    pub fn is_fresh(&self, now: i64, freshness_window: i64) -> bool {
        now.saturating_sub(self.timestamp) <= freshness_window
    }

    pub fn require_fresh(&self, now: i64, freshness_window: i64) -> Result<()> {
        require!(
            self.is_fresh(now, freshness_window),
            VaultError::StaleTvlData
        );
        Ok(())
    }

    /// Pre-bootstrap state: nothing reported and nothing minted
    pub fn is_empty(&self) -> bool {
        self.value == 0 && self.supply_snapshot == 0
    }
}

/// PDA: ["tvl_feed", asset_mint]
#[account]
#[derive(InitSpace, Default)]
pub struct TvlFeed {
    pub asset_mint: Pubkey,

    /// Vault this feed reports for. Default until a vault binds it.
    pub vault: Pubkey,

    /// Decimals of every reported value
    pub decimals: u8,

    /// Number of entries appended so far; the next index to be written
    pub entry_count: u64,

    pub bump: u8,
}

/// PDA: ["tvl_entry", feed, index (u64 LE)]
#[account]
#[derive(InitSpace, Default)]
pub struct TvlEntry {
    pub feed: Pubkey,
    pub index: u64,
    pub record: TvlRecord,
    pub bump: u8,
}

impl TvlFeed {
    pub fn is_bound(&self) -> bool {
        self.vault != Pubkey::default()
    }

    pub fn bind(&mut self, vault: Pubkey) -> Result<()> {
        require!(!self.is_bound(), VaultError::FeedAlreadyBound);
        self.vault = vault;
        Ok(())
    }

    /// Write the next record into `entry` and return its index
    pub fn append(
        &mut self,
        feed_key: Pubkey,
        entry: &mut TvlEntry,
        value: u128,
        current_supply: u128,
        now: i64,
    ) -> Result<u64> {
        require!(self.is_bound(), VaultError::FeedNotBound);

        let index = self.entry_count;

        entry.feed = feed_key;
        entry.index = index;
        entry.record = TvlRecord {
            value,
            timestamp: now,
            supply_snapshot: current_supply,
        };

        self.entry_count = index
            .checked_add(1)
            .ok_or(error!(VaultError::MathOverflow))?;

        Ok(index)
    }

    /// Append on behalf of a pending deposit.
    ///
    /// `reference_supply` must equal the vault's supply right now. Any mint or
    /// burn since the oracle read the supply invalidates the confirmation.
    pub fn append_for_deposit(
        &mut self,
        feed_key: Pubkey,
        entry: &mut TvlEntry,
        value: u128,
        reference_supply: u128,
        current_supply: u128,
        now: i64,
    ) -> Result<u64> {
        require!(self.is_bound(), VaultError::FeedNotBound);
        require!(
            reference_supply == current_supply,
            VaultError::SupplyMismatch
        );

        self.append(feed_key, entry, value, current_supply, now)
    }

    pub fn check_index(&self, index: u64) -> Result<()> {
        require!(index < self.entry_count, VaultError::IndexOutOfBounds);
        Ok(())
    }

    pub fn latest_index(&self) -> Result<u64> {
        self.entry_count
            .checked_sub(1)
            .ok_or(error!(VaultError::NoTvlData))
    }

    /// Validate that `entry` is this feed's entry at `index`
    pub fn check_entry(&self, feed_key: &Pubkey, entry: &TvlEntry, index: u64) -> Result<()> {
        self.check_index(index)?;
        require_keys_eq!(entry.feed, *feed_key, VaultError::InvalidTvlEntry);
        require!(entry.index == index, VaultError::BoundEntryMismatch);
        Ok(())
    }

    /// Validate that `entry` is the most recent entry of this feed
    pub fn check_latest(&self, feed_key: &Pubkey, entry: &TvlEntry) -> Result<()> {
        require_keys_eq!(entry.feed, *feed_key, VaultError::InvalidTvlEntry);
        require!(
            entry.index == self.latest_index()?,
            VaultError::NotLatestEntry
        );
        Ok(())
    }

    /// Record of the latest entry, None while the history is empty.
    ///
    /// Once anything has been appended the caller must supply the latest entry.
    pub fn latest_record(
        &self,
        feed_key: &Pubkey,
        entry: Option<&TvlEntry>,
    ) -> Result<Option<TvlRecord>> {
        if self.entry_count == 0 {
            return Ok(None);
        }

        let entry = entry.ok_or(error!(VaultError::NoTvlData))?;
        self.check_latest(feed_key, entry)?;

        Ok(Some(entry.record))
    }

    /// Indices of the `count` most recent entries, newest first.
    ///
    /// `count` is clamped to the history length and to the per-call maximum.
    pub fn last_entry_indices(&self, count: u64) -> Result<Vec<u64>> {
        require!(count > 0, VaultError::InvalidEntryCount);

        let count = count
            .min(self.entry_count)
            .min(MAX_RETURNED_ENTRIES as u64);

        Ok((0..count).map(|i| self.entry_count - 1 - i).collect())
    }

    /// Scale a feed value to 18 decimals
    pub fn normalize(&self, value: u128) -> Result<u128> {
        math::normalize(value, self.decimals).map(|(value_18, _)| value_18)
    }
}
