use anchor_lang::prelude::*;

use crate::error::VaultError;

/// A cohort of withdraw requests settled together at one rate.
///
/// PDA: ["withdraw_batch", vault, batch_id (u64 LE)]
///
/// Lifecycle: open (current batch, rate 0) -> closed (a later batch is
/// current, rate 0) -> settled (rate > 0). A batch is settled at most once.
#[account]
#[derive(InitSpace, Default)]
pub struct WithdrawBatch {
    pub vault: Pubkey,
    pub batch_id: u64,

    /// Escrowed shares of every live request attached to this batch
    pub total_shares: u128,

    /// Settlement rate in feed decimals; 0 while unsettled
    pub rate: u128,

    pub settled_ts: i64,

    pub bump: u8,
}

impl WithdrawBatch {
    pub fn is_settled(&self) -> bool {
        self.rate != 0
    }

    pub fn add_shares(&mut self, shares: u128) -> Result<()> {
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(error!(VaultError::MathOverflow))?;
        Ok(())
    }

    pub fn remove_shares(&mut self, shares: u128) -> Result<()> {
        self.total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(error!(VaultError::MathUnderflow))?;
        Ok(())
    }

    pub fn settle(&mut self, rate: u128, now: i64) -> Result<()> {
        require!(rate > 0, VaultError::InvalidRate);
        require!(!self.is_settled(), VaultError::BatchAlreadySettled);

        self.rate = rate;
        self.settled_ts = now;

        Ok(())
    }
}
