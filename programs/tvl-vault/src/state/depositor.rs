// =============================================================================
// Depositor State Account
// =============================================================================
// One record per (vault, owner). Holds the owner's share balance, whitelist
// flag and at most one live deposit request and one live withdraw request.
//
// Absent requests are `None`. A confirmed deposit may be bound to ledger
// index 0, so "no request" is never encoded as a zeroed field.
// =============================================================================

use anchor_lang::prelude::*;

use crate::error::VaultError;
use crate::math;
use crate::state::WithdrawBatch;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub struct DepositRequest {
    /// The request is void from this timestamp on
    pub expires_at: i64,

    /// Ledger index the oracle confirmed this deposit against.
    /// None while awaiting confirmation.
    pub bound_index: Option<u64>,
}

impl DepositRequest {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub fn is_confirmed(&self) -> bool {
        self.bound_index.is_some()
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub struct WithdrawRequest {
    pub batch_id: u64,
    pub requested_at: i64,

    /// Shares held in vault escrow for this request
    pub shares: u128,

    /// Vault timelock at request time; later changes do not apply
    pub timelock: i64,
}

impl WithdrawRequest {
    pub fn unlock_time(&self) -> i64 {
        self.requested_at.saturating_add(self.timelock)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum WithdrawState {
    None,
    /// Batch not settled yet
    Pending,
    /// Batch settled, timelock still running
    Locked,
    Ready,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct WithdrawStatus {
    pub state: WithdrawState,
    pub shares: u128,
    /// Payout at the settled rate; 0 until the batch settles
    pub asset_amount: u64,
    pub unlock_time: i64,
}

/// PDA: ["depositor", vault, owner]
#[account]
#[derive(InitSpace, Default)]
pub struct Depositor {
    pub vault: Pubkey,
    pub owner: Pubkey,

    /// Free (unescrowed) share balance
    pub shares: u128,

    pub whitelisted: bool,

    pub deposit_request: Option<DepositRequest>,
    pub withdraw_request: Option<WithdrawRequest>,

    /// Asset units received by the vault from this owner (cumulative)
    pub total_deposited: u64,

    /// Asset units paid out to this owner (cumulative)
    pub total_withdrawn: u64,

    pub last_deposit_ts: i64,
    pub last_withdraw_ts: i64,

    pub bump: u8,
}

impl Depositor {
    pub fn new(vault: Pubkey, owner: Pubkey, bump: u8) -> Self {
        Depositor {
            vault,
            owner,
            bump,
            ..Depositor::default()
        }
    }

    // =========================================================================
    // Deposit requests
    // =========================================================================

    /// Open a new deposit request. An expired request is silently replaced.
    pub fn request_deposit(&mut self, now: i64, validity: i64) -> Result<i64> {
        if let Some(request) = &self.deposit_request {
            require!(request.is_expired(now), VaultError::DepositRequestPending);
        }

        let expires_at = now
            .checked_add(validity)
            .ok_or(error!(VaultError::MathOverflow))?;

        self.deposit_request = Some(DepositRequest {
            expires_at,
            bound_index: None,
        });

        Ok(expires_at)
    }

    /// Bind the pending request to ledger `index`
    pub fn confirm_deposit(&mut self, index: u64, now: i64) -> Result<()> {
        let request = self
            .deposit_request
            .as_mut()
            .ok_or(error!(VaultError::NoDepositRequest))?;

        require!(!request.is_confirmed(), VaultError::DepositAlreadyConfirmed);
        require!(!request.is_expired(now), VaultError::DepositRequestExpired);

        request.bound_index = Some(index);

        Ok(())
    }

    /// Consume a confirmed, unexpired request and return its bound index
    pub fn take_confirmed_deposit(&mut self, now: i64) -> Result<u64> {
        let request = self
            .deposit_request
            .ok_or(error!(VaultError::NoDepositRequest))?;

        require!(!request.is_expired(now), VaultError::DepositRequestExpired);
        let bound_index = request
            .bound_index
            .ok_or(error!(VaultError::DepositNotConfirmed))?;

        self.deposit_request = None;

        Ok(bound_index)
    }

    pub fn record_deposit(&mut self, amount: u64, now: i64) -> Result<()> {
        self.total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(error!(VaultError::MathOverflow))?;
        self.last_deposit_ts = now;
        Ok(())
    }

    // =========================================================================
    // Share balance
    // =========================================================================

    pub fn increase_shares(&mut self, shares: u128) -> Result<()> {
        self.shares = self
            .shares
            .checked_add(shares)
            .ok_or(error!(VaultError::MathOverflow))?;
        Ok(())
    }

    pub fn decrease_shares(&mut self, shares: u128) -> Result<()> {
        require!(shares <= self.shares, VaultError::InsufficientShares);
        self.shares -= shares;
        Ok(())
    }

    // =========================================================================
    // Withdraw requests
    // =========================================================================

    /// Move `shares` out of the free balance into a request on `batch_id`
    pub fn request_withdraw(
        &mut self,
        batch_id: u64,
        shares: u128,
        timelock: i64,
        now: i64,
    ) -> Result<()> {
        require!(shares > 0, VaultError::InvalidAmount);
        require!(
            self.withdraw_request.is_none(),
            VaultError::WithdrawRequestPending
        );

        self.decrease_shares(shares)?;

        self.withdraw_request = Some(WithdrawRequest {
            batch_id,
            requested_at: now,
            shares,
            timelock,
        });

        Ok(())
    }

    /// Drop the request if its batch is still `current_batch_id`, returning the shares
    pub fn cancel_withdraw(&mut self, current_batch_id: u64) -> Result<WithdrawRequest> {
        let request = self
            .withdraw_request
            .ok_or(error!(VaultError::NoWithdrawRequest))?;

        require!(
            request.batch_id == current_batch_id,
            VaultError::BatchResolvedOrOngoing
        );

        self.increase_shares(request.shares)?;
        self.withdraw_request = None;

        Ok(request)
    }

    /// The live request, if its timelock has elapsed and `batch` settled it
    pub fn ready_withdraw(&self, batch: &WithdrawBatch, now: i64) -> Result<WithdrawRequest> {
        let request = self
            .withdraw_request
            .ok_or(error!(VaultError::NoWithdrawRequest))?;

        require!(
            now >= request.unlock_time(),
            VaultError::TimelockNotElapsed
        );
        require!(batch.batch_id == request.batch_id, VaultError::InvalidBatch);
        require!(batch.is_settled(), VaultError::BatchNotSettled);

        Ok(request)
    }

    pub fn record_withdraw(&mut self, amount: u64, now: i64) -> Result<()> {
        self.withdraw_request = None;
        self.total_withdrawn = self
            .total_withdrawn
            .checked_add(amount)
            .ok_or(error!(VaultError::MathOverflow))?;
        self.last_withdraw_ts = now;
        Ok(())
    }

    pub fn withdraw_status(
        &self,
        batch: Option<&WithdrawBatch>,
        feed_decimals: u8,
        asset_decimals: u8,
        now: i64,
    ) -> Result<WithdrawStatus> {
        let request = match self.withdraw_request {
            Some(request) => request,
            None => {
                return Ok(WithdrawStatus {
                    state: WithdrawState::None,
                    shares: 0,
                    asset_amount: 0,
                    unlock_time: 0,
                })
            }
        };

        let batch = batch.ok_or(error!(VaultError::InvalidBatch))?;
        require!(
            batch.batch_id == request.batch_id,
            VaultError::InvalidBatch
        );
        let settled_rate = batch.is_settled().then_some(batch.rate);

        let (state, asset_amount) = match settled_rate {
            None => (WithdrawState::Pending, 0),
            Some(rate) => {
                let amount =
                    math::shares_to_asset(request.shares, rate, feed_decimals, asset_decimals)?;
                if now < request.unlock_time() {
                    (WithdrawState::Locked, amount)
                } else {
                    (WithdrawState::Ready, amount)
                }
            }
        };

        Ok(WithdrawStatus {
            state,
            shares: request.shares,
            asset_amount,
            unlock_time: request.unlock_time(),
        })
    }
}
