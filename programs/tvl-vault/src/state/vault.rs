// =============================================================================
// Vault State Account
// =============================================================================
// The Vault is the central state of the protocol. It owns:
// - the share ledger totals (supply, escrow, bootstrap lock)
// - the withdraw batch cursor and the liquidity reserved for settled batches
// - the fee accrual counters
// - every configurable parameter
//
// Per-owner balances live in Depositor accounts and batch aggregates in
// WithdrawBatch accounts. The methods here take those records by reference
// and keep all of them consistent in one place.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::math;
use crate::state::{Depositor, TvlRecord, WithdrawBatch, WithdrawRequest};

/// Parameters supplied when a vault is created
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultParams {
    /// Deposit cap in feed decimals
    pub max_tvl: u128,
    /// Minimum execute_deposit amount in asset units
    pub min_deposit: u64,
    /// Lifetime of a deposit request in seconds
    pub request_validity: i64,
    /// Seconds between a withdraw request and its payout
    pub withdraw_timelock: i64,
    /// Maximum age of the latest TVL entry before it is stale
    pub tvl_freshness_window: i64,
    /// Asset units retrieve_liquidity always leaves in the vault
    pub liquidity_buffer: u64,
    pub maintenance_fee_bps: u16,
    pub performance_fee_bps: u16,
    pub whitelist_enabled: bool,
    /// Lock a few share units to the null holder on the first deposit
    pub lock_bootstrap_shares: bool,
    /// Owner whose Depositor account receives fee shares
    pub fee_recipient: Pubkey,
}

impl VaultParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.max_tvl > 0, VaultError::InvalidMaxTvl);
        require!(self.min_deposit > 0, VaultError::InvalidAmount);
        require!(
            self.fee_recipient != Pubkey::default(),
            VaultError::InvalidAddress
        );
        Vault::validate_request_validity(self.request_validity)?;
        Vault::validate_withdraw_timelock(self.withdraw_timelock)?;
        Vault::validate_freshness_window(self.tvl_freshness_window)?;
        Vault::validate_maintenance_fee(self.maintenance_fee_bps)?;
        Vault::validate_performance_fee(self.performance_fee_bps)?;
        Ok(())
    }
}

/// Shares and value minted by a fee claim
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeAccrual {
    /// Fee value in 18 decimals
    pub fee_value: u128,
    pub shares: u128,
}

/// Result of executing a confirmed deposit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepositOutcome {
    /// Shares credited to the depositor
    pub shares: u128,
    /// Shares locked to the null holder (bootstrap only)
    pub locked_shares: u128,
}

/// PDA: ["vault", asset_mint]
#[account]
#[derive(InitSpace, Default)]
pub struct Vault {
    // =========================================================================
    // References
    // =========================================================================
    pub asset_mint: Pubkey,

    /// PDA token account holding the vault's custody of the asset
    pub vault_token_account: Pubkey,

    /// TVL feed this vault prices deposits and fees against
    pub feed: Pubkey,

    /// Authorization object queried by every role-gated instruction
    pub access_control: Pubkey,

    /// Owner whose Depositor account receives fee shares
    pub fee_recipient: Pubkey,

    pub asset_decimals: u8,
    pub feed_decimals: u8,

    // =========================================================================
    // Share ledger (18 decimals)
    // =========================================================================
    pub total_shares: u128,

    /// Shares held for pending withdraw requests
    pub escrowed_shares: u128,

    /// Shares permanently locked by the bootstrap deposit
    pub locked_shares: u128,

    // =========================================================================
    // Configuration
    // =========================================================================
    /// Deposit cap in feed decimals
    pub max_tvl: u128,
    pub min_deposit: u64,
    pub request_validity: i64,
    pub withdraw_timelock: i64,
    pub tvl_freshness_window: i64,
    pub liquidity_buffer: u64,
    pub maintenance_fee_bps: u16,
    pub performance_fee_bps: u16,
    pub whitelist_enabled: bool,
    pub lock_bootstrap_shares: bool,
    pub is_paused: bool,

    // =========================================================================
    // Withdraw batches
    // =========================================================================
    /// Batch currently accepting requests
    pub current_batch_id: u64,

    /// Highest settled batch id; batches settle strictly in order
    pub last_settled_batch_id: u64,

    /// Asset units reserved for settled, unpaid withdrawals
    pub available_for_withdrawal: u64,

    /// Escrowed shares of settled batches not yet paid out
    pub settled_unpaid_shares: u128,

    /// Asset units owed to settled, unpaid withdrawals; the rest of the
    /// reserve is dust
    pub settled_unpaid_assets: u64,

    // =========================================================================
    // Fee accrual
    // =========================================================================
    pub last_maintenance_claim_ts: i64,

    /// TVL at the last performance fee settlement (18 decimals)
    pub snapshot_tvl_18: u128,

    /// Asset units deposited since the last performance fee settlement
    pub cumulative_deposit: u128,

    /// Asset units withdrawn since the last performance fee settlement
    pub cumulative_withdrawn: u128,

    // =========================================================================
    // PDA bumps
    // =========================================================================
    pub bump: u8,
    pub vault_token_bump: u8,
}

impl Vault {
    pub fn new(
        asset_mint: Pubkey,
        asset_decimals: u8,
        feed: Pubkey,
        feed_decimals: u8,
        params: VaultParams,
        now: i64,
    ) -> Result<Self> {
        require!(
            asset_decimals <= PRECISION_DECIMALS,
            VaultError::UnsupportedDecimals
        );
        require!(
            feed_decimals <= PRECISION_DECIMALS,
            VaultError::UnsupportedDecimals
        );
        params.validate()?;

        Ok(Vault {
            asset_mint,
            feed,
            fee_recipient: params.fee_recipient,
            asset_decimals,
            feed_decimals,
            max_tvl: params.max_tvl,
            min_deposit: params.min_deposit,
            request_validity: params.request_validity,
            withdraw_timelock: params.withdraw_timelock,
            tvl_freshness_window: params.tvl_freshness_window,
            liquidity_buffer: params.liquidity_buffer,
            maintenance_fee_bps: params.maintenance_fee_bps,
            performance_fee_bps: params.performance_fee_bps,
            whitelist_enabled: params.whitelist_enabled,
            lock_bootstrap_shares: params.lock_bootstrap_shares,
            current_batch_id: FIRST_BATCH_ID,
            last_maintenance_claim_ts: now,
            ..Vault::default()
        })
    }

    pub fn get_vault_signer_seeds<'a>(asset_mint: &'a Pubkey, bump: &'a [u8; 1]) -> [&'a [u8]; 3] {
        [VAULT_SEED, asset_mint.as_ref(), bump]
    }

    pub fn require_not_paused(&self) -> Result<()> {
        require!(!self.is_paused, VaultError::VaultPaused);
        Ok(())
    }

    pub fn require_allowed(&self, depositor: &Depositor) -> Result<()> {
        require!(
            !self.whitelist_enabled || depositor.whitelisted,
            VaultError::NotWhitelisted
        );
        Ok(())
    }

    fn normalize_asset(&self, amount: u128) -> Result<u128> {
        math::normalize(amount, self.asset_decimals).map(|(amount_18, _)| amount_18)
    }

    fn normalize_feed(&self, value: u128) -> Result<u128> {
        math::normalize(value, self.feed_decimals).map(|(value_18, _)| value_18)
    }

    pub fn shares_to_asset(&self, shares: u128, rate: u128) -> Result<u64> {
        math::shares_to_asset(shares, rate, self.feed_decimals, self.asset_decimals)
    }

    // =========================================================================
    // Share ledger
    // =========================================================================

    pub fn mint_shares(&mut self, to: &mut Depositor, shares: u128) -> Result<()> {
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(error!(VaultError::MathOverflow))?;
        to.increase_shares(shares)
    }

    pub fn transfer_shares(
        &self,
        from: &mut Depositor,
        to: &mut Depositor,
        shares: u128,
    ) -> Result<()> {
        require!(shares > 0, VaultError::InvalidAmount);
        from.decrease_shares(shares)?;
        to.increase_shares(shares)
    }

    /// Every share unit is either free, escrowed or locked
    pub fn check_share_ledger(&self, free_shares: u128) -> Result<()> {
        let accounted = free_shares
            .checked_add(self.escrowed_shares)
            .and_then(|v| v.checked_add(self.locked_shares))
            .ok_or(error!(VaultError::MathOverflow))?;
        require!(
            accounted == self.total_shares,
            VaultError::ShareLedgerMismatch
        );
        Ok(())
    }

    // =========================================================================
    // Deposits
    // =========================================================================

    /// Mint shares for `received` asset units against the record the
    /// depositor's request was bound to at confirmation.
    ///
    /// The depositor's request must already be consumed.
    pub fn execute_deposit(
        &mut self,
        depositor: &mut Depositor,
        bound: &TvlRecord,
        received: u64,
        now: i64,
    ) -> Result<DepositOutcome> {
        require!(received > 0, VaultError::ZeroCalculated);

        let amount_18 = self.normalize_asset(u128::from(received))?;
        let tvl_18 = self.normalize_feed(bound.value)?;
        let max_tvl_18 = self.normalize_feed(self.max_tvl)?;

        let tvl_after = tvl_18
            .checked_add(amount_18)
            .ok_or(error!(VaultError::MathOverflow))?;
        require!(tvl_after <= max_tvl_18, VaultError::ExceedsMaxTVL);

        let mut shares = math::shares_from_token(amount_18, tvl_18, bound.supply_snapshot)?;
        require!(shares > 0, VaultError::ZeroCalculated);

        let mut locked_shares = 0;
        if self.lock_bootstrap_shares && bound.supply_snapshot == 0 && self.total_shares == 0 {
            require!(
                shares > BOOTSTRAP_LOCKED_SHARES,
                VaultError::ZeroCalculated
            );
            locked_shares = BOOTSTRAP_LOCKED_SHARES;
            shares -= locked_shares;

            self.total_shares = self
                .total_shares
                .checked_add(locked_shares)
                .ok_or(error!(VaultError::MathOverflow))?;
            self.locked_shares = self
                .locked_shares
                .checked_add(locked_shares)
                .ok_or(error!(VaultError::MathOverflow))?;
        }

        self.mint_shares(depositor, shares)?;

        self.cumulative_deposit = self
            .cumulative_deposit
            .checked_add(u128::from(received))
            .ok_or(error!(VaultError::MathOverflow))?;

        depositor.record_deposit(received, now)?;

        Ok(DepositOutcome {
            shares,
            locked_shares,
        })
    }

    // =========================================================================
    // Withdraw batches
    // =========================================================================

    /// Escrow `shares` from the depositor into the current batch
    pub fn request_withdraw(
        &mut self,
        depositor: &mut Depositor,
        batch: &mut WithdrawBatch,
        shares: u128,
        now: i64,
    ) -> Result<()> {
        self.require_not_paused()?;
        self.require_allowed(depositor)?;
        require!(
            batch.batch_id == self.current_batch_id,
            VaultError::InvalidBatch
        );

        depositor.request_withdraw(self.current_batch_id, shares, self.withdraw_timelock, now)?;
        batch.add_shares(shares)?;

        self.escrowed_shares = self
            .escrowed_shares
            .checked_add(shares)
            .ok_or(error!(VaultError::MathOverflow))?;

        Ok(())
    }

    /// Return escrowed shares while the request's batch is still open
    pub fn cancel_withdraw(
        &mut self,
        depositor: &mut Depositor,
        batch: &mut WithdrawBatch,
    ) -> Result<WithdrawRequest> {
        require!(
            batch.batch_id == self.current_batch_id,
            VaultError::InvalidBatch
        );

        let request = depositor.cancel_withdraw(self.current_batch_id)?;
        batch.remove_shares(request.shares)?;

        self.escrowed_shares = self
            .escrowed_shares
            .checked_sub(request.shares)
            .ok_or(error!(VaultError::MathUnderflow))?;

        Ok(request)
    }

    fn is_batch_settled(&self, batch_id: u64) -> bool {
        batch_id <= self.last_settled_batch_id
    }

    /// Close the current batch if it holds any shares.
    ///
    /// Returns true when a new batch was opened.
    pub fn advance_batch(&mut self, current: &WithdrawBatch) -> Result<bool> {
        require!(
            current.batch_id == self.current_batch_id,
            VaultError::InvalidBatch
        );

        let previous = self.current_batch_id - 1;
        require!(
            previous < FIRST_BATCH_ID || self.is_batch_settled(previous),
            VaultError::PreviousBatchNotSettled
        );

        if current.total_shares == 0 {
            return Ok(false);
        }

        self.current_batch_id = self
            .current_batch_id
            .checked_add(1)
            .ok_or(error!(VaultError::MathOverflow))?;

        Ok(true)
    }

    /// The closed batch awaiting settlement
    pub fn batch_to_settle(&self) -> Result<u64> {
        require!(
            self.current_batch_id > FIRST_BATCH_ID,
            VaultError::NoBatchToSettle
        );
        let batch_id = self.current_batch_id - 1;
        require!(
            !self.is_batch_settled(batch_id),
            VaultError::BatchAlreadySettled
        );
        Ok(batch_id)
    }

    /// Asset units `batch` requires at `rate`
    pub fn settlement_requirement(&self, batch: &WithdrawBatch, rate: u128) -> Result<u64> {
        require!(rate > 0, VaultError::InvalidRate);
        require!(
            batch.batch_id == self.batch_to_settle()?,
            VaultError::InvalidBatch
        );
        require!(!batch.is_settled(), VaultError::BatchAlreadySettled);

        self.shares_to_asset(batch.total_shares, rate)
    }

    /// Record the settlement of `batch` after `received` asset units arrived.
    ///
    /// Returns the amount the batch required.
    pub fn settle_batch(
        &mut self,
        batch: &mut WithdrawBatch,
        rate: u128,
        received: u64,
        now: i64,
    ) -> Result<u64> {
        let required = self.settlement_requirement(batch, rate)?;
        require!(
            received >= required,
            VaultError::InsufficientTokensForBatch
        );

        batch.settle(rate, now)?;
        self.last_settled_batch_id = batch.batch_id;

        self.available_for_withdrawal = self
            .available_for_withdrawal
            .checked_add(received)
            .ok_or(error!(VaultError::MathOverflow))?;
        self.settled_unpaid_shares = self
            .settled_unpaid_shares
            .checked_add(batch.total_shares)
            .ok_or(error!(VaultError::MathOverflow))?;
        self.settled_unpaid_assets = self
            .settled_unpaid_assets
            .checked_add(required)
            .ok_or(error!(VaultError::MathOverflow))?;
        self.cumulative_withdrawn = self
            .cumulative_withdrawn
            .checked_add(u128::from(required))
            .ok_or(error!(VaultError::MathOverflow))?;

        Ok(required)
    }

    /// Burn the depositor's escrowed shares and release their payout.
    ///
    /// Returns the request and the asset amount to transfer.
    pub fn complete_withdraw(
        &mut self,
        depositor: &mut Depositor,
        batch: &WithdrawBatch,
        now: i64,
    ) -> Result<(WithdrawRequest, u64)> {
        let request = depositor.ready_withdraw(batch, now)?;

        let payout = self.shares_to_asset(request.shares, batch.rate)?;
        require!(payout > 0, VaultError::ZeroCalculated);

        depositor.record_withdraw(payout, now)?;

        self.available_for_withdrawal = self
            .available_for_withdrawal
            .checked_sub(payout)
            .ok_or(error!(VaultError::InsufficientLiquidity))?;
        self.settled_unpaid_shares = self
            .settled_unpaid_shares
            .checked_sub(request.shares)
            .ok_or(error!(VaultError::MathUnderflow))?;
        // Per-request payouts round down, so the last payout leaves a residual
        self.settled_unpaid_assets = if self.settled_unpaid_shares == 0 {
            0
        } else {
            self.settled_unpaid_assets.saturating_sub(payout)
        };
        self.escrowed_shares = self
            .escrowed_shares
            .checked_sub(request.shares)
            .ok_or(error!(VaultError::MathUnderflow))?;
        self.total_shares = self
            .total_shares
            .checked_sub(request.shares)
            .ok_or(error!(VaultError::MathUnderflow))?;

        Ok((request, payout))
    }

    // =========================================================================
    // Liquidity
    // =========================================================================

    /// Balance above the withdrawal reserve and the configured buffer
    pub fn retrievable_liquidity(&self, vault_balance: u64) -> u64 {
        vault_balance
            .saturating_sub(self.available_for_withdrawal)
            .saturating_sub(self.liquidity_buffer)
    }

    /// Take the part of the withdrawal reserve no settled request can claim
    pub fn take_dust(&mut self) -> Result<u64> {
        let dust = self
            .available_for_withdrawal
            .saturating_sub(self.settled_unpaid_assets);

        if dust == 0 {
            require!(
                self.settled_unpaid_shares == 0,
                VaultError::WithdrawalsOutstanding
            );
            return err!(VaultError::NoDustToSweep);
        }

        self.available_for_withdrawal = self.settled_unpaid_assets;

        Ok(dust)
    }

    // =========================================================================
    // Fees
    // =========================================================================

    /// Accrue the time-proportional fee since the last claim.
    ///
    /// `latest` is the most recent ledger record, None before the first report.
    /// Before bootstrap (nothing reported, nothing minted) the claim is a no-op
    /// that only moves the claim timestamp.
    pub fn claim_maintenance_fee(
        &mut self,
        latest: Option<&TvlRecord>,
        now: i64,
    ) -> Result<FeeAccrual> {
        let latest = match latest {
            Some(latest) if !latest.is_empty() => latest,
            _ => {
                self.last_maintenance_claim_ts = now;
                return Ok(FeeAccrual::default());
            }
        };

        latest.require_fresh(now, self.tvl_freshness_window)?;
        require!(
            now > self.last_maintenance_claim_ts,
            VaultError::AlreadyClaimed
        );

        let elapsed = now - self.last_maintenance_claim_ts;
        self.last_maintenance_claim_ts = now;

        if self.total_shares == 0 || latest.value == 0 {
            return Ok(FeeAccrual::default());
        }

        let tvl_18 = self.normalize_feed(latest.value)?;
        let rate = math::maintenance_rate_per_second(self.maintenance_fee_bps);
        let fee_value = math::maintenance_fee(tvl_18, rate, elapsed as u64)?;
        let shares = math::fee_shares(fee_value, tvl_18, self.total_shares)?;

        Ok(FeeAccrual { fee_value, shares })
    }

    /// Accrue the gain-proportional fee and reset the baseline.
    ///
    /// A loss is not carried forward: the baseline resets to the current TVL
    /// whether or not a fee was charged.
    pub fn claim_performance_fee(
        &mut self,
        latest: Option<&TvlRecord>,
        now: i64,
    ) -> Result<FeeAccrual> {
        let latest = match latest {
            Some(latest) if !latest.is_empty() => latest,
            _ => return Ok(FeeAccrual::default()),
        };

        latest.require_fresh(now, self.tvl_freshness_window)?;

        let tvl_18 = self.normalize_feed(latest.value)?;
        let deposits_18 = self.normalize_asset(self.cumulative_deposit)?;
        let withdrawn_18 = self.normalize_asset(self.cumulative_withdrawn)?;

        let gain = math::performance_gain(tvl_18, self.snapshot_tvl_18, deposits_18, withdrawn_18)?;
        let fee_value =
            math::performance_fee(gain, math::performance_rate(self.performance_fee_bps))?;

        let shares = if tvl_18 == 0 || self.total_shares == 0 {
            0
        } else {
            math::fee_shares(fee_value, tvl_18, self.total_shares)?
        };

        self.snapshot_tvl_18 = tvl_18;
        self.cumulative_deposit = 0;
        self.cumulative_withdrawn = 0;

        Ok(FeeAccrual { fee_value, shares })
    }

    /// Price of one whole share in 18 decimals from fresh data
    pub fn share_price(&self, latest: &TvlRecord, now: i64) -> Result<u128> {
        latest.require_fresh(now, self.tvl_freshness_window)?;
        math::share_price(self.normalize_feed(latest.value)?, self.total_shares)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn validate_maintenance_fee(fee_bps: u16) -> Result<()> {
        require!(
            fee_bps <= MAX_MAINTENANCE_FEE_BPS,
            VaultError::FeeExceedsMax
        );
        Ok(())
    }

    pub fn validate_performance_fee(fee_bps: u16) -> Result<()> {
        require!(
            fee_bps <= MAX_PERFORMANCE_FEE_BPS,
            VaultError::FeeExceedsMax
        );
        Ok(())
    }

    pub fn validate_withdraw_timelock(timelock: i64) -> Result<()> {
        require!(
            (0..=MAX_WITHDRAW_TIMELOCK).contains(&timelock),
            VaultError::InvalidDuration
        );
        Ok(())
    }

    pub fn validate_request_validity(validity: i64) -> Result<()> {
        require!(
            (1..=MAX_REQUEST_VALIDITY).contains(&validity),
            VaultError::InvalidDuration
        );
        Ok(())
    }

    pub fn validate_freshness_window(window: i64) -> Result<()> {
        require!(
            (1..=MAX_FRESHNESS_WINDOW).contains(&window),
            VaultError::InvalidDuration
        );
        Ok(())
    }

    /// The cap may not drop below the latest TVL while that report is fresh
    pub fn set_max_tvl(
        &mut self,
        max_tvl: u128,
        latest: Option<&TvlRecord>,
        now: i64,
    ) -> Result<u128> {
        require!(max_tvl > 0, VaultError::InvalidMaxTvl);
        if let Some(latest) = latest {
            if latest.is_fresh(now, self.tvl_freshness_window) {
                require!(max_tvl >= latest.value, VaultError::InvalidMaxTvl);
            }
        }

        Ok(std::mem::replace(&mut self.max_tvl, max_tvl))
    }

    /// Settle maintenance accrued under the old rate, then switch rates
    pub fn set_maintenance_fee(
        &mut self,
        fee_bps: u16,
        latest: Option<&TvlRecord>,
        now: i64,
    ) -> Result<FeeAccrual> {
        Self::validate_maintenance_fee(fee_bps)?;

        let accrual = if now > self.last_maintenance_claim_ts {
            self.claim_maintenance_fee(latest, now)?
        } else {
            FeeAccrual::default()
        };

        self.maintenance_fee_bps = fee_bps;

        Ok(accrual)
    }

    /// Settle the performance fee under the old rate, then switch rates
    pub fn set_performance_fee(
        &mut self,
        fee_bps: u16,
        latest: Option<&TvlRecord>,
        now: i64,
    ) -> Result<FeeAccrual> {
        Self::validate_performance_fee(fee_bps)?;

        let accrual = self.claim_performance_fee(latest, now)?;
        self.performance_fee_bps = fee_bps;

        Ok(accrual)
    }
}
