use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{
    DepositOutcome, Depositor, FeeAccrual, TvlEntry, TvlFeed, TvlRecord, Vault, VaultParams,
    WithdrawBatch, WithdrawState,
};
use crate::test_utils::assert_vault_err;

/// One whole asset unit at 6 decimals
const UNIT: u64 = 1_000_000;

/// One whole share
const SHARE: u128 = PRECISION;

/// A vault, its feed and every batch, driven the way the instructions drive
/// them. Asset and feed both use 6 decimals.
struct Harness {
    vault: Vault,
    feed_key: Pubkey,
    feed: TvlFeed,
    entries: Vec<TvlEntry>,
    batches: Vec<WithdrawBatch>,
}

fn default_params() -> VaultParams {
    VaultParams {
        max_tvl: 1_000_000_000 * u128::from(UNIT),
        min_deposit: UNIT,
        request_validity: ONE_HOUR,
        withdraw_timelock: ONE_DAY,
        tvl_freshness_window: ONE_DAY,
        liquidity_buffer: 0,
        maintenance_fee_bps: 100,
        performance_fee_bps: 2_000,
        whitelist_enabled: false,
        lock_bootstrap_shares: false,
        fee_recipient: Pubkey::new_unique(),
    }
}

fn depositor(h: &Harness) -> Depositor {
    Depositor::new(h.feed.vault, Pubkey::new_unique(), 0)
}

impl Harness {
    fn new(params: VaultParams) -> Self {
        let feed_key = Pubkey::new_unique();
        let vault = Vault::new(Pubkey::new_unique(), 6, feed_key, 6, params, 0).unwrap();

        let mut feed = TvlFeed {
            decimals: 6,
            ..TvlFeed::default()
        };
        feed.bind(Pubkey::new_unique()).unwrap();

        Harness {
            vault,
            feed_key,
            feed,
            entries: vec![],
            batches: vec![WithdrawBatch {
                batch_id: FIRST_BATCH_ID,
                ..WithdrawBatch::default()
            }],
        }
    }

    fn append(&mut self, value: u128, now: i64) -> u64 {
        let mut entry = TvlEntry::default();
        let index = self
            .feed
            .append(self.feed_key, &mut entry, value, self.vault.total_shares, now)
            .unwrap();
        self.entries.push(entry);
        index
    }

    fn latest(&self) -> Option<TvlRecord> {
        self.entries.last().map(|entry| entry.record)
    }

    fn confirm(
        &mut self,
        depositor: &mut Depositor,
        value: u128,
        reference_supply: u128,
        now: i64,
    ) -> Result<u64> {
        let mut entry = TvlEntry::default();
        let index = self.feed.append_for_deposit(
            self.feed_key,
            &mut entry,
            value,
            reference_supply,
            self.vault.total_shares,
            now,
        )?;
        self.entries.push(entry);
        depositor.confirm_deposit(index, now)?;
        Ok(index)
    }

    fn execute(
        &mut self,
        depositor: &mut Depositor,
        received: u64,
        now: i64,
    ) -> Result<DepositOutcome> {
        let index = depositor.take_confirmed_deposit(now)?;
        let entry = &self.entries[index as usize];
        self.feed.check_entry(&self.feed_key, entry, index)?;
        self.vault
            .execute_deposit(depositor, &entry.record, received, now)
    }

    /// request -> confirm at the current supply -> execute
    fn deposit(&mut self, depositor: &mut Depositor, tvl: u128, amount: u64, now: i64) -> u128 {
        depositor
            .request_deposit(now, self.vault.request_validity)
            .unwrap();
        let supply = self.vault.total_shares;
        self.confirm(depositor, tvl, supply, now + 1).unwrap();
        self.execute(depositor, amount, now + 2).unwrap().shares
    }

    fn current_batch(&mut self) -> &mut WithdrawBatch {
        let index = (self.vault.current_batch_id - FIRST_BATCH_ID) as usize;
        &mut self.batches[index]
    }

    fn request_withdraw(&mut self, depositor: &mut Depositor, shares: u128, now: i64) -> Result<()> {
        let index = (self.vault.current_batch_id - FIRST_BATCH_ID) as usize;
        self.vault
            .request_withdraw(depositor, &mut self.batches[index], shares, now)
    }

    fn cancel_withdraw(&mut self, depositor: &mut Depositor) -> Result<()> {
        let index = (self.vault.current_batch_id - FIRST_BATCH_ID) as usize;
        self.vault
            .cancel_withdraw(depositor, &mut self.batches[index])
            .map(|_| ())
    }

    fn advance(&mut self) -> Result<bool> {
        let index = (self.vault.current_batch_id - FIRST_BATCH_ID) as usize;
        let advanced = self.vault.advance_batch(&self.batches[index])?;
        if advanced {
            self.batches.push(WithdrawBatch {
                batch_id: self.vault.current_batch_id,
                ..WithdrawBatch::default()
            });
        }
        Ok(advanced)
    }

    fn settle(&mut self, batch_id: u64, rate: u128, received: u64, now: i64) -> Result<u64> {
        let index = (batch_id - FIRST_BATCH_ID) as usize;
        self.vault
            .settle_batch(&mut self.batches[index], rate, received, now)
    }

    fn withdraw(&mut self, depositor: &mut Depositor, now: i64) -> Result<u64> {
        let batch_id = depositor
            .withdraw_request
            .map(|request| request.batch_id)
            .unwrap_or(FIRST_BATCH_ID);
        let index = (batch_id - FIRST_BATCH_ID) as usize;
        self.vault
            .complete_withdraw(depositor, &self.batches[index], now)
            .map(|(_, payout)| payout)
    }
}

#[cfg(test)]
mod deposit_protocol {
    use super::*;

    #[test]
    fn test_bootstrap_deposit_mints_one_to_one() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);

        let shares = h.deposit(&mut alice, 0, 100 * UNIT, 100);

        assert_eq!(shares, 100 * SHARE);
        assert_eq!(alice.shares, 100 * SHARE);
        assert_eq!(h.vault.total_shares, 100 * SHARE);
        assert_eq!(h.vault.cumulative_deposit, u128::from(100 * UNIT));
        assert_eq!(alice.total_deposited, 100 * UNIT);
        assert!(alice.deposit_request.is_none());
        h.vault.check_share_ledger(alice.shares).unwrap();
    }

    #[test]
    fn test_sequential_deposits_keep_price() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);
        let mut bob = depositor(&h);

        h.deposit(&mut alice, 0, 100 * UNIT, 100);
        let bob_shares = h.deposit(&mut bob, u128::from(100 * UNIT), UNIT, 200);

        assert_eq!(bob_shares, SHARE);
        assert_eq!(h.vault.total_shares, 101 * SHARE);

        h.append(u128::from(101 * UNIT), 300);
        let price = h.vault.share_price(&h.latest().unwrap(), 300).unwrap();
        assert_eq!(price, PRECISION);

        h.vault
            .check_share_ledger(alice.shares + bob.shares)
            .unwrap();
    }

    #[test]
    fn test_confirmation_rejected_after_supply_change() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);
        let mut bob = depositor(&h);

        alice.request_deposit(100, ONE_HOUR).unwrap();
        bob.request_deposit(100, ONE_HOUR).unwrap();

        h.confirm(&mut alice, 0, 0, 110).unwrap();
        h.execute(&mut alice, 100 * UNIT, 120).unwrap();
        assert_eq!(h.vault.total_shares, 100 * SHARE);

        // bob was priced against the old supply
        let entries_before = h.feed.entry_count;
        assert_vault_err(h.confirm(&mut bob, 0, 0, 130), VaultError::SupplyMismatch);
        assert_eq!(h.feed.entry_count, entries_before);
        assert!(!bob.deposit_request.unwrap().is_confirmed());

        // bob re-requests once the old request lapses and is priced at the new state
        let later = 100 + ONE_HOUR;
        bob.request_deposit(later, ONE_HOUR).unwrap();
        h.confirm(&mut bob, u128::from(110 * UNIT), 100 * SHARE, later + 1)
            .unwrap();
        let outcome = h.execute(&mut bob, 100 * UNIT, later + 2).unwrap();

        assert_eq!(outcome.shares, 90_909_090_909_090_909_090);
        assert!(outcome.shares < 100 * SHARE);
    }

    #[test]
    fn test_execution_uses_bound_entry_despite_ledger_growth() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);
        let mut bob = depositor(&h);

        h.deposit(&mut alice, 0, 100 * UNIT, 100);

        bob.request_deposit(200, ONE_HOUR).unwrap();
        let bound = h
            .confirm(&mut bob, u128::from(100 * UNIT), 100 * SHARE, 210)
            .unwrap();

        // the vault doubles in value before bob executes
        h.append(u128::from(200 * UNIT), 220);
        h.append(u128::from(200 * UNIT), 230);
        assert!(h.feed.latest_index().unwrap() > bound);

        let outcome = h.execute(&mut bob, 10 * UNIT, 240).unwrap();
        assert_eq!(outcome.shares, 10 * SHARE);
    }

    #[test]
    fn test_bound_index_zero_is_a_valid_binding() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);

        alice.request_deposit(0, ONE_HOUR).unwrap();
        assert_eq!(h.confirm(&mut alice, 0, 0, 1).unwrap(), 0);
        assert_eq!(alice.deposit_request.unwrap().bound_index, Some(0));
        h.execute(&mut alice, UNIT, 2).unwrap();
    }

    #[test]
    fn test_deposit_request_expiry() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);

        alice.request_deposit(0, ONE_HOUR).unwrap();
        assert_vault_err(
            h.confirm(&mut alice, 0, 0, ONE_HOUR),
            VaultError::DepositRequestExpired,
        );

        alice.request_deposit(ONE_HOUR, ONE_HOUR).unwrap();
        h.confirm(&mut alice, 0, 0, ONE_HOUR + 1).unwrap();
        assert_vault_err(
            h.execute(&mut alice, UNIT, 2 * ONE_HOUR),
            VaultError::DepositRequestExpired,
        );
        assert_eq!(h.vault.total_shares, 0);
    }

    #[test]
    fn test_execute_requires_confirmation() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);

        assert_vault_err(h.execute(&mut alice, UNIT, 0), VaultError::NoDepositRequest);

        alice.request_deposit(0, ONE_HOUR).unwrap();
        assert_vault_err(
            h.execute(&mut alice, UNIT, 1),
            VaultError::DepositNotConfirmed,
        );
    }

    #[test]
    fn test_cap_counts_bound_tvl_and_received_amount() {
        let mut h = Harness::new(VaultParams {
            max_tvl: u128::from(150 * UNIT),
            ..default_params()
        });
        let mut alice = depositor(&h);
        let mut bob = depositor(&h);

        h.deposit(&mut alice, 0, 100 * UNIT, 0);

        bob.request_deposit(10, ONE_HOUR).unwrap();
        h.confirm(&mut bob, u128::from(100 * UNIT), 100 * SHARE, 11)
            .unwrap();
        assert_vault_err(
            h.execute(&mut bob, 60 * UNIT, 12),
            VaultError::ExceedsMaxTVL,
        );
    }

    #[test]
    fn test_zero_share_deposit_rejected() {
        let mut h = Harness::new(VaultParams {
            max_tvl: u128::MAX / PRECISION,
            ..default_params()
        });
        let mut alice = depositor(&h);
        let mut bob = depositor(&h);

        h.deposit(&mut alice, 0, UNIT, 0);

        // one share is now worth 10^14 whole units; a single base unit buys nothing
        bob.request_deposit(10, ONE_HOUR).unwrap();
        h.confirm(&mut bob, 100_000_000_000_000_000_000, SHARE, 11)
            .unwrap();
        assert_vault_err(h.execute(&mut bob, 1, 12), VaultError::ZeroCalculated);
    }
}

#[cfg(test)]
mod withdraw_batches {
    use super::*;

    fn funded() -> (Harness, Depositor) {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);
        h.deposit(&mut alice, 0, 100 * UNIT, 0);
        (h, alice)
    }

    #[test]
    fn test_withdraw_flow_pays_shares_times_rate() {
        let (mut h, mut alice) = funded();
        let requested_at = 1_000;

        h.request_withdraw(&mut alice, 50 * SHARE, requested_at)
            .unwrap();
        assert_eq!(h.vault.escrowed_shares, 50 * SHARE);
        assert_eq!(alice.shares, 50 * SHARE);
        h.vault.check_share_ledger(alice.shares).unwrap();

        assert!(h.advance().unwrap());
        assert_eq!(h.vault.current_batch_id, 2);

        // 2.0 asset units per share
        let rate = u128::from(2 * UNIT);
        let required = h.settle(1, rate, 100 * UNIT, requested_at + 10).unwrap();
        assert_eq!(required, 100 * UNIT);
        assert_eq!(h.vault.available_for_withdrawal, 100 * UNIT);
        assert_eq!(h.vault.settled_unpaid_shares, 50 * SHARE);

        let status = alice
            .withdraw_status(Some(&h.batches[0]), 6, 6, requested_at + 10)
            .unwrap();
        assert_eq!(status.state, WithdrawState::Locked);
        assert_eq!(status.asset_amount, 100 * UNIT);

        assert_vault_err(
            h.withdraw(&mut alice, requested_at + ONE_DAY - 1),
            VaultError::TimelockNotElapsed,
        );

        let payout = h.withdraw(&mut alice, requested_at + ONE_DAY).unwrap();
        assert_eq!(payout, 100 * UNIT);
        assert_eq!(alice.total_withdrawn, 100 * UNIT);
        assert!(alice.withdraw_request.is_none());

        assert_eq!(h.vault.total_shares, 50 * SHARE);
        assert_eq!(h.vault.escrowed_shares, 0);
        assert_eq!(h.vault.settled_unpaid_shares, 0);
        assert_eq!(h.vault.available_for_withdrawal, 0);
        h.vault.check_share_ledger(alice.shares).unwrap();
    }

    #[test]
    fn test_withdraw_before_settlement() {
        let (mut h, mut alice) = funded();

        assert_vault_err(h.withdraw(&mut alice, 0), VaultError::NoWithdrawRequest);

        h.request_withdraw(&mut alice, SHARE, 0).unwrap();
        h.advance().unwrap();
        assert_vault_err(
            h.withdraw(&mut alice, ONE_DAY),
            VaultError::BatchNotSettled,
        );
    }

    #[test]
    fn test_timelock_snapshot_survives_config_change() {
        let (mut h, mut alice) = funded();

        h.request_withdraw(&mut alice, SHARE, 0).unwrap();
        h.vault.withdraw_timelock = 10 * ONE_DAY;

        h.advance().unwrap();
        h.settle(1, u128::from(UNIT), UNIT, 1).unwrap();
        assert_eq!(h.withdraw(&mut alice, ONE_DAY).unwrap(), UNIT);
    }

    #[test]
    fn test_settlement_is_strictly_ordered() {
        let (mut h, mut alice) = funded();
        let mut bob = depositor(&h);
        h.deposit(&mut bob, u128::from(100 * UNIT), 100 * UNIT, 10);

        h.request_withdraw(&mut alice, SHARE, 20).unwrap();
        h.advance().unwrap();
        h.request_withdraw(&mut bob, SHARE, 30).unwrap();

        // batch 2 cannot close while batch 1 is unsettled
        assert_vault_err(h.advance(), VaultError::PreviousBatchNotSettled);

        // and cannot settle ahead of batch 1
        let rate = u128::from(UNIT);
        assert_vault_err(h.settle(2, rate, UNIT, 40), VaultError::InvalidBatch);

        h.settle(1, rate, UNIT, 40).unwrap();
        assert_vault_err(h.settle(1, rate, UNIT, 41), VaultError::BatchAlreadySettled);

        assert!(h.advance().unwrap());
        h.settle(2, rate, UNIT, 50).unwrap();
        assert_eq!(h.vault.last_settled_batch_id, 2);
    }

    #[test]
    fn test_settlement_validation() {
        let (mut h, mut alice) = funded();

        assert_vault_err(h.vault.batch_to_settle(), VaultError::NoBatchToSettle);

        h.request_withdraw(&mut alice, 10 * SHARE, 0).unwrap();
        h.advance().unwrap();

        assert_vault_err(h.settle(1, 0, 10 * UNIT, 1), VaultError::InvalidRate);
        assert_vault_err(
            h.settle(1, u128::from(UNIT), 10 * UNIT - 1, 1),
            VaultError::InsufficientTokensForBatch,
        );
        assert_eq!(h.vault.last_settled_batch_id, 0);
        assert!(!h.batches[0].is_settled());
    }

    #[test]
    fn test_empty_batch_does_not_advance() {
        let (mut h, _) = funded();

        assert!(!h.advance().unwrap());
        assert_eq!(h.vault.current_batch_id, FIRST_BATCH_ID);
        assert_eq!(h.batches.len(), 1);
    }

    #[test]
    fn test_cancel_only_while_batch_open() {
        let (mut h, mut alice) = funded();

        assert_vault_err(h.cancel_withdraw(&mut alice), VaultError::NoWithdrawRequest);

        h.request_withdraw(&mut alice, 40 * SHARE, 0).unwrap();
        assert_vault_err(
            h.request_withdraw(&mut alice, SHARE, 1),
            VaultError::WithdrawRequestPending,
        );

        h.cancel_withdraw(&mut alice).unwrap();
        assert_eq!(alice.shares, 100 * SHARE);
        assert_eq!(h.current_batch().total_shares, 0);
        assert_eq!(h.vault.escrowed_shares, 0);

        h.request_withdraw(&mut alice, 40 * SHARE, 2).unwrap();
        h.advance().unwrap();
        assert_vault_err(
            h.cancel_withdraw(&mut alice),
            VaultError::BatchResolvedOrOngoing,
        );
        assert_eq!(h.batches[0].total_shares, 40 * SHARE);
    }

    #[test]
    fn test_request_withdraw_guards() {
        let (mut h, mut alice) = funded();

        assert_vault_err(
            h.request_withdraw(&mut alice, 0, 0),
            VaultError::InvalidAmount,
        );
        assert_vault_err(
            h.request_withdraw(&mut alice, 101 * SHARE, 0),
            VaultError::InsufficientShares,
        );

        h.vault.is_paused = true;
        assert_vault_err(
            h.request_withdraw(&mut alice, SHARE, 0),
            VaultError::VaultPaused,
        );

        h.vault.is_paused = false;
        h.vault.whitelist_enabled = true;
        assert_vault_err(
            h.request_withdraw(&mut alice, SHARE, 0),
            VaultError::NotWhitelisted,
        );

        alice.whitelisted = true;
        h.request_withdraw(&mut alice, SHARE, 0).unwrap();
    }

    #[test]
    fn test_dust_sweep_leaves_owed_payouts() {
        let (mut h, mut alice) = funded();

        h.request_withdraw(&mut alice, 50 * SHARE, 0).unwrap();
        h.advance().unwrap();
        h.settle(1, u128::from(UNIT), 50 * UNIT + 5, 1).unwrap();
        assert_eq!(h.vault.settled_unpaid_assets, 50 * UNIT);

        assert_eq!(h.vault.take_dust().unwrap(), 5);
        assert_eq!(h.vault.available_for_withdrawal, 50 * UNIT);
        assert_vault_err(h.vault.take_dust(), VaultError::WithdrawalsOutstanding);

        h.withdraw(&mut alice, ONE_DAY).unwrap();
        assert_eq!(h.vault.available_for_withdrawal, 0);
        assert_eq!(h.vault.settled_unpaid_assets, 0);
        assert_vault_err(h.vault.take_dust(), VaultError::NoDustToSweep);
    }

    #[test]
    fn test_unpayable_request_does_not_block_sweep() {
        let (mut h, mut alice) = funded();
        let mut bob = depositor(&h);
        h.vault.transfer_shares(&mut alice, &mut bob, 1).unwrap();

        h.request_withdraw(&mut bob, 1, 0).unwrap();
        h.request_withdraw(&mut alice, 10 * SHARE, 0).unwrap();
        h.advance().unwrap();
        let required = h.settle(1, u128::from(UNIT), 10 * UNIT + 7, 1).unwrap();
        assert_eq!(required, 10 * UNIT);

        assert_eq!(h.withdraw(&mut alice, ONE_DAY).unwrap(), 10 * UNIT);

        // one share unit is worth less than one asset unit
        assert_vault_err(h.withdraw(&mut bob, ONE_DAY), VaultError::ZeroCalculated);
        assert_eq!(h.vault.settled_unpaid_shares, 1);

        assert_eq!(h.vault.take_dust().unwrap(), 7);
        assert_eq!(h.vault.available_for_withdrawal, 0);
        assert_vault_err(h.vault.take_dust(), VaultError::WithdrawalsOutstanding);
    }

    #[test]
    fn test_retrievable_liquidity_keeps_reserve() {
        let (mut h, mut alice) = funded();

        h.request_withdraw(&mut alice, 10 * SHARE, 0).unwrap();
        h.advance().unwrap();
        h.settle(1, u128::from(UNIT), 10 * UNIT, 1).unwrap();
        h.vault.liquidity_buffer = 5 * UNIT;

        // 100 deposited + 10 settled, 10 reserved, 5 buffered
        assert_eq!(h.vault.retrievable_liquidity(110 * UNIT), 95 * UNIT);
        assert_eq!(h.vault.retrievable_liquidity(12 * UNIT), 0);
    }
}

#[cfg(test)]
mod fees {
    use super::*;

    #[test]
    fn test_maintenance_fee_one_day() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);
        let mut collector = depositor(&h);

        h.deposit(&mut alice, 0, 100 * UNIT, 10);
        h.append(u128::from(100 * UNIT), ONE_DAY);

        let latest = h.latest();
        let accrual = h
            .vault
            .claim_maintenance_fee(latest.as_ref(), ONE_DAY)
            .unwrap();

        assert_eq!(accrual.fee_value, 2_739_726_020_160_000);
        // TVL equals supply, so fee shares equal the fee value
        assert_eq!(accrual.shares, 2_739_726_020_160_000);

        h.vault.mint_shares(&mut collector, accrual.shares).unwrap();
        h.vault
            .check_share_ledger(alice.shares + collector.shares)
            .unwrap();

        assert_vault_err(
            h.vault.claim_maintenance_fee(latest.as_ref(), ONE_DAY),
            VaultError::AlreadyClaimed,
        );
    }

    #[test]
    fn test_maintenance_fee_requires_fresh_data() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);

        h.deposit(&mut alice, 0, 100 * UNIT, 0);
        h.append(u128::from(100 * UNIT), 100);

        let latest = h.latest();
        assert_vault_err(
            h.vault
                .claim_maintenance_fee(latest.as_ref(), 101 + ONE_DAY),
            VaultError::StaleTvlData,
        );
    }

    #[test]
    fn test_maintenance_fee_skips_before_bootstrap() {
        let mut h = Harness::new(default_params());

        let accrual = h.vault.claim_maintenance_fee(None, 50).unwrap();
        assert_eq!(accrual, FeeAccrual::default());
        assert_eq!(h.vault.last_maintenance_claim_ts, 50);

        h.append(0, 60);
        let latest = h.latest();
        let accrual = h.vault.claim_maintenance_fee(latest.as_ref(), 70).unwrap();
        assert_eq!(accrual, FeeAccrual::default());
        assert_eq!(h.vault.last_maintenance_claim_ts, 70);

        // the all-zero entry has gone stale; both claims still skip
        let stale = 60 + ONE_DAY + 1;
        let accrual = h.vault.claim_maintenance_fee(latest.as_ref(), stale).unwrap();
        assert_eq!(accrual, FeeAccrual::default());
        assert_eq!(h.vault.last_maintenance_claim_ts, stale);

        let accrual = h.vault.claim_performance_fee(latest.as_ref(), stale).unwrap();
        assert_eq!(accrual, FeeAccrual::default());
    }

    #[test]
    fn test_performance_fee_resets_baseline() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);
        let mut collector = depositor(&h);

        h.deposit(&mut alice, 0, 100 * UNIT, 0);

        // +20 over the 100 deposited
        h.append(u128::from(120 * UNIT), 10);
        let latest = h.latest();
        let accrual = h
            .vault
            .claim_performance_fee(latest.as_ref(), 10)
            .unwrap();
        assert_eq!(accrual.fee_value, 4 * SHARE);
        assert_eq!(accrual.shares, 3_333_333_333_333_333_333);
        h.vault.mint_shares(&mut collector, accrual.shares).unwrap();

        assert_eq!(h.vault.snapshot_tvl_18, 120 * SHARE);
        assert_eq!(h.vault.cumulative_deposit, 0);
        assert_eq!(h.vault.cumulative_withdrawn, 0);

        // a loss charges nothing and is not carried forward
        h.append(u128::from(90 * UNIT), 20);
        let latest = h.latest();
        let accrual = h
            .vault
            .claim_performance_fee(latest.as_ref(), 20)
            .unwrap();
        assert_eq!(accrual, FeeAccrual::default());
        assert_eq!(h.vault.snapshot_tvl_18, 90 * SHARE);

        h.append(u128::from(100 * UNIT), 30);
        let latest = h.latest();
        let accrual = h
            .vault
            .claim_performance_fee(latest.as_ref(), 30)
            .unwrap();
        assert_eq!(accrual.fee_value, 2 * SHARE);
        assert_eq!(accrual.shares, 2_066_666_666_666_666_666);
    }

    #[test]
    fn test_performance_gain_nets_flows() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);
        h.deposit(&mut alice, 0, 100 * UNIT, 0);

        h.append(u128::from(100 * UNIT), 1);
        let latest = h.latest();
        h.vault.claim_performance_fee(latest.as_ref(), 1).unwrap();

        // 30 leaves at settlement, TVL drops by exactly that
        h.request_withdraw(&mut alice, 30 * SHARE, 2).unwrap();
        h.advance().unwrap();
        h.settle(1, u128::from(UNIT), 30 * UNIT, 3).unwrap();
        assert_eq!(h.vault.cumulative_withdrawn, u128::from(30 * UNIT));

        h.append(u128::from(70 * UNIT), 4);
        let latest = h.latest();
        let accrual = h
            .vault
            .claim_performance_fee(latest.as_ref(), 4)
            .unwrap();
        assert_eq!(accrual.fee_value, 0);
    }

    #[test]
    fn test_fee_rate_change_settles_old_rate_first() {
        let mut h = Harness::new(default_params());
        let mut alice = depositor(&h);

        h.deposit(&mut alice, 0, 100 * UNIT, 10);
        h.append(u128::from(100 * UNIT), ONE_DAY);

        let latest = h.latest();
        let accrual = h
            .vault
            .set_maintenance_fee(0, latest.as_ref(), ONE_DAY)
            .unwrap();
        assert_eq!(accrual.fee_value, 2_739_726_020_160_000);
        assert_eq!(h.vault.maintenance_fee_bps, 0);

        // same timestamp: nothing left to settle, the rate still changes
        let accrual = h
            .vault
            .set_maintenance_fee(50, latest.as_ref(), ONE_DAY)
            .unwrap();
        assert_eq!(accrual, FeeAccrual::default());
        assert_eq!(h.vault.maintenance_fee_bps, 50);

        assert_vault_err(
            h.vault
                .set_performance_fee(MAX_PERFORMANCE_FEE_BPS + 1, latest.as_ref(), ONE_DAY),
            VaultError::FeeExceedsMax,
        );
    }
}

#[cfg(test)]
mod conservation {
    use super::*;

    #[test]
    fn test_share_ledger_balances_through_a_session() {
        let mut h = Harness::new(VaultParams {
            lock_bootstrap_shares: true,
            ..default_params()
        });
        let mut alice = depositor(&h);
        let mut bob = depositor(&h);
        let mut carol = depositor(&h);

        let check = |h: &Harness, free: &[&Depositor]| {
            let free_shares = free.iter().map(|d| d.shares).sum();
            h.vault.check_share_ledger(free_shares).unwrap();
        };

        h.deposit(&mut alice, 0, 100 * UNIT, 0);
        assert_eq!(h.vault.locked_shares, BOOTSTRAP_LOCKED_SHARES);
        check(&h, &[&alice, &bob, &carol]);

        h.deposit(&mut bob, u128::from(100 * UNIT), 7 * UNIT, 10);
        h.deposit(&mut carol, u128::from(110 * UNIT), 33 * UNIT, 20);
        check(&h, &[&alice, &bob, &carol]);

        h.request_withdraw(&mut alice, 25 * SHARE, 30).unwrap();
        let third = bob.shares / 3;
        h.request_withdraw(&mut bob, third, 30).unwrap();
        check(&h, &[&alice, &bob, &carol]);

        h.cancel_withdraw(&mut bob).unwrap();
        check(&h, &[&alice, &bob, &carol]);

        h.vault
            .transfer_shares(&mut carol, &mut bob, SHARE)
            .unwrap();
        check(&h, &[&alice, &bob, &carol]);

        h.advance().unwrap();
        h.settle(1, 1_100_000, 28 * UNIT, 40).unwrap();
        check(&h, &[&alice, &bob, &carol]);

        let payout = h.withdraw(&mut alice, 30 + ONE_DAY).unwrap();
        assert_eq!(payout, 27_500_000);
        check(&h, &[&alice, &bob, &carol]);
        assert_eq!(h.vault.available_for_withdrawal, 500_000);
    }

    #[test]
    fn test_round_trip_never_pays_more_than_deposited() {
        for (tvl, supply, amount) in [
            (3 * UNIT, 7 * SHARE, UNIT),
            (1_234_567, 999_999_999_999_999_999, 333_333),
            (100 * UNIT, 100 * SHARE, 1),
            (7, 3 * SHARE, 5 * UNIT),
        ] {
            let mut h = Harness::new(default_params());
            let mut alice = depositor(&h);

            // seed the pool at the given supply
            h.vault.total_shares = supply;

            alice.request_deposit(0, ONE_HOUR).unwrap();
            h.confirm(&mut alice, u128::from(tvl), supply, 1).unwrap();
            let shares = h.execute(&mut alice, amount, 2).unwrap().shares;

            // settle at the price the deposit was made at
            let rate = u128::from(tvl) * PRECISION / supply;
            let back = h.vault.shares_to_asset(shares, rate).unwrap();
            assert!(back <= amount, "{} > {}", back, amount);
        }
    }
}
