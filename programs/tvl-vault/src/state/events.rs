use anchor_lang::prelude::*;

use crate::state::Role;

#[event]
pub struct TvlAppended {
    pub feed: Pubkey,
    pub index: u64,
    pub value: u128,
    pub supply_snapshot: u128,
    pub ts: i64,
    /// Set when the entry was appended to confirm a deposit
    pub depositor: Option<Pubkey>,
}

#[event]
pub struct DepositRequested {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub expires_at: i64,
    pub ts: i64,
}

#[event]
pub struct DepositConfirmed {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub bound_index: u64,
    pub ts: i64,
}

#[event]
pub struct DepositExecuted {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub bound_index: u64,
    pub requested_amount: u64,
    pub received_amount: u64,
    pub shares_minted: u128,
    pub locked_shares: u128,
    pub total_shares_after: u128,
    pub ts: i64,
}

#[event]
pub struct WithdrawRequested {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub batch_id: u64,
    pub shares: u128,
    pub timelock: i64,
    pub ts: i64,
}

#[event]
pub struct WithdrawCancelled {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub batch_id: u64,
    pub shares: u128,
    pub ts: i64,
}

#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub batch_id: u64,
    pub shares_burned: u128,
    pub amount: u64,
    pub ts: i64,
}

#[event]
pub struct BatchAdvanced {
    pub vault: Pubkey,
    pub closed_batch_id: u64,
    pub closed_batch_shares: u128,
    pub current_batch_id: u64,
    pub ts: i64,
}

#[event]
pub struct BatchSettled {
    pub vault: Pubkey,
    pub batch_id: u64,
    pub rate: u128,
    pub total_shares: u128,
    pub required_amount: u64,
    pub received_amount: u64,
    pub ts: i64,
}

#[derive(Clone, Copy, AnchorSerialize, AnchorDeserialize, PartialEq, Eq, Debug)]
pub enum FeeKind {
    Maintenance,
    Performance,
}

#[event]
pub struct FeeClaimed {
    pub vault: Pubkey,
    pub kind: FeeKind,
    pub recipient: Pubkey,
    /// Fee value in 18 decimals
    pub fee_value: u128,
    pub shares_minted: u128,
    pub ts: i64,
}

#[event]
pub struct LiquidityRetrieved {
    pub vault: Pubkey,
    pub executor: Pubkey,
    pub amount: u64,
    pub ts: i64,
}

#[event]
pub struct DustSwept {
    pub vault: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub ts: i64,
}

#[event]
pub struct SharesTransferred {
    pub vault: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub shares: u128,
    pub ts: i64,
}

#[event]
pub struct RoleUpdated {
    pub vault: Pubkey,
    pub role: Role,
    pub member: Pubkey,
    pub granted: bool,
}

#[derive(Clone, Copy, AnchorSerialize, AnchorDeserialize, PartialEq, Eq, Debug)]
pub enum ConfigField {
    Paused,
    MaintenanceFee,
    PerformanceFee,
    MaxTvl,
    WithdrawTimelock,
    FreshnessWindow,
    RequestValidity,
    MinDeposit,
    LiquidityBuffer,
    WhitelistEnabled,
}

#[event]
pub struct VaultConfigUpdated {
    pub vault: Pubkey,
    pub field: ConfigField,
    pub old_value: u128,
    pub new_value: u128,
    pub ts: i64,
}

#[event]
pub struct WhitelistUpdated {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub whitelisted: bool,
}

#[event]
pub struct FeeRecipientUpdated {
    pub vault: Pubkey,
    pub old_recipient: Pubkey,
    pub new_recipient: Pubkey,
}
