// =============================================================================
// Fee Claim Instructions (Claimer only)
// =============================================================================
// claim_maintenance_fee   - time-proportional fee on the latest TVL
// claim_performance_fee   - fee on the gain since the last performance claim,
//                           net of deposits and withdrawals
//
// Both mint shares to the fee recipient's Depositor at the current TVL/supply
// ratio. The latest ledger entry must be passed once the feed has any.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::{
    AccessControl, Depositor, FeeAccrual, FeeClaimed, FeeKind, Role, TvlEntry, TvlFeed, Vault,
};

#[derive(Accounts)]
pub struct ClaimFee<'info> {
    #[account(
        constraint = access_control.has_role(Role::Claimer, &claimer.key()) @ VaultError::Unauthorized
    )]
    pub claimer: Signer<'info>,

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

    /// Most recent entry of the feed; omitted only while the feed is empty
    pub latest_entry: Option<Account<'info, TvlEntry>>,

    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), vault.fee_recipient.as_ref()],
        bump = fee_recipient.bump
    )]
    pub fee_recipient: Account<'info, Depositor>,
}

pub fn handler_claim_maintenance_fee(ctx: Context<ClaimFee>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let feed_key = ctx.accounts.feed.key();
    let latest = ctx
        .accounts
        .feed
        .latest_record(&feed_key, ctx.accounts.latest_entry.as_deref())?;

    let accrual = ctx
        .accounts
        .vault
        .claim_maintenance_fee(latest.as_ref(), now)?;

    mint_fee_shares(
        &mut ctx.accounts.vault,
        &mut ctx.accounts.fee_recipient,
        FeeKind::Maintenance,
        accrual,
        now,
    )
}

pub fn handler_claim_performance_fee(ctx: Context<ClaimFee>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let feed_key = ctx.accounts.feed.key();
    let latest = ctx
        .accounts
        .feed
        .latest_record(&feed_key, ctx.accounts.latest_entry.as_deref())?;

    let accrual = ctx
        .accounts
        .vault
        .claim_performance_fee(latest.as_ref(), now)?;

    mint_fee_shares(
        &mut ctx.accounts.vault,
        &mut ctx.accounts.fee_recipient,
        FeeKind::Performance,
        accrual,
        now,
    )
}

/// Credit an accrual to the fee recipient and log it
pub fn mint_fee_shares(
    vault: &mut Account<Vault>,
    recipient: &mut Account<Depositor>,
    kind: FeeKind,
    accrual: FeeAccrual,
    now: i64,
) -> Result<()> {
    if accrual.shares > 0 {
        vault.mint_shares(recipient, accrual.shares)?;
    }

    msg!(
        "{:?} fee: value {} (18 decimals), {} shares to {}",
        kind,
        accrual.fee_value,
        accrual.shares,
        recipient.owner
    );

    emit!(FeeClaimed {
        vault: vault.key(),
        kind,
        recipient: recipient.owner,
        fee_value: accrual.fee_value,
        shares_minted: accrual.shares,
        ts: now,
    });

    Ok(())
}
