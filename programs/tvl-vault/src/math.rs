// =============================================================================
// Fixed-Point Math
// =============================================================================
// All TVL, fee and share arithmetic happens at 18 decimals. Asset amounts
// (asset decimals) and TVL values (feed decimals) are scaled up on the way in
// and truncated on the way out, so rounding always favours the vault.
//
// Products of two 18-decimal quantities do not fit in u128, so every
// multiply-then-divide goes through a 256-bit intermediate.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, PRECISION, PRECISION_DECIMALS, SECONDS_PER_YEAR};
use crate::error::VaultError;

#[allow(
    clippy::assign_op_pattern,
    clippy::ptr_offset_with_cast,
    clippy::manual_range_contains,
    clippy::manual_div_ceil
)]
mod u256 {
    uint::construct_uint! {
        pub struct U256(4);
    }
}

pub use u256::U256;

pub fn pow10(exponent: u32) -> Result<u128> {
    10u128
        .checked_pow(exponent)
        .ok_or(error!(VaultError::MathOverflow))
}

/// Exponent needed to lift `decimals` to 18 decimals (0 for 18 or more)
pub fn scale_exponent(decimals: u8) -> u32 {
    u32::from(PRECISION_DECIMALS.saturating_sub(decimals))
}

/// Scale `amount` from `decimals` up to 18 decimals.
///
/// Returns the scaled amount and the exponent used, so the caller can scale
/// back down with [`denormalize`]. Sources with 18 or more decimals are
/// returned unchanged.
pub fn normalize(amount: u128, decimals: u8) -> Result<(u128, u32)> {
    let exponent = scale_exponent(decimals);
    if exponent == 0 {
        return Ok((amount, 0));
    }

    let scaled = amount
        .checked_mul(pow10(exponent)?)
        .ok_or(error!(VaultError::OverflowOnNormalization))?;

    Ok((scaled, exponent))
}

/// Scale an 18-decimal amount back down by `10^exponent`, discarding the remainder
pub fn denormalize(amount_18: u128, exponent: u32) -> Result<u128> {
    Ok(amount_18 / pow10(exponent)?)
}

fn u256_to_u128(value: U256) -> Result<u128> {
    require!(value <= U256::from(u128::MAX), VaultError::MathOverflow);
    Ok(value.as_u128())
}

/// `a * b / denominator` with a 256-bit intermediate, truncating
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, VaultError::DivisionByZero);

    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(error!(VaultError::MathOverflow))?;

    u256_to_u128(product / U256::from(denominator))
}

// =============================================================================
// Share Conversions
// =============================================================================

/// Shares minted for an 18-decimal deposit against a TVL/supply pair.
///
/// An empty pool (supply 0) mints 1:1 with the normalized amount.
pub fn shares_from_token(amount_18: u128, tvl_18: u128, supply: u128) -> Result<u128> {
    if supply == 0 {
        return Ok(amount_18);
    }

    mul_div(amount_18, supply, tvl_18)
}

/// Asset units paid for `shares` at a settlement `rate`.
///
/// `rate` is the price of one whole share (10^18 share units) in whole asset
/// units, expressed with `feed_decimals`. The single final division truncates.
pub fn shares_to_asset(
    shares: u128,
    rate: u128,
    feed_decimals: u8,
    asset_decimals: u8,
) -> Result<u64> {
    let divisor = pow10(u32::from(feed_decimals))?
        .checked_mul(pow10(scale_exponent(asset_decimals))?)
        .ok_or(error!(VaultError::MathOverflow))?;

    let amount = mul_div(shares, rate, divisor)?;

    u64::try_from(amount).map_err(|_| error!(VaultError::MathOverflow))
}

/// Price of one whole share in 18 decimals; 1.0 while no shares exist
pub fn share_price(tvl_18: u128, supply: u128) -> Result<u128> {
    if supply == 0 {
        return Ok(PRECISION);
    }

    mul_div(tvl_18, PRECISION, supply)
}

// =============================================================================
// Fees
// =============================================================================

/// Per-second maintenance rate in 18 decimals for an annual fee in basis points
pub fn maintenance_rate_per_second(annual_fee_bps: u16) -> u128 {
    u128::from(annual_fee_bps) * PRECISION / BPS_DENOMINATOR / SECONDS_PER_YEAR
}

/// `tvl * rate * elapsed / 10^18`, all 18 decimals
pub fn maintenance_fee(tvl_18: u128, rate_per_second: u128, elapsed_seconds: u64) -> Result<u128> {
    let fee = U256::from(tvl_18)
        .checked_mul(U256::from(rate_per_second))
        .and_then(|v| v.checked_mul(U256::from(elapsed_seconds)))
        .ok_or(error!(VaultError::MathOverflow))?;

    u256_to_u128(fee / U256::from(PRECISION))
}

/// Performance rate in 18 decimals for a fee in basis points of gain
pub fn performance_rate(fee_bps: u16) -> u128 {
    u128::from(fee_bps) * PRECISION / BPS_DENOMINATOR
}

/// Gain of `current` over `snapshot + deposits - withdrawn`, floored at zero
pub fn performance_gain(
    current_18: u128,
    snapshot_18: u128,
    deposits_18: u128,
    withdrawn_18: u128,
) -> Result<u128> {
    let inflow = snapshot_18
        .checked_add(deposits_18)
        .ok_or(error!(VaultError::MathOverflow))?;

    if withdrawn_18 >= inflow {
        // baseline is negative: the whole current TVL plus the shortfall is gain
        return current_18
            .checked_add(withdrawn_18 - inflow)
            .ok_or(error!(VaultError::MathOverflow));
    }

    Ok(current_18.saturating_sub(inflow - withdrawn_18))
}

pub fn performance_fee(gain_18: u128, rate_18: u128) -> Result<u128> {
    mul_div(gain_18, rate_18, PRECISION)
}

/// Shares worth `fee_18` at the given TVL/supply ratio
pub fn fee_shares(fee_18: u128, tvl_18: u128, supply: u128) -> Result<u128> {
    if fee_18 == 0 {
        return Ok(0);
    }

    mul_div(fee_18, supply, tvl_18)
}
