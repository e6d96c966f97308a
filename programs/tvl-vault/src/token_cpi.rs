// =============================================================================
// Token Transfers
// =============================================================================
// Every asset movement goes through transfer_checked on the token interface,
// so both SPL Token and Token-2022 mints are supported. Inbound transfers
// report what actually arrived, which is less than the amount sent for mints
// with a transfer fee.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};

use crate::error::VaultError;

/// Move `amount` from a user-owned account into `to` and return the balance
/// increase of `to`.
pub fn transfer_measured<'info>(
    token_program: &Interface<'info, TokenInterface>,
    mint: &InterfaceAccount<'info, Mint>,
    from: &InterfaceAccount<'info, TokenAccount>,
    to: &mut InterfaceAccount<'info, TokenAccount>,
    authority: AccountInfo<'info>,
    amount: u64,
) -> Result<u64> {
    let balance_before = to.amount;

    let cpi_ctx = CpiContext::new(
        token_program.to_account_info(),
        TransferChecked {
            from: from.to_account_info(),
            mint: mint.to_account_info(),
            to: to.to_account_info(),
            authority,
        },
    );
    token_interface::transfer_checked(cpi_ctx, amount, mint.decimals)?;

    to.reload()?;

    to.amount
        .checked_sub(balance_before)
        .ok_or(error!(VaultError::MathUnderflow))
}

/// Move `amount` out of the vault token account, signed by the vault PDA
pub fn transfer_from_vault<'info>(
    token_program: &Interface<'info, TokenInterface>,
    mint: &InterfaceAccount<'info, Mint>,
    vault_token_account: &InterfaceAccount<'info, TokenAccount>,
    to: &InterfaceAccount<'info, TokenAccount>,
    vault: AccountInfo<'info>,
    signer_seeds: &[&[u8]],
    amount: u64,
) -> Result<()> {
    let signer = &[signer_seeds];

    let cpi_ctx = CpiContext::new_with_signer(
        token_program.to_account_info(),
        TransferChecked {
            from: vault_token_account.to_account_info(),
            mint: mint.to_account_info(),
            to: to.to_account_info(),
            authority: vault,
        },
        signer,
    );

    token_interface::transfer_checked(cpi_ctx, amount, mint.decimals)
}
