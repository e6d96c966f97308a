// =============================================================================
// Initialize Feed Instruction
// =============================================================================
// Creates the TVL history ledger for an asset. The feed starts unbound and
// accepts no entries until a vault binds it in initialize_vault.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

use crate::constants::*;
use crate::error::VaultError;
use crate::state::TvlFeed;

#[derive(Accounts)]
pub struct InitializeFeed<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The asset whose vault this feed will report for
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = payer,
        space = 8 + TvlFeed::INIT_SPACE,
        seeds = [TVL_FEED_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub feed: Account<'info, TvlFeed>,

    pub system_program: Program<'info, System>,
}

pub fn handler_initialize_feed(ctx: Context<InitializeFeed>, feed_decimals: u8) -> Result<()> {
    require!(
        feed_decimals <= PRECISION_DECIMALS,
        VaultError::UnsupportedDecimals
    );

    ctx.accounts.feed.set_inner(TvlFeed {
        asset_mint: ctx.accounts.asset_mint.key(),
        decimals: feed_decimals,
        bump: ctx.bumps.feed,
        ..TvlFeed::default()
    });

    msg!(
        "TVL feed created for mint {} ({} decimals)",
        ctx.accounts.asset_mint.key(),
        feed_decimals
    );

    Ok(())
}
