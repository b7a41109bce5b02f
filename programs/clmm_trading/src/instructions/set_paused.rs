use anchor_lang::prelude::*;
use crate::state::PoolState;
use crate::events::PoolPausedEvent;

/// Pause or resume a pool
#[derive(Accounts)]
pub struct SetPaused<'info> {
    /// The pool (zero-copy)
    #[account(mut)]
    pub pool_state: AccountLoader<'info, PoolState>,

    /// Pool authority
    pub authority: Signer<'info>,
}

/// Set paused handler
pub fn handler(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let mut pool = ctx.accounts.pool_state.load_mut()?;
    pool.update_paused(&authority, paused)?;

    emit!(PoolPausedEvent {
        pool_id: ctx.accounts.pool_state.key(),
        authority,
        paused,
    });

    msg!("Pool {}", if paused { "paused" } else { "resumed" });

    Ok(())
}
