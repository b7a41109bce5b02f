use anchor_lang::prelude::*;
use crate::state::{PoolState, Position};
use crate::engine::close_position;
use crate::errors::ClmmError;
use crate::events::PositionUpdateEvent;

/// Close an empty position and reclaim rent
#[derive(Accounts)]
pub struct ClosePosition<'info> {
    /// The pool (zero-copy, read-only for validation)
    pub pool_state: AccountLoader<'info, PoolState>,

    /// The position to close
    #[account(
        mut,
        close = receiver,
        constraint = position.pool == pool_state.key() @ ClmmError::PositionNotFound,
    )]
    pub position: Box<Account<'info, Position>>,

    /// Position owner
    pub owner: Signer<'info>,

    /// Account to receive rent lamports
    /// CHECK: Any account can receive the rent
    #[account(mut)]
    pub receiver: UncheckedAccount<'info>,
}

/// Close position handler
pub fn handler(ctx: Context<ClosePosition>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let pool = ctx.accounts.pool_state.load()?;
    let position = &ctx.accounts.position;

    close_position(&pool, position, owner)?;

    emit!(PositionUpdateEvent {
        owner,
        pool: ctx.accounts.pool_state.key(),
        liquidity: 0,
        tick_lower_index: position.tick_lower,
        tick_upper_index: position.tick_upper,
        tokens_owed_0: 0,
        tokens_owed_1: 0,
        update_type: "close".to_string(),
    });

    msg!("Position closed");
    msg!("Rent returned to: {}", ctx.accounts.receiver.key());

    Ok(())
}
