use anchor_lang::prelude::*;
use crate::state::{PoolState, Position, TickArray};
use crate::engine::{decrease_position, TickArrayPair};
use crate::errors::ClmmError;
use crate::events::{LiquidityRemovedEvent, PositionUpdateEvent};

/// Decrease liquidity from an existing position
/// Withdrawn tokens are credited to the position and paid out by `collect_fees`
#[derive(Accounts)]
pub struct DecreaseLiquidity<'info> {
    /// The pool (zero-copy)
    #[account(mut)]
    pub pool_state: AccountLoader<'info, PoolState>,

    /// The position to remove liquidity from
    #[account(
        mut,
        constraint = position.pool == pool_state.key() @ ClmmError::PositionNotFound,
    )]
    pub position: Box<Account<'info, Position>>,

    /// Tick array containing the lower tick (zero-copy)
    #[account(mut)]
    pub tick_array_lower: AccountLoader<'info, TickArray>,

    /// Tick array containing the upper tick; omitted when it is `tick_array_lower`
    #[account(mut)]
    pub tick_array_upper: Option<AccountLoader<'info, TickArray>>,

    /// Position owner
    pub owner: Signer<'info>,
}

/// Decrease liquidity handler
pub fn handler(
    ctx: Context<DecreaseLiquidity>,
    liquidity_delta: u128,
    amount_0_min: u64,
    amount_1_min: u64,
) -> Result<()> {
    let timestamp = Clock::get()?.unix_timestamp;
    let owner = ctx.accounts.owner.key();
    let pool_key = ctx.accounts.pool_state.key();

    let change = {
        let mut pool = ctx.accounts.pool_state.load_mut()?;
        let mut lower = ctx.accounts.tick_array_lower.load_mut()?;
        let mut upper = match &ctx.accounts.tick_array_upper {
            Some(loader) => Some(loader.load_mut()?),
            None => None,
        };
        let mut arrays = TickArrayPair::new(&mut lower, upper.as_deref_mut());

        decrease_position(
            &mut pool,
            &mut ctx.accounts.position,
            &mut arrays,
            owner,
            liquidity_delta,
            amount_0_min,
            amount_1_min,
            timestamp,
        )?
    };

    let position = &ctx.accounts.position;
    emit!(LiquidityRemovedEvent {
        pool_id: pool_key,
        liquidity_removed: liquidity_delta,
        tick_lower_index: position.tick_lower,
        tick_upper_index: position.tick_upper,
        amount_0: change.amount_0,
        amount_1: change.amount_1,
    });
    emit!(PositionUpdateEvent {
        owner,
        pool: pool_key,
        liquidity: position.liquidity,
        tick_lower_index: position.tick_lower,
        tick_upper_index: position.tick_upper,
        tokens_owed_0: position.tokens_owed_0,
        tokens_owed_1: position.tokens_owed_1,
        update_type: "decrease".to_string(),
    });

    msg!("Liquidity decreased: {}", liquidity_delta);
    msg!("Amount 0: {}, Amount 1: {}", change.amount_0, change.amount_1);
    msg!("Remaining liquidity: {}", change.liquidity);

    Ok(())
}
