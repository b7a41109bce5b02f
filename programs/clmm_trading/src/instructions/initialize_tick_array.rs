use anchor_lang::prelude::*;
use crate::state::{PoolState, TickArray};
use crate::constants::seeds;
use crate::errors::ClmmError;

/// Initialize a tick array for a pool
/// Tick arrays must be initialized before positions can reference ticks within them
#[derive(Accounts)]
#[instruction(start_tick_index: i32)]
pub struct InitializeTickArray<'info> {
    /// The pool this tick array belongs to (zero-copy)
    pub pool_state: AccountLoader<'info, PoolState>,

    /// The tick array to initialize (zero-copy)
    #[account(
        init,
        payer = payer,
        space = TickArray::LEN,
        seeds = [
            seeds::TICK_ARRAY_SEED,
            pool_state.key().as_ref(),
            &start_tick_index.to_le_bytes()
        ],
        bump
    )]
    pub tick_array: AccountLoader<'info, TickArray>,

    /// The payer for account creation
    #[account(mut)]
    pub payer: Signer<'info>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Initialize tick array handler
pub fn handler(
    ctx: Context<InitializeTickArray>,
    start_tick_index: i32,
) -> Result<()> {
    let pool_key = ctx.accounts.pool_state.key();
    let tick_spacing = {
        let pool = ctx.accounts.pool_state.load()?;
        require!(!pool.is_pool_paused(), ClmmError::PoolPaused);
        pool.tick_spacing
    };
    TickArray::check_start_tick_index(start_tick_index, tick_spacing)?;

    ctx.accounts.tick_array.load_init()?.initialize(
        pool_key,
        start_tick_index,
        tick_spacing,
        ctx.bumps.tick_array,
    )?;

    let span = TickArray::ticks_in_array(tick_spacing);
    msg!(
        "Tick array [{}, {}) initialized for pool {}",
        start_tick_index,
        start_tick_index + span,
        pool_key
    );

    Ok(())
}
