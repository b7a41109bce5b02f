//! CLMM Trading - Concentrated Liquidity Market Maker pool engine on Solana
//!
//! Liquidity providers concentrate capital inside tick ranges; traders swap
//! against the aggregate liquidity active at the current price.
//!
//! ## Architecture
//!
//! - **Math**: Q64.64 fixed-point tick, sqrt-price and swap-step math
//! - **State**: zero-copy pool, tick arrays and observation ring; Borsh positions and configs
//! - **Engine**: swap loop and position manager, staged and committed only on success
//! - **Instructions**: thin Anchor handlers that validate accounts, call the engine and move tokens
//!
//! ## Security
//!
//! - All arithmetic uses checked operations
//! - Every pool mutation is all-or-nothing
//! - Pool vaults are owned by the pool PDA

use anchor_lang::prelude::*;

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

use instructions::*;

declare_id!("E39ZYh2CjA6ht8nNe5tRUKEWvBQMin8wB9Zi3iyrU8nG");

#[program]
pub mod clmm_trading {
    use super::*;

    // ═══════════════════════════════════════════════════════════════════════════
    // ADMIN INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Create a fee and tick spacing configuration
    ///
    /// # Arguments
    /// * `index` - Config index, part of the PDA seed
    /// * `trade_fee_rate` - Trade fee in basis points
    /// * `protocol_fee_rate` - Share of the trade fee kept by the protocol, in basis points
    /// * `tick_spacing` - Tick spacing for pools created under this config
    /// * `max_price_impact_bps` - Swap price impact cap (0 disables the guard)
    pub fn initialize_amm_config(
        ctx: Context<InitializeAmmConfig>,
        index: u16,
        trade_fee_rate: u32,
        protocol_fee_rate: u32,
        tick_spacing: u16,
        max_price_impact_bps: u32,
    ) -> Result<()> {
        instructions::initialize_amm_config::handler(
            ctx,
            index,
            trade_fee_rate,
            protocol_fee_rate,
            tick_spacing,
            max_price_impact_bps,
        )
    }

    /// Pause or resume a pool
    /// Only the pool authority can call this
    pub fn set_paused(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
        instructions::set_paused::handler(ctx, paused)
    }

    /// Collect accumulated protocol fees from a pool
    /// Only callable by the config owner
    ///
    /// # Arguments
    /// * `amount_0_requested` - Maximum amount of token 0 to collect
    /// * `amount_1_requested` - Maximum amount of token 1 to collect
    pub fn collect_protocol_fees(
        ctx: Context<CollectProtocolFees>,
        amount_0_requested: u64,
        amount_1_requested: u64,
    ) -> Result<()> {
        instructions::collect_protocol_fees::handler(ctx, amount_0_requested, amount_1_requested)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POOL INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Initialize a new liquidity pool
    ///
    /// # Arguments
    /// * `tick_spacing` - Must match the config's tick spacing
    /// * `initial_sqrt_price_x64` - Initial sqrt(price) in Q64.64 format
    pub fn initialize_pool(
        ctx: Context<InitializePool>,
        tick_spacing: i32,
        initial_sqrt_price_x64: u128,
    ) -> Result<()> {
        instructions::initialize_pool::handler(ctx, tick_spacing, initial_sqrt_price_x64)
    }

    /// Initialize a tick array for a pool
    ///
    /// # Arguments
    /// * `start_tick_index` - Starting tick index (must be aligned to the array span)
    pub fn initialize_tick_array(
        ctx: Context<InitializeTickArray>,
        start_tick_index: i32,
    ) -> Result<()> {
        instructions::initialize_tick_array::handler(ctx, start_tick_index)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POSITION INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Open a position or add liquidity to an existing one
    pub fn create_liquidity(
        ctx: Context<CreateLiquidity>,
        params: CreateLiquidityParams,
    ) -> Result<()> {
        instructions::create_liquidity::handler(ctx, params)
    }

    /// Remove liquidity from a position, crediting the tokens as owed
    ///
    /// # Arguments
    /// * `liquidity_delta` - Amount of liquidity to remove
    /// * `amount_0_min` - Minimum amount of token 0 to receive
    /// * `amount_1_min` - Minimum amount of token 1 to receive
    pub fn decrease_liquidity(
        ctx: Context<DecreaseLiquidity>,
        liquidity_delta: u128,
        amount_0_min: u64,
        amount_1_min: u64,
    ) -> Result<()> {
        instructions::decrease_liquidity::handler(ctx, liquidity_delta, amount_0_min, amount_1_min)
    }

    /// Collect owed tokens and fees from a position
    pub fn collect_fees(
        ctx: Context<CollectFees>,
        amount_0_requested: u64,
        amount_1_requested: u64,
    ) -> Result<()> {
        instructions::collect_fees::handler(ctx, amount_0_requested, amount_1_requested)
    }

    /// Close an empty position and reclaim rent
    pub fn close_position(ctx: Context<ClosePosition>) -> Result<()> {
        instructions::close_position::handler(ctx)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SWAP INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Execute a swap on a pool
    /// Tick arrays are passed as remaining accounts
    pub fn swap_v2<'a, 'b, 'c: 'info, 'info>(
        ctx: Context<'a, 'b, 'c, 'info, SwapV2<'info>>,
        params: SwapV2Params,
    ) -> Result<()> {
        instructions::swap_v2::handler(ctx, params)
    }
}
