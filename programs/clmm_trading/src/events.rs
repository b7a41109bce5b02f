use anchor_lang::prelude::*;

/// Emitted once per successful swap
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapEvent {
    pub pool_id: Pubkey,
    pub zero_for_one: bool,
    pub is_base_input: bool,
    /// Input amount including fees
    pub amount_in: u64,
    pub amount_out: u64,
    /// Minimum output (base input) or maximum input (base output) requested
    pub amount_out_min: u64,
    pub fee_amount: u64,
    pub protocol_fee: u64,
    pub price_impact: u64,
    pub sqrt_price_limit: u128,
    pub sqrt_price_x64: u128,
    pub liquidity: u128,
    pub tick: i32,
}

#[event]
pub struct LiquidityAddedEvent {
    pub pool_id: Pubkey,
    pub liquidity_added: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub amount_0: u64,
    pub amount_1: u64,
}

#[event]
pub struct LiquidityRemovedEvent {
    pub pool_id: Pubkey,
    pub liquidity_removed: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub amount_0: u64,
    pub amount_1: u64,
}

/// Pool price and accumulators after a state change
#[event]
pub struct PoolUpdateEvent {
    pub pool_id: Pubkey,
    pub sqrt_price: u128,
    pub tick_index: i32,
    pub liquidity: u128,
    pub fee_growth_global_0: u128,
    pub fee_growth_global_1: u128,
}

#[event]
pub struct PositionUpdateEvent {
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub tokens_owed_0: u64,
    pub tokens_owed_1: u64,
    /// "increase", "decrease", "collect" or "close"
    pub update_type: String,
}

#[event]
pub struct FeesCollectedEvent {
    pub pool_id: Pubkey,
    pub owner: Pubkey,
    pub amount_0: u64,
    pub amount_1: u64,
}

#[event]
pub struct ProtocolFeesCollectedEvent {
    pub pool_id: Pubkey,
    pub recipient: Pubkey,
    pub amount_0: u64,
    pub amount_1: u64,
}

#[event]
pub struct PoolPausedEvent {
    pub pool_id: Pubkey,
    pub authority: Pubkey,
    pub paused: bool,
}
