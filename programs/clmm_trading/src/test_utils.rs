//! In-memory fixtures shared by unit tests

use anchor_lang::prelude::*;
use bytemuck::Zeroable;

use crate::errors::ClmmError;
use crate::math::tick_math::get_sqrt_price_at_tick;
use crate::state::{AmmConfig, ObservationState, PoolState, TickArray};

pub const TEST_POOL_KEY: [u8; 32] = [7u8; 32];

/// Tick spacing assumed by `empty_tick_array`
pub const TEST_TICK_SPACING: i32 = 10;

pub fn test_pool_pubkey() -> Pubkey {
    Pubkey::new_from_array(TEST_POOL_KEY)
}

/// Running pool at `tick` with no liquidity and a 0.30% fee
pub fn default_pool(tick_spacing: i32, tick: i32) -> PoolState {
    let mut pool = PoolState::zeroed();
    pool.pool_id = TEST_POOL_KEY;
    pool.authority = [1u8; 32];
    pool.tick_spacing = tick_spacing;
    pool.tick_spacing_seed = tick_spacing as u16;
    pool.current_tick_index = tick;
    pool.sqrt_price_x64 = get_sqrt_price_at_tick(tick).unwrap();
    pool.fee_rate = 30;
    pool
}

pub fn default_amm_config() -> AmmConfig {
    AmmConfig {
        trade_fee_rate: 30,
        protocol_fee_rate: 0,
        tick_spacing: TEST_TICK_SPACING as u16,
        max_price_impact_bps: 0,
        ..Default::default()
    }
}

/// Tick array of the test pool with spacing `TEST_TICK_SPACING`
pub fn empty_tick_array(start_tick_index: i32) -> TickArray {
    let mut array = TickArray::zeroed();
    array
        .initialize(test_pool_pubkey(), start_tick_index, TEST_TICK_SPACING, 255)
        .unwrap();
    array
}

pub fn empty_observation_state(timestamp: u32) -> ObservationState {
    let mut state = ObservationState::zeroed();
    state.initialize(test_pool_pubkey(), timestamp);
    state
}

/// Assert that `result` failed with exactly `expected`
pub fn assert_clmm_error<T: std::fmt::Debug>(result: Result<T>, expected: ClmmError) {
    match result {
        Err(anchor_lang::error::Error::AnchorError(error)) => {
            assert_eq!(
                error.error_code_number,
                u32::from(expected),
                "unexpected error: {}",
                error.error_name
            );
        }
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}
