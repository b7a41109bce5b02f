//! Tick Math
//!
//! Converts between tick indices and sqrt prices.
//! Based on Uniswap V3's TickMath library, in Q64.64.
//!
//! tick = log_{1.0001}(price) = log(price) / log(1.0001)
//! sqrt_price = sqrt(1.0001^tick) = 1.0001^(tick/2)

use crate::constants::{MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK};
use crate::errors::ClmmError;
use crate::math::full_math::{u256_to_u128, U256};
use anchor_lang::prelude::*;

/// 1/sqrt(1.0001)^(2^i) in Q128.128, for i = 1..18 (bit 0 is handled inline)
const RATIO_MULTIPLIERS: [(u32, u128); 18] = [
    (0x2, 0xfff97272373d413259a46990580e213a),
    (0x4, 0xfff2e50f5f656932ef12357cf3c7fdcc),
    (0x8, 0xffe5caca7e10e4e61c3624eaa0941cd0),
    (0x10, 0xffcb9843d60f6159c9db58835c926644),
    (0x20, 0xff973b41fa98c081472e6896dfb254c0),
    (0x40, 0xff2ea16466c96a3843ec78b326b52861),
    (0x80, 0xfe5dee046a99a2a811c461f1969c3053),
    (0x100, 0xfcbe86c7900a88aedcffc83b479aa3a4),
    (0x200, 0xf987a7253ac413176f2b074cf7815e54),
    (0x400, 0xf3392b0822b70005940c7a398e4b70f3),
    (0x800, 0xe7159475a2c29b7443b29c7fa6e889d9),
    (0x1000, 0xd097f3bdfd2022b8845ad8f792aa5825),
    (0x2000, 0xa9f746462d870fdf8a65dc1f90e061e5),
    (0x4000, 0x70d869a156d2a1b890bb3df62baf32f7),
    (0x8000, 0x31be135f97d08fd981231505542fcfa6),
    (0x10000, 0x9aa508b5b7a84e1c677de54f3e99bc9),
    (0x20000, 0x5d6af8dedb81196699c329225ee604),
    (0x40000, 0x2216e584f5fa1ea926041bedfe98),
];

/// Get sqrt price at a given tick
/// sqrt_price_x64 = sqrt(1.0001^tick) * 2^64
///
/// Uses binary representation of tick to compute efficiently:
/// 1.0001^tick = product of 1.0001^(2^i) for each bit i set in tick
pub fn get_sqrt_price_at_tick(tick: i32) -> Result<u128> {
    require!(tick >= MIN_TICK, ClmmError::MinTickIndexExceeded);
    require!(tick <= MAX_TICK, ClmmError::MaxTickIndexExceeded);

    let abs_tick = tick.unsigned_abs();

    // Q128.128; 1.0 is approximated by u128::MAX
    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(0xfffcb933bd6fad37aa2d162d1a594001u128)
    } else {
        U256::from(u128::MAX)
    };

    for (mask, multiplier) in RATIO_MULTIPLIERS {
        if abs_tick & mask != 0 {
            ratio = (ratio * U256::from(multiplier)) >> 128;
        }
    }

    // Multipliers give 1/1.0001^(|tick|/2); invert for positive ticks
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.64, rounding up so the result is never below the true price
    let remainder = ratio.low_u64();
    let shifted = ratio >> 64;
    let rounded = if remainder == 0 {
        shifted
    } else {
        shifted + U256::one()
    };
    u256_to_u128(rounded)
}

/// Get tick at a given sqrt price
/// Returns the greatest tick whose sqrt price is <= `sqrt_price_x64`
pub fn get_tick_at_sqrt_price(sqrt_price_x64: u128) -> Result<i32> {
    require!(
        (MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64),
        ClmmError::InvalidSqrtPrice
    );

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    while low < high {
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_price_at_tick(mid)? <= sqrt_price_x64 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

/// Check that a tick is inside the tick bounds
pub fn check_tick_bounds(tick: i32) -> Result<()> {
    require!(tick >= MIN_TICK, ClmmError::MinTickIndexExceeded);
    require!(tick <= MAX_TICK, ClmmError::MaxTickIndexExceeded);
    Ok(())
}

/// Check if a tick is valid for the given tick spacing
pub fn is_valid_tick(tick: i32, tick_spacing: i32) -> bool {
    tick_spacing > 0 && (MIN_TICK..=MAX_TICK).contains(&tick) && tick % tick_spacing == 0
}

/// Round a tick down to the nearest multiple of `tick_spacing`
pub fn floor_to_spacing(tick: i32, tick_spacing: i32) -> i32 {
    tick.div_euclid(tick_spacing) * tick_spacing
}
