//! Liquidity Math
//!
//! Functions for computing liquidity deltas and token amounts.

use crate::errors::ClmmError;
use crate::math::full_math::{div_rounding_up, u256_to_u64, RESOLUTION, U256};
use anchor_lang::prelude::*;

/// Add a signed liquidity delta to existing liquidity
pub fn add_liquidity_delta(x: u128, y: i128) -> Result<u128> {
    if y < 0 {
        x.checked_sub(y.unsigned_abs())
            .ok_or_else(|| error!(ClmmError::LiquidityOverflow))
    } else {
        x.checked_add(y as u128)
            .ok_or_else(|| error!(ClmmError::LiquidityOverflow))
    }
}

fn sort_prices(sqrt_price_a_x64: u128, sqrt_price_b_x64: u128) -> (u128, u128) {
    if sqrt_price_a_x64 < sqrt_price_b_x64 {
        (sqrt_price_a_x64, sqrt_price_b_x64)
    } else {
        (sqrt_price_b_x64, sqrt_price_a_x64)
    }
}

/// Amount of token 0 between two sqrt prices, `None` when it does not fit in u64
///
/// amount_0 = L * (sp_upper - sp_lower) * 2^64 / (sp_upper * sp_lower)
pub fn try_get_delta_amount_0(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<Option<u64>> {
    let (sqrt_price_lower, sqrt_price_upper) = sort_prices(sqrt_price_a_x64, sqrt_price_b_x64);
    require!(sqrt_price_lower > 0, ClmmError::InvalidSqrtPrice);

    // L * diff < 2^224; shifting by 64 more overflows only when the result exceeds 2^64
    let product = U256::from(liquidity) * U256::from(sqrt_price_upper - sqrt_price_lower);
    if product.bits() > 256 - RESOLUTION as usize {
        return Ok(None);
    }
    let numerator = product << RESOLUTION as usize;
    let upper = U256::from(sqrt_price_upper);
    let lower = U256::from(sqrt_price_lower);

    let amount = if round_up {
        div_rounding_up(div_rounding_up(numerator, upper)?, lower)?
    } else {
        numerator / upper / lower
    };
    Ok(u256_to_u64(amount))
}

/// Amount of token 1 between two sqrt prices, `None` when it does not fit in u64
///
/// amount_1 = L * (sp_upper - sp_lower) / 2^64
pub fn try_get_delta_amount_1(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<Option<u64>> {
    let (sqrt_price_lower, sqrt_price_upper) = sort_prices(sqrt_price_a_x64, sqrt_price_b_x64);

    let product = U256::from(liquidity) * U256::from(sqrt_price_upper - sqrt_price_lower);
    let amount = if round_up {
        div_rounding_up(product, U256::one() << RESOLUTION as usize)?
    } else {
        product >> RESOLUTION as usize
    };
    Ok(u256_to_u64(amount))
}

/// Calculate the amount of token 0 for a liquidity amount over [sqrt_price_a, sqrt_price_b]
pub fn get_delta_amount_0(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64> {
    try_get_delta_amount_0(sqrt_price_a_x64, sqrt_price_b_x64, liquidity, round_up)?
        .ok_or_else(|| error!(ClmmError::MathOverflow))
}

/// Calculate the amount of token 1 for a liquidity amount over [sqrt_price_a, sqrt_price_b]
pub fn get_delta_amount_1(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64> {
    try_get_delta_amount_1(sqrt_price_a_x64, sqrt_price_b_x64, liquidity, round_up)?
        .ok_or_else(|| error!(ClmmError::MathOverflow))
}

/// Token amounts represented by `liquidity` over [sqrt_price_lower, sqrt_price_upper]
/// at the current price
///
/// Below the range the position is all token 0, above it all token 1.
/// Deposits round up, withdrawals round down.
pub fn get_amounts_for_liquidity(
    sqrt_price_current_x64: u128,
    sqrt_price_lower_x64: u128,
    sqrt_price_upper_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<(u64, u64)> {
    if sqrt_price_current_x64 <= sqrt_price_lower_x64 {
        let amount_0 =
            get_delta_amount_0(sqrt_price_lower_x64, sqrt_price_upper_x64, liquidity, round_up)?;
        Ok((amount_0, 0))
    } else if sqrt_price_current_x64 < sqrt_price_upper_x64 {
        let amount_0 =
            get_delta_amount_0(sqrt_price_current_x64, sqrt_price_upper_x64, liquidity, round_up)?;
        let amount_1 =
            get_delta_amount_1(sqrt_price_lower_x64, sqrt_price_current_x64, liquidity, round_up)?;
        Ok((amount_0, amount_1))
    } else {
        let amount_1 =
            get_delta_amount_1(sqrt_price_lower_x64, sqrt_price_upper_x64, liquidity, round_up)?;
        Ok((0, amount_1))
    }
}
