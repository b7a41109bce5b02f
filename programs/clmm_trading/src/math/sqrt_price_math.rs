//! Sqrt Price Math
//!
//! Functions for computing the next sqrt price given token deltas.
//! Prices round in the direction that keeps the pool solvent.

use crate::errors::ClmmError;
use crate::math::full_math::{div_rounding_up, u256_to_u128, RESOLUTION, U256};
use anchor_lang::prelude::*;

/// Get the next sqrt price after adding or removing an amount of token 0
///
/// Adding token 0 lowers the price:
///   new_sqrt_price = L * sqrt_price / (L + amount * sqrt_price)
///
/// Removing token 0 raises it:
///   new_sqrt_price = L * sqrt_price / (L - amount * sqrt_price)
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128> {
    if amount == 0 {
        return Ok(sqrt_price_x64);
    }

    let numerator_1 = U256::from(liquidity) << RESOLUTION as usize;
    let sqrt_price = U256::from(sqrt_price_x64);
    let product = U256::from(amount) * sqrt_price;

    if add {
        let denominator = numerator_1 + product;
        if let Some(numerator) = numerator_1.checked_mul(sqrt_price) {
            return u256_to_u128(div_rounding_up(numerator, denominator)?);
        }
        // L / (L / sqrt_price + amount)
        let fallback = numerator_1 / sqrt_price + U256::from(amount);
        u256_to_u128(div_rounding_up(numerator_1, fallback)?)
    } else {
        require!(numerator_1 > product, ClmmError::InsufficientLiquidity);
        let denominator = numerator_1 - product;
        if let Some(numerator) = numerator_1.checked_mul(sqrt_price) {
            return u256_to_u128(div_rounding_up(numerator, denominator)?);
        }
        let inverse = numerator_1 / sqrt_price;
        require!(inverse > U256::from(amount), ClmmError::InsufficientLiquidity);
        u256_to_u128(div_rounding_up(numerator_1, inverse - U256::from(amount))?)
    }
}

/// Get the next sqrt price after adding or removing an amount of token 1
///
/// Adding token 1 raises the price:
///   new_sqrt_price = sqrt_price + amount / L
///
/// Removing token 1 lowers it:
///   new_sqrt_price = sqrt_price - amount / L
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128> {
    require!(liquidity > 0, ClmmError::InsufficientLiquidity);
    let shifted = U256::from(amount) << RESOLUTION as usize;
    let sqrt_price = U256::from(sqrt_price_x64);

    if add {
        let quotient = shifted / U256::from(liquidity);
        u256_to_u128(sqrt_price + quotient)
    } else {
        let quotient = div_rounding_up(shifted, U256::from(liquidity))?;
        require!(sqrt_price > quotient, ClmmError::InsufficientLiquidity);
        u256_to_u128(sqrt_price - quotient)
    }
}

/// Get the next sqrt price from an input amount
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_in: u64,
    zero_for_one: bool,
) -> Result<u128> {
    require!(sqrt_price_x64 > 0, ClmmError::InvalidSqrtPrice);
    require!(liquidity > 0, ClmmError::InsufficientLiquidity);

    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x64, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x64, liquidity, amount_in, true)
    }
}

/// Get the next sqrt price from an output amount
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_out: u64,
    zero_for_one: bool,
) -> Result<u128> {
    require!(sqrt_price_x64 > 0, ClmmError::InvalidSqrtPrice);
    require!(liquidity > 0, ClmmError::InsufficientLiquidity);

    if zero_for_one {
        get_next_sqrt_price_from_amount_1_rounding_down(
            sqrt_price_x64,
            liquidity,
            amount_out,
            false,
        )
    } else {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x64, liquidity, amount_out, false)
    }
}
