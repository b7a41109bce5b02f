//! Full precision math operations
//!
//! 256-bit intermediates for products of two 128-bit values, used by the
//! liquidity, sqrt price and fee calculations.

use crate::errors::ClmmError;
use anchor_lang::prelude::*;

mod u256 {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer
        pub struct U256(4);
    }
}
pub use u256::U256;

/// Q64 resolution in bits
pub const RESOLUTION: u32 = 64;

/// Narrow a U256 back to u128, failing with MathOverflow
pub fn u256_to_u128(value: U256) -> Result<u128> {
    if value.bits() > 128 {
        return Err(ClmmError::MathOverflow.into());
    }
    Ok(value.low_u128())
}

/// Narrow a U256 to u64 when it fits
pub fn u256_to_u64(value: U256) -> Option<u64> {
    if value.bits() > 64 {
        return None;
    }
    Some(value.low_u64())
}

/// Divide rounding towards positive infinity
pub fn div_rounding_up(numerator: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(ClmmError::MathOverflow.into());
    }
    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        Ok(quotient)
    } else {
        quotient
            .checked_add(U256::one())
            .ok_or_else(|| error!(ClmmError::MathOverflow))
    }
}

/// Multiply two u128 numbers and divide by a third, with full precision
///
/// # Formula
/// result = floor((a * b) / denominator)
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, ClmmError::MathOverflow);
    let product = U256::from(a) * U256::from(b);
    u256_to_u128(product / U256::from(denominator))
}

/// Multiply two u128 numbers and divide by a third, rounding up
pub fn mul_div_round_up(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, ClmmError::MathOverflow);
    let product = U256::from(a) * U256::from(b);
    u256_to_u128(div_rounding_up(product, U256::from(denominator))?)
}

/// Calculate (a * b) >> shift with full precision
pub fn mul_shr(a: u128, b: u128, shift: u32) -> Result<u128> {
    let product = U256::from(a) * U256::from(b);
    u256_to_u128(product >> shift as usize)
}

/// Calculate (a << shift) / b with full precision
pub fn shl_div(a: u128, shift: u32, b: u128) -> Result<u128> {
    require!(b != 0, ClmmError::MathOverflow);
    let numerator = U256::from(a) << shift as usize;
    u256_to_u128(numerator / U256::from(b))
}
