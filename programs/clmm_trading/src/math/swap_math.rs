//! Swap Math
//!
//! Core swap computation logic: one constant-liquidity step at a time.

use crate::constants::{FEE_RATE_DENOMINATOR, PRICE_IMPACT_DENOMINATOR};
use crate::errors::ClmmError;
use crate::math::full_math::{mul_div, mul_div_round_up, shl_div, RESOLUTION, U256};
use crate::math::liquidity_math::{
    get_delta_amount_0, get_delta_amount_1, try_get_delta_amount_0, try_get_delta_amount_1,
};
use crate::math::sqrt_price_math::{get_next_sqrt_price_from_input, get_next_sqrt_price_from_output};
use anchor_lang::prelude::*;

/// Result of a single swap step computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapStepResult {
    /// The new sqrt price after the swap step
    pub sqrt_price_next_x64: u128,
    /// Amount of input token consumed, excluding fees
    pub amount_in: u64,
    /// Amount of output token produced
    pub amount_out: u64,
    /// Fee amount charged on the input
    pub fee_amount: u64,
}

/// Compute the result of a single swap step
///
/// # Arguments
/// * `sqrt_price_current_x64` - Current sqrt price (Q64.64)
/// * `sqrt_price_target_x64` - Target sqrt price (next tick or price limit)
/// * `liquidity` - Active liquidity
/// * `amount_remaining` - Amount still to be swapped (input or output side)
/// * `fee_rate` - Fee rate in basis points (30 = 0.3%)
/// * `is_base_input` - true if `amount_remaining` is the exact input
///
/// The direction is implied by the target: a lower target means token 0 in.
pub fn compute_swap_step(
    sqrt_price_current_x64: u128,
    sqrt_price_target_x64: u128,
    liquidity: u128,
    amount_remaining: u64,
    fee_rate: u32,
    is_base_input: bool,
) -> Result<SwapStepResult> {
    require!(fee_rate < FEE_RATE_DENOMINATOR, ClmmError::InvalidFeeRate);
    let zero_for_one = sqrt_price_current_x64 >= sqrt_price_target_x64;

    let mut result = SwapStepResult::default();

    // Amount needed to reach the target; None when no u64 amount can get there
    let amount_to_target = if is_base_input {
        let amount_remaining_less_fee = mul_div(
            amount_remaining as u128,
            (FEE_RATE_DENOMINATOR - fee_rate) as u128,
            FEE_RATE_DENOMINATOR as u128,
        )? as u64;

        let amount_in_max = if zero_for_one {
            try_get_delta_amount_0(sqrt_price_target_x64, sqrt_price_current_x64, liquidity, true)?
        } else {
            try_get_delta_amount_1(sqrt_price_current_x64, sqrt_price_target_x64, liquidity, true)?
        };

        result.sqrt_price_next_x64 = match amount_in_max {
            Some(max) if amount_remaining_less_fee >= max => sqrt_price_target_x64,
            _ => get_next_sqrt_price_from_input(
                sqrt_price_current_x64,
                liquidity,
                amount_remaining_less_fee,
                zero_for_one,
            )?,
        };
        amount_in_max
    } else {
        let amount_out_max = if zero_for_one {
            try_get_delta_amount_1(sqrt_price_target_x64, sqrt_price_current_x64, liquidity, false)?
        } else {
            try_get_delta_amount_0(sqrt_price_current_x64, sqrt_price_target_x64, liquidity, false)?
        };

        result.sqrt_price_next_x64 = match amount_out_max {
            Some(max) if amount_remaining >= max => sqrt_price_target_x64,
            _ => get_next_sqrt_price_from_output(
                sqrt_price_current_x64,
                liquidity,
                amount_remaining,
                zero_for_one,
            )?,
        };
        amount_out_max
    };

    let reached_target = result.sqrt_price_next_x64 == sqrt_price_target_x64;
    let sqrt_price_next_x64 = result.sqrt_price_next_x64;

    if zero_for_one {
        result.amount_in = match amount_to_target {
            Some(max) if reached_target && is_base_input => max,
            _ => get_delta_amount_0(sqrt_price_next_x64, sqrt_price_current_x64, liquidity, true)?,
        };
        result.amount_out = match amount_to_target {
            Some(max) if reached_target && !is_base_input => max,
            _ => get_delta_amount_1(sqrt_price_next_x64, sqrt_price_current_x64, liquidity, false)?,
        };
    } else {
        result.amount_in = match amount_to_target {
            Some(max) if reached_target && is_base_input => max,
            _ => get_delta_amount_1(sqrt_price_current_x64, sqrt_price_next_x64, liquidity, true)?,
        };
        result.amount_out = match amount_to_target {
            Some(max) if reached_target && !is_base_input => max,
            _ => get_delta_amount_0(sqrt_price_current_x64, sqrt_price_next_x64, liquidity, false)?,
        };
    }

    // Output can never exceed what was asked for
    if !is_base_input && result.amount_out > amount_remaining {
        result.amount_out = amount_remaining;
    }

    result.fee_amount = if is_base_input && !reached_target {
        // Whatever the price move did not consume is kept as fee
        amount_remaining
            .checked_sub(result.amount_in)
            .ok_or(ClmmError::MathOverflow)?
    } else {
        let fee = mul_div_round_up(
            result.amount_in as u128,
            fee_rate as u128,
            (FEE_RATE_DENOMINATOR - fee_rate) as u128,
        )?;
        u64::try_from(fee).map_err(|_| ClmmError::FeeOverflow)?
    };

    Ok(result)
}

/// Calculate the protocol fee portion of a fee amount
/// `protocol_fee_rate` is in basis points of the fee
pub fn calculate_protocol_fee(fee_amount: u64, protocol_fee_rate: u32) -> Result<u64> {
    if protocol_fee_rate == 0 || fee_amount == 0 {
        return Ok(0);
    }
    let fee = mul_div(
        fee_amount as u128,
        protocol_fee_rate as u128,
        FEE_RATE_DENOMINATOR as u128,
    )?;
    u64::try_from(fee).map_err(|_| ClmmError::FeeOverflow.into())
}

/// Calculate fee growth per unit of liquidity
/// fee_growth = fee_amount * 2^64 / liquidity (Q64.64)
pub fn calculate_fee_growth(fee_amount: u64, liquidity: u128) -> Result<u128> {
    if liquidity == 0 || fee_amount == 0 {
        return Ok(0);
    }
    shl_div(fee_amount as u128, RESOLUTION, liquidity)
}

/// Price impact in basis points between two sqrt prices, measured on price
pub fn price_impact_bps(sqrt_price_before_x64: u128, sqrt_price_after_x64: u128) -> Result<u64> {
    require!(sqrt_price_before_x64 > 0, ClmmError::InvalidSqrtPrice);

    let before = U256::from(sqrt_price_before_x64) * U256::from(sqrt_price_before_x64);
    let after = U256::from(sqrt_price_after_x64) * U256::from(sqrt_price_after_x64);
    let diff = if after > before { after - before } else { before - after };

    // diff and before are < 2^192, so diff * 10_000 fits
    let impact = diff * U256::from(PRICE_IMPACT_DENOMINATOR) / before;
    if impact > U256::from(u64::MAX) {
        return Ok(u64::MAX);
    }
    Ok(impact.low_u64())
}
