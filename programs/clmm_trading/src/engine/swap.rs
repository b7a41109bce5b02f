//! Swap engine
//!
//! Walks initialized ticks in swap direction, one constant-liquidity step at a
//! time. All mutations are staged: the pool is copied and tick crossings are
//! logged, then committed together once every guard has passed.

use anchor_lang::prelude::*;

use crate::constants::{
    MAX_SQRT_PRICE_X64, MAX_SWAP_STEPS, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK,
};
use crate::engine::tick_sequence::TickArraySequence;
use crate::errors::ClmmError;
use crate::events::SwapEvent;
use crate::math::liquidity_math::add_liquidity_delta;
use crate::math::swap_math::{
    calculate_fee_growth, calculate_protocol_fee, compute_swap_step, price_impact_bps,
};
use crate::math::tick_math::{get_sqrt_price_at_tick, get_tick_at_sqrt_price};
use crate::state::{AmmConfig, ObservationState, PoolState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapParams {
    /// Exact input (base input) or exact output amount
    pub amount: u64,
    /// Minimum output for base input, maximum input for base output
    pub other_amount_threshold: u64,
    /// 0 means no limit
    pub sqrt_price_limit_x64: u128,
    pub is_base_input: bool,
    pub zero_for_one: bool,
}

#[derive(Debug, Clone)]
pub struct SwapResult {
    /// Input amount including fees
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_amount: u64,
    pub protocol_fee: u64,
    pub sqrt_price_x64: u128,
    pub tick: i32,
    pub liquidity: u128,
    pub price_impact_bps: u64,
    pub ticks_crossed: u32,
    pub event: SwapEvent,
}

/// Running totals of the swap loop
#[derive(Debug, Default)]
struct SwapState {
    amount_remaining: u64,
    amount_calculated: u64,
    sqrt_price_x64: u128,
    tick: i32,
    liquidity: u128,
    fee_growth_global_x64: u128,
    fee_amount: u64,
    protocol_fee: u64,
}

/// A tick crossed during the walk, applied to the tick arrays at commit
#[derive(Debug, Clone, Copy)]
struct TickCrossing {
    tick_index: i32,
    fee_growth_global_0_x64: u128,
    fee_growth_global_1_x64: u128,
}

/// Resolve the effective price limit, rejecting limits already passed
fn resolve_price_limit(pool: &PoolState, limit: u128, zero_for_one: bool) -> Result<u128> {
    if limit == 0 {
        return Ok(if zero_for_one {
            MIN_SQRT_PRICE_X64 + 1
        } else {
            MAX_SQRT_PRICE_X64 - 1
        });
    }

    require!(
        limit > MIN_SQRT_PRICE_X64 && limit < MAX_SQRT_PRICE_X64,
        ClmmError::InvalidSqrtPrice
    );
    if zero_for_one {
        require!(limit < pool.sqrt_price_x64, ClmmError::PriceLimitReached);
    } else {
        require!(limit > pool.sqrt_price_x64, ClmmError::PriceLimitReached);
    }
    Ok(limit)
}

/// Execute a swap against the pool
///
/// On error nothing is written: pool, tick arrays and observation state keep
/// their previous contents.
pub fn swap(
    pool: &mut PoolState,
    amm_config: &AmmConfig,
    tick_arrays: &mut TickArraySequence,
    observation: &mut ObservationState,
    params: &SwapParams,
    timestamp: i64,
) -> Result<SwapResult> {
    require!(!pool.is_pool_paused(), ClmmError::PoolPaused);
    require!(params.amount > 0, ClmmError::InsufficientInput);
    require!(
        observation.pool_id == pool.pool_id && observation.observation_count > 0,
        ClmmError::ObservationStateInvalid
    );
    let block_timestamp =
        u32::try_from(timestamp).map_err(|_| error!(ClmmError::ObservationStateInvalid))?;
    require!(
        tick_arrays.zero_for_one() == params.zero_for_one,
        ClmmError::TickArrayInvalid
    );

    let zero_for_one = params.zero_for_one;
    let sqrt_price_limit_x64 =
        resolve_price_limit(pool, params.sqrt_price_limit_x64, zero_for_one)?;

    let mut state = SwapState {
        amount_remaining: params.amount,
        sqrt_price_x64: pool.sqrt_price_x64,
        tick: pool.current_tick_index,
        liquidity: pool.liquidity,
        fee_growth_global_x64: if zero_for_one {
            pool.fee_growth_global_0_x64
        } else {
            pool.fee_growth_global_1_x64
        },
        ..Default::default()
    };
    let mut crossings: Vec<TickCrossing> = Vec::new();
    let mut steps = 0usize;

    while state.amount_remaining > 0
        && state.sqrt_price_x64 != sqrt_price_limit_x64
        && steps < MAX_SWAP_STEPS
    {
        steps += 1;

        let (tick_next, initialized) = match tick_arrays.next_initialized_tick(state.tick) {
            Some(tick) => (tick, true),
            None => (tick_arrays.coverage_bound(), false),
        };
        let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next_tick = get_sqrt_price_at_tick(tick_next)?;

        // Supplied arrays exhausted
        if !initialized
            && ((zero_for_one && state.sqrt_price_x64 <= sqrt_price_next_tick)
                || (!zero_for_one && state.sqrt_price_x64 >= sqrt_price_next_tick))
        {
            break;
        }

        let sqrt_price_target = if zero_for_one {
            sqrt_price_next_tick.max(sqrt_price_limit_x64)
        } else {
            sqrt_price_next_tick.min(sqrt_price_limit_x64)
        };

        let step = compute_swap_step(
            state.sqrt_price_x64,
            sqrt_price_target,
            state.liquidity,
            state.amount_remaining,
            pool.fee_rate,
            params.is_base_input,
        )?;
        state.sqrt_price_x64 = step.sqrt_price_next_x64;

        let amount_in_with_fee = step
            .amount_in
            .checked_add(step.fee_amount)
            .ok_or(ClmmError::MathOverflow)?;
        if params.is_base_input {
            state.amount_remaining = state
                .amount_remaining
                .checked_sub(amount_in_with_fee)
                .ok_or(ClmmError::MathOverflow)?;
            state.amount_calculated = state
                .amount_calculated
                .checked_add(step.amount_out)
                .ok_or(ClmmError::MathOverflow)?;
        } else {
            state.amount_remaining = state
                .amount_remaining
                .checked_sub(step.amount_out)
                .ok_or(ClmmError::MathOverflow)?;
            state.amount_calculated = state
                .amount_calculated
                .checked_add(amount_in_with_fee)
                .ok_or(ClmmError::MathOverflow)?;
        }

        if step.fee_amount > 0 {
            let protocol_fee =
                calculate_protocol_fee(step.fee_amount, amm_config.protocol_fee_rate)?;
            let lp_fee = step.fee_amount - protocol_fee;
            state.fee_amount = state
                .fee_amount
                .checked_add(step.fee_amount)
                .ok_or(ClmmError::FeeOverflow)?;
            state.protocol_fee = state
                .protocol_fee
                .checked_add(protocol_fee)
                .ok_or(ClmmError::FeeOverflow)?;
            if state.liquidity > 0 {
                state.fee_growth_global_x64 = state
                    .fee_growth_global_x64
                    .wrapping_add(calculate_fee_growth(lp_fee, state.liquidity)?);
            }
        }

        if state.sqrt_price_x64 == sqrt_price_next_tick && initialized {
            let (fee_growth_global_0_x64, fee_growth_global_1_x64) = if zero_for_one {
                (state.fee_growth_global_x64, pool.fee_growth_global_1_x64)
            } else {
                (pool.fee_growth_global_0_x64, state.fee_growth_global_x64)
            };
            crossings.push(TickCrossing {
                tick_index: tick_next,
                fee_growth_global_0_x64,
                fee_growth_global_1_x64,
            });

            let liquidity_net = tick_arrays.get_tick(tick_next)?.liquidity_net;
            let liquidity_net = if zero_for_one {
                liquidity_net.checked_neg().ok_or(ClmmError::MathOverflow)?
            } else {
                liquidity_net
            };
            state.liquidity = add_liquidity_delta(state.liquidity, liquidity_net)?;
            state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
        } else {
            state.tick = get_tick_at_sqrt_price(state.sqrt_price_x64)?;
        }
    }

    let consumed = params.amount - state.amount_remaining;
    if consumed == 0 {
        if state.sqrt_price_x64 == sqrt_price_limit_x64 {
            return err!(ClmmError::PriceLimitReached);
        }
        return err!(ClmmError::InsufficientLiquidity);
    }

    let (amount_in, amount_out) = if params.is_base_input {
        (consumed, state.amount_calculated)
    } else {
        (state.amount_calculated, consumed)
    };

    if params.is_base_input {
        require!(
            amount_out >= params.other_amount_threshold,
            ClmmError::SlippageExceeded
        );
    } else {
        require!(
            amount_in <= params.other_amount_threshold,
            ClmmError::SlippageExceeded
        );
    }

    let price_impact = price_impact_bps(pool.sqrt_price_x64, state.sqrt_price_x64)?;
    if amm_config.max_price_impact_bps > 0 {
        require!(
            price_impact <= amm_config.max_price_impact_bps as u64,
            ClmmError::ExcessivePriceImpact
        );
    }

    // Stage the pool; nothing below this point may fail on valid state
    let mut staged = *pool;
    staged.add_protocol_fee(zero_for_one, state.protocol_fee)?;
    if zero_for_one {
        staged.fee_growth_global_0_x64 = state.fee_growth_global_x64;
    } else {
        staged.fee_growth_global_1_x64 = state.fee_growth_global_x64;
    }
    staged.sqrt_price_x64 = state.sqrt_price_x64;
    staged.current_tick_index = state.tick;
    staged.liquidity = state.liquidity;
    staged.last_updated = timestamp;

    for crossing in crossings.iter() {
        tick_arrays.get_tick_mut(crossing.tick_index)?.cross(
            crossing.fee_growth_global_0_x64,
            crossing.fee_growth_global_1_x64,
        );
    }
    // The observation covers the interval that ends now, at the pre-swap state
    observation.record(block_timestamp, pool.current_tick_index, pool.liquidity)?;
    *pool = staged;

    let event = SwapEvent {
        pool_id: pool.pool_id_pubkey(),
        zero_for_one,
        is_base_input: params.is_base_input,
        amount_in,
        amount_out,
        amount_out_min: params.other_amount_threshold,
        fee_amount: state.fee_amount,
        protocol_fee: state.protocol_fee,
        price_impact,
        sqrt_price_limit: params.sqrt_price_limit_x64,
        sqrt_price_x64: pool.sqrt_price_x64,
        liquidity: pool.liquidity,
        tick: pool.current_tick_index,
    };

    Ok(SwapResult {
        amount_in,
        amount_out,
        fee_amount: state.fee_amount,
        protocol_fee: state.protocol_fee,
        sqrt_price_x64: pool.sqrt_price_x64,
        tick: pool.current_tick_index,
        liquidity: pool.liquidity,
        price_impact_bps: price_impact,
        ticks_crossed: crossings.len() as u32,
        event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::position_manager::{collect_fees, open_or_increase_position};
    use crate::engine::tick_sequence::TickArrayPair;
    use crate::state::{Position, TickArray};
    use crate::test_utils::{
        assert_clmm_error, default_amm_config, default_pool, empty_observation_state,
        empty_tick_array,
    };
    use proptest::prelude::*;

    const NOW: i64 = 1_700_000_000;

    struct Fixture {
        pool: PoolState,
        config: AmmConfig,
        upper: TickArray,
        lower: TickArray,
        observation: ObservationState,
        position: Position,
        owner: Pubkey,
    }

    /// Pool at tick 0 with `liquidity` over [-100, 100], arrays at 0 and -640
    fn fixture(liquidity: u128) -> Fixture {
        let mut pool = default_pool(10, 0);
        let mut lower = empty_tick_array(-640);
        let mut upper = empty_tick_array(0);
        let mut position = Position::default();
        let owner = Pubkey::new_unique();
        open_or_increase_position(
            &mut pool,
            &mut position,
            &mut TickArrayPair::Pair {
                lower: &mut lower,
                upper: &mut upper,
            },
            owner,
            -100,
            100,
            liquidity,
            u64::MAX,
            u64::MAX,
            NOW - 100,
        )
        .unwrap();

        Fixture {
            pool,
            config: default_amm_config(),
            upper,
            lower,
            observation: empty_observation_state((NOW - 1_000) as u32),
            position,
            owner,
        }
    }

    /// Collect everything the fixture position is owed
    fn collect_all(f: &mut Fixture) -> (u64, u64) {
        collect_fees(
            &f.pool,
            &mut f.position,
            &f.lower,
            &f.upper,
            f.owner,
            u64::MAX,
            u64::MAX,
            NOW,
        )
        .unwrap()
    }

    fn assert_within_one(actual: u64, expected: u64) {
        assert!(
            actual <= expected && expected - actual <= 1,
            "collected {} for {} earned",
            actual,
            expected
        );
    }

    fn sell_token_0(amount: u64, threshold: u64) -> SwapParams {
        SwapParams {
            amount,
            other_amount_threshold: threshold,
            sqrt_price_limit_x64: 0,
            is_base_input: true,
            zero_for_one: true,
        }
    }

    fn run(fixture: &mut Fixture, params: &SwapParams) -> Result<SwapResult> {
        let arrays = if params.zero_for_one {
            vec![&mut fixture.upper, &mut fixture.lower]
        } else {
            vec![&mut fixture.upper]
        };
        let mut sequence = TickArraySequence::new(arrays, &fixture.pool, params.zero_for_one)?;
        swap(
            &mut fixture.pool,
            &fixture.config,
            &mut sequence,
            &mut fixture.observation,
            params,
            NOW,
        )
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut f = fixture(1_000);
        let before = f.pool;
        assert_clmm_error(run(&mut f, &sell_token_0(0, 0)), ClmmError::InsufficientInput);
        assert_eq!(bytemuck::bytes_of(&before), bytemuck::bytes_of(&f.pool));
    }

    #[test]
    fn test_paused_pool_untouched() {
        let mut f = fixture(1_000);
        f.pool.set_paused(true);
        let before = f.pool;
        assert_clmm_error(run(&mut f, &sell_token_0(1_000, 0)), ClmmError::PoolPaused);
        assert_eq!(bytemuck::bytes_of(&before), bytemuck::bytes_of(&f.pool));
        assert_eq!(f.observation.observation_count, 1);
    }

    #[test]
    fn test_foreign_or_empty_observation_rejected() {
        let mut f = fixture(1_000_000_000);
        f.observation.pool_id = [9u8; 32];
        let before = f.pool;
        assert_clmm_error(
            run(&mut f, &sell_token_0(1_000, 0)),
            ClmmError::ObservationStateInvalid,
        );
        assert_eq!(bytemuck::bytes_of(&before), bytemuck::bytes_of(&f.pool));

        let mut f = fixture(1_000_000_000);
        f.observation.observation_count = 0;
        let before = f.pool;
        let tick_before = *f.upper.get_tick(100, 10).unwrap();
        assert_clmm_error(
            run(&mut f, &sell_token_0(1_000, 0)),
            ClmmError::ObservationStateInvalid,
        );
        assert_eq!(bytemuck::bytes_of(&before), bytemuck::bytes_of(&f.pool));
        assert_eq!(*f.upper.get_tick(100, 10).unwrap(), tick_before);
    }

    #[test]
    fn test_downward_swap_stopping_on_crossed_tick() {
        let mut f = fixture(1_000_000_000);
        let boundary = get_sqrt_price_at_tick(-100).unwrap();
        let params = SwapParams {
            sqrt_price_limit_x64: boundary,
            ..sell_token_0(1_000_000_000, 0)
        };
        let result = run(&mut f, &params).unwrap();

        assert_eq!(result.ticks_crossed, 1);
        assert_eq!(f.pool.sqrt_price_x64, boundary);
        assert_eq!(f.pool.liquidity, 0);
        // The price sits on the upper edge of the tick below the crossed one
        assert_eq!(f.pool.current_tick_index, -101);
        assert_eq!(get_tick_at_sqrt_price(f.pool.sqrt_price_x64).unwrap(), -100);
        assert_eq!(
            get_sqrt_price_at_tick(f.pool.current_tick_index + 1).unwrap(),
            f.pool.sqrt_price_x64
        );

        // Swapping back up crosses -100 once more and restores the range liquidity
        let mut sequence =
            TickArraySequence::new(vec![&mut f.lower, &mut f.upper], &f.pool, false).unwrap();
        let back = swap(
            &mut f.pool,
            &f.config,
            &mut sequence,
            &mut f.observation,
            &SwapParams {
                zero_for_one: false,
                ..sell_token_0(1_000, 0)
            },
            NOW,
        )
        .unwrap();
        assert_eq!(back.ticks_crossed, 1);
        assert_eq!(f.pool.liquidity, 1_000_000_000);
        assert!(f.pool.current_tick_index >= -100);
    }

    #[test]
    fn test_swap_fees_reach_position_selling_token_0() {
        let mut f = fixture(1_000_000_000);
        f.config.protocol_fee_rate = 2_500;
        let result = run(&mut f, &sell_token_0(1_000_000, 0)).unwrap();
        assert_eq!(result.ticks_crossed, 0);
        assert!(result.protocol_fee > 0);

        let (amount_0, amount_1) = collect_all(&mut f);
        assert_within_one(amount_0, result.fee_amount - result.protocol_fee);
        assert_eq!(amount_1, 0);
    }

    #[test]
    fn test_swap_fees_reach_position_buying_token_0() {
        let mut f = fixture(1_000_000_000);
        let params = SwapParams {
            zero_for_one: false,
            ..sell_token_0(1_000_000, 0)
        };
        let result = run(&mut f, &params).unwrap();
        assert!(result.fee_amount > 0);

        let (amount_0, amount_1) = collect_all(&mut f);
        assert_eq!(amount_0, 0);
        assert_within_one(amount_1, result.fee_amount - result.protocol_fee);
    }

    #[test]
    fn test_swap_fees_reach_position_across_crossed_tick() {
        let mut f = fixture(1_000_000_000);
        f.config.protocol_fee_rate = 1_000;
        let result = run(&mut f, &sell_token_0(1_000_000_000, 0)).unwrap();
        assert_eq!(result.ticks_crossed, 1);
        assert_eq!(f.pool.liquidity, 0);

        // Fees earned before the crossing stay claimable once the range is out of reach
        let (amount_0, amount_1) = collect_all(&mut f);
        assert_within_one(amount_0, result.fee_amount - result.protocol_fee);
        assert_eq!(amount_1, 0);
    }

    #[test]
    fn test_large_swap_crosses_range_and_stops_at_array_bound() {
        let mut f = fixture(1_000);
        let result = run(&mut f, &sell_token_0(1_000_000_000, 0)).unwrap();

        // Only ~5 units of token 1 sit in [-100, 0]
        assert_eq!(result.amount_out, 4);
        assert!(result.amount_in < 20);
        assert_eq!(result.ticks_crossed, 1);
        assert_eq!(result.liquidity, 0);
        assert_eq!(f.pool.liquidity, 0);
        assert_eq!(f.pool.current_tick_index, -640);
        assert_eq!(f.pool.sqrt_price_x64, get_sqrt_price_at_tick(-640).unwrap());
        assert_eq!(f.pool.last_updated, NOW);

        // Fee growth was flipped on the crossed tick
        let crossed = f.lower.get_tick(-100, 10).unwrap();
        assert_eq!(crossed.fee_growth_outside_0_x64, f.pool.fee_growth_global_0_x64);

        assert_eq!(f.observation.observation_count, 2);
        assert_eq!(f.observation.latest().unwrap().block_timestamp, NOW as u32);

        assert_eq!(result.event.pool_id, f.pool.pool_id_pubkey());
        assert_eq!(result.event.amount_out, 4);
        assert_eq!(result.event.tick, -640);
    }

    #[test]
    fn test_slippage_leaves_state_untouched() {
        let mut f = fixture(1_000);
        let pool_before = f.pool;
        let tick_before = *f.lower.get_tick(-100, 10).unwrap();

        assert_clmm_error(
            run(&mut f, &sell_token_0(1_000_000_000, 50)),
            ClmmError::SlippageExceeded,
        );
        assert_eq!(bytemuck::bytes_of(&pool_before), bytemuck::bytes_of(&f.pool));
        assert_eq!(*f.lower.get_tick(-100, 10).unwrap(), tick_before);
        assert_eq!(f.observation.observation_count, 1);
    }

    #[test]
    fn test_exact_output_within_range() {
        let mut f = fixture(1_000_000_000);
        let params = SwapParams {
            amount: 1_000,
            other_amount_threshold: 2_000,
            sqrt_price_limit_x64: 0,
            is_base_input: false,
            zero_for_one: true,
        };
        let result = run(&mut f, &params).unwrap();
        assert_eq!(result.amount_out, 1_000);
        assert!(result.amount_in > 1_000);
        assert!(result.fee_amount > 0);
        assert_eq!(f.pool.liquidity, 1_000_000_000);

        let mut f = fixture(1_000_000_000);
        let tight = SwapParams {
            other_amount_threshold: 1_000,
            ..params
        };
        assert_clmm_error(run(&mut f, &tight), ClmmError::SlippageExceeded);
    }

    #[test]
    fn test_price_limit() {
        let mut f = fixture(1_000_000_000);
        let limit = get_sqrt_price_at_tick(-10).unwrap();
        let params = SwapParams {
            sqrt_price_limit_x64: limit,
            ..sell_token_0(1_000_000_000, 0)
        };
        let result = run(&mut f, &params).unwrap();
        assert_eq!(f.pool.sqrt_price_x64, limit);
        assert_eq!(result.tick, -10);
        assert!(result.amount_in < 1_000_000_000);

        // Already at the limit: no progress possible
        assert_clmm_error(run(&mut f, &params), ClmmError::PriceLimitReached);

        // Limit above the current price when selling token 0
        let above = SwapParams {
            sqrt_price_limit_x64: get_sqrt_price_at_tick(10).unwrap(),
            ..params
        };
        assert_clmm_error(run(&mut f, &above), ClmmError::PriceLimitReached);
    }

    #[test]
    fn test_no_liquidity_in_reach() {
        let mut pool = default_pool(10, 0);
        let config = default_amm_config();
        let mut array = empty_tick_array(0);
        let mut observation = empty_observation_state(0);
        let mut sequence = TickArraySequence::new(vec![&mut array], &pool, false).unwrap();
        let params = SwapParams {
            zero_for_one: false,
            ..sell_token_0(1_000, 0)
        };
        assert_clmm_error(
            swap(&mut pool, &config, &mut sequence, &mut observation, &params, NOW),
            ClmmError::InsufficientLiquidity,
        );
    }

    #[test]
    fn test_direction_must_match_sequence() {
        let mut f = fixture(1_000);
        let mut sequence = TickArraySequence::new(vec![&mut f.upper], &f.pool, false).unwrap();
        assert_clmm_error(
            swap(
                &mut f.pool,
                &f.config,
                &mut sequence,
                &mut f.observation,
                &sell_token_0(1_000, 0),
                NOW,
            ),
            ClmmError::TickArrayInvalid,
        );
    }

    #[test]
    fn test_price_impact_guard() {
        let mut f = fixture(1_000);
        f.config.max_price_impact_bps = 100;
        assert_clmm_error(
            run(&mut f, &sell_token_0(1_000_000_000, 0)),
            ClmmError::ExcessivePriceImpact,
        );
    }

    #[test]
    fn test_protocol_fee_accrues_on_input_side() {
        let mut f = fixture(1_000_000_000);
        f.config.protocol_fee_rate = 2_500;
        let result = run(&mut f, &sell_token_0(1_000_000, 0)).unwrap();
        assert!(result.protocol_fee > 0);
        assert_eq!(f.pool.fee_protocol_token_0, result.protocol_fee);
        assert_eq!(f.pool.fee_protocol_token_1, 0);
        assert!(f.pool.fee_growth_global_0_x64 > 0);
    }

    #[test]
    fn test_buy_token_0_moves_price_up() {
        let mut f = fixture(1_000_000_000);
        let params = SwapParams {
            zero_for_one: false,
            ..sell_token_0(100_000, 0)
        };
        let result = run(&mut f, &params).unwrap();
        assert!(f.pool.sqrt_price_x64 > get_sqrt_price_at_tick(0).unwrap());
        assert!(result.tick >= 0);
        assert!(result.amount_out > 0);
        assert_eq!(
            f.pool.current_tick_index,
            get_tick_at_sqrt_price(f.pool.sqrt_price_x64).unwrap()
        );
    }

    proptest! {
        #[test]
        fn prop_output_monotonic_in_input(a in 1u64..5_000_000, b in 1u64..5_000_000) {
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            let mut first = fixture(1_000_000_000);
            let mut second = fixture(1_000_000_000);
            let out_small = run(&mut first, &sell_token_0(small, 0))
                .map(|r| r.amount_out)
                .unwrap_or(0);
            let out_large = run(&mut second, &sell_token_0(large, 0))
                .map(|r| r.amount_out)
                .unwrap_or(0);
            prop_assert!(out_small <= out_large);
        }

        #[test]
        fn prop_tick_matches_price_after_swap(amount in 1u64..50_000_000) {
            let mut f = fixture(1_000_000_000);
            if let Ok(result) = run(&mut f, &sell_token_0(amount, 0)) {
                let price = f.pool.sqrt_price_x64;
                let tick_floor = get_sqrt_price_at_tick(f.pool.current_tick_index).unwrap();
                let tick_ceil = get_sqrt_price_at_tick(f.pool.current_tick_index + 1).unwrap();
                prop_assert!(tick_floor <= price && price <= tick_ceil);
                if price == tick_ceil {
                    // Only a downward cross leaves the price on the upper edge
                    prop_assert!(result.ticks_crossed > 0);
                } else {
                    prop_assert_eq!(
                        f.pool.current_tick_index,
                        get_tick_at_sqrt_price(price).unwrap()
                    );
                }
            }
        }
    }
}
