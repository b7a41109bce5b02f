//! Position manager
//!
//! Adds and removes liquidity over tick ranges and settles owed fees. Each
//! operation works on copies of the two boundary ticks, the position and the
//! pool, and writes them back only after every check has passed.

use anchor_lang::prelude::*;

use crate::engine::tick_sequence::{check_range_arrays, TickArrayPair};
use crate::errors::ClmmError;
use crate::math::liquidity_math::get_amounts_for_liquidity;
use crate::math::tick_math::{check_tick_bounds, get_sqrt_price_at_tick, is_valid_tick};
use crate::state::{PoolState, Position, Tick, TickArray};

/// Token amounts moved by a liquidity change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiquidityChange {
    pub amount_0: u64,
    pub amount_1: u64,
    /// Position liquidity after the change
    pub liquidity: u128,
}

/// Staged result of a liquidity change, not yet written back
struct StagedChange {
    pool: PoolState,
    position: Position,
    tick_lower: Tick,
    tick_upper: Tick,
    flipped_lower: bool,
    flipped_upper: bool,
    amount_0: u64,
    amount_1: u64,
}

/// Validate a position range against the pool's spacing and the tick bounds
pub fn check_tick_range(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> Result<()> {
    require!(tick_lower < tick_upper, ClmmError::InvalidTickRange);
    check_tick_bounds(tick_lower)?;
    check_tick_bounds(tick_upper)?;
    require!(
        is_valid_tick(tick_lower, tick_spacing) && is_valid_tick(tick_upper, tick_spacing),
        ClmmError::InvalidTickRange
    );
    Ok(())
}

/// Compute the effect of `liquidity_delta` on copies of the affected state
fn stage(
    pool: &PoolState,
    position: Position,
    arrays: &TickArrayPair,
    liquidity_delta: i128,
) -> Result<StagedChange> {
    let spacing = pool.tick_spacing;
    let (lower_index, upper_index) = (position.tick_lower, position.tick_upper);

    let mut tick_lower = *arrays.lower().get_tick(lower_index, spacing)?;
    let mut tick_upper = *arrays.upper().get_tick(upper_index, spacing)?;

    let flipped_lower = tick_lower.update(
        pool.current_tick_index,
        lower_index,
        liquidity_delta,
        pool.fee_growth_global_0_x64,
        pool.fee_growth_global_1_x64,
        false,
    )?;
    let flipped_upper = tick_upper.update(
        pool.current_tick_index,
        upper_index,
        liquidity_delta,
        pool.fee_growth_global_0_x64,
        pool.fee_growth_global_1_x64,
        true,
    )?;

    let (fee_growth_inside_0_x64, fee_growth_inside_1_x64) = Tick::get_fee_growth_inside(
        &tick_lower,
        &tick_upper,
        lower_index,
        upper_index,
        pool.current_tick_index,
        pool.fee_growth_global_0_x64,
        pool.fee_growth_global_1_x64,
    );

    let mut position = position;
    position.update(liquidity_delta, fee_growth_inside_0_x64, fee_growth_inside_1_x64)?;

    let (amount_0, amount_1) = if liquidity_delta == 0 {
        (0, 0)
    } else {
        get_amounts_for_liquidity(
            pool.sqrt_price_x64,
            get_sqrt_price_at_tick(lower_index)?,
            get_sqrt_price_at_tick(upper_index)?,
            liquidity_delta.unsigned_abs(),
            liquidity_delta > 0,
        )?
    };

    let mut staged_pool = *pool;
    if liquidity_delta != 0 && pool.is_in_range(lower_index, upper_index) {
        staged_pool.update_liquidity(liquidity_delta)?;
    }

    Ok(StagedChange {
        pool: staged_pool,
        position,
        tick_lower,
        tick_upper,
        flipped_lower,
        flipped_upper,
        amount_0,
        amount_1,
    })
}

/// Write a staged change back; unreferenced ticks are cleared
fn commit(
    staged: StagedChange,
    pool: &mut PoolState,
    position: &mut Position,
    arrays: &mut TickArrayPair,
) -> Result<()> {
    let spacing = pool.tick_spacing;
    let (lower_index, upper_index) = (staged.position.tick_lower, staged.position.tick_upper);

    *arrays.lower_mut().get_tick_mut(lower_index, spacing)? = staged.tick_lower;
    if staged.flipped_lower {
        arrays.lower_mut().flip_tick(lower_index, spacing)?;
        if !staged.tick_lower.is_initialized() {
            arrays.lower_mut().clear_tick(lower_index, spacing)?;
        }
    }

    *arrays.upper_mut().get_tick_mut(upper_index, spacing)? = staged.tick_upper;
    if staged.flipped_upper {
        arrays.upper_mut().flip_tick(upper_index, spacing)?;
        if !staged.tick_upper.is_initialized() {
            arrays.upper_mut().clear_tick(upper_index, spacing)?;
        }
    }

    *position = staged.position;
    *pool = staged.pool;
    Ok(())
}

/// Current fee growth inside the position's range
fn fee_growth_inside(
    pool: &PoolState,
    position: &Position,
    lower: &TickArray,
    upper: &TickArray,
) -> Result<(u128, u128)> {
    let spacing = pool.tick_spacing;
    let tick_lower = lower.get_tick(position.tick_lower, spacing)?;
    let tick_upper = upper.get_tick(position.tick_upper, spacing)?;
    Ok(Tick::get_fee_growth_inside(
        tick_lower,
        tick_upper,
        position.tick_lower,
        position.tick_upper,
        pool.current_tick_index,
        pool.fee_growth_global_0_x64,
        pool.fee_growth_global_1_x64,
    ))
}

fn check_position_owner(position: &Position, pool: &PoolState, owner: &Pubkey) -> Result<()> {
    require!(
        !position.is_new() && position.pool == pool.pool_id_pubkey(),
        ClmmError::PositionNotFound
    );
    require_keys_eq!(position.owner, *owner, ClmmError::InvalidPosition);
    Ok(())
}

/// Open a new position or add liquidity to an existing one
///
/// Returns the token amounts (rounded up) the owner must deposit.
#[allow(clippy::too_many_arguments)]
pub fn open_or_increase_position(
    pool: &mut PoolState,
    position: &mut Position,
    arrays: &mut TickArrayPair,
    owner: Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: u128,
    amount_0_max: u64,
    amount_1_max: u64,
    timestamp: i64,
) -> Result<LiquidityChange> {
    require!(!pool.is_pool_paused(), ClmmError::PoolPaused);
    check_tick_range(tick_lower, tick_upper, pool.tick_spacing)?;
    require!(liquidity_delta > 0, ClmmError::ZeroLiquidity);
    let delta = i128::try_from(liquidity_delta).map_err(|_| error!(ClmmError::LiquidityOverflow))?;
    arrays.validate(pool, tick_lower, tick_upper)?;

    let mut current = position.clone();
    if current.is_new() {
        current.owner = owner;
        current.pool = pool.pool_id_pubkey();
        current.tick_lower = tick_lower;
        current.tick_upper = tick_upper;
        current.created_at = timestamp;
    } else {
        check_position_owner(&current, pool, &owner)?;
        require!(
            current.tick_lower == tick_lower && current.tick_upper == tick_upper,
            ClmmError::InvalidPosition
        );
    }
    current.last_updated = timestamp;

    let mut staged = stage(pool, current, arrays, delta)?;
    require!(
        staged.amount_0 <= amount_0_max && staged.amount_1 <= amount_1_max,
        ClmmError::InsufficientTokenBalance
    );
    staged.pool.last_updated = timestamp;

    let change = LiquidityChange {
        amount_0: staged.amount_0,
        amount_1: staged.amount_1,
        liquidity: staged.position.liquidity,
    };
    commit(staged, pool, position, arrays)?;
    Ok(change)
}

/// Remove liquidity from a position
///
/// The withdrawn amounts (rounded down) are credited to tokens owed and paid
/// out by `collect_fees`.
#[allow(clippy::too_many_arguments)]
pub fn decrease_position(
    pool: &mut PoolState,
    position: &mut Position,
    arrays: &mut TickArrayPair,
    owner: Pubkey,
    liquidity_delta: u128,
    amount_0_min: u64,
    amount_1_min: u64,
    timestamp: i64,
) -> Result<LiquidityChange> {
    require!(!pool.is_pool_paused(), ClmmError::PoolPaused);
    check_position_owner(position, pool, &owner)?;
    require!(position.has_liquidity(), ClmmError::PositionNotFound);
    require!(liquidity_delta > 0, ClmmError::ZeroLiquidity);
    require!(
        liquidity_delta <= position.liquidity,
        ClmmError::InsufficientLiquidity
    );
    arrays.validate(pool, position.tick_lower, position.tick_upper)?;

    let delta = -i128::try_from(liquidity_delta).map_err(|_| error!(ClmmError::LiquidityOverflow))?;

    let mut current = position.clone();
    current.last_updated = timestamp;
    let mut staged = stage(pool, current, arrays, delta)?;
    require!(
        staged.amount_0 >= amount_0_min && staged.amount_1 >= amount_1_min,
        ClmmError::SlippageExceeded
    );
    staged
        .position
        .credit_tokens_owed(staged.amount_0, staged.amount_1)?;
    staged.pool.last_updated = timestamp;

    let change = LiquidityChange {
        amount_0: staged.amount_0,
        amount_1: staged.amount_1,
        liquidity: staged.position.liquidity,
    };
    commit(staged, pool, position, arrays)?;
    Ok(change)
}

/// Settle fees accrued since the last update and release up to the requested amounts
///
/// `lower` and `upper` may be the same array. Returns the amounts to transfer
/// out of the vaults.
#[allow(clippy::too_many_arguments)]
pub fn collect_fees(
    pool: &PoolState,
    position: &mut Position,
    lower: &TickArray,
    upper: &TickArray,
    owner: Pubkey,
    amount_0_requested: u64,
    amount_1_requested: u64,
    timestamp: i64,
) -> Result<(u64, u64)> {
    require!(!pool.is_pool_paused(), ClmmError::PoolPaused);
    check_position_owner(position, pool, &owner)?;

    let mut current = position.clone();
    if current.has_liquidity() {
        check_range_arrays(lower, upper, pool, current.tick_lower, current.tick_upper)?;
        let (inside_0, inside_1) = fee_growth_inside(pool, &current, lower, upper)?;
        current.update(0, inside_0, inside_1)?;
    }

    let amount_0 = current.tokens_owed_0.min(amount_0_requested);
    let amount_1 = current.tokens_owed_1.min(amount_1_requested);
    current.tokens_owed_0 -= amount_0;
    current.tokens_owed_1 -= amount_1;
    current.last_updated = timestamp;

    *position = current;
    Ok((amount_0, amount_1))
}

/// Check a position can be closed: no liquidity and nothing owed
pub fn close_position(pool: &PoolState, position: &Position, owner: Pubkey) -> Result<()> {
    check_position_owner(position, pool, &owner)?;
    require!(position.is_empty(), ClmmError::PositionUpdateFailed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_TICK, MIN_TICK};
    use crate::state::TickArray;
    use crate::test_utils::{assert_clmm_error, default_pool, empty_tick_array};
    use proptest::prelude::*;

    const NOW: i64 = 1_000;

    struct Fixture {
        pool: PoolState,
        lower: TickArray,
        upper: TickArray,
        position: Position,
        owner: Pubkey,
    }

    fn fixture() -> Fixture {
        Fixture {
            pool: default_pool(10, 0),
            lower: empty_tick_array(-640),
            upper: empty_tick_array(0),
            position: Position::default(),
            owner: Pubkey::new_unique(),
        }
    }

    /// Ticks >= 0 live in the array at 0, negative ticks in the array at -640
    fn arrays_for<'a>(
        negative: &'a mut TickArray,
        positive: &'a mut TickArray,
        tick_lower: i32,
        tick_upper: i32,
    ) -> TickArrayPair<'a> {
        match (tick_lower >= 0, tick_upper >= 0) {
            (true, _) => TickArrayPair::Single(positive),
            (false, false) => TickArrayPair::Single(negative),
            (false, true) => TickArrayPair::Pair {
                lower: negative,
                upper: positive,
            },
        }
    }

    fn open(f: &mut Fixture, lower: i32, upper: i32, liquidity: u128) -> Result<LiquidityChange> {
        let owner = f.owner;
        open_or_increase_position(
            &mut f.pool,
            &mut f.position,
            &mut arrays_for(&mut f.lower, &mut f.upper, lower, upper),
            owner,
            lower,
            upper,
            liquidity,
            u64::MAX,
            u64::MAX,
            NOW,
        )
    }

    fn decrease(f: &mut Fixture, liquidity: u128) -> Result<LiquidityChange> {
        let owner = f.owner;
        let (tick_lower, tick_upper) = (f.position.tick_lower, f.position.tick_upper);
        decrease_position(
            &mut f.pool,
            &mut f.position,
            &mut arrays_for(&mut f.lower, &mut f.upper, tick_lower, tick_upper),
            owner,
            liquidity,
            0,
            0,
            NOW + 10,
        )
    }

    #[test]
    fn test_tick_range_validation() {
        assert!(check_tick_range(-100, 100, 10).is_ok());
        assert_clmm_error(check_tick_range(-95, 100, 10), ClmmError::InvalidTickRange);
        assert_clmm_error(check_tick_range(100, 100, 10), ClmmError::InvalidTickRange);
        assert_clmm_error(check_tick_range(100, -100, 10), ClmmError::InvalidTickRange);
        assert_clmm_error(
            check_tick_range(MIN_TICK - 10, 0, 10),
            ClmmError::MinTickIndexExceeded,
        );
        assert_clmm_error(
            check_tick_range(0, MAX_TICK + 10, 10),
            ClmmError::MaxTickIndexExceeded,
        );
    }

    #[test]
    fn test_misaligned_lower_tick_rejected_before_mutation() {
        let mut f = fixture();
        assert_clmm_error(open(&mut f, -95, 100, 1_000), ClmmError::InvalidTickRange);
        assert!(f.position.is_new());
        assert_eq!(f.pool.liquidity, 0);
    }

    #[test]
    fn test_open_in_range_position() {
        let mut f = fixture();
        let change = open(&mut f, -100, 100, 1_000_000).unwrap();

        assert!(change.amount_0 > 0 && change.amount_1 > 0);
        assert_eq!(change.liquidity, 1_000_000);
        assert_eq!(f.pool.liquidity, 1_000_000);
        assert_eq!(f.position.owner, f.owner);
        assert_eq!(f.position.pool, f.pool.pool_id_pubkey());
        assert_eq!(f.position.created_at, NOW);

        let lower = f.lower.get_tick(-100, 10).unwrap();
        assert_eq!(lower.liquidity_net, 1_000_000);
        assert!(f.lower.is_tick_initialized(-100, 10).unwrap());
        let upper = f.upper.get_tick(100, 10).unwrap();
        assert_eq!(upper.liquidity_net, -1_000_000);
        assert!(f.upper.is_tick_initialized(100, 10).unwrap());
    }

    #[test]
    fn test_out_of_range_positions_hold_one_token() {
        let mut f = fixture();
        let above = open(&mut f, 100, 200, 1_000_000).unwrap();
        assert!(above.amount_0 > 0);
        assert_eq!(above.amount_1, 0);
        assert_eq!(f.pool.liquidity, 0);

        let mut f = fixture();
        let below = open(&mut f, -200, -100, 1_000_000).unwrap();
        assert_eq!(below.amount_0, 0);
        assert!(below.amount_1 > 0);
    }

    #[test]
    fn test_amount_above_max_rejected() {
        let mut f = fixture();
        let owner = f.owner;
        let result = open_or_increase_position(
            &mut f.pool,
            &mut f.position,
            &mut TickArrayPair::Pair {
                lower: &mut f.lower,
                upper: &mut f.upper,
            },
            owner,
            -100,
            100,
            1_000_000_000,
            1,
            1,
            NOW,
        );
        assert_clmm_error(result, ClmmError::InsufficientTokenBalance);
        assert_eq!(f.pool.liquidity, 0);
        assert_eq!(f.lower.initialized_bitmap, 0);
        assert_eq!(f.upper.initialized_bitmap, 0);
    }

    #[test]
    fn test_zero_liquidity_and_paused() {
        let mut f = fixture();
        assert_clmm_error(open(&mut f, -100, 100, 0), ClmmError::ZeroLiquidity);
        f.pool.set_paused(true);
        assert_clmm_error(open(&mut f, -100, 100, 1), ClmmError::PoolPaused);
    }

    #[test]
    fn test_narrow_range_in_single_array() {
        let mut pool = default_pool(10, 0);
        let mut array = empty_tick_array(0);
        let mut position = Position::default();
        let owner = Pubkey::new_unique();
        let change = open_or_increase_position(
            &mut pool,
            &mut position,
            &mut TickArrayPair::Single(&mut array),
            owner,
            0,
            50,
            10_000,
            u64::MAX,
            u64::MAX,
            NOW,
        )
        .unwrap();
        assert!(change.amount_0 > 0);
        assert_eq!(pool.liquidity, 10_000);
        assert!(array.is_tick_initialized(0, 10).unwrap());
        assert!(array.is_tick_initialized(50, 10).unwrap());
    }

    #[test]
    fn test_decrease_credits_tokens_owed_and_clears_ticks() {
        let mut f = fixture();
        let added = open(&mut f, -100, 100, 1_000_000).unwrap();
        let removed = decrease(&mut f, 1_000_000).unwrap();

        // Rounding favours the pool
        assert!(removed.amount_0 <= added.amount_0);
        assert!(removed.amount_1 <= added.amount_1);
        assert_eq!(f.position.tokens_owed_0, removed.amount_0);
        assert_eq!(f.position.tokens_owed_1, removed.amount_1);
        assert_eq!(f.position.liquidity, 0);
        assert_eq!(f.pool.liquidity, 0);
        assert_eq!(f.lower.initialized_bitmap, 0);
        assert_eq!(f.upper.initialized_bitmap, 0);
        assert_eq!(*f.lower.get_tick(-100, 10).unwrap(), Tick::default());
    }

    #[test]
    fn test_decrease_errors() {
        let mut f = fixture();
        assert_clmm_error(decrease(&mut f, 1), ClmmError::PositionNotFound);

        open(&mut f, -100, 100, 1_000).unwrap();
        assert_clmm_error(decrease(&mut f, 1_001), ClmmError::InsufficientLiquidity);

        let owner = f.owner;
        let result = decrease_position(
            &mut f.pool,
            &mut f.position,
            &mut TickArrayPair::Pair {
                lower: &mut f.lower,
                upper: &mut f.upper,
            },
            owner,
            1_000,
            u64::MAX,
            0,
            NOW,
        );
        assert_clmm_error(result, ClmmError::SlippageExceeded);
        assert_eq!(f.position.liquidity, 1_000);

        let stranger = Pubkey::new_unique();
        let result = decrease_position(
            &mut f.pool,
            &mut f.position,
            &mut TickArrayPair::Pair {
                lower: &mut f.lower,
                upper: &mut f.upper,
            },
            stranger,
            1,
            0,
            0,
            NOW,
        );
        assert_clmm_error(result, ClmmError::InvalidPosition);
    }

    #[test]
    fn test_collect_fees_and_close() {
        let mut f = fixture();
        open(&mut f, -100, 100, 1_000).unwrap();

        // Fees accrued while in range: one token per unit of liquidity on side 0
        f.pool.fee_growth_global_0_x64 = 1u128 << 64;

        let (amount_0, amount_1) = collect_fees(
            &f.pool, &mut f.position, &f.lower, &f.upper, f.owner, 400, u64::MAX, NOW,
        )
        .unwrap();
        assert_eq!((amount_0, amount_1), (400, 0));
        assert_eq!(f.position.tokens_owed_0, 600);

        let (amount_0, _) = collect_fees(
            &f.pool, &mut f.position, &f.lower, &f.upper, f.owner, u64::MAX, u64::MAX, NOW,
        )
        .unwrap();
        assert_eq!(amount_0, 600);

        assert_clmm_error(
            close_position(&f.pool, &f.position, f.owner),
            ClmmError::PositionUpdateFailed,
        );

        decrease(&mut f, 1_000).unwrap();
        collect_fees(
            &f.pool, &mut f.position, &f.lower, &f.upper, f.owner, u64::MAX, u64::MAX, NOW,
        )
        .unwrap();
        assert!(close_position(&f.pool, &f.position, f.owner).is_ok());

        let stranger = Pubkey::new_unique();
        assert_clmm_error(
            close_position(&f.pool, &f.position, stranger),
            ClmmError::InvalidPosition,
        );
    }

    proptest! {
        #[test]
        fn prop_open_then_decrease_restores_pool_liquidity(
            lower in -60i32..0,
            upper in 0i32..60,
            liquidity in 1u128..1_000_000_000_000,
            existing in 0u128..1_000_000,
        ) {
            let mut f = fixture();
            f.pool.liquidity = existing;
            let (tick_lower, tick_upper) = (lower * 10, upper * 10);
            let before = f.pool.liquidity;

            open(&mut f, tick_lower, tick_upper, liquidity).unwrap();
            decrease(&mut f, liquidity).unwrap();

            prop_assert_eq!(f.pool.liquidity, before);
            prop_assert_eq!(f.lower.initialized_bitmap, 0);
            prop_assert_eq!(f.upper.initialized_bitmap, 0);
        }
    }
}
