//! Tick array traversal for swaps and position updates.

use anchor_lang::prelude::*;

use crate::constants::{MAX_SWAP_TICK_ARRAYS, MAX_TICK, MIN_TICK, TICK_ARRAY_SIZE};
use crate::errors::ClmmError;
use crate::state::{PoolState, Tick, TickArray};

/// Ordered tick arrays a swap walks through
///
/// The first array contains the current tick; each following array is the
/// adjacent one in swap direction.
pub struct TickArraySequence<'a> {
    arrays: Vec<&'a mut TickArray>,
    tick_spacing: i32,
    zero_for_one: bool,
}

impl<'a> TickArraySequence<'a> {
    pub fn new(
        arrays: Vec<&'a mut TickArray>,
        pool: &PoolState,
        zero_for_one: bool,
    ) -> Result<Self> {
        require!(
            !arrays.is_empty() && arrays.len() <= MAX_SWAP_TICK_ARRAYS,
            ClmmError::TickArrayInvalid
        );

        let tick_spacing = pool.tick_spacing;
        for array in arrays.iter() {
            require!(array.pool == pool.pool_id, ClmmError::TickArrayInvalid);
        }
        require!(
            arrays[0].is_tick_in_array(pool.current_tick_index, tick_spacing),
            ClmmError::TickArrayInvalid
        );

        let step = TickArray::ticks_in_array(tick_spacing);
        for pair in arrays.windows(2) {
            let expected = if zero_for_one {
                pair[0].start_tick_index - step
            } else {
                pair[0].start_tick_index + step
            };
            require!(pair[1].start_tick_index == expected, ClmmError::TickArrayInvalid);
        }

        Ok(Self {
            arrays,
            tick_spacing,
            zero_for_one,
        })
    }

    pub fn zero_for_one(&self) -> bool {
        self.zero_for_one
    }

    /// Next initialized tick in swap direction, or None once the arrays are exhausted
    ///
    /// Downward: greatest initialized tick `<= tick_index`.
    /// Upward: smallest initialized tick `> tick_index`.
    pub fn next_initialized_tick(&self, tick_index: i32) -> Option<i32> {
        self.arrays.iter().find_map(|array| {
            array.next_initialized_tick(tick_index, self.tick_spacing, self.zero_for_one)
        })
    }

    /// Furthest tick the supplied arrays vouch for in swap direction
    pub fn coverage_bound(&self) -> i32 {
        let last_start = self
            .arrays
            .last()
            .map(|array| array.start_tick_index)
            .unwrap_or_default();
        if self.zero_for_one {
            last_start.max(MIN_TICK)
        } else {
            (last_start + (TICK_ARRAY_SIZE as i32 - 1) * self.tick_spacing).min(MAX_TICK)
        }
    }

    pub fn get_tick(&self, tick_index: i32) -> Result<&Tick> {
        let array = self
            .arrays
            .iter()
            .find(|array| array.is_tick_in_array(tick_index, self.tick_spacing))
            .ok_or(ClmmError::TickArrayInvalid)?;
        array.get_tick(tick_index, self.tick_spacing)
    }

    pub fn get_tick_mut(&mut self, tick_index: i32) -> Result<&mut Tick> {
        let tick_spacing = self.tick_spacing;
        let array = self
            .arrays
            .iter_mut()
            .find(|array| array.is_tick_in_array(tick_index, tick_spacing))
            .ok_or(ClmmError::TickArrayInvalid)?;
        array.get_tick_mut(tick_index, tick_spacing)
    }
}

/// The tick arrays holding a position's lower and upper ticks
///
/// A narrow range can keep both ticks in the same array, which is then borrowed once.
pub enum TickArrayPair<'a> {
    Single(&'a mut TickArray),
    Pair {
        lower: &'a mut TickArray,
        upper: &'a mut TickArray,
    },
}

impl<'a> TickArrayPair<'a> {
    pub fn lower(&self) -> &TickArray {
        match self {
            TickArrayPair::Single(array) => array,
            TickArrayPair::Pair { lower, .. } => lower,
        }
    }

    pub fn upper(&self) -> &TickArray {
        match self {
            TickArrayPair::Single(array) => array,
            TickArrayPair::Pair { upper, .. } => upper,
        }
    }

    pub fn lower_mut(&mut self) -> &mut TickArray {
        match self {
            TickArrayPair::Single(array) => array,
            TickArrayPair::Pair { lower, .. } => lower,
        }
    }

    pub fn upper_mut(&mut self) -> &mut TickArray {
        match self {
            TickArrayPair::Single(array) => array,
            TickArrayPair::Pair { upper, .. } => upper,
        }
    }

    /// Check both arrays belong to the pool and hold the range bounds
    pub fn validate(&self, pool: &PoolState, tick_lower: i32, tick_upper: i32) -> Result<()> {
        check_range_arrays(self.lower(), self.upper(), pool, tick_lower, tick_upper)
    }

    /// Pair from the lower array and, when the range spans two arrays, the upper one
    pub fn new(lower: &'a mut TickArray, upper: Option<&'a mut TickArray>) -> Self {
        match upper {
            Some(upper) => TickArrayPair::Pair { lower, upper },
            None => TickArrayPair::Single(lower),
        }
    }
}

/// Check `lower` and `upper` belong to the pool and hold the range bounds
pub fn check_range_arrays(
    lower: &TickArray,
    upper: &TickArray,
    pool: &PoolState,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<()> {
    let spacing = pool.tick_spacing;
    require!(
        lower.pool == pool.pool_id && upper.pool == pool.pool_id,
        ClmmError::TickArrayInvalid
    );
    require!(
        lower.is_tick_in_array(tick_lower, spacing),
        ClmmError::TickArrayInvalid
    );
    require!(
        upper.is_tick_in_array(tick_upper, spacing),
        ClmmError::TickArrayInvalid
    );
    Ok(())
}
