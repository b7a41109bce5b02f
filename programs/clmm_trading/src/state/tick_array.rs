use anchor_lang::prelude::*;

use crate::constants::{MAX_TICK, MIN_TICK, TICK_ARRAY_SIZE};
use crate::errors::ClmmError;
use crate::math::bit_math::{is_bit_set, least_significant_bit, most_significant_bit, toggle_bit};
use crate::math::tick_math::floor_to_spacing;
use crate::state::tick::Tick;

// One u64 bitmap word per array
const _: () = assert!(TICK_ARRAY_SIZE == 64, "initialized_bitmap is a single u64 word");

/// Tick Array - stores a contiguous range of tick data
/// PDA: ["tick_array", pool, start_tick_index.to_le_bytes()]
/// Fields ordered to ensure proper alignment (Tick needs 16-byte alignment)
#[account(zero_copy)]
#[repr(C)]
#[derive(Debug)]
pub struct TickArray {
    /// The pool this tick array belongs to
    pub pool: [u8; 32],                           // 32 bytes, offset 0

    /// Starting tick index for this array
    /// Must be divisible by (TICK_ARRAY_SIZE * tick_spacing)
    pub start_tick_index: i32,                    // 4 bytes, offset 32

    /// Bump seed for PDA derivation
    pub bump: u8,                                 // 1 byte, offset 36

    pub _padding: [u8; 3],                        // 3 bytes, offset 37

    /// Bit i set <=> ticks[i].liquidity_gross > 0
    pub initialized_bitmap: u64,                  // 8 bytes, offset 40

    /// Array of ticks (64 ticks per array, each 80 bytes)
    pub ticks: [Tick; TICK_ARRAY_SIZE],           // 5120 bytes, offset 48
}
// Total: 5168 bytes (divisible by 16)

const _: () = assert!(std::mem::size_of::<TickArray>() == 5168);

impl TickArray {
    pub const LEN: usize = 8 + std::mem::size_of::<TickArray>();

    /// Get pool as Pubkey
    pub fn pool_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.pool)
    }

    /// Number of tick indices spanned by one array
    pub fn ticks_in_array(tick_spacing: i32) -> i32 {
        TICK_ARRAY_SIZE as i32 * tick_spacing
    }

    /// Calculate the start index for a tick array containing a given tick
    pub fn get_start_tick_index(tick_index: i32, tick_spacing: i32) -> i32 {
        floor_to_spacing(tick_index, Self::ticks_in_array(tick_spacing))
    }

    /// Validate a start index for the given spacing
    pub fn check_start_tick_index(start_tick_index: i32, tick_spacing: i32) -> Result<()> {
        require!(tick_spacing > 0, ClmmError::InvalidTickSpacing);
        let ticks_in_array = Self::ticks_in_array(tick_spacing);
        require!(
            Self::get_start_tick_index(start_tick_index, tick_spacing) == start_tick_index,
            ClmmError::TickArrayInvalid
        );
        // The array must overlap the valid tick range
        require!(
            start_tick_index <= MAX_TICK && start_tick_index + ticks_in_array > MIN_TICK,
            ClmmError::TickArrayInvalid
        );
        Ok(())
    }

    pub fn initialize(
        &mut self,
        pool: Pubkey,
        start_tick_index: i32,
        tick_spacing: i32,
        bump: u8,
    ) -> Result<()> {
        Self::check_start_tick_index(start_tick_index, tick_spacing)?;
        self.pool = pool.to_bytes();
        self.start_tick_index = start_tick_index;
        self.bump = bump;
        self.initialized_bitmap = 0;
        Ok(())
    }

    /// Check if a tick index falls within this array
    pub fn is_tick_in_array(&self, tick_index: i32, tick_spacing: i32) -> bool {
        tick_index >= self.start_tick_index
            && tick_index < self.start_tick_index + Self::ticks_in_array(tick_spacing)
    }

    /// Offset of an aligned tick within the array
    fn tick_offset(&self, tick_index: i32, tick_spacing: i32) -> Result<usize> {
        require!(
            self.is_tick_in_array(tick_index, tick_spacing),
            ClmmError::TickArrayInvalid
        );
        require!(tick_index % tick_spacing == 0, ClmmError::TickArrayInvalid);
        Ok(((tick_index - self.start_tick_index) / tick_spacing) as usize)
    }

    /// Get the tick at a specific index
    pub fn get_tick(&self, tick_index: i32, tick_spacing: i32) -> Result<&Tick> {
        let offset = self.tick_offset(tick_index, tick_spacing)?;
        Ok(&self.ticks[offset])
    }

    /// Get mutable tick at a specific index
    pub fn get_tick_mut(&mut self, tick_index: i32, tick_spacing: i32) -> Result<&mut Tick> {
        let offset = self.tick_offset(tick_index, tick_spacing)?;
        Ok(&mut self.ticks[offset])
    }

    /// Check if a specific tick is initialized
    pub fn is_tick_initialized(&self, tick_index: i32, tick_spacing: i32) -> Result<bool> {
        let offset = self.tick_offset(tick_index, tick_spacing)?;
        Ok(is_bit_set(self.initialized_bitmap, offset as u8))
    }

    /// Toggle the initialized bit of a tick
    pub fn flip_tick(&mut self, tick_index: i32, tick_spacing: i32) -> Result<()> {
        let offset = self.tick_offset(tick_index, tick_spacing)?;
        self.initialized_bitmap = toggle_bit(self.initialized_bitmap, offset as u8);
        Ok(())
    }

    /// Update tick and return whether the tick was flipped
    #[allow(clippy::too_many_arguments)]
    pub fn update_tick(
        &mut self,
        tick_index: i32,
        tick_spacing: i32,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global_0_x64: u128,
        fee_growth_global_1_x64: u128,
        upper: bool,
    ) -> Result<bool> {
        let tick = self.get_tick_mut(tick_index, tick_spacing)?;
        let flipped = tick.update(
            tick_current,
            tick_index,
            liquidity_delta,
            fee_growth_global_0_x64,
            fee_growth_global_1_x64,
            upper,
        )?;

        if flipped {
            self.flip_tick(tick_index, tick_spacing)?;
        }

        Ok(flipped)
    }

    /// Reset a tick that is no longer referenced
    pub fn clear_tick(&mut self, tick_index: i32, tick_spacing: i32) -> Result<()> {
        let tick = self.get_tick_mut(tick_index, tick_spacing)?;
        require!(tick.liquidity_gross == 0, ClmmError::InvalidPoolState);
        tick.clear();
        Ok(())
    }

    /// Find the next initialized tick within this array with a single word scan
    ///
    /// Downward (`zero_for_one`) returns the greatest initialized tick `<= tick_index`,
    /// upward the smallest initialized tick `> tick_index`.
    pub fn next_initialized_tick(
        &self,
        tick_index: i32,
        tick_spacing: i32,
        zero_for_one: bool,
    ) -> Option<i32> {
        let relative = (tick_index - self.start_tick_index).div_euclid(tick_spacing);

        let masked = if zero_for_one {
            if relative < 0 {
                return None;
            }
            if relative >= TICK_ARRAY_SIZE as i32 - 1 {
                self.initialized_bitmap
            } else {
                self.initialized_bitmap & ((1u64 << (relative + 1)) - 1)
            }
        } else {
            let first = relative + 1;
            if first >= TICK_ARRAY_SIZE as i32 {
                return None;
            }
            if first <= 0 {
                self.initialized_bitmap
            } else {
                self.initialized_bitmap & (u64::MAX << first)
            }
        };

        let bit = if zero_for_one {
            most_significant_bit(masked)
        } else {
            least_significant_bit(masked)
        }?;

        Some(self.start_tick_index + bit as i32 * tick_spacing)
    }
}
