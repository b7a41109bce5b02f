use anchor_lang::prelude::*;
use bytemuck::{Pod, Zeroable};

use crate::errors::ClmmError;
use crate::math::liquidity_math::add_liquidity_delta;

/// Tick data - stored within tick arrays
/// Each tick is a price point where in-range liquidity changes
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, Copy, PartialEq, Eq, Pod, Zeroable,
)]
#[repr(C)]
pub struct Tick {
    /// Net liquidity change when crossing this tick left to right
    /// When price moves up through tick: add liquidity_net
    /// When price moves down through tick: subtract liquidity_net
    pub liquidity_net: i128,                      // 16 bytes, offset 0

    /// Total liquidity referencing this tick
    pub liquidity_gross: u128,                    // 16 bytes, offset 16

    /// Fee growth on the other side of this tick (token 0, Q64.64)
    pub fee_growth_outside_0_x64: u128,           // 16 bytes, offset 32

    /// Fee growth on the other side of this tick (token 1, Q64.64)
    pub fee_growth_outside_1_x64: u128,           // 16 bytes, offset 48

    /// Whether this tick is referenced by any position
    pub initialized: u8,                          // 1 byte, offset 64

    /// Padding for 16-byte alignment
    pub _padding: [u8; 15],                       // 15 bytes, offset 65
}
// Total: 80 bytes

const _: () = assert!(std::mem::size_of::<Tick>() == 80);

impl Tick {
    pub fn is_initialized(&self) -> bool {
        self.initialized != 0
    }

    /// Update tick when liquidity is added/removed
    /// Returns true when the tick flipped between referenced and unreferenced
    pub fn update(
        &mut self,
        tick_current: i32,
        tick_index: i32,
        liquidity_delta: i128,
        fee_growth_global_0_x64: u128,
        fee_growth_global_1_x64: u128,
        upper: bool,
    ) -> Result<bool> {
        let liquidity_gross_before = self.liquidity_gross;
        let liquidity_gross_after = add_liquidity_delta(liquidity_gross_before, liquidity_delta)?;

        let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

        if liquidity_gross_before == 0 {
            // By convention all growth before initialization happened below the tick
            if tick_index <= tick_current {
                self.fee_growth_outside_0_x64 = fee_growth_global_0_x64;
                self.fee_growth_outside_1_x64 = fee_growth_global_1_x64;
            }
        }

        self.liquidity_gross = liquidity_gross_after;
        self.initialized = (liquidity_gross_after > 0) as u8;

        self.liquidity_net = if upper {
            self.liquidity_net.checked_sub(liquidity_delta)
        } else {
            self.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(ClmmError::LiquidityOverflow)?;

        Ok(flipped)
    }

    /// Cross a tick when price moves through it, returning liquidity_net
    pub fn cross(&mut self, fee_growth_global_0_x64: u128, fee_growth_global_1_x64: u128) -> i128 {
        self.fee_growth_outside_0_x64 =
            fee_growth_global_0_x64.wrapping_sub(self.fee_growth_outside_0_x64);
        self.fee_growth_outside_1_x64 =
            fee_growth_global_1_x64.wrapping_sub(self.fee_growth_outside_1_x64);
        self.liquidity_net
    }

    /// Clear tick when it's no longer referenced
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Calculate fee growth inside a tick range
    pub fn get_fee_growth_inside(
        tick_lower: &Tick,
        tick_upper: &Tick,
        tick_lower_index: i32,
        tick_upper_index: i32,
        tick_current: i32,
        fee_growth_global_0_x64: u128,
        fee_growth_global_1_x64: u128,
    ) -> (u128, u128) {
        let (below_0, below_1) = if tick_current >= tick_lower_index {
            (tick_lower.fee_growth_outside_0_x64, tick_lower.fee_growth_outside_1_x64)
        } else {
            (
                fee_growth_global_0_x64.wrapping_sub(tick_lower.fee_growth_outside_0_x64),
                fee_growth_global_1_x64.wrapping_sub(tick_lower.fee_growth_outside_1_x64),
            )
        };

        let (above_0, above_1) = if tick_current < tick_upper_index {
            (tick_upper.fee_growth_outside_0_x64, tick_upper.fee_growth_outside_1_x64)
        } else {
            (
                fee_growth_global_0_x64.wrapping_sub(tick_upper.fee_growth_outside_0_x64),
                fee_growth_global_1_x64.wrapping_sub(tick_upper.fee_growth_outside_1_x64),
            )
        };

        (
            fee_growth_global_0_x64.wrapping_sub(below_0).wrapping_sub(above_0),
            fee_growth_global_1_x64.wrapping_sub(below_1).wrapping_sub(above_1),
        )
    }
}
