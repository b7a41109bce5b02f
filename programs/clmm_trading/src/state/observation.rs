use anchor_lang::prelude::*;
use bytemuck::{Pod, Zeroable};

use crate::constants::OBSERVATION_CAPACITY;
use crate::errors::ClmmError;

/// Oracle observation - one TWAP data point
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, Copy, PartialEq, Eq, Pod, Zeroable,
)]
#[repr(C)]
pub struct Observation {
    /// Cumulative seconds per unit of liquidity (Q64.64)
    pub seconds_per_liquidity_cumulative_x64: u128, // 16 bytes, offset 0

    /// Cumulative tick value (tick * time elapsed)
    pub tick_cumulative: i64,                        // 8 bytes, offset 16

    /// Block timestamp of the observation
    pub block_timestamp: u32,                        // 4 bytes, offset 24

    /// Whether this observation has been written
    pub initialized: u8,                             // 1 byte, offset 28

    pub _padding: [u8; 3],                           // 3 bytes, offset 29
}
// Total: 32 bytes

const _: () = assert!(std::mem::size_of::<Observation>() == 32);

impl Observation {
    /// Project this observation forward to `timestamp` at a constant tick and liquidity
    fn transform(&self, timestamp: u32, tick: i32, liquidity: u128) -> Observation {
        let delta = timestamp.wrapping_sub(self.block_timestamp);
        Observation {
            seconds_per_liquidity_cumulative_x64: self
                .seconds_per_liquidity_cumulative_x64
                .wrapping_add(((delta as u128) << 64) / liquidity.max(1)),
            tick_cumulative: self
                .tick_cumulative
                .wrapping_add((tick as i64).wrapping_mul(delta as i64)),
            block_timestamp: timestamp,
            initialized: 1,
            _padding: [0; 3],
        }
    }
}

/// Observation ring buffer for TWAP
/// PDA: ["observation", pool]
#[account(zero_copy)]
#[repr(C)]
#[derive(Debug)]
pub struct ObservationState {
    /// The pool this buffer belongs to
    pub pool_id: [u8; 32],                                   // 32 bytes, offset 0

    /// Slot of the most recent observation
    pub observation_index: u16,                              // 2 bytes, offset 32

    /// Number of written observations, capped at capacity
    pub observation_count: u16,                              // 2 bytes, offset 34

    pub _padding: [u8; 12],                                  // 12 bytes, offset 36

    pub observations: [Observation; OBSERVATION_CAPACITY],   // 3200 bytes, offset 48
}
// Total: 3248 bytes (divisible by 16)

const _: () = assert!(std::mem::size_of::<ObservationState>() == 3248);

impl ObservationState {
    pub const LEN: usize = 8 + std::mem::size_of::<ObservationState>();

    pub fn pool_id_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.pool_id)
    }

    /// Reset the buffer with a single observation at `timestamp`
    pub fn initialize(&mut self, pool_id: Pubkey, timestamp: u32) {
        self.pool_id = pool_id.to_bytes();
        self.observations = [Observation::default(); OBSERVATION_CAPACITY];
        self.observations[0] = Observation {
            block_timestamp: timestamp,
            initialized: 1,
            ..Default::default()
        };
        self.observation_index = 0;
        self.observation_count = 1;
    }

    /// Most recent observation
    pub fn latest(&self) -> Result<&Observation> {
        require!(self.observation_count > 0, ClmmError::ObservationStateInvalid);
        Ok(&self.observations[self.observation_index as usize])
    }

    /// Physical slot of the `logical`-th oldest observation
    fn slot(&self, logical: usize) -> usize {
        let count = self.observation_count as usize;
        let oldest = (self.observation_index as usize + 1 + OBSERVATION_CAPACITY - count)
            % OBSERVATION_CAPACITY;
        (oldest + logical) % OBSERVATION_CAPACITY
    }

    /// Append an observation of the state that held since the last entry
    ///
    /// No-op unless `timestamp` is strictly after the latest entry; the oldest
    /// entry is overwritten once the buffer is full. Returns whether a write happened.
    pub fn record(&mut self, timestamp: u32, tick: i32, liquidity: u128) -> Result<bool> {
        let last = *self.latest()?;
        if timestamp <= last.block_timestamp {
            return Ok(false);
        }

        let next_index = (self.observation_index as usize + 1) % OBSERVATION_CAPACITY;
        self.observations[next_index] = last.transform(timestamp, tick, liquidity);
        self.observation_index = next_index as u16;
        if (self.observation_count as usize) < OBSERVATION_CAPACITY {
            self.observation_count += 1;
        }
        Ok(true)
    }

    /// Cumulative values `seconds_ago` before `now`
    ///
    /// `tick` and `liquidity` are the current pool values, used to extrapolate past the
    /// latest entry. Returns (tick_cumulative, seconds_per_liquidity_cumulative_x64).
    pub fn observe(
        &self,
        now: u32,
        seconds_ago: u32,
        tick: i32,
        liquidity: u128,
    ) -> Result<(i64, u128)> {
        let target = now
            .checked_sub(seconds_ago)
            .ok_or(ClmmError::ObservationStateInvalid)?;
        let latest = self.latest()?;

        if target >= latest.block_timestamp {
            let observation = if target == latest.block_timestamp {
                *latest
            } else {
                latest.transform(target, tick, liquidity)
            };
            return Ok((
                observation.tick_cumulative,
                observation.seconds_per_liquidity_cumulative_x64,
            ));
        }

        let oldest = &self.observations[self.slot(0)];
        require!(
            target >= oldest.block_timestamp,
            ClmmError::ObservationStateInvalid
        );

        // Binary search for the last entry at or before target
        let mut low = 0usize;
        let mut high = self.observation_count as usize - 1;
        while low < high {
            let mid = (low + high + 1) / 2;
            if self.observations[self.slot(mid)].block_timestamp <= target {
                low = mid;
            } else {
                high = mid - 1;
            }
        }

        let before = &self.observations[self.slot(low)];
        if before.block_timestamp == target {
            return Ok((before.tick_cumulative, before.seconds_per_liquidity_cumulative_x64));
        }
        let after = &self.observations[self.slot(low + 1)];

        // Interpolate between neighbours
        let span = after.block_timestamp.wrapping_sub(before.block_timestamp) as i64;
        let elapsed = target.wrapping_sub(before.block_timestamp) as i64;
        let tick_cumulative = before.tick_cumulative.wrapping_add(
            after.tick_cumulative.wrapping_sub(before.tick_cumulative) / span * elapsed,
        );
        let spl_delta = after
            .seconds_per_liquidity_cumulative_x64
            .wrapping_sub(before.seconds_per_liquidity_cumulative_x64);
        let seconds_per_liquidity = before
            .seconds_per_liquidity_cumulative_x64
            .wrapping_add(spl_delta / span as u128 * elapsed as u128);

        Ok((tick_cumulative, seconds_per_liquidity))
    }

    /// Arithmetic mean tick over the last `window` seconds, rounded towards negative infinity
    pub fn twap_tick(&self, now: u32, window: u32, tick: i32, liquidity: u128) -> Result<i32> {
        require!(window > 0, ClmmError::ObservationStateInvalid);
        let (cumulative_now, _) = self.observe(now, 0, tick, liquidity)?;
        let (cumulative_then, _) = self.observe(now, window, tick, liquidity)?;
        let mean = cumulative_now
            .wrapping_sub(cumulative_then)
            .div_euclid(window as i64);
        i32::try_from(mean).map_err(|_| error!(ClmmError::MathOverflow))
    }
}
