use anchor_lang::prelude::*;

use crate::errors::ClmmError;
use crate::math::full_math::mul_shr;
use crate::math::liquidity_math::add_liquidity_delta;

/// Liquidity position - an owner's concentrated liquidity over one tick range
/// PDA: ["position", pool, owner, tick_lower.to_le_bytes(), tick_upper.to_le_bytes()]
#[account]
#[derive(Default, Debug)]
pub struct Position {
    /// Position owner
    pub owner: Pubkey,

    /// The pool this position belongs to
    pub pool: Pubkey,

    /// Lower tick of the position range
    pub tick_lower: i32,

    /// Upper tick of the position range
    pub tick_upper: i32,

    /// Amount of liquidity in this position
    pub liquidity: u128,

    /// Fee growth inside the range at last update (token 0, Q64.64)
    pub fee_growth_inside_0_last_x64: u128,

    /// Fee growth inside the range at last update (token 1, Q64.64)
    pub fee_growth_inside_1_last_x64: u128,

    /// Uncollected tokens owed to the position (token 0)
    pub tokens_owed_0: u64,

    /// Uncollected tokens owed to the position (token 1)
    pub tokens_owed_1: u64,

    pub created_at: i64,

    pub last_updated: i64,

    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl Position {
    pub const LEN: usize = 8 +  // discriminator
        32 +                     // owner
        32 +                     // pool
        4 +                      // tick_lower
        4 +                      // tick_upper
        16 +                     // liquidity
        16 +                     // fee_growth_inside_0_last_x64
        16 +                     // fee_growth_inside_1_last_x64
        8 +                      // tokens_owed_0
        8 +                      // tokens_owed_1
        8 +                      // created_at
        8 +                      // last_updated
        1;                       // bump

    /// A freshly created account has no owner yet
    pub fn is_new(&self) -> bool {
        self.owner == Pubkey::default()
    }

    /// Check if position is empty (no liquidity and no owed tokens)
    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 && self.tokens_owed_0 == 0 && self.tokens_owed_1 == 0
    }

    pub fn has_liquidity(&self) -> bool {
        self.liquidity > 0
    }

    /// Accrue fees earned since the last snapshot and apply a liquidity delta
    ///
    /// owed = (fee_growth_inside - fee_growth_inside_last) * liquidity >> 64
    pub fn update(
        &mut self,
        liquidity_delta: i128,
        fee_growth_inside_0_x64: u128,
        fee_growth_inside_1_x64: u128,
    ) -> Result<()> {
        let owed_0 = Self::fees_earned(
            self.liquidity,
            fee_growth_inside_0_x64.wrapping_sub(self.fee_growth_inside_0_last_x64),
        )?;
        let owed_1 = Self::fees_earned(
            self.liquidity,
            fee_growth_inside_1_x64.wrapping_sub(self.fee_growth_inside_1_last_x64),
        )?;

        if liquidity_delta != 0 {
            self.liquidity = add_liquidity_delta(self.liquidity, liquidity_delta)?;
        }

        self.fee_growth_inside_0_last_x64 = fee_growth_inside_0_x64;
        self.fee_growth_inside_1_last_x64 = fee_growth_inside_1_x64;

        self.credit_tokens_owed(owed_0, owed_1)
    }

    /// Add amounts to tokens owed
    pub fn credit_tokens_owed(&mut self, amount_0: u64, amount_1: u64) -> Result<()> {
        self.tokens_owed_0 = self
            .tokens_owed_0
            .checked_add(amount_0)
            .ok_or(ClmmError::FeeOverflow)?;
        self.tokens_owed_1 = self
            .tokens_owed_1
            .checked_add(amount_1)
            .ok_or(ClmmError::FeeOverflow)?;
        Ok(())
    }

    fn fees_earned(liquidity: u128, fee_growth_delta_x64: u128) -> Result<u64> {
        if liquidity == 0 || fee_growth_delta_x64 == 0 {
            return Ok(0);
        }
        let owed = mul_shr(fee_growth_delta_x64, liquidity, 64)
            .map_err(|_| error!(ClmmError::FeeOverflow))?;
        u64::try_from(owed).map_err(|_| error!(ClmmError::FeeOverflow))
    }
}
