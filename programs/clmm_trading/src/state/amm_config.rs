use anchor_lang::prelude::*;

use crate::constants::{FEE_RATE_DENOMINATOR, MAX_PRICE_IMPACT_BPS, MAX_TICK_SPACING};
use crate::errors::ClmmError;

/// Fee tier and protocol settings shared by pools
/// PDA: ["amm_config", index.to_le_bytes()]
#[account]
#[derive(Default, Debug)]
pub struct AmmConfig {
    /// Authority that can collect protocol fees
    pub owner: Pubkey,

    /// Config index (seed)
    pub index: u16,

    /// Trade fee in basis points (30 = 0.30%)
    pub trade_fee_rate: u32,

    /// Share of the trade fee taken by the protocol, in basis points of the fee
    pub protocol_fee_rate: u32,

    /// Tick spacing of pools created under this config
    pub tick_spacing: u16,

    /// Maximum price move per swap in basis points, 0 disables the guard
    /// Capped at MAX_PRICE_IMPACT_BPS
    pub max_price_impact_bps: u32,

    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl AmmConfig {
    pub const LEN: usize = 8 +  // discriminator
        32 +                     // owner
        2 +                      // index
        4 +                      // trade_fee_rate
        4 +                      // protocol_fee_rate
        2 +                      // tick_spacing
        4 +                      // max_price_impact_bps
        1;                       // bump

    pub fn validate(
        trade_fee_rate: u32,
        protocol_fee_rate: u32,
        tick_spacing: u16,
        max_price_impact_bps: u32,
    ) -> Result<()> {
        require!(trade_fee_rate < FEE_RATE_DENOMINATOR, ClmmError::InvalidFeeRate);
        require!(protocol_fee_rate <= FEE_RATE_DENOMINATOR, ClmmError::InvalidFeeRate);
        require!(
            tick_spacing > 0 && tick_spacing as i32 <= MAX_TICK_SPACING,
            ClmmError::InvalidTickSpacing
        );
        require!(
            max_price_impact_bps <= MAX_PRICE_IMPACT_BPS,
            ClmmError::ExcessivePriceImpact
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_clmm_error;

    #[test]
    fn test_validate() {
        assert!(AmmConfig::validate(30, 2_500, 60, 0).is_ok());
        assert_clmm_error(AmmConfig::validate(10_000, 0, 60, 0), ClmmError::InvalidFeeRate);
        assert_clmm_error(AmmConfig::validate(30, 10_001, 60, 0), ClmmError::InvalidFeeRate);
        assert_clmm_error(AmmConfig::validate(30, 0, 0, 0), ClmmError::InvalidTickSpacing);
        assert_clmm_error(AmmConfig::validate(30, 0, 20_000, 0), ClmmError::InvalidTickSpacing);
    }

    #[test]
    fn test_price_impact_guard_is_capped() {
        assert!(AmmConfig::validate(30, 0, 60, 500).is_ok());
        assert!(AmmConfig::validate(30, 0, 60, MAX_PRICE_IMPACT_BPS).is_ok());
        assert_clmm_error(
            AmmConfig::validate(30, 0, 60, MAX_PRICE_IMPACT_BPS + 1),
            ClmmError::ExcessivePriceImpact,
        );
    }
}
