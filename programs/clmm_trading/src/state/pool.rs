use anchor_lang::prelude::*;

use crate::constants::{MAX_SQRT_PRICE_X64, MAX_TICK_SPACING, MIN_SQRT_PRICE_X64};
use crate::errors::ClmmError;
use crate::math::liquidity_math::add_liquidity_delta;
use crate::math::tick_math::get_tick_at_sqrt_price;
use crate::state::AmmConfig;
use crate::utils::validate_token_order;

/// Accounts a pool records at creation
#[derive(Debug, Clone, Copy)]
pub struct PoolKeys {
    pub pool_id: Pubkey,
    pub authority: Pubkey,
    pub amm_config: Pubkey,
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub token_vault_0: Pubkey,
    pub token_vault_1: Pubkey,
    pub observation_key: Pubkey,
}

/// Pool state - the core AMM state for a token pair
/// PDA: ["pool", amm_config, token_mint_0, token_mint_1]
///
/// Using zero-copy for efficient memory access and reduced stack usage
/// All fields are carefully ordered to avoid implicit padding
#[account(zero_copy)]
#[repr(C)]
#[derive(Debug)]
pub struct PoolState {
    // === 16-byte aligned fields first (u128) ===

    /// Total liquidity currently in range
    pub liquidity: u128,                          // 16 bytes, offset 0

    /// Current sqrt price as Q64.64 fixed point
    pub sqrt_price_x64: u128,                     // 16 bytes, offset 16

    /// Global fee growth per unit of liquidity for token 0 (Q64.64)
    pub fee_growth_global_0_x64: u128,            // 16 bytes, offset 32

    /// Global fee growth per unit of liquidity for token 1 (Q64.64)
    pub fee_growth_global_1_x64: u128,            // 16 bytes, offset 48

    // === 8-byte aligned fields ===

    /// Protocol fees accumulated for token 0
    pub fee_protocol_token_0: u64,                // 8 bytes, offset 64

    /// Protocol fees accumulated for token 1
    pub fee_protocol_token_1: u64,                // 8 bytes, offset 72

    /// Unix timestamp of the last state change
    pub last_updated: i64,                        // 8 bytes, offset 80

    // === 4-byte aligned fields ===

    /// Tick spacing for this pool
    pub tick_spacing: i32,                        // 4 bytes, offset 88

    /// Current tick index
    pub current_tick_index: i32,                  // 4 bytes, offset 92

    /// Trade fee rate in basis points, copied from the config at creation
    pub fee_rate: u32,                            // 4 bytes, offset 96

    // === 2-byte and 1-byte fields ===

    /// Tick spacing as used in the config seed
    pub tick_spacing_seed: u16,                   // 2 bytes, offset 100

    /// Whether the pool is paused
    pub is_paused: u8,                            // 1 byte, offset 102

    /// Bump seed for PDA derivation
    pub bump: u8,                                 // 1 byte, offset 103

    // === Pubkey-sized fields (32 bytes, no alignment requirement) ===

    /// Authority allowed to pause the pool
    pub authority: [u8; 32],                      // 32 bytes, offset 104

    /// The config this pool belongs to
    pub amm_config: [u8; 32],                     // 32 bytes, offset 136

    /// Token 0 mint (must be < token 1 mint)
    pub token_mint_0: [u8; 32],                   // 32 bytes, offset 168

    /// Token 1 mint
    pub token_mint_1: [u8; 32],                   // 32 bytes, offset 200

    /// Token 0 vault (PDA owned by pool)
    pub token_vault_0: [u8; 32],                  // 32 bytes, offset 232

    /// Token 1 vault (PDA owned by pool)
    pub token_vault_1: [u8; 32],                  // 32 bytes, offset 264

    /// Observation account for TWAP
    pub observation_key: [u8; 32],                // 32 bytes, offset 296

    /// Pool identity (the pool account address)
    pub pool_id: [u8; 32],                        // 32 bytes, offset 328

    /// Reserved for future use
    pub _reserved: [u8; 24],                      // 24 bytes, offset 360
}
// Total: 384 bytes (divisible by 16)

const _: () = assert!(std::mem::size_of::<PoolState>() == 384);

impl PoolState {
    /// Set up a fresh pool at `initial_sqrt_price_x64`
    ///
    /// `tick_spacing` must match the config; token 0 must sort strictly below token 1.
    pub fn initialize(
        &mut self,
        keys: &PoolKeys,
        amm_config: &AmmConfig,
        tick_spacing: i32,
        initial_sqrt_price_x64: u128,
        bump: u8,
        timestamp: i64,
    ) -> Result<()> {
        require!(
            tick_spacing > 0
                && tick_spacing <= MAX_TICK_SPACING
                && tick_spacing == amm_config.tick_spacing as i32,
            ClmmError::InvalidTickSpacing
        );
        require!(
            (MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&initial_sqrt_price_x64),
            ClmmError::InvalidSqrtPrice
        );
        require!(
            validate_token_order(&keys.token_mint_0, &keys.token_mint_1),
            ClmmError::InvalidTokenMint
        );
        let tick = get_tick_at_sqrt_price(initial_sqrt_price_x64)?;

        self.pool_id = keys.pool_id.to_bytes();
        self.authority = keys.authority.to_bytes();
        self.amm_config = keys.amm_config.to_bytes();
        self.token_mint_0 = keys.token_mint_0.to_bytes();
        self.token_mint_1 = keys.token_mint_1.to_bytes();
        self.token_vault_0 = keys.token_vault_0.to_bytes();
        self.token_vault_1 = keys.token_vault_1.to_bytes();
        self.observation_key = keys.observation_key.to_bytes();
        self.tick_spacing = tick_spacing;
        self.tick_spacing_seed = amm_config.tick_spacing;
        self.fee_rate = amm_config.trade_fee_rate;
        self.sqrt_price_x64 = initial_sqrt_price_x64;
        self.current_tick_index = tick;
        self.liquidity = 0;
        self.fee_growth_global_0_x64 = 0;
        self.fee_growth_global_1_x64 = 0;
        self.fee_protocol_token_0 = 0;
        self.fee_protocol_token_1 = 0;
        self.set_paused(false);
        self.last_updated = timestamp;
        self.bump = bump;
        Ok(())
    }

    pub const LEN: usize = 8 + std::mem::size_of::<PoolState>();

    pub fn authority_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.authority)
    }

    pub fn amm_config_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.amm_config)
    }

    pub fn token_mint_0_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_mint_0)
    }

    pub fn token_mint_1_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_mint_1)
    }

    pub fn token_vault_0_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_vault_0)
    }

    pub fn token_vault_1_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_vault_1)
    }

    pub fn observation_key_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.observation_key)
    }

    pub fn pool_id_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.pool_id)
    }

    /// Check if pool is paused
    pub fn is_pool_paused(&self) -> bool {
        self.is_paused != 0
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused as u8;
    }

    /// Authority-gated pause toggle; setting the current value again is an error
    pub fn update_paused(&mut self, signer: &Pubkey, paused: bool) -> Result<()> {
        require_keys_eq!(*signer, self.authority_pubkey(), ClmmError::InvalidAuthority);
        if paused {
            require!(!self.is_pool_paused(), ClmmError::PoolIsPaused);
        } else {
            require!(self.is_pool_paused(), ClmmError::InvalidPoolState);
        }
        self.set_paused(paused);
        Ok(())
    }

    /// Update in-range liquidity, handling the signed delta
    pub fn update_liquidity(&mut self, delta: i128) -> Result<()> {
        self.liquidity = add_liquidity_delta(self.liquidity, delta)?;
        Ok(())
    }

    /// Whether `tick_lower <= current tick < tick_upper`
    pub fn is_in_range(&self, tick_lower: i32, tick_upper: i32) -> bool {
        self.current_tick_index >= tick_lower && self.current_tick_index < tick_upper
    }

    /// Accrue protocol fees on the input side of a swap
    pub fn add_protocol_fee(&mut self, zero_for_one: bool, amount: u64) -> Result<()> {
        let slot = if zero_for_one {
            &mut self.fee_protocol_token_0
        } else {
            &mut self.fee_protocol_token_1
        };
        *slot = slot.checked_add(amount).ok_or(ClmmError::FeeOverflow)?;
        Ok(())
    }

    /// Release up to the requested protocol fees, returning the amounts taken
    pub fn take_protocol_fees(
        &mut self,
        amount_0_requested: u64,
        amount_1_requested: u64,
    ) -> (u64, u64) {
        let amount_0 = self.fee_protocol_token_0.min(amount_0_requested);
        let amount_1 = self.fee_protocol_token_1.min(amount_1_requested);
        self.fee_protocol_token_0 -= amount_0;
        self.fee_protocol_token_1 -= amount_1;
        (amount_0, amount_1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;
    use crate::math::tick_math::get_sqrt_price_at_tick;
    use crate::test_utils::{assert_clmm_error, default_amm_config, default_pool};
    use bytemuck::Zeroable;

    fn pool_keys() -> PoolKeys {
        PoolKeys {
            pool_id: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            amm_config: Pubkey::new_unique(),
            token_mint_0: Pubkey::new_from_array([1u8; 32]),
            token_mint_1: Pubkey::new_from_array([2u8; 32]),
            token_vault_0: Pubkey::new_unique(),
            token_vault_1: Pubkey::new_unique(),
            observation_key: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_initialize() {
        let keys = pool_keys();
        let config = default_amm_config();
        let sqrt_price = get_sqrt_price_at_tick(-200).unwrap();
        let mut pool = PoolState::zeroed();
        pool.initialize(&keys, &config, 10, sqrt_price, 254, 1_000).unwrap();

        assert_eq!(pool.pool_id_pubkey(), keys.pool_id);
        assert_eq!(pool.token_vault_1_pubkey(), keys.token_vault_1);
        assert_eq!(pool.observation_key_pubkey(), keys.observation_key);
        assert_eq!(pool.current_tick_index, -200);
        assert_eq!(pool.sqrt_price_x64, sqrt_price);
        assert_eq!(pool.fee_rate, config.trade_fee_rate);
        assert_eq!(pool.liquidity, 0);
        assert_eq!(pool.bump, 254);
        assert!(!pool.is_pool_paused());
    }

    #[test]
    fn test_initialize_rejects_bad_tick_spacing() {
        let keys = pool_keys();
        let config = default_amm_config();
        for spacing in [0, -10, MAX_TICK_SPACING + 1, 60] {
            let mut pool = PoolState::zeroed();
            assert_clmm_error(
                pool.initialize(&keys, &config, spacing, Q64, 255, 0),
                ClmmError::InvalidTickSpacing,
            );
            assert_eq!(pool.sqrt_price_x64, 0);
        }
    }

    #[test]
    fn test_initialize_rejects_out_of_bounds_price() {
        let keys = pool_keys();
        let config = default_amm_config();
        for sqrt_price in [0, MIN_SQRT_PRICE_X64 - 1, MAX_SQRT_PRICE_X64 + 1] {
            let mut pool = PoolState::zeroed();
            assert_clmm_error(
                pool.initialize(&keys, &config, 10, sqrt_price, 255, 0),
                ClmmError::InvalidSqrtPrice,
            );
        }
    }

    #[test]
    fn test_initialize_rejects_unordered_mints() {
        let config = default_amm_config();
        let swapped = PoolKeys {
            token_mint_0: Pubkey::new_from_array([2u8; 32]),
            token_mint_1: Pubkey::new_from_array([1u8; 32]),
            ..pool_keys()
        };
        let equal = PoolKeys {
            token_mint_1: Pubkey::new_from_array([1u8; 32]),
            ..pool_keys()
        };
        for keys in [swapped, equal] {
            let mut pool = PoolState::zeroed();
            assert_clmm_error(
                pool.initialize(&keys, &config, 10, Q64, 255, 0),
                ClmmError::InvalidTokenMint,
            );
            assert_eq!(pool.pool_id, [0u8; 32]);
        }
    }

    #[test]
    fn test_layout_has_no_padding() {
        assert_eq!(PoolState::LEN, 392);
    }

    #[test]
    fn test_update_liquidity() {
        let mut pool = default_pool(10, 0);
        pool.update_liquidity(500).unwrap();
        pool.update_liquidity(-200).unwrap();
        assert_eq!(pool.liquidity, 300);
        assert_clmm_error(pool.update_liquidity(-301), ClmmError::LiquidityOverflow);
    }

    #[test]
    fn test_range_check_is_half_open() {
        let pool = default_pool(10, 0);
        assert!(pool.is_in_range(-10, 10));
        assert!(pool.is_in_range(0, 10));
        assert!(!pool.is_in_range(-10, 0));
    }

    #[test]
    fn test_pause_flag() {
        let mut pool = default_pool(10, 0);
        assert!(!pool.is_pool_paused());
        pool.set_paused(true);
        assert!(pool.is_pool_paused());
    }

    #[test]
    fn test_update_paused() {
        let mut pool = default_pool(10, 0);
        let authority = pool.authority_pubkey();

        assert_clmm_error(
            pool.update_paused(&Pubkey::new_unique(), true),
            ClmmError::InvalidAuthority,
        );
        assert_clmm_error(pool.update_paused(&authority, false), ClmmError::InvalidPoolState);

        pool.update_paused(&authority, true).unwrap();
        assert!(pool.is_pool_paused());
        assert_clmm_error(pool.update_paused(&authority, true), ClmmError::PoolIsPaused);

        pool.update_paused(&authority, false).unwrap();
        assert!(!pool.is_pool_paused());
    }

    #[test]
    fn test_protocol_fees() {
        let mut pool = default_pool(10, 0);
        pool.add_protocol_fee(true, 70).unwrap();
        pool.add_protocol_fee(false, 5).unwrap();
        assert_eq!(pool.take_protocol_fees(50, u64::MAX), (50, 5));
        assert_eq!(pool.fee_protocol_token_0, 20);
        assert_eq!(pool.fee_protocol_token_1, 0);

        pool.fee_protocol_token_0 = u64::MAX;
        assert_clmm_error(pool.add_protocol_fee(true, 1), ClmmError::FeeOverflow);
    }
}
