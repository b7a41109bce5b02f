// CLMM Protocol Constants
// Tick grid follows p(i) = 1.0001^i with sqrt prices stored as Q64.64

/// Number of ticks per tick array (one 64-bit bitmap word per array)
pub const TICK_ARRAY_SIZE: usize = 64;

/// Minimum tick index
pub const MIN_TICK: i32 = -443636;

/// Maximum tick index
pub const MAX_TICK: i32 = 443636;

/// Sqrt price at MIN_TICK (Q64.64)
pub const MIN_SQRT_PRICE_X64: u128 = 4295048017;

/// Sqrt price at MAX_TICK (Q64.64)
pub const MAX_SQRT_PRICE_X64: u128 = 79226673515401279992447579062;

/// Q64 multiplier (2^64)
pub const Q64: u128 = 1 << 64;

/// Fee rates are expressed in basis points (10000 = 100%)
pub const FEE_RATE_DENOMINATOR: u32 = 10_000;

/// Price impact is expressed in basis points
pub const PRICE_IMPACT_DENOMINATOR: u64 = 10_000;

/// Maximum tick spacing
pub const MAX_TICK_SPACING: i32 = 16384;

/// Upper bound on swap loop iterations (tick crossings + partial steps)
pub const MAX_SWAP_STEPS: usize = 256;

/// Maximum number of tick arrays a single swap may walk
pub const MAX_SWAP_TICK_ARRAYS: usize = 8;

/// Number of observations kept by the TWAP ring buffer
pub const OBSERVATION_CAPACITY: usize = 100;

/// Largest price impact guard a config may set (10%)
pub const MAX_PRICE_IMPACT_BPS: u32 = 1000;

/// Account seeds for PDA derivation
pub mod seeds {
    pub const AMM_CONFIG_SEED: &[u8] = b"amm_config";
    pub const POOL_SEED: &[u8] = b"pool";
    pub const POOL_VAULT_SEED: &[u8] = b"pool_vault";
    pub const TICK_ARRAY_SEED: &[u8] = b"tick_array";
    pub const POSITION_SEED: &[u8] = b"position";
    pub const OBSERVATION_SEED: &[u8] = b"observation";
}
