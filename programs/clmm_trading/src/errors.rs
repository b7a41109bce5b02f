use anchor_lang::prelude::*;

/// CLMM error codes
/// Flat namespace starting at 6000; the order is part of the public interface
#[error_code]
pub enum ClmmError {
    // ═══════════════════════════════════════════════════════════════════════
    // ARITHMETIC / POOL
    // ═══════════════════════════════════════════════════════════════════════

    /// Arithmetic overflow, underflow or division by zero
    #[msg("Math operation overflowed")]
    MathOverflow, // 6000

    /// Account does not belong to the pool or is in an unexpected state
    #[msg("Invalid pool state")]
    InvalidPoolState, // 6001

    #[msg("Pool is paused")]
    PoolPaused, // 6002

    /// Tick spacing is non-positive, too large or does not match the config
    #[msg("Invalid tick spacing")]
    InvalidTickSpacing, // 6003

    /// Sqrt price outside [MIN_SQRT_PRICE_X64, MAX_SQRT_PRICE_X64]
    #[msg("Invalid sqrt price")]
    InvalidSqrtPrice, // 6004

    /// Lower tick must be below upper tick and both aligned to tick spacing
    #[msg("Invalid tick range")]
    InvalidTickRange, // 6005

    // ═══════════════════════════════════════════════════════════════════════
    // LIQUIDITY / SWAP
    // ═══════════════════════════════════════════════════════════════════════

    #[msg("Insufficient liquidity")]
    InsufficientLiquidity, // 6006

    /// Liquidity net/gross or pool liquidity overflowed
    #[msg("Liquidity overflow")]
    LiquidityOverflow, // 6007

    #[msg("Insufficient input amount")]
    InsufficientInput, // 6008

    #[msg("Excessive price impact")]
    ExcessivePriceImpact, // 6009

    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded, // 6010

    // ═══════════════════════════════════════════════════════════════════════
    // FEES / ACCOUNTS
    // ═══════════════════════════════════════════════════════════════════════

    #[msg("Invalid fee rate")]
    InvalidFeeRate, // 6011

    #[msg("Fee calculation overflow")]
    FeeOverflow, // 6012

    #[msg("Invalid token account owner")]
    InvalidTokenAccountOwner, // 6013

    #[msg("Invalid token mint")]
    InvalidTokenMint, // 6014

    #[msg("Invalid authority")]
    InvalidAuthority, // 6015

    // ═══════════════════════════════════════════════════════════════════════
    // TICKS / POSITIONS
    // ═══════════════════════════════════════════════════════════════════════

    #[msg("Maximum tick index exceeded")]
    MaxTickIndexExceeded, // 6016

    #[msg("Minimum tick index exceeded")]
    MinTickIndexExceeded, // 6017

    #[msg("Invalid position")]
    InvalidPosition, // 6018

    #[msg("Position not found")]
    PositionNotFound, // 6019

    #[msg("Position update failed")]
    PositionUpdateFailed, // 6020

    #[msg("Observation state invalid")]
    ObservationStateInvalid, // 6021

    #[msg("Tick array invalid")]
    TickArrayInvalid, // 6022

    #[msg("Price limit reached")]
    PriceLimitReached, // 6023

    #[msg("Zero liquidity")]
    ZeroLiquidity, // 6024

    #[msg("Token account balance insufficient")]
    InsufficientTokenBalance, // 6025

    #[msg("Pool is Paused")]
    PoolIsPaused, // 6026
}
