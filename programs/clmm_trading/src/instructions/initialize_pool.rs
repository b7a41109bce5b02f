use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::{AmmConfig, ObservationState, PoolKeys, PoolState};
use crate::constants::seeds;
use crate::errors::ClmmError;
use crate::events::PoolUpdateEvent;

/// Initialize a new liquidity pool
#[derive(Accounts)]
pub struct InitializePool<'info> {
    /// Authority allowed to pause the pool
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The config this pool is created under
    pub amm_config: Box<Account<'info, AmmConfig>>,

    /// The pool account to initialize (zero-copy)
    #[account(
        init,
        payer = authority,
        space = PoolState::LEN,
        seeds = [
            seeds::POOL_SEED,
            amm_config.key().as_ref(),
            token_mint_0.key().as_ref(),
            token_mint_1.key().as_ref(),
        ],
        bump
    )]
    pub pool_state: AccountLoader<'info, PoolState>,

    /// Observation ring buffer for the pool (zero-copy)
    #[account(
        init,
        payer = authority,
        space = ObservationState::LEN,
        seeds = [seeds::OBSERVATION_SEED, pool_state.key().as_ref()],
        bump
    )]
    pub observation_state: AccountLoader<'info, ObservationState>,

    /// Token 0 mint (must be < token 1 mint lexicographically)
    pub token_mint_0: Box<InterfaceAccount<'info, Mint>>,

    /// Token 1 mint
    pub token_mint_1: Box<InterfaceAccount<'info, Mint>>,

    /// Token 0 vault for the pool
    #[account(
        init,
        payer = authority,
        seeds = [seeds::POOL_VAULT_SEED, pool_state.key().as_ref(), token_mint_0.key().as_ref()],
        bump,
        token::mint = token_mint_0,
        token::authority = pool_state,
        token::token_program = token_program,
    )]
    pub token_vault_0: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token 1 vault for the pool
    #[account(
        init,
        payer = authority,
        seeds = [seeds::POOL_VAULT_SEED, pool_state.key().as_ref(), token_mint_1.key().as_ref()],
        bump,
        token::mint = token_mint_1,
        token::authority = pool_state,
        token::token_program = token_program,
    )]
    pub token_vault_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// System program
    pub system_program: Program<'info, System>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
}

/// Initialize pool handler
pub fn handler(
    ctx: Context<InitializePool>,
    tick_spacing: i32,
    initial_sqrt_price_x64: u128,
) -> Result<()> {
    let amm_config = &ctx.accounts.amm_config;
    let timestamp = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool_state.key();
    let keys = PoolKeys {
        pool_id: pool_key,
        authority: ctx.accounts.authority.key(),
        amm_config: amm_config.key(),
        token_mint_0: ctx.accounts.token_mint_0.key(),
        token_mint_1: ctx.accounts.token_mint_1.key(),
        token_vault_0: ctx.accounts.token_vault_0.key(),
        token_vault_1: ctx.accounts.token_vault_1.key(),
        observation_key: ctx.accounts.observation_state.key(),
    };

    let initial_tick = {
        let mut pool = ctx.accounts.pool_state.load_init()?;
        pool.initialize(
            &keys,
            amm_config,
            tick_spacing,
            initial_sqrt_price_x64,
            ctx.bumps.pool_state,
            timestamp,
        )?;
        pool.current_tick_index
    };

    let mut observation = ctx.accounts.observation_state.load_init()?;
    observation.initialize(
        pool_key,
        u32::try_from(timestamp).map_err(|_| error!(ClmmError::ObservationStateInvalid))?,
    );

    emit!(PoolUpdateEvent {
        pool_id: pool_key,
        sqrt_price: initial_sqrt_price_x64,
        tick_index: initial_tick,
        liquidity: 0,
        fee_growth_global_0: 0,
        fee_growth_global_1: 0,
    });

    msg!("Pool initialized");
    msg!("Token 0: {}", ctx.accounts.token_mint_0.key());
    msg!("Token 1: {}", ctx.accounts.token_mint_1.key());
    msg!("Fee rate: {} bps", amm_config.trade_fee_rate);
    msg!("Initial sqrt price: {}", initial_sqrt_price_x64);
    msg!("Initial tick: {}", initial_tick);

    Ok(())
}
