use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::{PoolState, Position, TickArray};
use crate::constants::seeds;
use crate::engine::{open_or_increase_position, TickArrayPair};
use crate::errors::ClmmError;
use crate::events::{LiquidityAddedEvent, PositionUpdateEvent};
use crate::utils::{transfer_from_user, validate_pool_tokens};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct CreateLiquidityParams {
    pub liquidity_delta: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub amount_0_max: u64,
    pub amount_1_max: u64,
}

/// Open a position, or add liquidity to an existing one
#[derive(Accounts)]
#[instruction(params: CreateLiquidityParams)]
pub struct CreateLiquidity<'info> {
    /// The pool (zero-copy)
    #[account(mut)]
    pub pool_state: AccountLoader<'info, PoolState>,

    /// The position, created on first deposit
    #[account(
        init_if_needed,
        payer = owner,
        space = Position::LEN,
        seeds = [
            seeds::POSITION_SEED,
            pool_state.key().as_ref(),
            owner.key().as_ref(),
            &params.tick_lower_index.to_le_bytes(),
            &params.tick_upper_index.to_le_bytes()
        ],
        bump
    )]
    pub position: Box<Account<'info, Position>>,

    /// Tick array containing the lower tick (zero-copy)
    #[account(mut)]
    pub tick_array_lower: AccountLoader<'info, TickArray>,

    /// Tick array containing the upper tick; omitted when it is `tick_array_lower`
    #[account(mut)]
    pub tick_array_upper: Option<AccountLoader<'info, TickArray>>,

    /// Token 0 mint
    pub token_mint_0: Box<InterfaceAccount<'info, Mint>>,

    /// Token 1 mint
    pub token_mint_1: Box<InterfaceAccount<'info, Mint>>,

    /// Pool vault for token 0
    #[account(mut)]
    pub token_vault_0: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Pool vault for token 1
    #[account(mut)]
    pub token_vault_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Owner's token 0 account
    #[account(
        mut,
        constraint = user_token_0.owner == owner.key() @ ClmmError::InvalidTokenAccountOwner,
    )]
    pub user_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Owner's token 1 account
    #[account(
        mut,
        constraint = user_token_1.owner == owner.key() @ ClmmError::InvalidTokenAccountOwner,
    )]
    pub user_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Position owner, pays for the position account
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Create liquidity handler
pub fn handler(ctx: Context<CreateLiquidity>, params: CreateLiquidityParams) -> Result<()> {
    let timestamp = Clock::get()?.unix_timestamp;
    let owner = ctx.accounts.owner.key();
    let pool_key = ctx.accounts.pool_state.key();

    let change = {
        let mut pool = ctx.accounts.pool_state.load_mut()?;
        validate_pool_tokens(
            &pool,
            &ctx.accounts.token_vault_0.key(),
            &ctx.accounts.token_vault_1.key(),
            &ctx.accounts.token_mint_0.key(),
            &ctx.accounts.token_mint_1.key(),
        )?;

        let mut lower = ctx.accounts.tick_array_lower.load_mut()?;
        let mut upper = match &ctx.accounts.tick_array_upper {
            Some(loader) => Some(loader.load_mut()?),
            None => None,
        };
        let mut arrays = TickArrayPair::new(&mut lower, upper.as_deref_mut());

        open_or_increase_position(
            &mut pool,
            &mut ctx.accounts.position,
            &mut arrays,
            owner,
            params.tick_lower_index,
            params.tick_upper_index,
            params.liquidity_delta,
            params.amount_0_max,
            params.amount_1_max,
            timestamp,
        )?
    };
    ctx.accounts.position.bump = ctx.bumps.position;

    transfer_from_user(
        &ctx.accounts.token_program,
        &ctx.accounts.user_token_0,
        &ctx.accounts.token_vault_0,
        &ctx.accounts.token_mint_0,
        &ctx.accounts.owner,
        change.amount_0,
    )?;
    transfer_from_user(
        &ctx.accounts.token_program,
        &ctx.accounts.user_token_1,
        &ctx.accounts.token_vault_1,
        &ctx.accounts.token_mint_1,
        &ctx.accounts.owner,
        change.amount_1,
    )?;

    let position = &ctx.accounts.position;
    emit!(LiquidityAddedEvent {
        pool_id: pool_key,
        liquidity_added: params.liquidity_delta,
        tick_lower_index: params.tick_lower_index,
        tick_upper_index: params.tick_upper_index,
        amount_0: change.amount_0,
        amount_1: change.amount_1,
    });
    emit!(PositionUpdateEvent {
        owner,
        pool: pool_key,
        liquidity: position.liquidity,
        tick_lower_index: position.tick_lower,
        tick_upper_index: position.tick_upper,
        tokens_owed_0: position.tokens_owed_0,
        tokens_owed_1: position.tokens_owed_1,
        update_type: "increase".to_string(),
    });

    msg!("Liquidity increased: {}", params.liquidity_delta);
    msg!("Amount 0: {}, Amount 1: {}", change.amount_0, change.amount_1);
    msg!("Position liquidity: {}", change.liquidity);

    Ok(())
}
