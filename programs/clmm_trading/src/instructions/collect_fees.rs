use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::{PoolState, Position, TickArray};
use crate::engine::collect_fees;
use crate::errors::ClmmError;
use crate::events::{FeesCollectedEvent, PositionUpdateEvent};
use crate::utils::{transfer_from_vault, validate_pool_tokens};

/// Collect owed tokens (fees and withdrawn liquidity) from a position
#[derive(Accounts)]
pub struct CollectFees<'info> {
    /// The pool (zero-copy)
    pub pool_state: AccountLoader<'info, PoolState>,

    /// The position to collect from
    #[account(
        mut,
        constraint = position.pool == pool_state.key() @ ClmmError::PositionNotFound,
    )]
    pub position: Box<Account<'info, Position>>,

    /// Tick array containing the lower tick (zero-copy)
    pub tick_array_lower: AccountLoader<'info, TickArray>,

    /// Tick array containing the upper tick; omitted when it is `tick_array_lower`
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

    /// Recipient token 0 account
    #[account(mut)]
    pub recipient_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Recipient token 1 account
    #[account(mut)]
    pub recipient_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Position owner
    pub owner: Signer<'info>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
}

/// Collect fees handler
pub fn handler(
    ctx: Context<CollectFees>,
    amount_0_requested: u64,
    amount_1_requested: u64,
) -> Result<()> {
    let timestamp = Clock::get()?.unix_timestamp;
    let owner = ctx.accounts.owner.key();
    let pool_key = ctx.accounts.pool_state.key();

    let (pool, amount_0, amount_1) = {
        let pool = ctx.accounts.pool_state.load()?;
        validate_pool_tokens(
            &pool,
            &ctx.accounts.token_vault_0.key(),
            &ctx.accounts.token_vault_1.key(),
            &ctx.accounts.token_mint_0.key(),
            &ctx.accounts.token_mint_1.key(),
        )?;

        let lower = ctx.accounts.tick_array_lower.load()?;
        let upper = match &ctx.accounts.tick_array_upper {
            Some(loader) => Some(loader.load()?),
            None => None,
        };

        let (amount_0, amount_1) = collect_fees(
            &pool,
            &mut ctx.accounts.position,
            &lower,
            upper.as_deref().unwrap_or(&*lower),
            owner,
            amount_0_requested,
            amount_1_requested,
            timestamp,
        )?;
        (*pool, amount_0, amount_1)
    };

    let pool_account = ctx.accounts.pool_state.to_account_info();
    transfer_from_vault(
        &ctx.accounts.token_program,
        &pool_account,
        &pool,
        &ctx.accounts.token_vault_0,
        &ctx.accounts.recipient_token_0,
        &ctx.accounts.token_mint_0,
        amount_0,
    )?;
    transfer_from_vault(
        &ctx.accounts.token_program,
        &pool_account,
        &pool,
        &ctx.accounts.token_vault_1,
        &ctx.accounts.recipient_token_1,
        &ctx.accounts.token_mint_1,
        amount_1,
    )?;

    let position = &ctx.accounts.position;
    emit!(FeesCollectedEvent {
        pool_id: pool_key,
        owner,
        amount_0,
        amount_1,
    });
    emit!(PositionUpdateEvent {
        owner,
        pool: pool_key,
        liquidity: position.liquidity,
        tick_lower_index: position.tick_lower,
        tick_upper_index: position.tick_upper,
        tokens_owed_0: position.tokens_owed_0,
        tokens_owed_1: position.tokens_owed_1,
        update_type: "collect".to_string(),
    });

    msg!("Fees collected - Token 0: {}, Token 1: {}", amount_0, amount_1);

    Ok(())
}
