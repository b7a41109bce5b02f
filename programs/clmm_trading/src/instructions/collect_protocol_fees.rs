use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::{AmmConfig, PoolState};
use crate::errors::ClmmError;
use crate::events::ProtocolFeesCollectedEvent;
use crate::utils::{transfer_from_vault, validate_pool_tokens};

/// Collect accumulated protocol fees from a pool
/// Only callable by the config owner
#[derive(Accounts)]
pub struct CollectProtocolFees<'info> {
    /// The config the pool was created under
    #[account(has_one = owner @ ClmmError::InvalidAuthority)]
    pub amm_config: Box<Account<'info, AmmConfig>>,

    /// The pool to collect fees from (zero-copy)
    #[account(mut)]
    pub pool_state: AccountLoader<'info, PoolState>,

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

    /// Config owner
    pub owner: Signer<'info>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
}

/// Collect protocol fees handler
pub fn handler(
    ctx: Context<CollectProtocolFees>,
    amount_0_requested: u64,
    amount_1_requested: u64,
) -> Result<()> {
    let (pool, amount_0, amount_1) = {
        let mut pool = ctx.accounts.pool_state.load_mut()?;
        require_keys_eq!(
            pool.amm_config_pubkey(),
            ctx.accounts.amm_config.key(),
            ClmmError::InvalidPoolState
        );
        validate_pool_tokens(
            &pool,
            &ctx.accounts.token_vault_0.key(),
            &ctx.accounts.token_vault_1.key(),
            &ctx.accounts.token_mint_0.key(),
            &ctx.accounts.token_mint_1.key(),
        )?;

        let (amount_0, amount_1) = pool.take_protocol_fees(amount_0_requested, amount_1_requested);
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

    emit!(ProtocolFeesCollectedEvent {
        pool_id: ctx.accounts.pool_state.key(),
        recipient: ctx.accounts.owner.key(),
        amount_0,
        amount_1,
    });

    msg!("Protocol fees collected - Token 0: {}, Token 1: {}", amount_0, amount_1);

    Ok(())
}
