use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::{AmmConfig, ObservationState, PoolState, TickArray};
use crate::engine::{swap, SwapParams, TickArraySequence};
use crate::errors::ClmmError;
use crate::events::PoolUpdateEvent;
use crate::utils::{transfer_from_user, transfer_from_vault};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct SwapV2Params {
    pub amount: u64,
    pub other_amount_threshold: u64,
    pub sqrt_price_limit_x64: u128,
    pub is_base_input: bool,
}

/// Execute a swap on a pool
/// Tick arrays are passed as remaining accounts, in traversal order
#[derive(Accounts)]
pub struct SwapV2<'info> {
    /// The user performing the swap
    pub payer: Signer<'info>,

    /// The config the pool was created under
    pub amm_config: Box<Account<'info, AmmConfig>>,

    /// The pool to swap on (zero-copy)
    #[account(mut)]
    pub pool_state: AccountLoader<'info, PoolState>,

    /// User's input token account
    #[account(
        mut,
        constraint = input_token_account.owner == payer.key() @ ClmmError::InvalidTokenAccountOwner,
    )]
    pub input_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// User's output token account
    #[account(mut)]
    pub output_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Pool vault receiving the input token
    #[account(mut)]
    pub input_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Pool vault paying out the output token
    #[account(mut)]
    pub output_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// The pool's observation ring buffer (zero-copy)
    #[account(mut)]
    pub observation_state: AccountLoader<'info, ObservationState>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,

    /// CHECK: accepted for interface compatibility, transfers go through `token_program`
    pub token_program_2022: UncheckedAccount<'info>,

    /// CHECK: accepted for interface compatibility, no memo is written
    pub memo_program: UncheckedAccount<'info>,

    /// Mint of the input vault
    #[account(address = input_vault.mint @ ClmmError::InvalidTokenMint)]
    pub input_vault_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Mint of the output vault
    #[account(address = output_vault.mint @ ClmmError::InvalidTokenMint)]
    pub output_vault_mint: Box<InterfaceAccount<'info, Mint>>,
}

/// Swap handler
pub fn handler<'a, 'b, 'c: 'info, 'info>(
    ctx: Context<'a, 'b, 'c, 'info, SwapV2<'info>>,
    params: SwapV2Params,
) -> Result<()> {
    let timestamp = Clock::get()?.unix_timestamp;

    let (pool, result) = {
        let mut pool = ctx.accounts.pool_state.load_mut()?;
        require_keys_eq!(
            pool.amm_config_pubkey(),
            ctx.accounts.amm_config.key(),
            ClmmError::InvalidPoolState
        );
        require_keys_eq!(
            pool.observation_key_pubkey(),
            ctx.accounts.observation_state.key(),
            ClmmError::ObservationStateInvalid
        );

        // Direction follows the input vault
        let input_vault = ctx.accounts.input_vault.key();
        let output_vault = ctx.accounts.output_vault.key();
        let zero_for_one = input_vault == pool.token_vault_0_pubkey();
        let (expected_input, expected_output) = if zero_for_one {
            (pool.token_vault_0_pubkey(), pool.token_vault_1_pubkey())
        } else {
            (pool.token_vault_1_pubkey(), pool.token_vault_0_pubkey())
        };
        require_keys_eq!(input_vault, expected_input, ClmmError::InvalidTokenAccountOwner);
        require_keys_eq!(output_vault, expected_output, ClmmError::InvalidTokenAccountOwner);

        let loaders = ctx
            .remaining_accounts
            .iter()
            .map(AccountLoader::<TickArray>::try_from)
            .collect::<Result<Vec<_>>>()?;
        let mut tick_arrays = loaders
            .iter()
            .map(|loader| loader.load_mut())
            .collect::<Result<Vec<_>>>()?;
        let mut sequence = TickArraySequence::new(
            tick_arrays.iter_mut().map(|array| &mut **array).collect(),
            &pool,
            zero_for_one,
        )?;

        let mut observation = ctx.accounts.observation_state.load_mut()?;
        let result = swap(
            &mut pool,
            &ctx.accounts.amm_config,
            &mut sequence,
            &mut observation,
            &SwapParams {
                amount: params.amount,
                other_amount_threshold: params.other_amount_threshold,
                sqrt_price_limit_x64: params.sqrt_price_limit_x64,
                is_base_input: params.is_base_input,
                zero_for_one,
            },
            timestamp,
        )?;
        (*pool, result)
    };

    transfer_from_user(
        &ctx.accounts.token_program,
        &ctx.accounts.input_token_account,
        &ctx.accounts.input_vault,
        &ctx.accounts.input_vault_mint,
        &ctx.accounts.payer,
        result.amount_in,
    )?;
    transfer_from_vault(
        &ctx.accounts.token_program,
        &ctx.accounts.pool_state.to_account_info(),
        &pool,
        &ctx.accounts.output_vault,
        &ctx.accounts.output_token_account,
        &ctx.accounts.output_vault_mint,
        result.amount_out,
    )?;

    emit!(result.event.clone());
    emit!(PoolUpdateEvent {
        pool_id: ctx.accounts.pool_state.key(),
        sqrt_price: pool.sqrt_price_x64,
        tick_index: pool.current_tick_index,
        liquidity: pool.liquidity,
        fee_growth_global_0: pool.fee_growth_global_0_x64,
        fee_growth_global_1: pool.fee_growth_global_1_x64,
    });

    let (token_in, token_out) = if result.event.zero_for_one { (0, 1) } else { (1, 0) };
    msg!("Swap: {} -> {}", token_in, token_out);
    msg!(
        "In: {}, Out: {}, Ticks crossed: {}",
        result.amount_in,
        result.amount_out,
        result.ticks_crossed
    );
    msg!("Price impact: {} bps", result.price_impact_bps);

    Ok(())
}
