//! Token transfer helpers shared by instruction handlers

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::seeds;
use crate::errors::ClmmError;
use crate::state::PoolState;

/// Validate token ordering (token 0 must be < token 1 lexicographically)
pub fn validate_token_order(token_0: &Pubkey, token_1: &Pubkey) -> bool {
    token_0 < token_1
}

/// Check the passed vaults and mints are the pool's own, in token order
pub fn validate_pool_tokens(
    pool: &PoolState,
    token_vault_0: &Pubkey,
    token_vault_1: &Pubkey,
    token_mint_0: &Pubkey,
    token_mint_1: &Pubkey,
) -> Result<()> {
    require!(
        pool.token_mint_0 == token_mint_0.to_bytes()
            && pool.token_mint_1 == token_mint_1.to_bytes(),
        ClmmError::InvalidTokenMint
    );
    require!(
        pool.token_vault_0 == token_vault_0.to_bytes()
            && pool.token_vault_1 == token_vault_1.to_bytes(),
        ClmmError::InvalidTokenAccountOwner
    );
    Ok(())
}

/// Move tokens from a user account into a pool vault
pub fn transfer_from_user<'info>(
    token_program: &Interface<'info, TokenInterface>,
    from: &InterfaceAccount<'info, TokenAccount>,
    to_vault: &InterfaceAccount<'info, TokenAccount>,
    mint: &InterfaceAccount<'info, Mint>,
    authority: &Signer<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    transfer_checked(
        CpiContext::new(
            token_program.to_account_info(),
            TransferChecked {
                from: from.to_account_info(),
                mint: mint.to_account_info(),
                to: to_vault.to_account_info(),
                authority: authority.to_account_info(),
            },
        ),
        amount,
        mint.decimals,
    )
}

/// Move tokens out of a pool vault, signed by the pool PDA
///
/// `pool` is a snapshot of the pool state; the signer seeds are
/// ["pool", amm_config, token_mint_0, token_mint_1, bump].
#[allow(clippy::too_many_arguments)]
pub fn transfer_from_vault<'info>(
    token_program: &Interface<'info, TokenInterface>,
    pool_account: &AccountInfo<'info>,
    pool: &PoolState,
    from_vault: &InterfaceAccount<'info, TokenAccount>,
    to: &InterfaceAccount<'info, TokenAccount>,
    mint: &InterfaceAccount<'info, Mint>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let bump = [pool.bump];
    let pool_seeds: &[&[u8]] = &[
        seeds::POOL_SEED,
        &pool.amm_config,
        &pool.token_mint_0,
        &pool.token_mint_1,
        &bump,
    ];

    transfer_checked(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            TransferChecked {
                from: from_vault.to_account_info(),
                mint: mint.to_account_info(),
                to: to.to_account_info(),
                authority: pool_account.clone(),
            },
            &[pool_seeds],
        ),
        amount,
        mint.decimals,
    )
}
