use anchor_lang::prelude::*;
use crate::state::AmmConfig;
use crate::constants::seeds;

/// Create a fee tier config that pools are created under
#[derive(Accounts)]
#[instruction(index: u16)]
pub struct InitializeAmmConfig<'info> {
    /// The config account to initialize
    #[account(
        init,
        payer = owner,
        space = AmmConfig::LEN,
        seeds = [seeds::AMM_CONFIG_SEED, &index.to_le_bytes()],
        bump
    )]
    pub amm_config: Account<'info, AmmConfig>,

    /// Config owner, allowed to collect protocol fees
    #[account(mut)]
    pub owner: Signer<'info>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Initialize AMM config handler
pub fn handler(
    ctx: Context<InitializeAmmConfig>,
    index: u16,
    trade_fee_rate: u32,
    protocol_fee_rate: u32,
    tick_spacing: u16,
    max_price_impact_bps: u32,
) -> Result<()> {
    AmmConfig::validate(trade_fee_rate, protocol_fee_rate, tick_spacing, max_price_impact_bps)?;

    let amm_config = &mut ctx.accounts.amm_config;
    amm_config.owner = ctx.accounts.owner.key();
    amm_config.index = index;
    amm_config.trade_fee_rate = trade_fee_rate;
    amm_config.protocol_fee_rate = protocol_fee_rate;
    amm_config.tick_spacing = tick_spacing;
    amm_config.max_price_impact_bps = max_price_impact_bps;
    amm_config.bump = ctx.bumps.amm_config;

    msg!("AMM config {} initialized", index);
    msg!("Trade fee rate: {} bps, protocol share: {} bps", trade_fee_rate, protocol_fee_rate);
    msg!("Tick spacing: {}", tick_spacing);

    Ok(())
}
