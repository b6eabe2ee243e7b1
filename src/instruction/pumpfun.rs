use crate::{
    common::{
        bonding_curve::BondingCurveState,
        spl_token::{create_associated_token_account_idempotent, get_associated_token_address},
        LedgerRpc,
    },
    constants::{SYSTEM_PROGRAM_META, TOKEN_PROGRAM, TOKEN_PROGRAM_META},
    instruction::utils::pumpfun::{
        accounts, encode_trade_data, fee_config_meta, get_bonding_curve_pda,
        get_creator_vault_pda, get_user_volume_accumulator_pda, global_constants,
        global_volume_accumulator_meta, BUY_DISCRIMINATOR, SELL_DISCRIMINATOR,
    },
    trading::{
        common::wsol_manager::{close_wsol, create_wsol_ata},
        core::{
            errors::SwapError,
            params::{SwapDirection, SwapIntent},
            traits::{SwapVenue, VenueKind, VenueOutcome, VenueQuote},
        },
    },
    utils::calc::common::calculate_with_slippage_buy,
};
use anyhow::Result;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signer::Signer,
};
use std::sync::Arc;
use tracing::debug;

/// pump.fun bonding-curve venue. The curve account is read fresh on every
/// attempt.
pub struct PumpFunVenue {
    rpc: Arc<dyn LedgerRpc>,
}

impl PumpFunVenue {
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { rpc }
    }

    /// Current curve state, `Ok(None)` when the account does not exist.
    pub async fn fetch_curve(&self, mint: &Pubkey) -> Result<Option<BondingCurveState>, SwapError> {
        let address = get_bonding_curve_pda(mint);
        let account = self.rpc.get_account(&address).await.map_err(|e| SwapError::Venue {
            venue: VenueKind::PumpFun,
            message: format!("failed to fetch bonding curve {}: {:#}", address, e),
        })?;
        Ok(account
            .filter(|account| account.owner == accounts::PUMPFUN)
            .and_then(|account| BondingCurveState::decode(&account.data)))
    }
}

#[async_trait::async_trait]
impl SwapVenue for PumpFunVenue {
    fn kind(&self) -> VenueKind {
        VenueKind::PumpFun
    }

    async fn try_build(&self, intent: &SwapIntent) -> Result<VenueOutcome, SwapError> {
        let Some(curve) = self.fetch_curve(&intent.mint).await? else {
            return Ok(VenueOutcome::Unavailable("bonding curve not found".to_string()));
        };
        if curve.complete {
            return Ok(VenueOutcome::Unavailable("bonding curve completed".to_string()));
        }
        if !curve.is_priceable() {
            return Ok(VenueOutcome::Unavailable("bonding curve has no reserves".to_string()));
        }
        let Some(creator) = curve.creator else {
            return Ok(VenueOutcome::Unavailable("bonding curve has no creator".to_string()));
        };

        let payer = intent.payer.pubkey();
        let quote = match intent.direction {
            SwapDirection::Buy => {
                let token_amount = match curve.get_buy_token_amount(intent.amount) {
                    Some(amount) if amount > 0 => amount,
                    _ => {
                        return Ok(VenueOutcome::Unavailable(
                            "input outside the curve's price range".to_string(),
                        ));
                    }
                };
                let max_sol_cost =
                    calculate_with_slippage_buy(intent.amount, intent.slippage_basis_points);
                debug!(mint = %intent.mint, token_amount, max_sol_cost, "pumpfun buy quote");
                VenueQuote {
                    venue: VenueKind::PumpFun,
                    input_amount: intent.amount,
                    estimated_output_amount: token_amount,
                    instructions: build_buy_instructions(
                        &payer,
                        &intent.mint,
                        &creator,
                        token_amount,
                        max_sol_cost,
                    ),
                    address_lookup_tables: Vec::new(),
                }
            }
            SwapDirection::Sell => {
                let Some(min_sol_output) =
                    curve.get_sell_min_sol_output(intent.amount, intent.slippage_basis_points)
                else {
                    return Ok(VenueOutcome::Unavailable("curve cannot price the sale".to_string()));
                };
                debug!(mint = %intent.mint, min_sol_output, "pumpfun sell quote");
                VenueQuote {
                    venue: VenueKind::PumpFun,
                    input_amount: intent.amount,
                    estimated_output_amount: min_sol_output,
                    instructions: build_sell_instructions(
                        &payer,
                        &intent.mint,
                        &creator,
                        intent.amount,
                        min_sol_output,
                    )
                    .map_err(|e| SwapError::Venue {
                        venue: VenueKind::PumpFun,
                        message: format!("failed to build sell instructions: {:#}", e),
                    })?,
                    address_lookup_tables: Vec::new(),
                }
            }
        };
        Ok(VenueOutcome::Quote(quote))
    }
}

/// `create mint ATA` + `buy(token_amount, max_sol_cost)`. The program
/// debits native lamports, so nothing is wrapped on the way in.
pub fn build_buy_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    creator: &Pubkey,
    token_amount: u64,
    max_sol_cost: u64,
) -> Vec<Instruction> {
    let bonding_curve = get_bonding_curve_pda(mint);
    let associated_bonding_curve = get_associated_token_address(&bonding_curve, mint);
    let user_token_account = get_associated_token_address(payer, mint);

    let accounts: [AccountMeta; 16] = [
        global_constants::GLOBAL_ACCOUNT_META,
        global_constants::FEE_RECIPIENT_META,
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(bonding_curve, false),
        AccountMeta::new(associated_bonding_curve, false),
        AccountMeta::new(user_token_account, false),
        AccountMeta::new(*payer, true),
        SYSTEM_PROGRAM_META,
        TOKEN_PROGRAM_META,
        AccountMeta::new(get_creator_vault_pda(creator), false),
        accounts::EVENT_AUTHORITY_META,
        accounts::PUMPFUN_META,
        global_volume_accumulator_meta(),
        AccountMeta::new(get_user_volume_accumulator_pda(payer), false),
        fee_config_meta(),
        accounts::FEE_PROGRAM_META,
    ];

    vec![
        create_associated_token_account_idempotent(payer, payer, mint, &TOKEN_PROGRAM),
        Instruction::new_with_bytes(
            accounts::PUMPFUN,
            &encode_trade_data(BUY_DISCRIMINATOR, token_amount, max_sol_cost),
            accounts.to_vec(),
        ),
    ]
}

/// `create wSOL ATA` + `sell(token_amount, min_sol_output)` + `close wSOL`.
pub fn build_sell_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    creator: &Pubkey,
    token_amount: u64,
    min_sol_output: u64,
) -> Result<Vec<Instruction>> {
    let bonding_curve = get_bonding_curve_pda(mint);
    let associated_bonding_curve = get_associated_token_address(&bonding_curve, mint);
    let user_token_account = get_associated_token_address(payer, mint);

    // sell 的账户顺序与 buy 不同：creator_vault 在 token program 之前
    let accounts: [AccountMeta; 14] = [
        global_constants::GLOBAL_ACCOUNT_META,
        global_constants::FEE_RECIPIENT_META,
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(bonding_curve, false),
        AccountMeta::new(associated_bonding_curve, false),
        AccountMeta::new(user_token_account, false),
        AccountMeta::new(*payer, true),
        SYSTEM_PROGRAM_META,
        AccountMeta::new(get_creator_vault_pda(creator), false),
        TOKEN_PROGRAM_META,
        accounts::EVENT_AUTHORITY_META,
        accounts::PUMPFUN_META,
        fee_config_meta(),
        accounts::FEE_PROGRAM_META,
    ];

    Ok(vec![
        create_wsol_ata(payer),
        Instruction::new_with_bytes(
            accounts::PUMPFUN,
            &encode_trade_data(SELL_DISCRIMINATOR, token_amount, min_sol_output),
            accounts.to_vec(),
        ),
        // unwrap step: the close returns the wSOL ATA lamports and rent to the payer
        close_wsol(payer)?,
    ])
}
