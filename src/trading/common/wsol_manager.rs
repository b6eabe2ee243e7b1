use crate::common::spl_token::{
    close_account, create_associated_token_account_idempotent, get_associated_token_address,
    sync_native,
};
use crate::constants::{TOKEN_PROGRAM, WSOL_MINT};
use anyhow::Result;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use solana_system_interface::instruction::transfer;

/// Create the wSOL ATA (idempotent), move `amount_in` lamports into it and sync.
pub fn handle_wsol(payer: &Pubkey, amount_in: u64) -> Result<Vec<Instruction>> {
    let wsol_token_account = get_associated_token_address(payer, &WSOL_MINT);
    Ok(vec![
        create_wsol_ata(payer),
        transfer(payer, &wsol_token_account, amount_in),
        sync_native(&TOKEN_PROGRAM, &wsol_token_account)?,
    ])
}

/// Close the wSOL ATA, unwrapping everything back to the payer.
pub fn close_wsol(payer: &Pubkey) -> Result<Instruction> {
    let wsol_token_account = get_associated_token_address(payer, &WSOL_MINT);
    close_account(&TOKEN_PROGRAM, &wsol_token_account, payer, payer)
}

pub fn create_wsol_ata(payer: &Pubkey) -> Instruction {
    create_associated_token_account_idempotent(payer, payer, &WSOL_MINT, &TOKEN_PROGRAM)
}
