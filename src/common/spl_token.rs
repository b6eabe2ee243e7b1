//! SPL Token / Associated Token Account helpers used by the venues.
//!
//! Thin layer over `spl-token` and `spl-associated-token-account`; the
//! venues only ever talk to the classic Token program.

use crate::constants::TOKEN_PROGRAM;
use anyhow::Result;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_token::solana_program::program_pack::Pack;

pub use spl_associated_token_account::get_associated_token_address_with_program_id;

pub fn get_associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(wallet, mint, &TOKEN_PROGRAM)
}

/// Create the ATA of `owner` for `mint`; a no-op when it already exists.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Instruction {
    spl_associated_token_account::instruction::create_associated_token_account_idempotent(
        payer,
        owner,
        mint,
        token_program,
    )
}

/// Close `account` into `destination`, signed by its single `owner`.
pub fn close_account(
    token_program: &Pubkey,
    account: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction> {
    Ok(spl_token::instruction::close_account(token_program, account, destination, owner, &[])?)
}

pub fn sync_native(token_program: &Pubkey, account: &Pubkey) -> Result<Instruction> {
    Ok(spl_token::instruction::sync_native(token_program, account)?)
}

/// Balance of a packed, initialized token account.
pub fn decode_token_account_amount(data: &[u8]) -> Option<u64> {
    spl_token::state::Account::unpack(data).ok().map(|account| account.amount)
}

#[cfg(test)]
pub(crate) fn packed_token_account(mint: Pubkey, owner: Pubkey, amount: u64) -> Vec<u8> {
    let account = spl_token::state::Account {
        mint,
        owner,
        amount,
        state: spl_token::state::AccountState::Initialized,
        ..Default::default()
    };
    let mut data = vec![0u8; spl_token::state::Account::LEN];
    spl_token::state::Account::pack(account, &mut data).unwrap();
    data
}
