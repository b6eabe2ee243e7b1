use anyhow::{anyhow, Result};
use crate::constants::COMPUTE_BUDGET_PROGRAM;
use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::{v0, AddressLookupTableAccount, VersionedMessage},
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::VersionedTransaction,
};
use solana_system_interface::instruction::transfer;

/// Compute-budget prefix; empty when neither value is configured.
pub fn compute_budget_instructions(unit_price: Option<u64>, unit_limit: Option<u32>) -> Vec<Instruction> {
    let mut instructions = Vec::with_capacity(2);
    if let Some(limit) = unit_limit {
        instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(limit));
    }
    if let Some(price) = unit_price.filter(|p| *p > 0) {
        instructions.push(ComputeBudgetInstruction::set_compute_unit_price(price));
    }
    instructions
}

/// Swap transaction: `[compute budget] + venue instructions + [tip transfer]`.
///
/// Venues that already ship compute-budget instructions keep theirs; the
/// runtime rejects duplicates.
pub fn build_swap_transaction(
    payer: &Keypair,
    business_instructions: &[Instruction],
    address_lookup_tables: &[AddressLookupTableAccount],
    recent_blockhash: Hash,
    tip: Option<(Pubkey, u64)>,
    unit_price: Option<u64>,
    unit_limit: Option<u32>,
) -> Result<VersionedTransaction> {
    let venue_sets_budget =
        business_instructions.iter().any(|ix| ix.program_id == COMPUTE_BUDGET_PROGRAM);
    let mut instructions = if venue_sets_budget {
        Vec::with_capacity(business_instructions.len() + 1)
    } else {
        compute_budget_instructions(unit_price, unit_limit)
    };
    instructions.extend_from_slice(business_instructions);

    if let Some((tip_account, tip_lamports)) = tip {
        if tip_lamports > 0 {
            instructions.push(transfer(&payer.pubkey(), &tip_account, tip_lamports));
        }
    }

    build_versioned_transaction(payer, &instructions, address_lookup_tables, recent_blockhash)
}

/// Compile a v0 message and sign it with `payer` as the only signer.
pub fn build_versioned_transaction(
    payer: &Keypair,
    instructions: &[Instruction],
    address_lookup_tables: &[AddressLookupTableAccount],
    recent_blockhash: Hash,
) -> Result<VersionedTransaction> {
    if instructions.is_empty() {
        return Err(anyhow!("refusing to build a transaction without instructions"));
    }
    let message =
        v0::Message::try_compile(&payer.pubkey(), instructions, address_lookup_tables, recent_blockhash)
            .map_err(|e| anyhow!("failed to compile v0 message: {}", e))?;
    VersionedTransaction::try_new(VersionedMessage::V0(message), &[payer])
        .map_err(|e| anyhow!("交易签名失败: {}", e))
}
