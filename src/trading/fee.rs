//! Protocol fee and referral payouts.

use crate::constants::trade::{BASIS_POINTS_DENOMINATOR, FULL_CENTI_PERCENT};
use crate::trading::common::build_versioned_transaction;
use crate::trading::core::params::ReferralChain;
use crate::utils::calc::big_num::mul_div_floor;
use anyhow::Result;
use solana_sdk::{
    hash::Hash, instruction::Instruction, pubkey::Pubkey, signature::Keypair, signer::Signer,
    transaction::VersionedTransaction,
};
use solana_system_interface::instruction::transfer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeDistributor {
    pub treasury: Pubkey,
    pub protocol_fee_basis_points: u64,
}

impl FeeDistributor {
    pub fn new(treasury: Pubkey, protocol_fee_basis_points: u64) -> Self {
        Self { treasury, protocol_fee_basis_points }
    }

    /// Fee on the leg that carries lamports: input on buy, output on sell.
    pub fn protocol_fee(&self, lamports: u64) -> u64 {
        mul_div_floor(lamports, self.protocol_fee_basis_points, BASIS_POINTS_DENOMINATOR)
            .unwrap_or(0)
    }

    /// 计算返佣分配
    ///
    /// Referrers first in chain order, treasury last. Zero payouts are left
    /// out; the percentage of an omitted referrer stays with the treasury.
    pub fn split(&self, fee: u64, chain: &ReferralChain) -> Vec<(Pubkey, u64)> {
        let mut payouts = Vec::with_capacity(chain.len() + 1);
        let mut paid_centi_percent = 0u64;

        for edge in chain.edges() {
            let amount = mul_div_floor(fee, edge.centi_percent, FULL_CENTI_PERCENT).unwrap_or(0);
            if amount == 0 {
                continue;
            }
            paid_centi_percent += edge.centi_percent;
            payouts.push((edge.payout, amount));
        }

        let remaining = FULL_CENTI_PERCENT.saturating_sub(paid_centi_percent);
        let treasury_amount = mul_div_floor(fee, remaining, FULL_CENTI_PERCENT).unwrap_or(0);
        if treasury_amount > 0 {
            payouts.push((self.treasury, treasury_amount));
        }
        payouts
    }

    /// Transfer instructions for the split, `None` when nothing is paid.
    pub fn build_fee_instructions(
        &self,
        payer: &Pubkey,
        fee: u64,
        chain: &ReferralChain,
    ) -> Option<Vec<Instruction>> {
        let instructions: Vec<Instruction> = self
            .split(fee, chain)
            .into_iter()
            .map(|(to, lamports)| transfer(payer, &to, lamports))
            .collect();
        (!instructions.is_empty()).then_some(instructions)
    }

    /// Signed transfer-only transaction, `None` when nothing is paid.
    pub fn build_fee_transaction(
        &self,
        payer: &Keypair,
        fee: u64,
        chain: &ReferralChain,
        recent_blockhash: Hash,
    ) -> Result<Option<VersionedTransaction>> {
        let Some(instructions) = self.build_fee_instructions(&payer.pubkey(), fee, chain) else {
            return Ok(None);
        };
        build_versioned_transaction(payer, &instructions, &[], recent_blockhash).map(Some)
    }
}
