//! 交易序列化模块

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use solana_sdk::transaction::VersionedTransaction;

/// Wire form expected by the block engine: bincode, then standard base64.
pub fn encode_transaction_base64(transaction: &VersionedTransaction) -> Result<String> {
    let bytes = bincode::serialize(transaction).context("failed to serialize transaction")?;
    Ok(STANDARD.encode(bytes))
}

pub fn encode_bundle_base64(transactions: &[VersionedTransaction]) -> Result<Vec<String>> {
    transactions.iter().map(encode_transaction_base64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        message::{v0, VersionedMessage},
        signature::Keypair,
        signer::Signer,
    };
    use solana_system_interface::instruction::transfer;

    #[test]
    fn encoded_transaction_decodes_back() {
        let payer = Keypair::new();
        let ix = transfer(&payer.pubkey(), &payer.pubkey(), 1);
        let message = v0::Message::try_compile(&payer.pubkey(), &[ix], &[], Hash::default()).unwrap();
        let tx = VersionedTransaction::try_new(VersionedMessage::V0(message), &[&payer]).unwrap();

        let encoded = encode_transaction_base64(&tx).unwrap();
        let decoded: VersionedTransaction =
            bincode::deserialize(&STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(decoded.signatures, tx.signatures);
    }
}
