use crate::{
    common::LedgerRpc,
    constants::WSOL_MINT,
    instruction::utils::jupiter::{decode_lookup_table, JupiterClient},
    trading::core::{
        errors::SwapError,
        params::{SwapDirection, SwapIntent},
        traits::{SwapVenue, VenueKind, VenueOutcome, VenueQuote},
    },
};
use anyhow::Result;
use solana_sdk::{message::AddressLookupTableAccount, pubkey::Pubkey, signer::Signer};
use std::sync::Arc;
use tracing::{debug, warn};

/// Jupiter aggregator venue. Always has a route or fails outright.
pub struct JupiterVenue {
    client: JupiterClient,
    rpc: Arc<dyn LedgerRpc>,
}

impl JupiterVenue {
    pub fn new(client: JupiterClient, rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { client, rpc }
    }

    /// Fetch and decode the referenced lookup tables; missing ones are skipped.
    async fn resolve_lookup_tables(&self, keys: &[Pubkey]) -> Result<Vec<AddressLookupTableAccount>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let accounts = self.rpc.get_multiple_accounts(keys).await?;
        let mut tables = Vec::with_capacity(keys.len());
        for (key, account) in keys.iter().zip(accounts) {
            match account {
                Some(account) => tables.push(decode_lookup_table(*key, &account.data)?),
                None => warn!(table = %key, "lookup table not found"),
            }
        }
        Ok(tables)
    }

    async fn build(&self, intent: &SwapIntent) -> Result<VenueQuote> {
        let (input_mint, output_mint) = match intent.direction {
            SwapDirection::Buy => (WSOL_MINT, intent.mint),
            SwapDirection::Sell => (intent.mint, WSOL_MINT),
        };
        let quote = self
            .client
            .quote(&input_mint, &output_mint, intent.amount, intent.slippage_basis_points)
            .await?;
        let response = self.client.swap_instructions(&quote, &intent.payer.pubkey()).await?;
        let instructions = response.instructions()?;
        let address_lookup_tables =
            self.resolve_lookup_tables(&response.lookup_table_addresses()?).await?;

        debug!(
            mint = %intent.mint,
            in_amount = quote.in_amount,
            out_amount = quote.out_amount,
            instructions = instructions.len(),
            lookup_tables = address_lookup_tables.len(),
            "jupiter quote"
        );
        Ok(VenueQuote {
            venue: VenueKind::Jupiter,
            input_amount: intent.amount,
            estimated_output_amount: quote.out_amount,
            instructions,
            address_lookup_tables,
        })
    }
}

#[async_trait::async_trait]
impl SwapVenue for JupiterVenue {
    fn kind(&self) -> VenueKind {
        VenueKind::Jupiter
    }

    async fn try_build(&self, intent: &SwapIntent) -> Result<VenueOutcome, SwapError> {
        self.build(intent).await.map(VenueOutcome::Quote).map_err(|e| SwapError::Venue {
            venue: VenueKind::Jupiter,
            message: format!("{:#}", e),
        })
    }
}
