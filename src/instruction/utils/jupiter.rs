//! Jupiter v6 swap API: quote, pre-assembled swap instructions and the
//! address lookup tables they reference.

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use solana_address_lookup_table_interface::state::AddressLookupTable;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    message::AddressLookupTableAccount,
    pubkey::Pubkey,
};
use std::str::FromStr;
use std::time::Duration;

/// `dynamicSlippage.maxBps` sent with every swap-instructions request.
pub const DYNAMIC_SLIPPAGE_MAX_BPS: u64 = 5_000;

/// Quote as returned by `/quote`. The raw body is posted back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct JupiterQuote {
    pub in_amount: u64,
    pub out_amount: u64,
    pub raw: Value,
}

impl JupiterQuote {
    pub fn from_value(raw: Value) -> Result<Self> {
        let amount = |field: &str| -> Result<u64> {
            let value = raw.get(field).ok_or_else(|| anyhow!("quote without {}", field))?;
            match value {
                Value::String(s) => s.parse::<u64>().with_context(|| format!("bad {}: {}", field, s)),
                Value::Number(n) => n.as_u64().ok_or_else(|| anyhow!("bad {}: {}", field, n)),
                other => Err(anyhow!("bad {}: {}", field, other)),
            }
        };
        Ok(Self { in_amount: amount("inAmount")?, out_amount: amount("outAmount")?, raw })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedAccountMeta {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// Instruction in Jupiter's JSON form: base58 keys, base64 data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedInstruction {
    pub program_id: String,
    pub accounts: Vec<EncodedAccountMeta>,
    pub data: String,
}

impl EncodedInstruction {
    pub fn to_instruction(&self) -> Result<Instruction> {
        let program_id = Pubkey::from_str(&self.program_id)
            .map_err(|e| anyhow!("bad program id {}: {}", self.program_id, e))?;
        let accounts = self
            .accounts
            .iter()
            .map(|meta| {
                let pubkey = Pubkey::from_str(&meta.pubkey)
                    .map_err(|e| anyhow!("bad account {}: {}", meta.pubkey, e))?;
                Ok(AccountMeta { pubkey, is_signer: meta.is_signer, is_writable: meta.is_writable })
            })
            .collect::<Result<Vec<_>>>()?;
        let data = STANDARD.decode(&self.data).context("instruction data is not base64")?;
        Ok(Instruction { program_id, accounts, data })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInstructionsResponse {
    #[serde(default)]
    pub compute_budget_instructions: Vec<EncodedInstruction>,
    #[serde(default)]
    pub setup_instructions: Vec<EncodedInstruction>,
    pub swap_instruction: EncodedInstruction,
    #[serde(default)]
    pub cleanup_instruction: Option<EncodedInstruction>,
    #[serde(default)]
    pub address_lookup_table_addresses: Vec<String>,
}

impl SwapInstructionsResponse {
    /// `compute budget + setup + swap + cleanup`, in execution order.
    pub fn instructions(&self) -> Result<Vec<Instruction>> {
        self.compute_budget_instructions
            .iter()
            .chain(&self.setup_instructions)
            .chain(std::iter::once(&self.swap_instruction))
            .chain(&self.cleanup_instruction)
            .map(EncodedInstruction::to_instruction)
            .collect()
    }

    pub fn lookup_table_addresses(&self) -> Result<Vec<Pubkey>> {
        self.address_lookup_table_addresses
            .iter()
            .map(|s| Pubkey::from_str(s).map_err(|e| anyhow!("bad lookup table {}: {}", s, e)))
            .collect()
    }
}

/// Decode a lookup table account's address list.
pub fn decode_lookup_table(key: Pubkey, data: &[u8]) -> Result<AddressLookupTableAccount> {
    let table = AddressLookupTable::deserialize(data)
        .map_err(|e| anyhow!("account {} is not a usable lookup table: {}", key, e))?;
    Ok(AddressLookupTableAccount { key, addresses: table.addresses.to_vec() })
}

/// Serialized lookup table holding `entries`, as the ledger would store it.
#[cfg(test)]
pub(crate) fn lookup_table_account_data(entries: &[Pubkey]) -> Vec<u8> {
    use solana_address_lookup_table_interface::state::LookupTableMeta;
    AddressLookupTable {
        meta: LookupTableMeta::default(),
        addresses: std::borrow::Cow::Owned(entries.to_vec()),
    }
    .serialize_for_tests()
    .unwrap()
}

/// Jupiter HTTP client
pub struct JupiterClient {
    pub base_url: String,
    pub http_client: Client,
}

impl JupiterClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(120))
            .tcp_nodelay(true)
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(3))
            .build()
            .context("failed to build Jupiter HTTP client")?;
        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), http_client })
    }

    pub async fn quote(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        slippage_bps: u64,
    ) -> Result<JupiterQuote> {
        let url = format!("{}/quote", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("inputMint", input_mint.to_string()),
                ("outputMint", output_mint.to_string()),
                ("amount", amount.to_string()),
                ("slippageBps", slippage_bps.to_string()),
            ])
            .send()
            .await
            .context("jupiter quote request failed")?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!("jupiter quote returned {}: {}", status, body));
        }
        let raw: Value = serde_json::from_str(&body)
            .map_err(|e| anyhow!("unexpected jupiter quote ({}): {}", e, body))?;
        JupiterQuote::from_value(raw)
    }

    pub async fn swap_instructions(
        &self,
        quote: &JupiterQuote,
        user: &Pubkey,
    ) -> Result<SwapInstructionsResponse> {
        let url = format!("{}/swap-instructions", self.base_url);
        let body = json!({
            "quoteResponse": quote.raw,
            "userPublicKey": user.to_string(),
            "wrapAndUnwrapSol": true,
            "dynamicSlippage": { "maxBps": DYNAMIC_SLIPPAGE_MAX_BPS },
            "dynamicComputeUnitLimit": true,
            "prioritizationFeeLamports": "auto",
        });
        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("jupiter swap-instructions request failed")?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!("jupiter swap-instructions returned {}: {}", status, text));
        }
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("unexpected jupiter swap-instructions ({}): {}", e, text))
    }
}
