use crate::constants::{
    accounts::DEFAULT_TREASURY,
    swqos::{DEFAULT_BUNDLE_POLL_INTERVAL_MS, MAX_BUNDLE_STATUS_CHECKS},
    trade::{DEFAULT_BLOCKHASH_REFRESH_MS, DEFAULT_PROTOCOL_FEE_BASIS_POINTS, MIN_RESERVE_LAMPORTS},
};
use crate::swqos::jito::types::JitoRegion;
use anyhow::{anyhow, Result};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_JUPITER_API_URL: &str = "https://quote-api.jup.ag/v6";

/// Engine configuration (wallet-independent).
///
/// One engine serves every user; per-user settings (key, slippage, tip,
/// referral chain) arrive with each swap intent.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub jito_region: JitoRegion,
    /// Jito auth token, empty for the public rate limit
    pub jito_auth_token: String,
    pub jupiter_api_url: String,
    /// Receives whatever share of the protocol fee no referrer claims
    pub treasury: Pubkey,
    pub protocol_fee_basis_points: u64,
    /// Lamports a buy must leave in the wallet
    pub min_reserve_lamports: u64,
    pub blockhash_refresh_interval: Duration,
    pub bundle_poll_interval: Duration,
    pub bundle_max_attempts: u32,
    pub compute_unit_limit: Option<u32>,
    pub compute_unit_price: Option<u64>,
}

impl EngineConfig {
    pub fn new(rpc_url: String) -> Self {
        Self {
            rpc_url,
            commitment: CommitmentConfig::confirmed(),
            jito_region: JitoRegion::Tokyo,
            jito_auth_token: String::new(),
            jupiter_api_url: DEFAULT_JUPITER_API_URL.to_string(),
            treasury: DEFAULT_TREASURY,
            protocol_fee_basis_points: DEFAULT_PROTOCOL_FEE_BASIS_POINTS,
            min_reserve_lamports: MIN_RESERVE_LAMPORTS,
            blockhash_refresh_interval: Duration::from_millis(DEFAULT_BLOCKHASH_REFRESH_MS),
            bundle_poll_interval: Duration::from_millis(DEFAULT_BUNDLE_POLL_INTERVAL_MS),
            bundle_max_attempts: MAX_BUNDLE_STATUS_CHECKS,
            compute_unit_limit: None,
            compute_unit_price: None,
        }
    }

    /// Build from `RPC_URL`, `JITO_REGION`, `JITO_AUTH_TOKEN`, `JUPITER_API_URL`
    /// and `TREASURY_WALLET`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("RPC_URL").ok_or_else(|| anyhow!("RPC_URL is not set"))?;
        let mut config = Self::new(rpc_url);
        if let Some(region) = lookup("JITO_REGION") {
            config.jito_region = JitoRegion::from_str(&region)?;
        }
        if let Some(token) = lookup("JITO_AUTH_TOKEN") {
            config.jito_auth_token = token;
        }
        if let Some(url) = lookup("JUPITER_API_URL") {
            config.jupiter_api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(treasury) = lookup("TREASURY_WALLET") {
            config.treasury = Pubkey::from_str(&treasury)
                .map_err(|e| anyhow!("invalid TREASURY_WALLET '{}': {}", treasury, e))?;
        }
        Ok(config)
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_jito(mut self, region: JitoRegion, auth_token: String) -> Self {
        self.jito_region = region;
        self.jito_auth_token = auth_token;
        self
    }

    pub fn with_jupiter_api_url(mut self, url: impl Into<String>) -> Self {
        self.jupiter_api_url = url.into();
        self
    }

    pub fn with_treasury(mut self, treasury: Pubkey) -> Self {
        self.treasury = treasury;
        self
    }

    pub fn with_protocol_fee_basis_points(mut self, basis_points: u64) -> Self {
        self.protocol_fee_basis_points = basis_points;
        self
    }

    pub fn with_min_reserve_lamports(mut self, lamports: u64) -> Self {
        self.min_reserve_lamports = lamports;
        self
    }

    pub fn with_blockhash_refresh_interval(mut self, interval: Duration) -> Self {
        self.blockhash_refresh_interval = interval;
        self
    }

    pub fn with_bundle_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.bundle_poll_interval = interval;
        self.bundle_max_attempts = max_attempts;
        self
    }

    pub fn with_compute_budget(mut self, unit_limit: u32, unit_price: u64) -> Self {
        self.compute_unit_limit = Some(unit_limit);
        self.compute_unit_price = Some(unit_price);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_protocol_constants() {
        let config = EngineConfig::new("http://127.0.0.1:8899".to_string());
        assert_eq!(config.protocol_fee_basis_points, 90);
        assert_eq!(config.min_reserve_lamports, 3_000_000);
        assert_eq!(config.bundle_max_attempts, 20);
        assert_eq!(config.jito_region, JitoRegion::Tokyo);
        assert_eq!(config.treasury, DEFAULT_TREASURY);
    }

    #[test]
    fn env_lookup_overrides_defaults() {
        let treasury = Pubkey::new_unique();
        let vars: HashMap<&str, String> = HashMap::from([
            ("RPC_URL", "http://rpc.local".to_string()),
            ("JITO_REGION", "ny".to_string()),
            ("JUPITER_API_URL", "http://jup.local/v6/".to_string()),
            ("TREASURY_WALLET", treasury.to_string()),
        ]);
        let config = EngineConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.rpc_url, "http://rpc.local");
        assert_eq!(config.jito_region, JitoRegion::NewYork);
        assert_eq!(config.jupiter_api_url, "http://jup.local/v6");
        assert_eq!(config.treasury, treasury);
    }

    #[test]
    fn env_lookup_rejects_bad_values() {
        assert!(EngineConfig::from_lookup(|_| None).is_err());
        let bad_treasury = |k: &str| match k {
            "RPC_URL" => Some("http://rpc.local".to_string()),
            "TREASURY_WALLET" => Some("not-a-key".to_string()),
            _ => None,
        };
        assert!(EngineConfig::from_lookup(bad_treasury).is_err());
    }
}
