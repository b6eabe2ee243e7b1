pub mod types;

pub use types::{BundleStatus, JitoRegion};

use crate::constants::swqos::JITO_TIP_ACCOUNTS;
use crate::swqos::{serialization::encode_bundle_base64, RelayClient};
use anyhow::{anyhow, Context, Result};
use rand::seq::IndexedRandom;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use solana_sdk::{pubkey::Pubkey, transaction::VersionedTransaction};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Jito accepts at most five transactions per bundle.
pub const MAX_BUNDLE_TRANSACTIONS: usize = 5;

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct InflightStatuses {
    #[serde(default)]
    value: Option<Vec<InflightStatus>>,
}

#[derive(Debug, Deserialize)]
struct InflightStatus {
    bundle_id: String,
    status: String,
}

/// Block-engine JSON-RPC client for bundle submission and status.
pub struct JitoClient {
    pub endpoint: String,
    pub auth_token: String,
    pub http_client: Client,
}

#[async_trait::async_trait]
impl RelayClient for JitoClient {
    async fn send_bundle(&self, transactions: &[VersionedTransaction]) -> Result<String> {
        self.send_bundle_impl(transactions).await
    }

    async fn get_bundle_status(&self, bundle_id: &str) -> Result<BundleStatus> {
        self.get_inflight_status_impl(bundle_id).await
    }

    fn tip_account(&self) -> Result<Pubkey> {
        JITO_TIP_ACCOUNTS
            .choose(&mut rand::rng())
            .copied()
            .ok_or_else(|| anyhow!("no valid tip accounts found"))
    }
}

impl JitoClient {
    /// 创建新的 Jito Client
    pub fn new(region: JitoRegion, auth_token: String) -> Result<Self> {
        Self::with_endpoint(region.endpoint().to_string(), auth_token)
    }

    /// Client against an explicit block-engine base URL.
    pub fn with_endpoint(endpoint: String, auth_token: String) -> Result<Self> {
        let http_client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(64)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .timeout(Duration::from_millis(3000))
            .connect_timeout(Duration::from_millis(2000))
            .build()
            .context("failed to build Jito HTTP client")?;
        Ok(Self { endpoint: endpoint.trim_end_matches('/').to_string(), auth_token, http_client })
    }

    fn url(&self, path: &str) -> String {
        if self.auth_token.is_empty() {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("{}{}?uuid={}", self.endpoint, path, self.auth_token)
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let mut request = self
            .http_client
            .post(self.url(path))
            .header("Content-Type", "application/json");
        if !self.auth_token.is_empty() {
            request = request.header("x-jito-auth", &self.auth_token);
        }
        let response_text = request
            .body(body.to_string())
            .send()
            .await
            .with_context(|| format!("jito request to {} failed", path))?
            .text()
            .await?;

        let response: JsonRpcResponse<T> = serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("unexpected jito response ({}): {}", e, response_text))?;
        if let Some(error) = response.error {
            return Err(anyhow!("jito error: {}", error));
        }
        response.result.ok_or_else(|| anyhow!("jito response without result: {}", response_text))
    }

    pub async fn send_bundle_impl(&self, transactions: &[VersionedTransaction]) -> Result<String> {
        if transactions.is_empty() || transactions.len() > MAX_BUNDLE_TRANSACTIONS {
            return Err(anyhow!(
                "bundle must hold 1..={} transactions, got {}",
                MAX_BUNDLE_TRANSACTIONS,
                transactions.len()
            ));
        }
        let start_time = Instant::now();
        let txs_base64 = encode_bundle_base64(transactions)?;
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "sendBundle",
            "params": [txs_base64, { "encoding": "base64" }],
        });

        match self.post::<String>("/api/v1/bundles", body).await {
            Ok(bundle_id) => {
                debug!(%bundle_id, elapsed = ?start_time.elapsed(), "jito bundle submitted");
                Ok(bundle_id)
            }
            Err(e) => {
                warn!(error = %e, "jito bundle submission failed");
                Err(e)
            }
        }
    }

    pub async fn get_inflight_status_impl(&self, bundle_id: &str) -> Result<BundleStatus> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getInflightBundleStatuses",
            "params": [[bundle_id]],
        });
        let statuses: InflightStatuses =
            self.post("/api/v1/getInflightBundleStatuses", body).await?;

        let status = statuses
            .value
            .unwrap_or_default()
            .into_iter()
            .find(|s| s.bundle_id == bundle_id)
            .map(|s| BundleStatus::from_inflight(&s.status))
            .unwrap_or(BundleStatus::Pending);
        Ok(status)
    }
}
