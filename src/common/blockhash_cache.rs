//! Recent blockhash cache.
//!
//! One background task refreshes the hash on a fixed interval; builders read
//! it without touching the network. A failed refresh keeps the previous
//! value, so readers only ever see "unavailable" before the first success.

use crate::common::ledger_rpc::LedgerRpc;
use crate::trading::core::errors::SwapError;
use anyhow::Result;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use solana_sdk::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedBlockhash {
    pub hash: Hash,
    pub fetched_at: Instant,
}

pub struct BlockhashCache {
    rpc: Arc<dyn LedgerRpc>,
    refresh_interval: Duration,
    current: ArcSwapOption<CachedBlockhash>,
    refresher: Mutex<Option<JoinHandle<()>>>,
}

impl BlockhashCache {
    pub fn new(rpc: Arc<dyn LedgerRpc>, refresh_interval: Duration) -> Self {
        Self {
            rpc,
            refresh_interval,
            current: ArcSwapOption::empty(),
            refresher: Mutex::new(None),
        }
    }

    /// 启动后台刷新任务
    ///
    /// At most one refresher runs per cache. Returns `false` when one is
    /// already running and nothing was spawned.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut refresher = self.refresher.lock();
        if refresher.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("blockhash refresher already running");
            return false;
        }
        let cache = Arc::clone(self);
        *refresher = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cache.refresh_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = cache.refresh().await {
                    warn!(error = %e, "blockhash refresh failed, keeping previous value");
                }
            }
        }));
        true
    }

    /// Abort the background refresher; the cached value stays readable.
    pub fn stop(&self) {
        if let Some(handle) = self.refresher.lock().take() {
            handle.abort();
        }
    }

    /// Fetch once and overwrite the cached value.
    pub async fn refresh(&self) -> Result<Hash> {
        let hash = self.rpc.get_latest_blockhash().await?;
        self.store(hash);
        debug!(%hash, "blockhash refreshed");
        Ok(hash)
    }

    fn store(&self, hash: Hash) {
        self.current.store(Some(Arc::new(CachedBlockhash { hash, fetched_at: Instant::now() })));
    }

    /// Last known hash, `None` until the first successful refresh.
    pub fn get(&self) -> Option<Hash> {
        self.current.load_full().map(|cached| cached.hash)
    }

    /// Like [`get`](Self::get), failing fast instead of waiting for a refresh.
    pub fn require(&self) -> Result<Hash, SwapError> {
        self.get().ok_or(SwapError::MetadataUnavailable)
    }

    pub fn snapshot(&self) -> Option<CachedBlockhash> {
        self.current.load_full().map(|cached| *cached)
    }

    /// Time since the cached value was fetched.
    pub fn age(&self) -> Option<Duration> {
        self.snapshot().map(|cached| cached.fetched_at.elapsed())
    }
}
