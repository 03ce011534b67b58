use super::{DirectoryCache, RefreshClaim};
use crate::core::errors::Result;
use crate::services::store::StoreGateway;
use crate::services::tree::{BuildStats, SnapshotBuilder};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Installed(BuildStats),
    /// Another refresh held the slot; nothing was done.
    Skipped,
}

/// Drives the list-parse-build-install cycle, one cycle at a time.
#[derive(Clone)]
pub struct Refresher {
    cache: Arc<DirectoryCache>,
    gateway: Arc<dyn StoreGateway>,
}

impl Refresher {
    pub fn new(cache: Arc<DirectoryCache>, gateway: Arc<dyn StoreGateway>) -> Self {
        Self { cache, gateway }
    }

    pub fn cache(&self) -> &Arc<DirectoryCache> {
        &self.cache
    }

    /// Runs a refresh to completion on the caller's task.
    ///
    /// Listing failures are returned and leave the installed snapshot untouched.
    pub async fn refresh_now(&self) -> Result<RefreshOutcome> {
        let Some(claim) = self.cache.try_claim() else {
            tracing::debug!("refresh already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        };
        run_cycle(self.gateway.as_ref(), claim)
            .await
            .map(RefreshOutcome::Installed)
    }

    /// Starts a background refresh unless one is running. Never waits.
    pub fn trigger(&self) -> bool {
        match self.cache.try_claim() {
            Some(claim) => self.spawn(claim),
            None => false,
        }
    }

    /// Starts a background refresh if `root` is unknown or the snapshot is stale.
    pub fn trigger_if_stale(&self, root: &str) -> bool {
        match self.cache.claim_if_stale(root, Instant::now()) {
            Some(claim) => self.spawn(claim),
            None => false,
        }
    }

    fn spawn(&self, claim: RefreshClaim) -> bool {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!("cannot start background refresh outside a runtime: {}", err);
                return false;
            }
        };
        let gateway = Arc::clone(&self.gateway);
        handle.spawn(async move {
            if let Err(err) = run_cycle(gateway.as_ref(), claim).await {
                tracing::warn!(
                    transient = err.is_transient(),
                    "background refresh failed, keeping previous snapshot: {}",
                    err
                );
            }
        });
        true
    }
}

async fn run_cycle(gateway: &dyn StoreGateway, claim: RefreshClaim) -> Result<BuildStats> {
    let started = Instant::now();
    let records = gateway.list_all_keys().await?;
    let listed_in = started.elapsed();

    let (snapshot, stats) = SnapshotBuilder::from_records(&records);
    let folders = snapshot.folder_count();
    claim.install(snapshot, started);

    tracing::debug!(
        keys = stats.keys,
        entries = stats.entries,
        discarded = stats.discarded,
        folders,
        listed_ms = listed_in.as_millis() as u64,
        "installed directory snapshot"
    );
    Ok(stats)
}
