//! In-memory directory tree served to readers while refreshes run in the background.

pub mod freshness;
pub mod refresh;

pub use freshness::FreshnessPolicy;
pub use refresh::{RefreshOutcome, Refresher};

use crate::models::entry::sort_entries;
use crate::models::Entry;
use crate::services::tree::{normalize_path, Snapshot};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Holds the installed [`Snapshot`] and the refresh bookkeeping.
///
/// All state sits behind one mutex that is only held for pointer-sized
/// reads and writes. Snapshots are never edited in place: a refresh builds a
/// new one and [`DirectoryCache::install`] swaps the `Arc`, so a reader that
/// cloned the old `Arc` keeps a complete, consistent view.
#[derive(Debug)]
pub struct DirectoryCache {
    policy: FreshnessPolicy,
    state: Mutex<CacheState>,
}

#[derive(Debug)]
struct CacheState {
    snapshot: Arc<Snapshot>,
    refreshed_at: Option<Instant>,
    refreshing: bool,
}

impl DirectoryCache {
    pub fn new(policy: FreshnessPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(CacheState {
                snapshot: Arc::new(Snapshot::empty()),
                refreshed_at: None,
                refreshing: false,
            }),
        }
    }

    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    // Every critical section is a single assignment or read, so a poisoned
    // lock still guards consistent data.
    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state().snapshot)
    }

    /// Sorted entries of `path` in `root`; empty when either is unknown.
    pub fn lookup(&self, root: &str, path: &str) -> Vec<Entry> {
        let snapshot = self.snapshot();
        let mut entries = snapshot
            .folder(root, &normalize_path(path))
            .map(<[Entry]>::to_vec)
            .unwrap_or_default();
        sort_entries(&mut entries);
        entries
    }

    /// Replaces the snapshot wholesale and records when its listing was taken.
    pub fn install(&self, snapshot: Snapshot, at: Instant) {
        let snapshot = Arc::new(snapshot);
        let previous = {
            let mut state = self.state();
            state.refreshed_at = Some(at);
            std::mem::replace(&mut state.snapshot, snapshot)
        };
        // The old tree is freed outside the lock unless a reader still holds it.
        drop(previous);
    }

    pub fn needs_refresh(&self, root: &str, now: Instant) -> bool {
        let state = self.state();
        self.is_stale(&state, root, now)
    }

    fn is_stale(&self, state: &CacheState, root: &str, now: Instant) -> bool {
        !state.snapshot.contains_root(root) || self.policy.is_stale(state.refreshed_at, now)
    }

    /// Checks staleness and claims the refresh slot in one critical section.
    ///
    /// Returns `None` when the snapshot is fresh for `root` or when another
    /// refresh already holds the slot.
    pub fn claim_if_stale(self: &Arc<Self>, root: &str, now: Instant) -> Option<RefreshClaim> {
        let mut state = self.state();
        if state.refreshing || !self.is_stale(&state, root, now) {
            return None;
        }
        state.refreshing = true;
        Some(RefreshClaim {
            cache: Arc::clone(self),
        })
    }

    /// Claims the refresh slot regardless of staleness.
    pub fn try_claim(self: &Arc<Self>) -> Option<RefreshClaim> {
        let mut state = self.state();
        if state.refreshing {
            return None;
        }
        state.refreshing = true;
        Some(RefreshClaim {
            cache: Arc::clone(self),
        })
    }

    pub fn is_refreshing(&self) -> bool {
        self.state().refreshing
    }

    pub fn refreshed_at(&self) -> Option<Instant> {
        self.state().refreshed_at
    }

    pub fn roots(&self) -> Vec<String> {
        let mut roots: Vec<String> = self.snapshot().roots().map(str::to_string).collect();
        roots.sort();
        roots
    }
}

impl Default for DirectoryCache {
    fn default() -> Self {
        Self::new(FreshnessPolicy::default())
    }
}

/// Exclusive right to run one refresh; the slot is released on drop.
#[derive(Debug)]
pub struct RefreshClaim {
    cache: Arc<DirectoryCache>,
}

impl RefreshClaim {
    pub fn cache(&self) -> &Arc<DirectoryCache> {
        &self.cache
    }

    pub fn install(self, snapshot: Snapshot, at: Instant) {
        self.cache.install(snapshot, at);
    }
}

impl Drop for RefreshClaim {
    fn drop(&mut self) {
        self.cache.state().refreshing = false;
    }
}
