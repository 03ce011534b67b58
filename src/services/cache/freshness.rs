use std::time::{Duration, Instant};

/// Decides when an installed snapshot is too old to serve without a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    staleness: Duration,
}

impl FreshnessPolicy {
    /// Tunable; small values trade backend list calls for fresher listings.
    pub const DEFAULT_STALENESS: Duration = Duration::from_secs(10);

    pub fn new(staleness: Duration) -> Self {
        Self { staleness }
    }

    pub fn staleness(&self) -> Duration {
        self.staleness
    }

    /// A snapshot that was never refreshed is always stale.
    pub fn is_stale(&self, refreshed_at: Option<Instant>, now: Instant) -> bool {
        match refreshed_at {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.staleness,
        }
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STALENESS)
    }
}
