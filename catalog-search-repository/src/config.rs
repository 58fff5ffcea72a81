//! Configuration types for the SearchIndexService.

use std::str::FromStr;
use std::time::Duration;

/// Default number of documents per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// How a full rebuild replaces the live index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildMode {
    /// Drop and recreate the target index in place. The index is briefly
    /// empty while the backfill runs.
    #[default]
    Recreate,
    /// Build a fresh versioned index, backfill it, then atomically repoint
    /// the alias and drop the old index.
    AliasSwap,
}

impl FromStr for RebuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recreate" => Ok(Self::Recreate),
            "alias-swap" | "alias_swap" | "aliasswap" => Ok(Self::AliasSwap),
            other => Err(format!("unknown rebuild mode '{}'", other)),
        }
    }
}

/// Configuration for the SearchIndexService.
///
/// Batch size only bounds request payloads; any positive value yields the
/// same end state.
#[derive(Debug, Clone)]
pub struct SearchIndexServiceConfig {
    /// Number of documents submitted per bulk request. Must be positive.
    pub batch_size: usize,
    /// How many times a bulk request that failed as a whole is resubmitted.
    pub max_batch_retries: u32,
    /// Base delay between bulk retries; grows linearly with the attempt.
    pub retry_backoff: Duration,
    /// Replica count applied once a rebuild has finished loading.
    pub replicas: u32,
    pub rebuild_mode: RebuildMode,
}

impl Default for SearchIndexServiceConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_batch_retries: 2,
            retry_backoff: Duration::from_millis(500),
            replicas: 1,
            rebuild_mode: RebuildMode::Recreate,
        }
    }
}

impl SearchIndexServiceConfig {
    /// Create a config with a custom batch size.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Default::default()
        }
    }
}
