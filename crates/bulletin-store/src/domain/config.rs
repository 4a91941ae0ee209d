//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the storage engine. Defaults match the wire-stable
/// behavior; hosts override them per shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How far an author-declared timestamp may lag the block time before
    /// a non-censor creation is rejected (default: 180 s).
    pub max_backdate_secs: i64,

    /// Range-query result-vector cap (default: 8192).
    pub max_results: usize,

    /// Range-query record-count cap (default: 255).
    pub max_result_count: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_backdate_secs: 180,
            max_results: 8192,
            max_result_count: 255,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_backdate_secs(mut self, secs: i64) -> Self {
        self.max_backdate_secs = secs;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn with_max_result_count(mut self, max: usize) -> Self {
        self.max_result_count = max;
        self
    }
}
