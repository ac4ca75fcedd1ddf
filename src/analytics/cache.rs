//! Cache interface and key derivation for analysis results.
//!
//! The cache itself is an external collaborator; the core only computes
//! deterministic keys so the caller can memoize without risking staleness.

use crate::analytics::{AnalysisReport, AnalysisRequest};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// External key-value store for computed analysis reports.
pub trait AnalysisCache {
    fn get(&self, key: &str) -> Option<AnalysisReport>;
    fn set(&mut self, key: String, report: AnalysisReport);
    fn clear(&mut self);
}

/// Derive the cache key for an analysis request over a dataset.
///
/// SHA-256 over the dataset fingerprint and the canonical JSON serialization
/// of the full request (filter, rule thresholds, top_n), so any input change
/// produces a different key.
pub fn cache_key(dataset_fingerprint: &str, request: &AnalysisRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(dataset_fingerprint.as_bytes());
    hasher.update([0x1f]);
    // Struct field order is fixed and set predicates are ordered, so this
    // serialization is canonical.
    let request_json =
        serde_json::to_string(request).unwrap_or_else(|_| format!("{request:?}"));
    hasher.update(request_json.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-memory cache for tests and single-process use.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: HashMap<String, AnalysisReport>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AnalysisCache for MemoryCache {
    fn get(&self, key: &str) -> Option<AnalysisReport> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: String, report: AnalysisReport) {
        self.entries.insert(key, report);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisConfig, FraudConfig};
    use crate::filter::FilterSpec;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            filter: FilterSpec::default(),
            fraud: FraudConfig::default(),
            top_n: AnalysisConfig::default().top_n,
        }
    }

    #[test]
    fn test_cache_key_is_stable() {
        let a = cache_key("fingerprint", &request());
        let b = cache_key("fingerprint", &request());
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_key_changes_with_inputs() {
        let base = cache_key("fingerprint", &request());

        assert_ne!(base, cache_key("other-fingerprint", &request()));

        let mut filtered = request();
        filtered.filter = FilterSpec::default().with_categories(["Home".to_string()]);
        assert_ne!(base, cache_key("fingerprint", &filtered));

        let mut tightened = request();
        tightened.fraud.excessive_quantity.max_quantity = 5;
        assert_ne!(base, cache_key("fingerprint", &tightened));
    }
}
