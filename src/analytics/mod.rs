//! Analysis pipeline: filtering, aggregation and fraud scoring.

pub mod aggregate;
pub mod cache;
pub mod fraud;

pub use aggregate::{aggregate, AggregationReport};
pub use cache::{cache_key, AnalysisCache, MemoryCache};
pub use fraud::{FraudRule, FraudScorer, ScoringContext};

use crate::config::FraudConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::types::FraudFlag;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything that determines an analysis result besides the dataset itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub filter: FilterSpec,
    pub fraud: FraudConfig,
    pub top_n: usize,
}

/// Aggregation metrics plus fraud flags for one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub aggregation: AggregationReport,
    pub flags: Vec<FraudFlag>,
}

/// Analysis entry point: filter the dataset, aggregate, and score.
///
/// Pure given its inputs. When a cache handle is supplied, a previously
/// computed report for the same `(dataset, request)` pair is returned without
/// recomputation; the core stays cache-agnostic otherwise.
pub fn run_analysis(
    dataset: &Dataset,
    request: &AnalysisRequest,
    cache: Option<&mut dyn AnalysisCache>,
) -> Result<AnalysisReport> {
    request.filter.validate()?;
    request.fraud.validate()?;

    let key = cache
        .as_ref()
        .map(|_| cache_key(&dataset.fingerprint(), request));
    if let (Some(cache), Some(key)) = (cache.as_ref(), key.as_ref()) {
        if let Some(report) = cache.get(key) {
            debug!(key = %key, "analysis served from cache");
            return Ok(report);
        }
    }

    let rows = request.filter.apply(dataset.records())?;
    let aggregation = aggregate(&rows, request.top_n);
    let flags = FraudScorer::from_config(&request.fraud).score(&rows);
    debug!(
        rows = rows.len(),
        flags = flags.len(),
        "analysis computed"
    );

    let report = AnalysisReport { aggregation, flags };
    if let (Some(cache), Some(key)) = (cache, key) {
        cache.set(key, report.clone());
    }
    Ok(report)
}
