//! E-commerce Analytics Pipeline Library
//!
//! Synthesizes internally-consistent e-commerce transaction datasets and
//! runs deterministic filtering, aggregation and rule-based fraud scoring
//! over them.

pub mod analytics;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod generator;
pub mod metrics;
pub mod types;

pub use analytics::{run_analysis, AnalysisReport, AnalysisRequest, MemoryCache};
pub use config::AppConfig;
pub use dataset::{Dataset, ValidationMode};
pub use error::{PipelineError, Result};
pub use filter::FilterSpec;
pub use generator::DatasetBuilder;
pub use types::{FraudFlag, Transaction};
