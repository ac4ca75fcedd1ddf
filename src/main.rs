//! E-commerce Analytics Pipeline - Main Entry Point
//!
//! Generates synthetic transaction datasets as CSV and runs filtered
//! aggregation plus fraud scoring over previously generated files.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ecommerce_analytics_pipeline::{
    analytics::AnalysisRequest,
    config::AppConfig,
    dataset::{Dataset, ValidationMode},
    filter::FilterSpec,
    generator::DatasetBuilder,
    metrics::{self, RunTimer},
    run_analysis,
    types::{PaymentMethod, ShippingMethod},
};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecommerce-analytics-pipeline")]
#[command(about = "Synthetic e-commerce dataset generation and analytics", long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic dataset and write it as CSV
    Generate {
        /// Number of records to generate
        #[arg(short = 'n', long)]
        records: usize,

        /// Seed for reproducibility; drawn from entropy when omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Output CSV path
        #[arg(short, long, default_value = "ecommerce_data.csv")]
        output: PathBuf,
    },

    /// Load a dataset, filter it, and report aggregation and fraud flags
    Analyze {
        /// Input CSV path
        input: PathBuf,

        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Restrict to these categories
        #[arg(long)]
        category: Vec<String>,

        /// Restrict to these products
        #[arg(long)]
        product: Vec<String>,

        /// Restrict to these payment methods (e.g. "Credit Card")
        #[arg(long)]
        payment: Vec<String>,

        /// Restrict to these shipping methods (e.g. "Express")
        #[arg(long)]
        shipping: Vec<String>,

        /// Minimum order total
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum order total
        #[arg(long)]
        max_price: Option<f64>,

        /// Skip invalid rows instead of failing on the first one
        #[arg(long)]
        lenient: bool,

        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None if Path::new("config/config.toml").exists() => {
            AppConfig::load().context("failed to load config/config.toml")
        }
        None => Ok(AppConfig::default()),
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_filter_spec(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    category: Vec<String>,
    product: Vec<String>,
    payment: Vec<String>,
    shipping: Vec<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
) -> Result<FilterSpec> {
    let mut spec = FilterSpec::default();

    if from.is_some() || to.is_some() {
        let start = from
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC);
        let end = to
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|d| d.and_utc())
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC);
        spec = spec.with_date_range(start, end);
    }
    if !category.is_empty() {
        spec = spec.with_categories(category);
    }
    if !product.is_empty() {
        spec = spec.with_products(product);
    }
    if !payment.is_empty() {
        let methods = payment
            .iter()
            .map(|s| s.parse::<PaymentMethod>().map_err(|e| anyhow!(e)))
            .collect::<Result<Vec<_>>>()?;
        spec = spec.with_payment_methods(methods);
    }
    if !shipping.is_empty() {
        let methods = shipping
            .iter()
            .map(|s| s.parse::<ShippingMethod>().map_err(|e| anyhow!(e)))
            .collect::<Result<Vec<_>>>()?;
        spec = spec.with_shipping_methods(methods);
    }
    if min_price.is_some() || max_price.is_some() {
        spec = spec.with_price_range(min_price.unwrap_or(0.0), max_price.unwrap_or(f64::MAX));
    }

    Ok(spec)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    match cli.command {
        Commands::Generate {
            records,
            seed,
            output,
        } => {
            let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
            info!(records, seed, "generating dataset");

            let timer = RunTimer::start();
            let dataset = DatasetBuilder::build(records, seed, &config.generation)?;
            dataset
                .write_csv_file(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            metrics::log_generation_summary(records, seed, &output, &timer);
        }

        Commands::Analyze {
            input,
            from,
            to,
            category,
            product,
            payment,
            shipping,
            min_price,
            max_price,
            lenient,
            json,
        } => {
            let mode = if lenient {
                ValidationMode::Lenient
            } else {
                ValidationMode::FailFast
            };
            let dataset = Dataset::read_csv_file(&input, mode)
                .with_context(|| format!("failed to load {}", input.display()))?;
            info!(records = dataset.len(), input = %input.display(), "dataset loaded");

            let filter = build_filter_spec(
                from, to, category, product, payment, shipping, min_price, max_price,
            )?;
            let request = AnalysisRequest {
                filter,
                fraud: config.fraud.clone(),
                top_n: config.analysis.top_n,
            };

            let report = run_analysis(&dataset, &request, None)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                metrics::log_analysis_summary(&report);
            }
        }
    }

    Ok(())
}
