//! Configuration management for the analytics pipeline.

use crate::error::{PipelineError, Result};
use chrono::{DateTime, TimeZone, Utc};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub fraud: FraudConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One product entry in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    /// Lower bound of the unit price range.
    pub min_price: f64,
    /// Upper bound of the unit price range.
    pub max_price: f64,
    /// Fraction of the base price that fulfilment costs, before noise.
    pub cost_multiplier: f64,
}

/// One category with its products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub products: Vec<ProductConfig>,
}

/// Synthetic data generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Start of the generation window.
    #[serde(default = "default_window_start")]
    pub window_start: DateTime<Utc>,
    /// Length of the generation window in days.
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    /// Size of the customer id pool; ids recur to model repeat customers.
    #[serde(default = "default_customer_pool")]
    pub customer_pool: u32,
    /// Probability that a transaction carries injected anomaly traits.
    #[serde(default = "default_anomaly_rate")]
    pub anomaly_rate: f64,
    /// Probability that a transaction has a coupon applied.
    #[serde(default = "default_coupon_rate")]
    pub coupon_rate: f64,
    /// Probability that a transaction has no discount at all.
    #[serde(default = "default_discount_zero_probability")]
    pub discount_zero_probability: f64,
    /// Upper bound for ordinary (non-anomalous) discount rates.
    #[serde(default = "default_max_discount")]
    pub max_discount: f64,
    /// Relative noise applied to the per-product cost multiplier.
    #[serde(default = "default_cost_noise")]
    pub cost_noise: f64,
    /// Product catalog: categories and their price/cost parameters.
    #[serde(default = "default_catalog")]
    pub catalog: Vec<CategoryConfig>,
}

fn default_window_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn default_window_days() -> i64 {
    365
}

fn default_customer_pool() -> u32 {
    10_000
}

fn default_anomaly_rate() -> f64 {
    0.05
}

fn default_coupon_rate() -> f64 {
    0.25
}

fn default_discount_zero_probability() -> f64 {
    0.7
}

fn default_max_discount() -> f64 {
    0.3
}

fn default_cost_noise() -> f64 {
    0.05
}

fn default_catalog() -> Vec<CategoryConfig> {
    fn product(name: &str, min_price: f64, max_price: f64, cost_multiplier: f64) -> ProductConfig {
        ProductConfig {
            name: name.to_string(),
            min_price,
            max_price,
            cost_multiplier,
        }
    }

    vec![
        CategoryConfig {
            name: "Electronics".to_string(),
            products: vec![
                product("Laptop", 800.0, 2000.0, 0.7),
                product("Smartphone", 500.0, 1200.0, 0.75),
                product("Headphones", 50.0, 300.0, 0.6),
                product("Tablet", 200.0, 800.0, 0.65),
            ],
        },
        CategoryConfig {
            name: "Clothing".to_string(),
            products: vec![
                product("T-shirt", 15.0, 40.0, 0.3),
                product("Jeans", 30.0, 100.0, 0.4),
                product("Sneakers", 50.0, 150.0, 0.5),
                product("Jacket", 60.0, 200.0, 0.45),
            ],
        },
        CategoryConfig {
            name: "Home".to_string(),
            products: vec![
                product("Coffee Maker", 30.0, 200.0, 0.55),
                product("Blender", 40.0, 150.0, 0.5),
                product("Vacuum Cleaner", 100.0, 400.0, 0.6),
                product("Microwave", 80.0, 300.0, 0.65),
            ],
        },
    ]
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            window_start: default_window_start(),
            window_days: default_window_days(),
            customer_pool: default_customer_pool(),
            anomaly_rate: default_anomaly_rate(),
            coupon_rate: default_coupon_rate(),
            discount_zero_probability: default_discount_zero_probability(),
            max_discount: default_max_discount(),
            cost_noise: default_cost_noise(),
            catalog: default_catalog(),
        }
    }
}

impl GenerationConfig {
    /// Validate the generation parameters, failing fast on the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.window_days < 1 {
            return Err(PipelineError::config(format!(
                "window_days must be at least 1, got {}",
                self.window_days
            )));
        }
        if self.customer_pool == 0 {
            return Err(PipelineError::config("customer_pool must be positive"));
        }
        for (name, rate) in [
            ("anomaly_rate", self.anomaly_rate),
            ("coupon_rate", self.coupon_rate),
            ("discount_zero_probability", self.discount_zero_probability),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PipelineError::config(format!(
                    "{name} must be in [0, 1], got {rate}"
                )));
            }
        }
        if !(0.0..1.0).contains(&self.max_discount) {
            return Err(PipelineError::config(format!(
                "max_discount must be in [0, 1), got {}",
                self.max_discount
            )));
        }
        if !(0.0..1.0).contains(&self.cost_noise) {
            return Err(PipelineError::config(format!(
                "cost_noise must be in [0, 1), got {}",
                self.cost_noise
            )));
        }
        if self.catalog.is_empty() {
            return Err(PipelineError::config("catalog has no categories"));
        }
        let mut seen_products = HashSet::new();
        let mut seen_categories = HashSet::new();
        for category in &self.catalog {
            if !seen_categories.insert(category.name.as_str()) {
                return Err(PipelineError::config(format!(
                    "duplicate category: {}",
                    category.name
                )));
            }
            if category.products.is_empty() {
                return Err(PipelineError::config(format!(
                    "category {} has no products",
                    category.name
                )));
            }
            for product in &category.products {
                if !seen_products.insert(product.name.as_str()) {
                    return Err(PipelineError::config(format!(
                        "duplicate product: {}",
                        product.name
                    )));
                }
                if product.min_price <= 0.0 || product.min_price > product.max_price {
                    return Err(PipelineError::config(format!(
                        "product {} has invalid price range [{}, {}]",
                        product.name, product.min_price, product.max_price
                    )));
                }
                if product.cost_multiplier <= 0.0 {
                    return Err(PipelineError::config(format!(
                        "product {} has non-positive cost_multiplier",
                        product.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// High-value order combined with a deep discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighValueHighDiscountConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Order totals above this are considered high-value.
    #[serde(default = "default_price_threshold")]
    pub price_threshold: f64,
    /// Discount rates above this are considered suspicious.
    #[serde(default = "default_discount_threshold")]
    pub discount_threshold: f64,
}

/// Quantity above a configured ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcessiveQuantityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Quantities strictly above this are flagged.
    #[serde(default = "default_max_quantity")]
    pub max_quantity: u32,
}

/// Multiple orders from one customer inside a short window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RapidRepeatConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Window radius in minutes around each order.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
    /// Minimum number of orders inside the window to flag.
    #[serde(default = "default_min_orders")]
    pub min_orders: u32,
}

/// Orders placed during unusual night-time hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddHoursConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// First suspicious hour (UTC, inclusive).
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    /// Last suspicious hour (UTC, inclusive).
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
}

fn default_true() -> bool {
    true
}

fn default_price_threshold() -> f64 {
    1000.0
}

fn default_discount_threshold() -> f64 {
    0.5
}

fn default_max_quantity() -> u32 {
    10
}

fn default_window_minutes() -> i64 {
    60
}

fn default_min_orders() -> u32 {
    3
}

fn default_start_hour() -> u32 {
    1
}

fn default_end_hour() -> u32 {
    4
}

/// Fraud scoring rules; each independently togglable with its own thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudConfig {
    #[serde(default)]
    pub high_value_high_discount: HighValueHighDiscountConfig,
    #[serde(default)]
    pub excessive_quantity: ExcessiveQuantityConfig,
    #[serde(default)]
    pub rapid_repeat_orders: RapidRepeatConfig,
    #[serde(default)]
    pub odd_hours: OddHoursConfig,
}

impl Default for HighValueHighDiscountConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            price_threshold: default_price_threshold(),
            discount_threshold: default_discount_threshold(),
        }
    }
}

impl Default for ExcessiveQuantityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_quantity: default_max_quantity(),
        }
    }
}

impl Default for RapidRepeatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_minutes: default_window_minutes(),
            min_orders: default_min_orders(),
        }
    }
}

impl Default for OddHoursConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
        }
    }
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            high_value_high_discount: HighValueHighDiscountConfig::default(),
            excessive_quantity: ExcessiveQuantityConfig::default(),
            rapid_repeat_orders: RapidRepeatConfig::default(),
            odd_hours: OddHoursConfig::default(),
        }
    }
}

impl FraudConfig {
    /// Validate rule thresholds.
    pub fn validate(&self) -> Result<()> {
        if self.high_value_high_discount.price_threshold <= 0.0 {
            return Err(PipelineError::config("price_threshold must be positive"));
        }
        if !(0.0..1.0).contains(&self.high_value_high_discount.discount_threshold) {
            return Err(PipelineError::config("discount_threshold must be in [0, 1)"));
        }
        if self.rapid_repeat_orders.window_minutes < 1 {
            return Err(PipelineError::config("window_minutes must be at least 1"));
        }
        if self.rapid_repeat_orders.min_orders < 2 {
            return Err(PipelineError::config("min_orders must be at least 2"));
        }
        if self.odd_hours.start_hour > 23
            || self.odd_hours.end_hour > 23
            || self.odd_hours.start_hour > self.odd_hours.end_hour
        {
            return Err(PipelineError::config(format!(
                "odd_hours range [{}, {}] is invalid",
                self.odd_hours.start_hour, self.odd_hours.end_hour
            )));
        }
        Ok(())
    }
}

/// Aggregation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Size of top-N product and spender rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    10
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| PipelineError::config(format!("failed to read config: {e}")))?;

        let app: AppConfig = config
            .try_deserialize()
            .map_err(|e| PipelineError::config(format!("failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<()> {
        self.generation.validate()?;
        self.fraud.validate()?;
        if self.analysis.top_n == 0 {
            return Err(PipelineError::config("top_n must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation.catalog.len(), 3);
        assert_eq!(config.generation.anomaly_rate, 0.05);
        assert_eq!(config.fraud.high_value_high_discount.price_threshold, 1000.0);
        assert_eq!(config.fraud.high_value_high_discount.discount_threshold, 0.5);
        assert_eq!(config.analysis.top_n, 10);
    }

    #[test]
    fn test_catalog_contains_original_products() {
        let catalog = default_catalog();
        let electronics = &catalog[0];
        assert_eq!(electronics.name, "Electronics");
        let laptop = &electronics.products[0];
        assert_eq!(laptop.name, "Laptop");
        assert_eq!(laptop.min_price, 800.0);
        assert_eq!(laptop.max_price, 2000.0);
        assert_eq!(laptop.cost_multiplier, 0.7);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let config = GenerationConfig {
            catalog: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_category_without_products_rejected() {
        let config = GenerationConfig {
            catalog: vec![CategoryConfig {
                name: "Empty".to_string(),
                products: Vec::new(),
            }],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_price_range_rejected() {
        let mut config = GenerationConfig::default();
        config.catalog[0].products[0].min_price = 5000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_anomaly_rate_out_of_range_rejected() {
        let config = GenerationConfig {
            anomaly_rate: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fraud_thresholds_validated() {
        let mut fraud = FraudConfig::default();
        fraud.rapid_repeat_orders.min_orders = 1;
        assert!(fraud.validate().is_err());

        let mut fraud = FraudConfig::default();
        fraud.odd_hours.start_hour = 5;
        fraud.odd_hours.end_hour = 2;
        assert!(fraud.validate().is_err());
    }
}
