//! Transaction synthesizer: composes field generators into coherent records.

use crate::config::GenerationConfig;
use crate::generator::fields;
use crate::types::{round_currency, Transaction};
use chrono::{DateTime, Duration, Timelike, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Anomaly traits a transaction may carry for fraud-pattern realism.
///
/// Traits shape the record but are never labeled on it; detection happens
/// downstream in the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnomalyTrait {
    /// Quantity far above the usual 1-3 range.
    HighQuantity,
    /// Top-of-range price with a discount deeper than normal generation allows.
    DeepDiscountHighValue,
    /// Timestamp forced into the late-night hours.
    OddHours,
    /// Starts a burst of rapid repeated orders from the same customer.
    RapidRepeat,
    /// IP address from a block that does not match the shipping region.
    GeoMismatch,
}

/// Identity memoized per customer so repeat customers stay consistent.
struct CustomerProfile {
    name: String,
    email: String,
}

struct Burst {
    customer: u32,
    last_at: DateTime<Utc>,
    remaining: u32,
}

/// Produces one internally-consistent transaction per call.
///
/// All randomness flows through the caller-supplied RNG, so a fixed seed
/// reproduces the same sequence of records exactly.
pub struct TransactionSynthesizer<'a> {
    config: &'a GenerationConfig,
    customers: HashMap<u32, CustomerProfile>,
    pending_burst: Option<Burst>,
    seq: u64,
    anomalies: u64,
}

impl<'a> TransactionSynthesizer<'a> {
    /// Create a synthesizer over a validated configuration.
    pub fn new(config: &'a GenerationConfig) -> Self {
        Self {
            config,
            customers: HashMap::new(),
            pending_burst: None,
            seq: 0,
            anomalies: 0,
        }
    }

    /// Number of records that carried injected anomaly traits so far.
    pub fn anomalies_injected(&self) -> u64 {
        self.anomalies
    }

    /// Produce the next transaction.
    pub fn synthesize(&mut self, rng: &mut ChaCha8Rng) -> Transaction {
        self.seq += 1;

        // A pending rapid-repeat burst takes precedence over fresh rolls.
        let burst_step = self.take_burst_step(rng);
        let anomaly = if burst_step.is_some() {
            None
        } else if rng.gen::<f64>() < self.config.anomaly_rate {
            Some(match rng.gen_range(0..5) {
                0 => AnomalyTrait::HighQuantity,
                1 => AnomalyTrait::DeepDiscountHighValue,
                2 => AnomalyTrait::OddHours,
                3 => AnomalyTrait::RapidRepeat,
                _ => AnomalyTrait::GeoMismatch,
            })
        } else {
            None
        };

        let category = &self.config.catalog[rng.gen_range(0..self.config.catalog.len())];
        let product = &category.products[rng.gen_range(0..category.products.len())];

        let mut base_price =
            round_currency(rng.gen_range(product.min_price..=product.max_price));
        let mut quantity = fields::quantity(rng);
        let mut discount = fields::discount(rng, self.config);

        let mut customer_index = fields::customer_index(rng, self.config.customer_pool);
        let mut transaction_date = fields::timestamp(rng, self.config);

        let home = fields::region(rng);
        let shipping_address = fields::street_address(rng, home);
        let mut ip_address = fields::ip_in_region(rng, home);

        let payment_method = fields::payment_method(rng);
        let shipping_method = fields::shipping_method(rng);
        let coupon_code = fields::coupon(rng, self.config.coupon_rate);
        let cost_noise = rng.gen_range(-self.config.cost_noise..=self.config.cost_noise);

        if let Some((customer, at)) = burst_step {
            customer_index = customer;
            transaction_date = at;
            self.anomalies += 1;
        }

        if let Some(kind) = anomaly {
            self.anomalies += 1;
            match kind {
                AnomalyTrait::HighQuantity => {
                    quantity = rng.gen_range(15..=40);
                }
                AnomalyTrait::DeepDiscountHighValue => {
                    base_price = round_currency(product.max_price);
                    quantity = rng.gen_range(3..=8);
                    discount = rng.gen_range(51..=70) as f64 / 100.0;
                }
                AnomalyTrait::OddHours => {
                    let hour = rng.gen_range(1..=4);
                    transaction_date = transaction_date
                        .with_hour(hour)
                        .unwrap_or(transaction_date);
                }
                AnomalyTrait::RapidRepeat => {
                    self.pending_burst = Some(Burst {
                        customer: customer_index,
                        last_at: transaction_date,
                        remaining: rng.gen_range(2..=3),
                    });
                }
                AnomalyTrait::GeoMismatch => {
                    ip_address = fields::ip_outside_region(rng, home);
                }
            }
        }

        let profile = self.customers.entry(customer_index).or_insert_with(|| {
            let name = fields::full_name(rng);
            let email = fields::email(rng, &name);
            CustomerProfile { name, email }
        });

        let total_price =
            round_currency(base_price * quantity as f64 * (1.0 - discount));
        let cost = round_currency(
            base_price * quantity as f64 * product.cost_multiplier * (1.0 + cost_noise),
        );
        let profit = round_currency(total_price - cost);

        let tx = Transaction {
            order_id: fields::order_id(self.seq),
            transaction_date,
            customer_id: fields::customer_id(customer_index),
            customer_name: profile.name.clone(),
            email: profile.email.clone(),
            category: category.name.clone(),
            product_name: product.name.clone(),
            quantity,
            base_price,
            discount,
            total_price,
            cost,
            profit,
            coupon_code,
            payment_method,
            shipping_method,
            shipping_address,
            ip_address,
        };
        debug_assert!(tx.check_invariants().is_ok());
        tx
    }

    fn take_burst_step(&mut self, rng: &mut ChaCha8Rng) -> Option<(u32, DateTime<Utc>)> {
        let burst = self.pending_burst.as_mut()?;
        let window_end = self.config.window_start + Duration::days(self.config.window_days)
            - Duration::seconds(1);
        let at = (burst.last_at + Duration::minutes(rng.gen_range(2..=12))).min(window_end);
        burst.last_at = at;
        burst.remaining -= 1;
        let customer = burst.customer;
        if burst.remaining == 0 {
            self.pending_burst = None;
        }
        Some((customer, at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn generate(n: usize, seed: u64, config: &GenerationConfig) -> Vec<Transaction> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut synthesizer = TransactionSynthesizer::new(config);
        (0..n).map(|_| synthesizer.synthesize(&mut rng)).collect()
    }

    #[test]
    fn test_every_record_satisfies_invariants() {
        let config = GenerationConfig {
            anomaly_rate: 0.3,
            ..Default::default()
        };
        for tx in generate(1000, 11, &config) {
            assert!(
                tx.check_invariants().is_ok(),
                "invariant violated by {:?}",
                tx
            );
        }
    }

    #[test]
    fn test_product_always_belongs_to_category() {
        let config = GenerationConfig::default();
        let mut by_product: HashMap<&str, &str> = HashMap::new();
        for category in &config.catalog {
            for product in &category.products {
                by_product.insert(&product.name, &category.name);
            }
        }

        for tx in generate(500, 12, &config) {
            assert_eq!(by_product[tx.product_name.as_str()], tx.category);
        }
    }

    #[test]
    fn test_customer_identity_is_consistent() {
        let config = GenerationConfig {
            customer_pool: 20, // force heavy reuse
            ..Default::default()
        };
        let mut identities: HashMap<String, (String, String)> = HashMap::new();
        for tx in generate(500, 13, &config) {
            let entry = identities
                .entry(tx.customer_id.clone())
                .or_insert_with(|| (tx.customer_name.clone(), tx.email.clone()));
            assert_eq!(entry.0, tx.customer_name);
            assert_eq!(entry.1, tx.email);
        }
        assert!(identities.len() > 1);
    }

    #[test]
    fn test_same_seed_same_records() {
        let config = GenerationConfig::default();
        assert_eq!(generate(200, 42, &config), generate(200, 42, &config));
    }

    #[test]
    fn test_different_seed_different_records() {
        let config = GenerationConfig::default();
        assert_ne!(generate(200, 42, &config), generate(200, 43, &config));
    }

    #[test]
    fn test_no_anomalies_when_disabled() {
        let config = GenerationConfig {
            anomaly_rate: 0.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let mut synthesizer = TransactionSynthesizer::new(&config);
        for _ in 0..300 {
            synthesizer.synthesize(&mut rng);
        }
        assert_eq!(synthesizer.anomalies_injected(), 0);
    }

    #[test]
    fn test_timestamps_stay_inside_window() {
        let config = GenerationConfig {
            anomaly_rate: 0.5,
            ..Default::default()
        };
        let window_end = config.window_start + Duration::days(config.window_days);
        for tx in generate(500, 15, &config) {
            assert!(tx.transaction_date >= config.window_start);
            assert!(tx.transaction_date < window_end);
        }
    }
}
