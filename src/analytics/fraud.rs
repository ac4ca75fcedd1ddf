//! Rule-based fraud scoring.
//!
//! Each rule is an independent predicate with its own configuration and a
//! stable tag. The scorer evaluates every enabled rule uniformly, so new
//! rules slot in without touching the aggregation path. Scoring is a pure
//! function of the analyzed rows.

use crate::config::FraudConfig;
use crate::types::{FraudFlag, Transaction};
use chrono::{DateTime, Duration, Timelike, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Cross-row context available to rules while scoring.
///
/// Holds the order timestamps per customer within the analyzed scope, sorted
/// ascending, for velocity-style rules.
pub struct ScoringContext {
    orders_by_customer: HashMap<String, Vec<DateTime<Utc>>>,
}

impl ScoringContext {
    fn build(rows: &[&Transaction]) -> Self {
        let mut orders_by_customer: HashMap<String, Vec<DateTime<Utc>>> = HashMap::new();
        for tx in rows {
            orders_by_customer
                .entry(tx.customer_id.clone())
                .or_default()
                .push(tx.transaction_date);
        }
        for times in orders_by_customer.values_mut() {
            times.sort();
        }
        Self { orders_by_customer }
    }

    /// Number of orders the customer placed within `radius` of `at`,
    /// inclusive of the order at `at` itself.
    pub fn orders_near(&self, customer_id: &str, at: DateTime<Utc>, radius: Duration) -> u32 {
        let lo = at - radius;
        let hi = at + radius;
        self.orders_by_customer
            .get(customer_id)
            .map(|times| times.iter().filter(|t| **t >= lo && **t <= hi).count() as u32)
            .unwrap_or(0)
    }
}

/// A named, configurable condition that flags a transaction.
pub trait FraudRule {
    /// Stable tag recorded on flags this rule produces.
    fn tag(&self) -> &'static str;

    /// Whether the transaction matches this rule.
    fn matches(&self, tx: &Transaction, ctx: &ScoringContext) -> bool;
}

/// High-value order combined with a deep discount.
struct HighValueHighDiscountRule {
    price_threshold: f64,
    discount_threshold: f64,
}

impl FraudRule for HighValueHighDiscountRule {
    fn tag(&self) -> &'static str {
        "high_value_high_discount"
    }

    fn matches(&self, tx: &Transaction, _ctx: &ScoringContext) -> bool {
        tx.total_price > self.price_threshold && tx.discount > self.discount_threshold
    }
}

/// Quantity above the configured ceiling.
struct ExcessiveQuantityRule {
    max_quantity: u32,
}

impl FraudRule for ExcessiveQuantityRule {
    fn tag(&self) -> &'static str {
        "excessive_quantity"
    }

    fn matches(&self, tx: &Transaction, _ctx: &ScoringContext) -> bool {
        tx.quantity > self.max_quantity
    }
}

/// Multiple orders from the same customer inside a short window.
struct RapidRepeatRule {
    radius: Duration,
    min_orders: u32,
}

impl FraudRule for RapidRepeatRule {
    fn tag(&self) -> &'static str {
        "rapid_repeat_orders"
    }

    fn matches(&self, tx: &Transaction, ctx: &ScoringContext) -> bool {
        ctx.orders_near(&tx.customer_id, tx.transaction_date, self.radius) >= self.min_orders
    }
}

/// Orders placed during unusual night-time hours.
struct OddHoursRule {
    start_hour: u32,
    end_hour: u32,
}

impl FraudRule for OddHoursRule {
    fn tag(&self) -> &'static str {
        "odd_hours"
    }

    fn matches(&self, tx: &Transaction, _ctx: &ScoringContext) -> bool {
        let hour = tx.transaction_date.hour();
        hour >= self.start_hour && hour <= self.end_hour
    }
}

/// Evaluates the enabled rules over a view of rows.
pub struct FraudScorer {
    rules: Vec<Box<dyn FraudRule>>,
}

impl FraudScorer {
    /// Assemble the enabled rules from configuration.
    pub fn from_config(config: &FraudConfig) -> Self {
        let mut rules: Vec<Box<dyn FraudRule>> = Vec::new();
        if config.high_value_high_discount.enabled {
            rules.push(Box::new(HighValueHighDiscountRule {
                price_threshold: config.high_value_high_discount.price_threshold,
                discount_threshold: config.high_value_high_discount.discount_threshold,
            }));
        }
        if config.excessive_quantity.enabled {
            rules.push(Box::new(ExcessiveQuantityRule {
                max_quantity: config.excessive_quantity.max_quantity,
            }));
        }
        if config.rapid_repeat_orders.enabled {
            rules.push(Box::new(RapidRepeatRule {
                radius: Duration::minutes(config.rapid_repeat_orders.window_minutes),
                min_orders: config.rapid_repeat_orders.min_orders,
            }));
        }
        if config.odd_hours.enabled {
            rules.push(Box::new(OddHoursRule {
                start_hour: config.odd_hours.start_hour,
                end_hour: config.odd_hours.end_hour,
            }));
        }
        Self { rules }
    }

    /// Number of active rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Flag every row matching at least one rule, preserving row order.
    pub fn score(&self, rows: &[&Transaction]) -> Vec<FraudFlag> {
        let ctx = ScoringContext::build(rows);
        let mut flags = Vec::new();
        for tx in rows {
            let triggered: Vec<String> = self
                .rules
                .iter()
                .filter(|rule| rule.matches(tx, &ctx))
                .map(|rule| rule.tag().to_string())
                .collect();
            if !triggered.is_empty() {
                debug!(
                    order_id = %tx.order_id,
                    rules = ?triggered,
                    "transaction flagged"
                );
                flags.push(FraudFlag::new(tx, triggered));
            }
        }
        flags
    }
}
