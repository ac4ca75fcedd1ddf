//! Filter engine: AND-combined predicate sets over a dataset.
//!
//! Filtering returns an order-preserving view of borrowed records; source
//! records are never copied or mutated. Unset options impose no constraint.

use crate::error::{PipelineError, Result};
use crate::types::{PaymentMethod, ShippingMethod, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Predicate set narrowing which transactions are in scope for analysis.
///
/// Serializes canonically (sets are ordered), so a spec can participate in
/// cache keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive timestamp range.
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub categories: Option<BTreeSet<String>>,
    pub products: Option<BTreeSet<String>>,
    pub payment_methods: Option<BTreeSet<PaymentMethod>>,
    pub shipping_methods: Option<BTreeSet<ShippingMethod>>,
    /// Inclusive range over `total_price`.
    pub price_range: Option<(f64, f64)>,
}

impl FilterSpec {
    pub fn with_date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.date_range = Some((start, end));
        self
    }

    pub fn with_categories<I: IntoIterator<Item = String>>(mut self, categories: I) -> Self {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    pub fn with_products<I: IntoIterator<Item = String>>(mut self, products: I) -> Self {
        self.products = Some(products.into_iter().collect());
        self
    }

    pub fn with_payment_methods<I: IntoIterator<Item = PaymentMethod>>(mut self, methods: I) -> Self {
        self.payment_methods = Some(methods.into_iter().collect());
        self
    }

    pub fn with_shipping_methods<I: IntoIterator<Item = ShippingMethod>>(mut self, methods: I) -> Self {
        self.shipping_methods = Some(methods.into_iter().collect());
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some((min, max));
        self
    }

    /// Reject malformed ranges; an unset option is always valid.
    pub fn validate(&self) -> Result<()> {
        if let Some((start, end)) = self.date_range {
            if start > end {
                return Err(PipelineError::config(format!(
                    "date_range start {start} is after end {end}"
                )));
            }
        }
        if let Some((min, max)) = self.price_range {
            if min > max {
                return Err(PipelineError::config(format!(
                    "price_range min {min} exceeds max {max}"
                )));
            }
        }
        Ok(())
    }

    /// Whether a transaction passes every set predicate.
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some((start, end)) = self.date_range {
            if tx.transaction_date < start || tx.transaction_date > end {
                return false;
            }
        }
        if let Some(categories) = &self.categories {
            if !categories.contains(&tx.category) {
                return false;
            }
        }
        if let Some(products) = &self.products {
            if !products.contains(&tx.product_name) {
                return false;
            }
        }
        if let Some(methods) = &self.payment_methods {
            if !methods.contains(&tx.payment_method) {
                return false;
            }
        }
        if let Some(methods) = &self.shipping_methods {
            if !methods.contains(&tx.shipping_method) {
                return false;
            }
        }
        if let Some((min, max)) = self.price_range {
            if tx.total_price < min || tx.total_price > max {
                return false;
            }
        }
        true
    }

    /// Apply the predicate set, preserving input order.
    pub fn apply<'a, I>(&self, rows: I) -> Result<Vec<&'a Transaction>>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        self.validate()?;
        Ok(rows.into_iter().filter(|tx| self.matches(tx)).collect())
    }
}
