//! Transaction data structures for the synthetic e-commerce dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment methods supported by the synthetic store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    CreditCard,
    PayPal,
    DebitCard,
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::CreditCard,
        PaymentMethod::PayPal,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
    ];

    /// Human-readable label, as written to the dataset file.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown payment method: {s}"))
    }
}

/// Shipping methods supported by the synthetic store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShippingMethod {
    Standard,
    Express,
    NextDay,
    International,
}

impl ShippingMethod {
    pub const ALL: [ShippingMethod; 4] = [
        ShippingMethod::Standard,
        ShippingMethod::Express,
        ShippingMethod::NextDay,
        ShippingMethod::International,
    ];

    /// Human-readable label, as written to the dataset file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingMethod::Standard => "Standard",
            ShippingMethod::Express => "Express",
            ShippingMethod::NextDay => "Next Day",
            ShippingMethod::International => "International",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown shipping method: {s}"))
    }
}

/// Round a monetary amount to 2 fraction digits using round-half-even.
pub fn round_currency(value: f64) -> f64 {
    let cents = value * 100.0;
    let floor = cents.floor();
    let frac = cents - floor;
    let rounded = if (frac - 0.5).abs() < 1e-9 {
        // Midpoint: round to the even cent.
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        cents.round()
    };
    rounded / 100.0
}

/// One synthetic order record.
///
/// Transactions are created only by the synthesizer and are immutable
/// afterwards; filtering and aggregation operate on read-only views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique order identifier (`ORD-{seq:06}`).
    pub order_id: String,

    /// Order timestamp, inside the configured generation window.
    pub transaction_date: DateTime<Utc>,

    /// Customer identifier (`CUST-{n:05}`); recurs across transactions.
    pub customer_id: String,

    /// Customer name, consistent per customer id within a dataset.
    pub customer_name: String,

    /// Customer email, consistent per customer id within a dataset.
    pub email: String,

    /// Product category from the catalog.
    pub category: String,

    /// Product name, always belonging to `category`.
    pub product_name: String,

    /// Units ordered, always positive.
    pub quantity: u32,

    /// Unit price before discount.
    pub base_price: f64,

    /// Discount rate in `[0, 1)`.
    pub discount: f64,

    /// `round_half_even(base_price * quantity * (1 - discount), 2)`.
    pub total_price: f64,

    /// Fulfilment cost for the whole order.
    pub cost: f64,

    /// `total_price - cost`; occasionally negative for loss-leaders.
    pub profit: f64,

    /// Applied coupon, if any.
    pub coupon_code: Option<String>,

    pub payment_method: PaymentMethod,

    pub shipping_method: ShippingMethod,

    /// Synthetic but well-formed street address.
    pub shipping_address: String,

    /// Synthetic IPv4 address.
    pub ip_address: String,
}

impl Transaction {
    /// Check the data model invariants, returning the first violation.
    ///
    /// Monetary comparisons tolerate half a cent to absorb the decimal
    /// representation of 2-fraction-digit values.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.quantity == 0 {
            return Err("quantity must be positive".to_string());
        }
        if self.base_price <= 0.0 {
            return Err(format!(
                "base_price must be positive, got {}",
                self.base_price
            ));
        }
        if !(0.0..1.0).contains(&self.discount) {
            return Err(format!("discount must be in [0, 1), got {}", self.discount));
        }
        let expected_total =
            round_currency(self.base_price * self.quantity as f64 * (1.0 - self.discount));
        if (self.total_price - expected_total).abs() > 0.005 {
            return Err(format!(
                "total_price {} does not match base_price * quantity * (1 - discount) = {}",
                self.total_price, expected_total
            ));
        }
        let expected_profit = self.total_price - self.cost;
        if (self.profit - expected_profit).abs() > 0.005 {
            return Err(format!(
                "profit {} does not match total_price - cost = {}",
                self.profit, expected_profit
            ));
        }
        Ok(())
    }
}
