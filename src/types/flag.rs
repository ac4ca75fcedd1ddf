//! Fraud flag data structures.

use crate::types::transaction::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A transaction flagged by one or more fraud rules.
///
/// The flag records every rule tag that matched, not just a boolean, so a
/// reviewer can see why the order was surfaced. Flags are a pure function of
/// the analyzed rows: scoring the same rows with the same rule configuration
/// always produces the same flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudFlag {
    /// Flagged order.
    pub order_id: String,

    /// Customer that placed the order.
    pub customer_id: String,

    /// Order timestamp.
    pub transaction_date: DateTime<Utc>,

    /// Order total, for review context.
    pub total_price: f64,

    /// Units ordered, for review context.
    pub quantity: u32,

    /// Tags of the rules that matched, in rule evaluation order.
    pub triggered_rules: Vec<String>,
}

impl FraudFlag {
    /// Build a flag for a transaction with the rules that matched it.
    pub fn new(tx: &Transaction, triggered_rules: Vec<String>) -> Self {
        Self {
            order_id: tx.order_id.clone(),
            customer_id: tx.customer_id.clone(),
            transaction_date: tx.transaction_date,
            total_price: tx.total_price,
            quantity: tx.quantity,
            triggered_rules,
        }
    }

    /// Whether a specific rule contributed to this flag.
    pub fn triggered_by(&self, tag: &str) -> bool {
        self.triggered_rules.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::{PaymentMethod, ShippingMethod};
    use chrono::TimeZone;

    fn flagged_transaction() -> Transaction {
        Transaction {
            order_id: "ORD-000007".to_string(),
            transaction_date: Utc.with_ymd_and_hms(2025, 6, 1, 2, 30, 0).unwrap(),
            customer_id: "CUST-00199".to_string(),
            customer_name: "Brian Oduya".to_string(),
            email: "brian.oduya@example.net".to_string(),
            category: "Electronics".to_string(),
            product_name: "Smartphone".to_string(),
            quantity: 12,
            base_price: 1000.0,
            discount: 0.0,
            total_price: 12000.0,
            cost: 9000.0,
            profit: 3000.0,
            coupon_code: None,
            payment_method: PaymentMethod::PayPal,
            shipping_method: ShippingMethod::International,
            shipping_address: "14 Cedar Court, Denver, CO 80014".to_string(),
            ip_address: "98.12.200.3".to_string(),
        }
    }

    #[test]
    fn test_flag_carries_rule_tags() {
        let tx = flagged_transaction();
        let flag = FraudFlag::new(
            &tx,
            vec!["excessive_quantity".to_string(), "odd_hours".to_string()],
        );

        assert_eq!(flag.order_id, "ORD-000007");
        assert!(flag.triggered_by("excessive_quantity"));
        assert!(flag.triggered_by("odd_hours"));
        assert!(!flag.triggered_by("high_value_high_discount"));
    }

    #[test]
    fn test_flag_serialization() {
        let tx = flagged_transaction();
        let flag = FraudFlag::new(&tx, vec!["excessive_quantity".to_string()]);

        let json = serde_json::to_string(&flag).unwrap();
        let deserialized: FraudFlag = serde_json::from_str(&json).unwrap();
        assert_eq!(flag, deserialized);
    }
}
