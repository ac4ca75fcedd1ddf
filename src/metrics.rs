//! Run metrics and summary reporting for the CLI entry points.

use crate::analytics::AnalysisReport;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Wall-clock timer for one generation or analysis run.
pub struct RunTimer {
    started: Instant,
}

impl RunTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Records per second for this run.
    pub fn throughput(&self, records: usize) -> f64 {
        let elapsed = self.elapsed_secs();
        if elapsed > 0.0 {
            records as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Tally flags per rule tag, ordered by tag for stable output.
pub fn flag_counts_by_rule(report: &AnalysisReport) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for flag in &report.flags {
        for tag in &flag.triggered_rules {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Log a one-screen summary of a generation run.
pub fn log_generation_summary(records: usize, seed: u64, output: &Path, timer: &RunTimer) {
    info!(
        records,
        seed,
        output = %output.display(),
        elapsed_secs = format!("{:.2}", timer.elapsed_secs()),
        throughput = format!("{:.0} records/s", timer.throughput(records)),
        "generation complete"
    );
}

/// Log a one-screen summary of an analysis run.
pub fn log_analysis_summary(report: &AnalysisReport) {
    let agg = &report.aggregation;
    info!(
        orders = agg.order_count,
        revenue = format!("{:.2}", agg.total_revenue),
        profit = format!("{:.2}", agg.total_profit),
        avg_order_value = format!("{:.2}", agg.avg_order_value),
        "aggregation totals"
    );
    info!(
        unique = agg.unique_customers,
        repeat = agg.repeat_customers,
        "customers"
    );
    if let Some(top) = agg.top_products_by_quantity.first() {
        info!(
            product = %top.product_name,
            quantity = top.quantity,
            "top product by quantity"
        );
    }
    if let Some(top) = agg.top_products_by_profit.first() {
        info!(
            product = %top.product_name,
            profit = format!("{:.2}", top.profit),
            "top product by profit"
        );
    }

    let flagged = report.flags.len();
    let rate = if agg.order_count > 0 {
        flagged as f64 / agg.order_count as f64 * 100.0
    } else {
        0.0
    };
    info!(
        flagged,
        rate = format!("{rate:.1}%"),
        "potentially fraudulent orders"
    );
    for (tag, count) in flag_counts_by_rule(report) {
        info!(rule = %tag, count, "rule matches");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregate;
    use crate::types::{FraudFlag, PaymentMethod, ShippingMethod, Transaction};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_throughput_is_finite() {
        let timer = RunTimer::start();
        let throughput = timer.throughput(1000);
        assert!(throughput.is_finite());
        assert!(throughput >= 0.0);
    }

    #[test]
    fn test_flag_counts_by_rule() {
        let tx = Transaction {
            order_id: "ORD-000001".to_string(),
            transaction_date: Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap(),
            customer_id: "CUST-00001".to_string(),
            customer_name: "Test Customer".to_string(),
            email: "test@example.com".to_string(),
            category: "Electronics".to_string(),
            product_name: "Laptop".to_string(),
            quantity: 1,
            base_price: 100.0,
            discount: 0.0,
            total_price: 100.0,
            cost: 70.0,
            profit: 30.0,
            coupon_code: None,
            payment_method: PaymentMethod::CreditCard,
            shipping_method: ShippingMethod::Standard,
            shipping_address: "1 Test Street".to_string(),
            ip_address: "10.0.0.1".to_string(),
        };
        let report = AnalysisReport {
            aggregation: aggregate(&[], 10),
            flags: vec![
                FraudFlag::new(&tx, vec!["odd_hours".to_string()]),
                FraudFlag::new(
                    &tx,
                    vec!["odd_hours".to_string(), "excessive_quantity".to_string()],
                ),
            ],
        };

        let counts = flag_counts_by_rule(&report);
        assert_eq!(counts["odd_hours"], 2);
        assert_eq!(counts["excessive_quantity"], 1);
    }
}
