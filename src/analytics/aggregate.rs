//! Summary aggregation over a (possibly filtered) view of the dataset.

use crate::types::{round_currency, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Revenue, profit and order count for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub revenue: f64,
    pub profit: f64,
    pub orders: u64,
}

/// Order count and revenue for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category: String,
    pub orders: u64,
    pub revenue: f64,
}

/// Per-product totals used for the top-N rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub product_name: String,
    pub quantity: u64,
    pub revenue: f64,
    pub profit: f64,
}

/// Per-customer totals used for the top spender ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerEntry {
    pub customer_id: String,
    pub orders: u64,
    pub total_spend: f64,
}

/// Summary metrics over the analyzed rows.
///
/// An empty input yields zeros and empty series, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationReport {
    pub total_revenue: f64,
    pub total_profit: f64,
    pub order_count: u64,
    /// `total_revenue / order_count`, 0 when there are no orders.
    pub avg_order_value: f64,
    /// Per-day series, sorted by date.
    pub daily_series: Vec<DailyEntry>,
    /// Category distribution, sorted by category name.
    pub category_distribution: Vec<CategoryEntry>,
    pub top_products_by_quantity: Vec<ProductEntry>,
    pub top_products_by_profit: Vec<ProductEntry>,
    /// Customers appearing in at least one analyzed transaction.
    pub unique_customers: u64,
    /// Customers appearing in at least two analyzed transactions.
    pub repeat_customers: u64,
    pub top_spenders: Vec<CustomerEntry>,
}

/// Compute the aggregation report over a view of rows.
///
/// Pure and deterministic: ties in the top-N rankings break by name so the
/// same rows always produce the same report.
pub fn aggregate(rows: &[&Transaction], top_n: usize) -> AggregationReport {
    let mut total_revenue = 0.0;
    let mut total_profit = 0.0;

    let mut daily: BTreeMap<NaiveDate, DailyEntry> = BTreeMap::new();
    let mut categories: BTreeMap<&str, CategoryEntry> = BTreeMap::new();
    let mut products: BTreeMap<&str, ProductEntry> = BTreeMap::new();
    let mut customers: BTreeMap<&str, CustomerEntry> = BTreeMap::new();

    for tx in rows {
        total_revenue += tx.total_price;
        total_profit += tx.profit;

        let date = tx.transaction_date.date_naive();
        let day = daily.entry(date).or_insert(DailyEntry {
            date,
            revenue: 0.0,
            profit: 0.0,
            orders: 0,
        });
        day.revenue += tx.total_price;
        day.profit += tx.profit;
        day.orders += 1;

        let category = categories
            .entry(tx.category.as_str())
            .or_insert_with(|| CategoryEntry {
                category: tx.category.clone(),
                orders: 0,
                revenue: 0.0,
            });
        category.orders += 1;
        category.revenue += tx.total_price;

        let product = products
            .entry(tx.product_name.as_str())
            .or_insert_with(|| ProductEntry {
                product_name: tx.product_name.clone(),
                quantity: 0,
                revenue: 0.0,
                profit: 0.0,
            });
        product.quantity += tx.quantity as u64;
        product.revenue += tx.total_price;
        product.profit += tx.profit;

        let customer = customers
            .entry(tx.customer_id.as_str())
            .or_insert_with(|| CustomerEntry {
                customer_id: tx.customer_id.clone(),
                orders: 0,
                total_spend: 0.0,
            });
        customer.orders += 1;
        customer.total_spend += tx.total_price;
    }

    let order_count = rows.len() as u64;
    let avg_order_value = if order_count > 0 {
        round_currency(total_revenue / order_count as f64)
    } else {
        0.0
    };

    let daily_series = daily
        .into_values()
        .map(|mut d| {
            d.revenue = round_currency(d.revenue);
            d.profit = round_currency(d.profit);
            d
        })
        .collect();

    let category_distribution = categories
        .into_values()
        .map(|mut c| {
            c.revenue = round_currency(c.revenue);
            c
        })
        .collect();

    let product_entries: Vec<ProductEntry> = products
        .into_values()
        .map(|mut p| {
            p.revenue = round_currency(p.revenue);
            p.profit = round_currency(p.profit);
            p
        })
        .collect();

    let mut top_products_by_quantity = product_entries.clone();
    top_products_by_quantity.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    top_products_by_quantity.truncate(top_n);

    let mut top_products_by_profit = product_entries;
    top_products_by_profit.sort_by(|a, b| {
        b.profit
            .total_cmp(&a.profit)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    top_products_by_profit.truncate(top_n);

    let unique_customers = customers.len() as u64;
    let repeat_customers = customers.values().filter(|c| c.orders >= 2).count() as u64;

    let mut top_spenders: Vec<CustomerEntry> = customers
        .into_values()
        .map(|mut c| {
            c.total_spend = round_currency(c.total_spend);
            c
        })
        .collect();
    top_spenders.sort_by(|a, b| {
        b.total_spend
            .total_cmp(&a.total_spend)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    top_spenders.truncate(top_n);

    AggregationReport {
        total_revenue: round_currency(total_revenue),
        total_profit: round_currency(total_profit),
        order_count,
        avg_order_value,
        daily_series,
        category_distribution,
        top_products_by_quantity,
        top_products_by_profit,
        unique_customers,
        repeat_customers,
        top_spenders,
    }
}
