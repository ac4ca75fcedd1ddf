//! Dataset container and its tabular serialization.
//!
//! The on-disk format is UTF-8 CSV with a header row, one row per
//! transaction, RFC 3339 timestamps, and monetary values printed with 2
//! fraction digits.

use crate::error::{PipelineError, Result};
use crate::types::Transaction;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::warn;

/// Column names, in the exact order written to and expected from disk.
pub const COLUMNS: [&str; 18] = [
    "order_id",
    "transaction_date",
    "customer_id",
    "customer_name",
    "email",
    "category",
    "product_name",
    "quantity",
    "base_price",
    "discount",
    "total_price",
    "cost",
    "profit",
    "coupon_code",
    "payment_method",
    "shipping_method",
    "shipping_address",
    "ip_address",
];

/// How the loader reacts to rows that violate the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Stop at the first bad row.
    #[default]
    FailFast,
    /// Log each bad row and keep the valid ones.
    Lenient,
}

/// Ordered collection of transactions, in generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Transaction>,
}

fn csv_fields(tx: &Transaction) -> [String; 18] {
    [
        tx.order_id.clone(),
        tx.transaction_date.to_rfc3339(),
        tx.customer_id.clone(),
        tx.customer_name.clone(),
        tx.email.clone(),
        tx.category.clone(),
        tx.product_name.clone(),
        tx.quantity.to_string(),
        format!("{:.2}", tx.base_price),
        format!("{:.2}", tx.discount),
        format!("{:.2}", tx.total_price),
        format!("{:.2}", tx.cost),
        format!("{:.2}", tx.profit),
        tx.coupon_code.clone().unwrap_or_default(),
        tx.payment_method.to_string(),
        tx.shipping_method.to_string(),
        tx.shipping_address.clone(),
        tx.ip_address.clone(),
    ]
}

impl Dataset {
    pub fn new(records: Vec<Transaction>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read-only view over all records, the input shape the filter engine
    /// and analytics operate on.
    pub fn view(&self) -> Vec<&Transaction> {
        self.records.iter().collect()
    }

    /// Serialize to CSV.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(COLUMNS)?;
        for tx in &self.records {
            csv_writer.write_record(csv_fields(tx))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Serialize to a CSV file.
    pub fn write_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_csv(File::create(path)?)
    }

    /// Parse a CSV stream, validating each row against the data model.
    pub fn read_csv<R: io::Read>(reader: R, mode: ValidationMode) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.len() != COLUMNS.len() {
            return Err(PipelineError::integrity(
                0,
                format!("expected {} columns, found {}", COLUMNS.len(), headers.len()),
            ));
        }
        for (i, expected) in COLUMNS.iter().enumerate() {
            match headers.get(i) {
                Some(actual) if actual == *expected => {}
                Some(actual) => {
                    return Err(PipelineError::integrity(
                        0,
                        format!("expected column {expected}, found {actual}"),
                    ))
                }
                None => {
                    return Err(PipelineError::integrity(
                        0,
                        format!("missing required column {expected}"),
                    ))
                }
            }
        }

        let mut records = Vec::new();
        for (i, row) in csv_reader.records().enumerate() {
            let row_index = i + 1;
            let row = row?;
            match parse_row(&row, row_index) {
                Ok(tx) => records.push(tx),
                Err(err) => match mode {
                    ValidationMode::FailFast => return Err(err),
                    ValidationMode::Lenient => {
                        warn!(row = row_index, error = %err, "skipping invalid row");
                    }
                },
            }
        }
        Ok(Self::new(records))
    }

    /// Parse a CSV file.
    pub fn read_csv_file<P: AsRef<Path>>(path: P, mode: ValidationMode) -> Result<Self> {
        Self::read_csv(File::open(path)?, mode)
    }

    /// Stable identity of this dataset's contents, used for cache keys.
    ///
    /// SHA-256 over the serialized fields of every record; two datasets with
    /// identical records always produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for tx in &self.records {
            for field in csv_fields(tx) {
                hasher.update(field.as_bytes());
                hasher.update([0x1f]);
            }
            hasher.update([0x0a]);
        }
        hex::encode(hasher.finalize())
    }
}

fn field<'a>(row: &'a csv::StringRecord, index: usize, row_index: usize) -> Result<&'a str> {
    row.get(index)
        .ok_or_else(|| PipelineError::integrity(row_index, format!("missing field {}", COLUMNS[index])))
}

fn numeric(row: &csv::StringRecord, index: usize, row_index: usize) -> Result<f64> {
    let raw = field(row, index, row_index)?;
    raw.parse().map_err(|_| {
        PipelineError::integrity(
            row_index,
            format!("non-numeric {}: {raw}", COLUMNS[index]),
        )
    })
}

fn parse_row(row: &csv::StringRecord, row_index: usize) -> Result<Transaction> {
    let date_raw = field(row, 1, row_index)?;
    let transaction_date: DateTime<Utc> = DateTime::parse_from_rfc3339(date_raw)
        .map_err(|_| {
            PipelineError::integrity(row_index, format!("invalid transaction_date: {date_raw}"))
        })?
        .with_timezone(&Utc);

    let quantity_raw = field(row, 7, row_index)?;
    let quantity: u32 = quantity_raw.parse().map_err(|_| {
        PipelineError::integrity(row_index, format!("non-numeric quantity: {quantity_raw}"))
    })?;

    let coupon_raw = field(row, 13, row_index)?;
    let coupon_code = if coupon_raw.is_empty() {
        None
    } else {
        Some(coupon_raw.to_string())
    };

    let payment_method = field(row, 14, row_index)?
        .parse()
        .map_err(|e: String| PipelineError::integrity(row_index, e))?;
    let shipping_method = field(row, 15, row_index)?
        .parse()
        .map_err(|e: String| PipelineError::integrity(row_index, e))?;

    let tx = Transaction {
        order_id: field(row, 0, row_index)?.to_string(),
        transaction_date,
        customer_id: field(row, 2, row_index)?.to_string(),
        customer_name: field(row, 3, row_index)?.to_string(),
        email: field(row, 4, row_index)?.to_string(),
        category: field(row, 5, row_index)?.to_string(),
        product_name: field(row, 6, row_index)?.to_string(),
        quantity,
        base_price: numeric(row, 8, row_index)?,
        discount: numeric(row, 9, row_index)?,
        total_price: numeric(row, 10, row_index)?,
        cost: numeric(row, 11, row_index)?,
        profit: numeric(row, 12, row_index)?,
        coupon_code,
        payment_method,
        shipping_method,
        shipping_address: field(row, 16, row_index)?.to_string(),
        ip_address: field(row, 17, row_index)?.to_string(),
    };

    tx.check_invariants()
        .map_err(|reason| PipelineError::integrity(row_index, reason))?;
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::generator::DatasetBuilder;

    fn sample_dataset(n: usize) -> Dataset {
        DatasetBuilder::build(n, 21, &GenerationConfig::default()).unwrap()
    }

    fn to_csv_string(dataset: &Dataset) -> String {
        let mut buf = Vec::new();
        dataset.write_csv(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_round_trip_reproduces_field_values() {
        let dataset = sample_dataset(100);
        let csv = to_csv_string(&dataset);
        let reloaded = Dataset::read_csv(csv.as_bytes(), ValidationMode::FailFast).unwrap();

        assert_eq!(dataset.len(), reloaded.len());
        for (a, b) in dataset.records().iter().zip(reloaded.records()) {
            assert_eq!(a.order_id, b.order_id);
            assert_eq!(a.transaction_date, b.transaction_date);
            assert_eq!(a.customer_id, b.customer_id);
            assert_eq!(a.customer_name, b.customer_name);
            assert_eq!(a.email, b.email);
            assert_eq!(a.category, b.category);
            assert_eq!(a.product_name, b.product_name);
            assert_eq!(a.quantity, b.quantity);
            assert_eq!(a.coupon_code, b.coupon_code);
            assert_eq!(a.payment_method, b.payment_method);
            assert_eq!(a.shipping_method, b.shipping_method);
            assert_eq!(a.shipping_address, b.shipping_address);
            assert_eq!(a.ip_address, b.ip_address);
            for (x, y) in [
                (a.base_price, b.base_price),
                (a.discount, b.discount),
                (a.total_price, b.total_price),
                (a.cost, b.cost),
                (a.profit, b.profit),
            ] {
                assert!((x - y).abs() < 0.005, "{x} != {y} beyond currency rounding");
            }
        }
    }

    #[test]
    fn test_header_row_and_column_order() {
        let dataset = sample_dataset(1);
        let csv = to_csv_string(&dataset);
        let header = csv.lines().next().unwrap();
        assert_eq!(header, COLUMNS.join(","));
    }

    const ROW_LAPTOP: &str = "ORD-000001,2025-03-14T15:09:26+00:00,CUST-00042,Alice Walker,alice.walker7@example.com,Electronics,Laptop,2,1200.00,0.10,2160.00,1680.00,480.00,SAVE10,Credit Card,Express,221 Birch Lane Austin TX 73301,23.104.17.88";
    const ROW_HEADPHONES: &str = "ORD-000002,2025-04-02T09:30:00+00:00,CUST-00007,Brian Chen,brian.chen3@example.net,Electronics,Headphones,1,50.00,0.00,50.00,30.00,20.00,,PayPal,Standard,14 Cedar Court Denver CO 80014,47.8.101.9";
    const ROW_BAD_QUANTITY: &str = "ORD-000003,2025-04-02T09:31:00+00:00,CUST-00007,Brian Chen,brian.chen3@example.net,Electronics,Tablet,not-a-number,300.00,0.00,300.00,200.00,100.00,,PayPal,Standard,14 Cedar Court Denver CO 80014,47.8.101.9";
    const ROW_BAD_TOTAL: &str = "ORD-000004,2025-04-02T09:32:00+00:00,CUST-00007,Brian Chen,brian.chen3@example.net,Electronics,Tablet,1,300.00,0.00,999999.99,200.00,999799.99,,PayPal,Standard,14 Cedar Court Denver CO 80014,47.8.101.9";

    fn csv_with_rows(rows: &[&str]) -> String {
        let mut out = COLUMNS.join(",");
        out.push('\n');
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_missing_column_rejected() {
        let csv = "order_id,transaction_date\nORD-000001,2025-01-01T00:00:00+00:00\n";
        let err = Dataset::read_csv(csv.as_bytes(), ValidationMode::FailFast).unwrap_err();
        assert!(matches!(err, PipelineError::DataIntegrity { row: 0, .. }));
    }

    #[test]
    fn test_empty_coupon_loads_as_none() {
        let csv = csv_with_rows(&[ROW_HEADPHONES]);
        let loaded = Dataset::read_csv(csv.as_bytes(), ValidationMode::FailFast).unwrap();
        assert_eq!(loaded.records()[0].coupon_code, None);
    }

    #[test]
    fn test_corrupt_row_fails_fast_with_row_index() {
        let csv = csv_with_rows(&[ROW_LAPTOP, ROW_BAD_QUANTITY]);
        let err = Dataset::read_csv(csv.as_bytes(), ValidationMode::FailFast).unwrap_err();
        match err {
            PipelineError::DataIntegrity { row, .. } => assert_eq!(row, 2),
            other => panic!("expected DataIntegrity, got {other}"),
        }
    }

    #[test]
    fn test_lenient_mode_keeps_valid_rows() {
        let csv = csv_with_rows(&[ROW_LAPTOP, ROW_BAD_QUANTITY, ROW_HEADPHONES]);
        let loaded = Dataset::read_csv(csv.as_bytes(), ValidationMode::Lenient).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.records()[1].order_id, "ORD-000002");
    }

    #[test]
    fn test_invariant_violation_rejected_on_load() {
        let csv = csv_with_rows(&[ROW_BAD_TOTAL]);
        let result = Dataset::read_csv(csv.as_bytes(), ValidationMode::FailFast);
        assert!(matches!(
            result,
            Err(PipelineError::DataIntegrity { row: 1, .. })
        ));
    }

    #[test]
    fn test_fingerprint_stable_and_content_sensitive() {
        let a = sample_dataset(50);
        let b = sample_dataset(50);
        assert_eq!(a.fingerprint(), b.fingerprint());

        let different = DatasetBuilder::build(50, 22, &GenerationConfig::default()).unwrap();
        assert_ne!(a.fingerprint(), different.fingerprint());
    }
}
