//! Type definitions for the analytics pipeline.

pub mod flag;
pub mod transaction;

pub use flag::FraudFlag;
pub use transaction::{round_currency, PaymentMethod, ShippingMethod, Transaction};
