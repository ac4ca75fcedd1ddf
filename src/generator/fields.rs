//! Per-field value generators.
//!
//! Each generator is a pure function of an explicit random source (and an
//! optional prior context such as the chosen product), so a fixed seed always
//! reproduces the same dataset. Nothing here touches ambient randomness.

use crate::config::GenerationConfig;
use crate::types::{PaymentMethod, ShippingMethod};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const COUPON_CODES: [&str; 4] = ["SAVE10", "SPRING20", "SUMMER15", "FLASH25"];

const FIRST_NAMES: [&str; 24] = [
    "Alice", "Brian", "Carmen", "Derek", "Elena", "Felix", "Grace", "Hassan", "Irene", "Jonas",
    "Keiko", "Liam", "Maria", "Noah", "Olivia", "Pedro", "Quinn", "Rosa", "Samuel", "Tara",
    "Umar", "Vera", "Wesley", "Yara",
];

const LAST_NAMES: [&str; 24] = [
    "Anderson", "Brooks", "Chen", "Diaz", "Evans", "Fischer", "Garcia", "Hughes", "Ivanov",
    "Johnson", "Kim", "Lopez", "Mwangi", "Nguyen", "Okafor", "Patel", "Quintero", "Rossi",
    "Silva", "Tanaka", "Ueda", "Vargas", "Walker", "Young",
];

const EMAIL_DOMAINS: [&str; 4] = ["example.com", "example.net", "example.org", "mail.example.com"];

const STREET_NAMES: [&str; 12] = [
    "Maple", "Oak", "Birch", "Cedar", "Elm", "Willow", "Juniper", "Magnolia", "Chestnut",
    "Sycamore", "Aspen", "Hawthorn",
];

const STREET_SUFFIXES: [&str; 5] = ["Street", "Avenue", "Lane", "Court", "Drive"];

/// A shipping region with its IPv4 block; normal transactions draw their IP
/// from the block matching the shipping address, anomalous ones do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub city: &'static str,
    pub state: &'static str,
    pub zip: &'static str,
    pub ip_block: u8,
}

pub const REGIONS: [Region; 10] = [
    Region { city: "Austin", state: "TX", zip: "73301", ip_block: 23 },
    Region { city: "Denver", state: "CO", zip: "80014", ip_block: 47 },
    Region { city: "Seattle", state: "WA", zip: "98101", ip_block: 63 },
    Region { city: "Portland", state: "OR", zip: "97201", ip_block: 71 },
    Region { city: "Chicago", state: "IL", zip: "60601", ip_block: 89 },
    Region { city: "Atlanta", state: "GA", zip: "30301", ip_block: 98 },
    Region { city: "Boston", state: "MA", zip: "02108", ip_block: 121 },
    Region { city: "Phoenix", state: "AZ", zip: "85001", ip_block: 134 },
    Region { city: "Nashville", state: "TN", zip: "37201", ip_block: 152 },
    Region { city: "Columbus", state: "OH", zip: "43004", ip_block: 173 },
];

/// Pick from an explicit weighted enumeration.
fn pick_weighted<'a, T>(rng: &mut impl Rng, options: &'a [(T, u32)]) -> &'a T {
    let total: u32 = options.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (value, weight) in options {
        if roll < *weight {
            return value;
        }
        roll -= weight;
    }
    &options[options.len() - 1].0
}

/// Sequential order identifier.
pub fn order_id(seq: u64) -> String {
    format!("ORD-{seq:06}")
}

/// Customer identifier for a pool index.
pub fn customer_id(index: u32) -> String {
    format!("CUST-{:05}", index + 1)
}

/// Uniform draw from the customer pool.
pub fn customer_index(rng: &mut impl Rng, pool: u32) -> u32 {
    rng.gen_range(0..pool)
}

/// Random full name.
pub fn full_name(rng: &mut impl Rng) -> String {
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
    format!("{first} {last}")
}

/// Email derived from a name, with a numeric suffix against collisions.
pub fn email(rng: &mut impl Rng, name: &str) -> String {
    let domain = EMAIL_DOMAINS[rng.gen_range(0..EMAIL_DOMAINS.len())];
    let suffix = rng.gen_range(1..100);
    let local = name.to_lowercase().replace(' ', ".");
    format!("{local}{suffix}@{domain}")
}

/// Payment method, weighted toward credit cards.
pub fn payment_method(rng: &mut impl Rng) -> PaymentMethod {
    const WEIGHTS: [(PaymentMethod, u32); 4] = [
        (PaymentMethod::CreditCard, 55),
        (PaymentMethod::PayPal, 20),
        (PaymentMethod::DebitCard, 15),
        (PaymentMethod::BankTransfer, 10),
    ];
    *pick_weighted(rng, &WEIGHTS)
}

/// Shipping method, weighted toward standard delivery.
pub fn shipping_method(rng: &mut impl Rng) -> ShippingMethod {
    const WEIGHTS: [(ShippingMethod, u32); 4] = [
        (ShippingMethod::Standard, 50),
        (ShippingMethod::Express, 25),
        (ShippingMethod::NextDay, 15),
        (ShippingMethod::International, 10),
    ];
    *pick_weighted(rng, &WEIGHTS)
}

/// Order quantity, skewed toward 1-3 with a long tail.
pub fn quantity(rng: &mut impl Rng) -> u32 {
    const WEIGHTS: [(u32, u32); 6] = [(1, 38), (2, 27), (3, 16), (4, 9), (5, 6), (0, 4)];
    match *pick_weighted(rng, &WEIGHTS) {
        0 => rng.gen_range(6..=15),
        q => q,
    }
}

/// Discount rate: zero with high probability, otherwise a bounded random
/// value quantized to 2 fraction digits.
pub fn discount(rng: &mut impl Rng, config: &GenerationConfig) -> f64 {
    if rng.gen::<f64>() < config.discount_zero_probability {
        return 0.0;
    }
    let max_cents = (config.max_discount * 100.0) as u32;
    if max_cents == 0 {
        return 0.0;
    }
    rng.gen_range(1..=max_cents) as f64 / 100.0
}

/// Optional coupon code.
pub fn coupon(rng: &mut impl Rng, rate: f64) -> Option<String> {
    if rng.gen::<f64>() < rate {
        Some(COUPON_CODES[rng.gen_range(0..COUPON_CODES.len())].to_string())
    } else {
        None
    }
}

/// Timestamp uniformly inside the generation window, whole seconds.
pub fn timestamp(rng: &mut impl Rng, config: &GenerationConfig) -> DateTime<Utc> {
    let window_secs = config.window_days * 86_400;
    config.window_start + Duration::seconds(rng.gen_range(0..window_secs))
}

/// Uniform region pick.
pub fn region(rng: &mut impl Rng) -> &'static Region {
    &REGIONS[rng.gen_range(0..REGIONS.len())]
}

/// Street address inside a region.
pub fn street_address(rng: &mut impl Rng, region: &Region) -> String {
    let number = rng.gen_range(1..1000);
    let street = STREET_NAMES[rng.gen_range(0..STREET_NAMES.len())];
    let suffix = STREET_SUFFIXES[rng.gen_range(0..STREET_SUFFIXES.len())];
    format!(
        "{number} {street} {suffix}, {}, {} {}",
        region.city, region.state, region.zip
    )
}

/// IPv4 address inside the region's block.
pub fn ip_in_region(rng: &mut impl Rng, region: &Region) -> String {
    format!(
        "{}.{}.{}.{}",
        region.ip_block,
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(1..=254)
    )
}

/// IPv4 address from a different region's block, for geo-mismatch anomalies.
pub fn ip_outside_region(rng: &mut impl Rng, region: &Region) -> String {
    let mut other = REGIONS[rng.gen_range(0..REGIONS.len())];
    while other.ip_block == region.ip_block {
        other = REGIONS[rng.gen_range(0..REGIONS.len())];
    }
    ip_in_region(rng, &other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generators_are_deterministic() {
        let config = GenerationConfig::default();
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);

        assert_eq!(full_name(&mut a), full_name(&mut b));
        assert_eq!(quantity(&mut a), quantity(&mut b));
        assert_eq!(timestamp(&mut a, &config), timestamp(&mut b, &config));
        assert_eq!(payment_method(&mut a), payment_method(&mut b));
    }

    #[test]
    fn test_quantity_is_positive_and_skewed() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let samples: Vec<u32> = (0..2000).map(|_| quantity(&mut rng)).collect();

        assert!(samples.iter().all(|&q| q >= 1));
        let small = samples.iter().filter(|&&q| q <= 3).count();
        assert!(small > samples.len() / 2, "quantities should skew toward 1-3");
        assert!(samples.iter().any(|&q| q > 5), "long tail should occur");
    }

    #[test]
    fn test_discount_bounds() {
        let config = GenerationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..2000 {
            let d = discount(&mut rng, &config);
            assert!((0.0..1.0).contains(&d));
            assert!(d <= config.max_discount + 1e-9);
        }
    }

    #[test]
    fn test_payment_weighted_toward_credit_card() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut credit = 0;
        for _ in 0..1000 {
            if payment_method(&mut rng) == PaymentMethod::CreditCard {
                credit += 1;
            }
        }
        assert!(credit > 400, "credit card should dominate, got {credit}/1000");
    }

    #[test]
    fn test_timestamp_inside_window() {
        let config = GenerationConfig::default();
        let end = config.window_start + Duration::days(config.window_days);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..500 {
            let ts = timestamp(&mut rng, &config);
            assert!(ts >= config.window_start && ts < end);
        }
    }

    #[test]
    fn test_ip_outside_region_uses_other_block() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let home = &REGIONS[0];
        for _ in 0..100 {
            let ip = ip_outside_region(&mut rng, home);
            let first_octet: u8 = ip.split('.').next().unwrap().parse().unwrap();
            assert_ne!(first_octet, home.ip_block);
        }
    }

    #[test]
    fn test_email_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let name = full_name(&mut rng);
        let address = email(&mut rng, &name);
        assert!(address.contains('@'));
        assert!(address.contains('.'));
        assert!(!address.contains(' '));
    }
}
