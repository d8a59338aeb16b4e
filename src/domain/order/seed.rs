//! Deterministic demo data.
//!
//! Generates a fixed population of orders from a seeded RNG so every run of
//! the demo sees the same customers, items and statuses. Dates are anchored
//! to the supplied `today`.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use super::store::{OrderStore, StoreError};
use super::{Order, OrderStatus};
use crate::domain::foundation::{OrderId, ValidationError};

pub const CITIES: [&str; 8] = [
    "Delhi", "Mumbai", "Bengaluru", "Hyderabad", "Chennai", "Pune", "Kolkata", "Ahmedabad",
];

pub const COURIERS: [&str; 5] = ["Bluedart", "Delhivery", "XpressBees", "Ecom Express", "Shadowfax"];

pub const ITEMS: [&str; 13] = [
    "Wireless Earbuds",
    "Phone Case",
    "USB-C Cable",
    "Power Bank",
    "Keyboard",
    "Water Bottle",
    "Running Shoes",
    "Backpack",
    "Analog Watch",
    "Bluetooth Speaker",
    "LED Bulb",
    "Shirt",
    "Jeans",
];

const FIRST_NAMES: [&str; 12] = [
    "Aman", "Priya", "Ravi", "Neha", "Kiran", "Sneha", "Rohit", "Aisha", "Kabir", "Aditi", "Ankit",
    "Meera",
];

const PAYMENT_METHODS: [&str; 4] = ["UPI", "Credit Card", "Debit Card", "COD"];

const EMAIL_DOMAINS: [&str; 3] = ["gmail.com", "yahoo.com", "outlook.com"];

/// Days a delivered order stays returnable.
pub const RETURN_WINDOW_DAYS: i64 = 10;

/// Errors raised while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parameters for [`seed_store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOptions {
    pub order_count: usize,
    pub rng_seed: u64,
    pub demo_phone: String,
    pub demo_email: String,
    pub demo_order_count: usize,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            order_count: 260,
            rng_seed: 42,
            demo_phone: "9876543210".to_string(),
            demo_email: "demo@customer.com".to_string(),
            demo_order_count: 10,
        }
    }
}

/// Status buckets: 20% Processing, 27% Shipped, 15% Out for Delivery,
/// 28% Delivered, 5% Return Initiated, remainder Refunded.
fn status_buckets(n: usize) -> Vec<(OrderStatus, usize)> {
    let share = |pct: usize| n * pct / 100;
    let fixed = [
        (OrderStatus::Processing, share(20)),
        (OrderStatus::Shipped, share(27)),
        (OrderStatus::OutForDelivery, share(15)),
        (OrderStatus::Delivered, share(28)),
        (OrderStatus::ReturnInitiated, share(5)),
    ];
    let used: usize = fixed.iter().map(|(_, c)| c).sum();
    let mut buckets = fixed.to_vec();
    buckets.push((OrderStatus::Refunded, n.saturating_sub(used)));
    buckets
}

/// Builds a store populated with demo orders.
pub fn seed_store(options: &SeedOptions, today: NaiveDate) -> Result<OrderStore, SeedError> {
    Ok(OrderStore::with_orders(seed_orders(options, today)?)?)
}

/// Generates the demo orders, ids `ORD10001` upwards.
pub fn seed_orders(options: &SeedOptions, today: NaiveDate) -> Result<Vec<Order>, SeedError> {
    let mut rng = StdRng::seed_from_u64(options.rng_seed);
    let n = options.order_count;
    let demo: HashSet<usize> = index::sample(&mut rng, n, options.demo_order_count.min(n))
        .into_iter()
        .collect();

    let mut orders = Vec::with_capacity(n);
    let mut i = 0usize;
    for (status, count) in status_buckets(n) {
        for _ in 0..count {
            let id = OrderId::from_number(10_000 + i as u32 + 1)?;
            let is_demo = demo.contains(&i);
            i += 1;
            orders.push(random_order(&mut rng, id, status, today, is_demo, options)?);
        }
    }
    Ok(orders)
}

fn random_order(
    rng: &mut StdRng,
    id: OrderId,
    status: OrderStatus,
    today: NaiveDate,
    is_demo: bool,
    options: &SeedOptions,
) -> Result<Order, SeedError> {
    let name = pick(rng, &FIRST_NAMES);
    let phone = format!("9{:09}", rng.gen_range(0..1_000_000_000u32));
    let email = format!(
        "{}{}@{}",
        name.to_lowercase(),
        rng.gen_range(10..=99),
        pick(rng, &EMAIL_DOMAINS)
    );
    let order_date = today - Duration::days(rng.gen_range(0..=45));

    let item_count = rng.gen_range(1..=3);
    let items: Vec<String> = ITEMS
        .choose_multiple(rng, item_count)
        .map(|s| s.to_string())
        .collect();
    let address = format!("{} Main Road, {}", rng.gen_range(1..=200), pick(rng, &CITIES));

    let (phone, email) = if is_demo {
        (options.demo_phone.clone(), options.demo_email.clone())
    } else {
        (phone, email)
    };

    let mut order = Order::new(id, status, items, phone, address)?
        .with_customer(name, email)
        .with_order_date(order_date)
        .with_payment_method(pick(rng, &PAYMENT_METHODS));

    if status != OrderStatus::Processing {
        let ship = order_date + Duration::days(rng.gen_range(0..=2));
        let eta = ship + Duration::days(rng.gen_range(2..=6));
        let courier = pick(rng, &COURIERS);
        let tracking = format!("TRK{}", rng.gen_range(100_000..=999_999));
        order = order
            .with_shipment(courier, tracking, Some(ship))
            .with_est_delivery_date(eta);
    }

    if status.is_post_delivery() {
        let delivered = order_date + Duration::days(rng.gen_range(4..=10));
        order = order
            .with_delivered_date(delivered)
            .with_return_eligible_until(delivered + Duration::days(RETURN_WINDOW_DAYS));
    }

    match status {
        OrderStatus::Delivered => order = order.with_return_status("Not Started"),
        OrderStatus::ReturnInitiated => {
            order = order.with_return_status("Initiated").with_refund_status("Pending")
        }
        OrderStatus::Refunded => order = order.with_refund_status("Completed"),
        _ => {}
    }

    Ok(order)
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn seeds_requested_number_of_orders() {
        let orders = seed_orders(&SeedOptions::default(), today()).unwrap();
        assert_eq!(orders.len(), 260);
        assert_eq!(orders[0].order_id().as_str(), "ORD10001");
        assert_eq!(orders[259].order_id().as_str(), "ORD10260");
    }

    #[test]
    fn bucket_sizes_follow_shares() {
        let buckets = status_buckets(260);
        let counts: Vec<usize> = buckets.iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![52, 70, 39, 72, 13, 14]);
        assert_eq!(counts.iter().sum::<usize>(), 260);
    }

    #[test]
    fn seeding_is_deterministic() {
        let a = seed_orders(&SeedOptions::default(), today()).unwrap();
        let b = seed_orders(&SeedOptions::default(), today()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn demo_phone_owns_requested_orders() {
        let store = seed_store(&SeedOptions::default(), today()).unwrap();
        let mine = store.find_by_phone("9876543210");
        assert_eq!(mine.len(), 10);
        assert!(mine.iter().all(|o| o.customer_email() == Some("demo@customer.com")));
    }

    #[test]
    fn dates_are_consistent_with_status() {
        let orders = seed_orders(&SeedOptions::default(), today()).unwrap();
        for o in &orders {
            let placed = o.order_date().unwrap();
            assert!(placed <= today());
            match o.status() {
                OrderStatus::Processing => {
                    assert!(o.ship_date().is_none());
                    assert!(o.courier().is_none());
                    assert!(o.tracking_id().is_none());
                }
                status => {
                    let ship = o.ship_date().unwrap();
                    assert!(ship >= placed);
                    assert!(o.est_delivery_date().unwrap() > ship);
                    assert!(o.tracking_id().unwrap().starts_with("TRK"));
                    if status.is_post_delivery() {
                        let delivered = o.delivered_date().unwrap();
                        assert_eq!(
                            o.return_eligible_until(),
                            Some(delivered + Duration::days(RETURN_WINDOW_DAYS))
                        );
                    }
                }
            }
            assert!((1..=3).contains(&o.items().len()));
            assert_eq!(o.customer_phone().len(), 10);
        }
    }
}
