//! Delivery-time statistics and delay narratives.
//!
//! Pure functions over the store. No I/O; `today` is always passed in.

use chrono::NaiveDate;

use super::store::OrderStore;
use super::{Order, OrderStatus};

/// Minimum samples before an item-specific average is quoted.
pub const MIN_ITEM_SAMPLES: usize = 3;

/// Mean ship-to-delivery time over a set of delivered orders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryAverage {
    pub days: f64,
    pub samples: usize,
}

/// Calculator for delivery statistics.
pub struct DeliveryAnalytics;

impl DeliveryAnalytics {
    /// Averages `delivered_date - ship_date` over Delivered orders.
    ///
    /// # Edge Cases
    /// - Orders missing either date, or delivered before shipping, are skipped
    /// - No qualifying orders: returns `None`
    pub fn average_delivery_days(
        store: &OrderStore,
        item: Option<&str>,
        courier: Option<&str>,
    ) -> Option<DeliveryAverage> {
        let days: Vec<i64> = store
            .orders()
            .filter(|o| o.status() == OrderStatus::Delivered)
            .filter(|o| item.map_or(true, |it| o.contains_item(it)))
            .filter(|o| courier.map_or(true, |c| o.courier() == Some(c)))
            .filter_map(|o| match (o.ship_date(), o.delivered_date()) {
                (Some(ship), Some(delivered)) if delivered >= ship => {
                    Some((delivered - ship).num_days())
                }
                _ => None,
            })
            .collect();

        if days.is_empty() {
            return None;
        }
        let total: i64 = days.iter().sum();
        Some(DeliveryAverage {
            days: total as f64 / days.len() as f64,
            samples: days.len(),
        })
    }

    /// True when the ETA has passed and the order is still moving.
    pub fn is_delayed(order: &Order, today: NaiveDate) -> bool {
        !order.status().is_closed() && order.est_delivery_date().is_some_and(|eta| today > eta)
    }

    /// Builds a short explanation of where the order is and what is typical.
    pub fn explain_delay(store: &OrderStore, order: &Order, today: NaiveDate) -> String {
        let status = order.status();
        let mut parts = vec![format!("**{}** is currently **{}**.", order.order_id(), status)];

        if Self::is_delayed(order, today) {
            if let Some(eta) = order.est_delivery_date() {
                parts.push(format!("It’s past the estimated delivery date (**{}**).", eta));
            }
        }

        match status {
            OrderStatus::Processing => parts.push(
                "It’s still being prepared. High demand or batching can add 1–2 days.".to_string(),
            ),
            OrderStatus::Shipped | OrderStatus::OutForDelivery => {
                let courier = order.courier().unwrap_or("the courier");
                parts.push(format!(
                    "It’s with **{}**; hub backlogs and handovers sometimes add a day.",
                    courier
                ));
                if let Some(ship) = order.ship_date() {
                    parts.push(format!(
                        "Days in transit so far: **{}**.",
                        (today - ship).num_days()
                    ));
                }
            }
            OrderStatus::Delivered => parts.push("It has already been delivered.".to_string()),
            _ => {}
        }

        let item = order.primary_item();
        let item_avg = Self::average_delivery_days(store, Some(item), None)
            .filter(|avg| avg.samples >= MIN_ITEM_SAMPLES);
        if let Some(avg) = item_avg {
            parts.push(format!(
                "Typical for **{}**: ~**{:.1} days** (n={}).",
                item, avg.days, avg.samples
            ));
        } else if let Some(avg) = Self::average_delivery_days(store, None, None) {
            parts.push(format!(
                "Overall average: ~**{:.1} days** (n={}).",
                avg.days, avg.samples
            ));
        }

        if matches!(
            status,
            OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::OutForDelivery
        ) {
            parts.push("You can wait another day, escalate, or (if not shipped) cancel.".to_string());
        }

        parts.join(" ")
    }
}
