//! Eligibility rules.
//!
//! Pure predicates over an order's current state. The toolkit consults these
//! before any mutation; the store itself never validates.

use chrono::NaiveDate;

use super::{Order, OrderStatus};

/// An order can be cancelled only before it ships.
pub fn can_cancel(order: &Order) -> bool {
    order.status() == OrderStatus::Processing
}

/// The delivery address can be changed only before the order ships.
pub fn can_change_address(order: &Order) -> bool {
    order.status() == OrderStatus::Processing
}

/// True iff the order is Delivered or Return Initiated and `today` is on or
/// before the stored `return_eligible_until` date.
///
/// Fails closed: a missing window date yields false.
pub fn is_return_eligible(order: &Order, today: NaiveDate) -> bool {
    if !matches!(
        order.status(),
        OrderStatus::Delivered | OrderStatus::ReturnInitiated
    ) {
        return false;
    }
    match order.return_eligible_until() {
        Some(until) => today <= until,
        None => false,
    }
}

/// True once the stored return window has closed.
pub fn return_window_expired(order: &Order, today: NaiveDate) -> bool {
    order
        .return_eligible_until()
        .is_some_and(|until| today > until)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::OrderId;
    use chrono::Duration;
    use proptest::prelude::*;

    fn order(status: OrderStatus, until: Option<NaiveDate>) -> Order {
        let o = Order::new(
            OrderId::new("ORD10001").unwrap(),
            status,
            vec!["Backpack".to_string()],
            "9876543210",
            "12 Park Lane, Mumbai",
        )
        .unwrap();
        match until {
            Some(d) => o.with_return_eligible_until(d),
            None => o,
        }
    }

    fn status_strategy() -> impl Strategy<Value = OrderStatus> {
        proptest::sample::select(OrderStatus::ALL.to_vec())
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0i64..3650).prop_map(|days| {
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(days)
        })
    }

    proptest! {
        #[test]
        fn can_cancel_iff_processing(status in status_strategy()) {
            prop_assert_eq!(can_cancel(&order(status, None)), status == OrderStatus::Processing);
        }

        #[test]
        fn can_change_address_iff_processing(status in status_strategy()) {
            prop_assert_eq!(
                can_change_address(&order(status, None)),
                status == OrderStatus::Processing
            );
        }

        #[test]
        fn return_eligibility_matches_status_and_window(
            status in status_strategy(),
            until in date_strategy(),
            today in date_strategy(),
        ) {
            let expected = matches!(status, OrderStatus::Delivered | OrderStatus::ReturnInitiated)
                && today <= until;
            prop_assert_eq!(is_return_eligible(&order(status, Some(until)), today), expected);
        }

        #[test]
        fn missing_window_is_never_eligible(status in status_strategy(), today in date_strategy()) {
            prop_assert!(!is_return_eligible(&order(status, None), today));
        }
    }

    #[test]
    fn last_day_of_window_is_still_eligible() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert!(is_return_eligible(&order(OrderStatus::Delivered, Some(day)), day));
        assert!(!is_return_eligible(
            &order(OrderStatus::Delivered, Some(day)),
            day + Duration::days(1)
        ));
    }

    #[test]
    fn window_expiry_requires_a_stored_date() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert!(return_window_expired(
            &order(OrderStatus::Delivered, Some(day)),
            day + Duration::days(1)
        ));
        assert!(!return_window_expired(&order(OrderStatus::Delivered, None), day));
    }
}
