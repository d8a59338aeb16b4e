//! Action toolkit: eligibility-checked operations over the order store.
//!
//! Destructive operations follow one shape: look the order up, check the
//! eligibility rule, snapshot, mutate, snapshot again, record the action and
//! return a confirmation line. Every refusal is a [`ToolkitError`] whose
//! `Display` is the user-facing explanation; refusals never mutate.

use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

use super::rules::{can_cancel, can_change_address, return_window_expired};
use super::store::{ActionKind, OrderStore};
use super::{Order, OrderStatus};
use crate::domain::foundation::{today, OrderId, StateMachine};

/// Refund status set when a return is started.
pub const REFUND_PENDING_PICKUP: &str = "Pending Pickup";

/// Why a toolkit operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolkitError {
    #[error("I couldn't find {0}.")]
    NotFound(OrderId),

    /// The order's current status does not permit the operation.
    #[error("{reason}")]
    Ineligible { order_id: OrderId, reason: String },

    #[error("Return window has expired for **{0}**.")]
    ReturnWindowExpired(OrderId),
}

impl ToolkitError {
    fn ineligible(order: &Order, reason: String) -> Self {
        ToolkitError::Ineligible {
            order_id: order.order_id().clone(),
            reason,
        }
    }
}

/// Checks `target` against the status transition table.
fn transition(before: &Order, target: OrderStatus) -> Result<OrderStatus, ToolkitError> {
    before.status().transition_to(target).map_err(|_| {
        ToolkitError::ineligible(
            before,
            format!(
                "**{}** is {}, so it can’t move to {}.",
                before.order_id(),
                before.status(),
                target
            ),
        )
    })
}

/// Order operations used by the dispatcher and the confirm step.
pub struct ActionToolkit;

impl ActionToolkit {
    /// Cancels a Processing order.
    pub fn cancel_order(store: &mut OrderStore, id: &OrderId) -> Result<String, ToolkitError> {
        let before = store
            .snapshot(id)
            .ok_or_else(|| ToolkitError::NotFound(id.clone()))?;

        if !can_cancel(&before) {
            let status = before.status();
            let reason = if status.is_in_transit() {
                format!("**{}** is already {}, so I can’t cancel it.", id, status)
            } else {
                format!("**{}** is {}, so cancellation isn’t applicable.", id, status)
            };
            debug!(order_id = %id, %status, "cancel refused");
            return Err(ToolkitError::ineligible(&before, reason));
        }

        let next = transition(&before, OrderStatus::Cancelled)?;
        store.set_status(id, next);
        Self::record(store, ActionKind::Cancel, id, &before);
        Ok(format!("**{}** has been **cancelled**.", id))
    }

    /// Starts a return on a Delivered order whose return window has not
    /// closed. An order without a stored window date is not refused.
    pub fn start_return(store: &mut OrderStore, id: &OrderId) -> Result<String, ToolkitError> {
        Self::start_return_on(store, id, today())
    }

    /// Same as [`start_return`](Self::start_return) for an explicit calendar day.
    pub fn start_return_on(
        store: &mut OrderStore,
        id: &OrderId,
        today: NaiveDate,
    ) -> Result<String, ToolkitError> {
        let before = store
            .snapshot(id)
            .ok_or_else(|| ToolkitError::NotFound(id.clone()))?;

        match before.status() {
            OrderStatus::Delivered if !return_window_expired(&before, today) => {}
            OrderStatus::Delivered => {
                debug!(order_id = %id, "return window closed");
                return Err(ToolkitError::ReturnWindowExpired(id.clone()));
            }
            OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::OutForDelivery => {
                return Err(ToolkitError::ineligible(
                    &before,
                    format!("**{}** isn’t delivered yet, so return can’t be started.", id),
                ));
            }
            status => {
                return Err(ToolkitError::ineligible(
                    &before,
                    format!("**{}** is {}, so a return isn’t applicable.", id, status),
                ));
            }
        }

        let next = transition(&before, OrderStatus::ReturnInitiated)?;
        store.set_status(id, next);
        store.set_refund_status(id, REFUND_PENDING_PICKUP);
        Self::record(store, ActionKind::StartReturn, id, &before);
        Ok(format!(
            "Return initiated for **{}**. We’ll share pickup details shortly.",
            id
        ))
    }

    /// Replaces the delivery address of a Processing order.
    pub fn change_address(
        store: &mut OrderStore,
        id: &OrderId,
        new_address: &str,
    ) -> Result<String, ToolkitError> {
        let before = store
            .snapshot(id)
            .ok_or_else(|| ToolkitError::NotFound(id.clone()))?;

        if !can_change_address(&before) {
            return Err(ToolkitError::ineligible(
                &before,
                format!("**{}** is {}, so I can’t change the address.", id, before.status()),
            ));
        }

        store.set_address(id, new_address.trim());
        Self::record(store, ActionKind::ChangeAddress, id, &before);
        Ok(format!("Address updated for **{}**.", id))
    }

    fn record(store: &mut OrderStore, kind: ActionKind, id: &OrderId, before: &Order) {
        if let Some(after) = store.snapshot(id) {
            store.record_action(kind, id, before, &after);
            info!(order_id = %id, kind = %kind, "order mutated");
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════════

    pub fn lookup_order<'a>(store: &'a OrderStore, id: &OrderId) -> Result<&'a Order, ToolkitError> {
        store
            .get_order(id)
            .ok_or_else(|| ToolkitError::NotFound(id.clone()))
    }

    pub fn search_items<'a>(store: &'a OrderStore, text: &str) -> Vec<&'a Order> {
        store.search_by_item_keyword(text)
    }

    /// Order ids containing `query`, optionally scoped to one phone.
    pub fn suggest_order_ids(
        store: &OrderStore,
        query: &str,
        phone: Option<&str>,
        limit: usize,
    ) -> Vec<OrderId> {
        let needle = query.trim().to_uppercase();
        store
            .orders()
            .filter(|o| phone.map_or(true, |p| o.customer_phone() == p))
            .filter(|o| o.order_id().as_str().contains(&needle))
            .map(|o| o.order_id().clone())
            .take(limit)
            .collect()
    }

    /// Distinct item names containing `query`, in first-seen order.
    pub fn suggest_item_names(store: &OrderStore, query: &str, limit: usize) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for item in store.orders().flat_map(|o| o.items()) {
            if names.len() >= limit {
                break;
            }
            if item.to_lowercase().contains(&needle) && seen.insert(item.as_str()) {
                names.push(item.clone());
            }
        }
        names
    }

    /// Orders for the session phone; else the demo fallback phone's; else all.
    pub fn orders_for_session<'a>(
        store: &'a OrderStore,
        phone: &str,
        fallback_phone: &str,
    ) -> Vec<&'a Order> {
        let own = store.find_by_phone(phone);
        if !own.is_empty() {
            return own;
        }
        let demo = store.find_by_phone(fallback_phone);
        if !demo.is_empty() {
            return demo;
        }
        store.orders().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn oid(s: &str) -> OrderId {
        OrderId::new(s).unwrap()
    }

    fn order(id: &str, status: OrderStatus, items: &[&str]) -> Order {
        Order::new(
            oid(id),
            status,
            items.iter().map(|s| s.to_string()).collect(),
            "9876543210",
            "12 Park Lane, Mumbai",
        )
        .unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn store() -> OrderStore {
        OrderStore::with_orders(vec![
            order("ORD10001", OrderStatus::Processing, &["USB-C Cable"]),
            order("ORD10002", OrderStatus::Shipped, &["Power Bank"]),
            order("ORD10003", OrderStatus::Delivered, &["Wireless Earbuds"])
                .with_delivered_date(day() - Duration::days(2))
                .with_return_eligible_until(day() + Duration::days(8)),
            order("ORD10004", OrderStatus::Delivered, &["Keyboard"])
                .with_return_eligible_until(day() - Duration::days(1)),
            order("ORD10005", OrderStatus::Refunded, &["Phone Case", "USB-C Cable"]),
        ])
        .unwrap()
    }

    #[test]
    fn cancel_processing_order_succeeds_and_logs() {
        let mut s = store();
        let id = oid("ORD10001");

        let msg = ActionToolkit::cancel_order(&mut s, &id).unwrap();

        assert!(msg.contains("cancelled"));
        assert_eq!(s.get_order(&id).unwrap().status(), OrderStatus::Cancelled);
        let log = s.action_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, ActionKind::Cancel);
        assert_eq!(log[0].kind.as_str(), "cancel");
        assert_eq!(log[0].before.status(), OrderStatus::Processing);
        assert_eq!(log[0].after.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn cancel_then_undo_restores_snapshot() {
        let mut s = store();
        let id = oid("ORD10001");
        let original = s.snapshot(&id).unwrap();

        ActionToolkit::cancel_order(&mut s, &id).unwrap();
        s.undo_last().unwrap();

        assert_eq!(s.get_order(&id).unwrap(), &original);
    }

    #[test]
    fn cancel_shipped_order_is_refused() {
        let mut s = store();
        let err = ActionToolkit::cancel_order(&mut s, &oid("ORD10002")).unwrap_err();
        assert!(err.to_string().contains("already Shipped"));
        assert!(s.action_log().is_empty());
    }

    #[test]
    fn cancel_refunded_order_is_not_applicable() {
        let mut s = store();
        let err = ActionToolkit::cancel_order(&mut s, &oid("ORD10005")).unwrap_err();
        assert!(err.to_string().contains("isn’t applicable"));
    }

    #[test]
    fn unknown_order_is_not_found_for_every_operation() {
        let mut s = store();
        let id = oid("ORD99999");

        for err in [
            ActionToolkit::cancel_order(&mut s, &id).unwrap_err(),
            ActionToolkit::start_return_on(&mut s, &id, day()).unwrap_err(),
            ActionToolkit::change_address(&mut s, &id, "MG Road").unwrap_err(),
            ActionToolkit::lookup_order(&s, &id).unwrap_err(),
        ] {
            assert_eq!(err, ToolkitError::NotFound(id.clone()));
            assert!(err.to_string().contains("couldn't find ORD99999"));
        }
        assert!(s.action_log().is_empty());
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn change_address_on_shipped_order_leaves_address() {
        let mut s = store();
        let id = oid("ORD10002");

        let err = ActionToolkit::change_address(&mut s, &id, "MG Road, Bengaluru").unwrap_err();

        assert!(matches!(err, ToolkitError::Ineligible { .. }));
        assert_eq!(s.get_order(&id).unwrap().address_line(), "12 Park Lane, Mumbai");
    }

    #[test]
    fn change_address_on_processing_order_updates() {
        let mut s = store();
        let id = oid("ORD10001");

        ActionToolkit::change_address(&mut s, &id, "  MG Road, Bengaluru ").unwrap();

        assert_eq!(s.get_order(&id).unwrap().address_line(), "MG Road, Bengaluru");
        assert_eq!(s.action_log()[0].kind, ActionKind::ChangeAddress);
    }

    #[test]
    fn start_return_inside_window_sets_pending_pickup() {
        let mut s = store();
        let id = oid("ORD10003");

        ActionToolkit::start_return_on(&mut s, &id, day()).unwrap();

        let o = s.get_order(&id).unwrap();
        assert_eq!(o.status(), OrderStatus::ReturnInitiated);
        assert_eq!(o.refund_status(), Some(REFUND_PENDING_PICKUP));
    }

    #[test]
    fn start_return_after_window_reports_expiry() {
        let mut s = store();
        let id = oid("ORD10004");

        let err = ActionToolkit::start_return_on(&mut s, &id, day()).unwrap_err();

        assert_eq!(err, ToolkitError::ReturnWindowExpired(id.clone()));
        assert!(err.to_string().contains("expired"));
        assert_eq!(s.get_order(&id).unwrap().status(), OrderStatus::Delivered);
    }

    #[test]
    fn start_return_without_window_date_proceeds() {
        let mut s = store();
        let id = oid("ORD10006");
        s.insert(order("ORD10006", OrderStatus::Delivered, &["Desk Lamp"]))
            .unwrap();

        let msg = ActionToolkit::start_return_on(&mut s, &id, day()).unwrap();

        assert!(msg.starts_with("Return initiated for **ORD10006**"));
        assert_eq!(s.get_order(&id).unwrap().status(), OrderStatus::ReturnInitiated);
        assert_eq!(s.action_log().len(), 1);
    }

    #[test]
    fn illegal_transition_is_ineligible() {
        let refunded = order("ORD10005", OrderStatus::Refunded, &["Phone Case"]);
        let err = transition(&refunded, OrderStatus::Cancelled).unwrap_err();
        assert!(matches!(err, ToolkitError::Ineligible { ref order_id, .. } if order_id == &oid("ORD10005")));

        let processing = order("ORD10001", OrderStatus::Processing, &["USB-C Cable"]);
        assert_eq!(
            transition(&processing, OrderStatus::Cancelled),
            Ok(OrderStatus::Cancelled)
        );
    }

    #[test]
    fn start_return_before_delivery_is_refused() {
        let mut s = store();
        let err = ActionToolkit::start_return_on(&mut s, &oid("ORD10002"), day()).unwrap_err();
        assert!(err.to_string().contains("isn’t delivered yet"));
    }

    #[test]
    fn suggestions_are_scoped_and_capped() {
        let s = store();
        let all = ActionToolkit::suggest_order_ids(&s, "ord1000", None, 3);
        assert_eq!(all, vec![oid("ORD10001"), oid("ORD10002"), oid("ORD10003")]);

        let none = ActionToolkit::suggest_order_ids(&s, "ORD", Some("0000000000"), 10);
        assert!(none.is_empty());
    }

    #[test]
    fn item_suggestions_are_deduplicated() {
        let s = store();
        let names = ActionToolkit::suggest_item_names(&s, "usb", 10);
        assert_eq!(names, vec!["USB-C Cable".to_string()]);

        let capped = ActionToolkit::suggest_item_names(&s, "", 2);
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn search_items_matches_any_item() {
        let s = store();
        let hits = ActionToolkit::search_items(&s, "phone case");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].order_id(), &oid("ORD10005"));
    }

    #[test]
    fn session_orders_fall_back_to_demo_phone_then_everything() {
        let mut s = store();
        s.insert(
            Order::new(
                oid("ORD10006"),
                OrderStatus::Shipped,
                vec!["Desk Lamp".to_string()],
                "1112223334",
                "4 Lake View, Pune",
            )
            .unwrap(),
        )
        .unwrap();

        let own = ActionToolkit::orders_for_session(&s, "1112223334", "9876543210");
        assert_eq!(own.len(), 1);

        let demo = ActionToolkit::orders_for_session(&s, "0000000000", "9876543210");
        assert_eq!(demo.len(), 5);

        let all = ActionToolkit::orders_for_session(&s, "0000000000", "5555555555");
        assert_eq!(all.len(), 6);
    }
}
