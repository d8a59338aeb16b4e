//! In-memory order store and action log.
//!
//! The store owns every order for the lifetime of the process together with
//! an append-only log of mutations. Only the newest log entry is revertible,
//! and only within the undo grace period.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use super::{Order, OrderStatus};
use crate::domain::foundation::{ActionId, OrderId, Timestamp};

/// Seconds after a mutation during which it may be reverted.
pub const UNDO_GRACE_SECS: i64 = 300;

/// Kind of mutation recorded in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Cancel,
    StartReturn,
    ChangeAddress,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Cancel => "cancel",
            ActionKind::StartReturn => "start_return",
            ActionKind::ChangeAddress => "change_address",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded mutation with full before/after snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: ActionId,
    pub kind: ActionKind,
    pub order_id: OrderId,
    pub recorded_at: Timestamp,
    pub before: Order,
    pub after: Order,
}

/// Snapshot of the undoable action for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastActionInfo {
    pub kind: ActionKind,
    pub order_id: OrderId,
    pub age_secs: i64,
    pub remaining_secs: i64,
    pub can_undo: bool,
}

/// Errors from store-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Order {0} already exists")]
    DuplicateOrder(OrderId),
}

/// Reasons an undo request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UndoError {
    #[error("Undo window has expired.")]
    Expired,

    #[error("Nothing to undo.")]
    NothingToUndo,
}

/// Volatile order store; the single source of truth for order state.
#[derive(Debug, Clone)]
pub struct OrderStore {
    orders: BTreeMap<OrderId, Order>,
    actions: Vec<ActionLogEntry>,
    last_action: Option<usize>,
    next_seq: u64,
    undo_grace_secs: i64,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    /// Creates an empty store with the default undo grace period.
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
            actions: Vec::new(),
            last_action: None,
            next_seq: 0,
            undo_grace_secs: UNDO_GRACE_SECS,
        }
    }

    /// Creates a store from a batch of orders; later duplicates are rejected.
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for order in orders {
            store.insert(order)?;
        }
        Ok(store)
    }

    /// Overrides the undo grace period.
    pub fn with_undo_grace_secs(mut self, secs: i64) -> Self {
        self.undo_grace_secs = secs;
        self
    }

    /// Adds a new order. Ids are never reused.
    pub fn insert(&mut self, order: Order) -> Result<(), StoreError> {
        let id = order.order_id().clone();
        if self.orders.contains_key(&id) {
            return Err(StoreError::DuplicateOrder(id));
        }
        self.orders.insert(id, order);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════════

    pub fn get_order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    /// All orders, in store iteration order (ascending order id).
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn find_by_phone(&self, phone: &str) -> Vec<&Order> {
        self.orders
            .values()
            .filter(|o| o.customer_phone() == phone)
            .collect()
    }

    /// Case-insensitive substring match against any item name.
    pub fn search_by_item_keyword(&self, text: &str) -> Vec<&Order> {
        let needle = text.to_lowercase();
        self.orders
            .values()
            .filter(|o| o.has_item_matching(&needle))
            .collect()
    }

    /// Deep copy of the current order state.
    pub fn snapshot(&self, id: &OrderId) -> Option<Order> {
        self.orders.get(id).cloned()
    }

    /// Full action history, oldest first.
    pub fn action_log(&self) -> &[ActionLogEntry] {
        &self.actions
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Mutators (no validation)
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_status(&mut self, id: &OrderId, status: OrderStatus) {
        if let Some(order) = self.orders.get_mut(id) {
            order.set_status(status);
        }
    }

    pub fn set_address(&mut self, id: &OrderId, address: &str) {
        if let Some(order) = self.orders.get_mut(id) {
            order.set_address(address);
        }
    }

    pub fn set_refund_status(&mut self, id: &OrderId, status: &str) {
        if let Some(order) = self.orders.get_mut(id) {
            order.set_refund_status(status);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Action log and undo
    // ═══════════════════════════════════════════════════════════════════════

    /// Appends a mutation to the log and makes it the undoable action.
    pub fn record_action(
        &mut self,
        kind: ActionKind,
        order_id: &OrderId,
        before: &Order,
        after: &Order,
    ) -> ActionLogEntry {
        self.record_action_at(kind, order_id, before, after, Timestamp::now())
    }

    /// Same as [`record_action`](Self::record_action) with an explicit time.
    pub fn record_action_at(
        &mut self,
        kind: ActionKind,
        order_id: &OrderId,
        before: &Order,
        after: &Order,
        recorded_at: Timestamp,
    ) -> ActionLogEntry {
        self.next_seq += 1;
        let entry = ActionLogEntry {
            id: ActionId::new(self.next_seq),
            kind,
            order_id: order_id.clone(),
            recorded_at,
            before: before.clone(),
            after: after.clone(),
        };
        self.actions.push(entry.clone());
        self.last_action = Some(self.actions.len() - 1);
        debug!(action = %entry.id, kind = %kind, order_id = %order_id, "recorded action");
        entry
    }

    fn last_entry(&self) -> Option<&ActionLogEntry> {
        self.last_action.and_then(|idx| self.actions.get(idx))
    }

    pub fn can_undo(&self) -> bool {
        self.can_undo_at(Timestamp::now())
    }

    /// True iff an undoable action exists and is within the grace period at `now`.
    pub fn can_undo_at(&self, now: Timestamp) -> bool {
        self.last_entry()
            .is_some_and(|entry| now.duration_since(&entry.recorded_at).num_seconds() <= self.undo_grace_secs)
    }

    pub fn last_action_info(&self) -> Option<LastActionInfo> {
        self.last_action_info_at(Timestamp::now())
    }

    pub fn last_action_info_at(&self, now: Timestamp) -> Option<LastActionInfo> {
        let entry = self.last_entry()?;
        let age_secs = now.duration_since(&entry.recorded_at).num_seconds().max(0);
        let remaining_secs = (self.undo_grace_secs - age_secs).max(0);
        Some(LastActionInfo {
            kind: entry.kind,
            order_id: entry.order_id.clone(),
            age_secs,
            remaining_secs,
            can_undo: self.can_undo_at(now),
        })
    }

    pub fn undo_last(&mut self) -> Result<String, UndoError> {
        self.undo_last_at(Timestamp::now())
    }

    /// Restores the last mutated order to its `before` snapshot.
    ///
    /// The undo pointer is cleared on success, so a second call reports
    /// nothing to undo. An expired action is left untouched.
    pub fn undo_last_at(&mut self, now: Timestamp) -> Result<String, UndoError> {
        let entry = self.last_entry().cloned().ok_or(UndoError::NothingToUndo)?;
        if !self.can_undo_at(now) {
            return Err(UndoError::Expired);
        }
        if !self.orders.contains_key(&entry.order_id) {
            self.last_action = None;
            return Err(UndoError::NothingToUndo);
        }
        self.orders.insert(entry.order_id.clone(), entry.before);
        self.last_action = None;
        info!(action = %entry.id, kind = %entry.kind, order_id = %entry.order_id, "reverted action");
        Ok(format!("Reverted **{}** on **{}**.", entry.kind, entry.order_id))
    }
}
