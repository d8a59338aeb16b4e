//! Pending confirmations for destructive actions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::OrderId;
use crate::domain::order::ActionKind;

/// A destructive action proposed this session but not yet approved.
///
/// At most one exists per session; a new proposal replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub kind: ActionKind,
    pub order_id: OrderId,
    pub address: Option<String>,
}

impl PendingConfirmation {
    pub fn cancel(order_id: OrderId) -> Self {
        Self {
            kind: ActionKind::Cancel,
            order_id,
            address: None,
        }
    }

    pub fn start_return(order_id: OrderId) -> Self {
        Self {
            kind: ActionKind::StartReturn,
            order_id,
            address: None,
        }
    }

    pub fn change_address(order_id: OrderId, address: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::ChangeAddress,
            order_id,
            address: Some(address.into()),
        }
    }

    /// Question shown next to the confirm / dismiss controls.
    pub fn prompt(&self) -> String {
        match self.kind {
            ActionKind::Cancel => format!("Confirm cancellation for **{}**?", self.order_id),
            ActionKind::StartReturn => {
                format!("Confirm starting a **return** for **{}**?", self.order_id)
            }
            ActionKind::ChangeAddress => format!(
                "Confirm updating address for **{}** to:\n\n> {}",
                self.order_id,
                self.address.as_deref().unwrap_or("(missing)")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> OrderId {
        OrderId::new("ORD10015").unwrap()
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(PendingConfirmation::cancel(id()).kind, ActionKind::Cancel);
        assert_eq!(PendingConfirmation::start_return(id()).kind, ActionKind::StartReturn);
        let change = PendingConfirmation::change_address(id(), "MG Road");
        assert_eq!(change.address.as_deref(), Some("MG Road"));
    }

    #[test]
    fn prompts_name_the_order() {
        assert_eq!(
            PendingConfirmation::cancel(id()).prompt(),
            "Confirm cancellation for **ORD10015**?"
        );
        assert!(PendingConfirmation::change_address(id(), "MG Road")
            .prompt()
            .ends_with("> MG Road"));
    }
}
