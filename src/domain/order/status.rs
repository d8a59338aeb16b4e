//! Order lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Where an order is in its lifecycle.
///
/// Serialized with the customer-facing labels ("Out for Delivery", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
    #[serde(rename = "Return Initiated")]
    ReturnInitiated,
    #[serde(rename = "Refunded")]
    Refunded,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::ReturnInitiated,
        OrderStatus::Refunded,
        OrderStatus::Cancelled,
    ];

    /// Customer-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::ReturnInitiated => "Return Initiated",
            OrderStatus::Refunded => "Refunded",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// True while the parcel is with the courier.
    pub fn is_in_transit(&self) -> bool {
        matches!(self, OrderStatus::Shipped | OrderStatus::OutForDelivery)
    }

    /// True once the order has reached the customer (or come back).
    pub fn is_post_delivery(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::ReturnInitiated | OrderStatus::Refunded
        )
    }

    /// Statuses for which a late ETA no longer matters.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }
}

impl StateMachine for OrderStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Processing => vec![Cancelled, Shipped],
            Shipped => vec![OutForDelivery],
            OutForDelivery => vec![Delivered],
            Delivered => vec![ReturnInitiated],
            ReturnInitiated => vec![Refunded],
            Refunded | Cancelled => vec![],
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.label().to_lowercase() == wanted)
            .ok_or_else(|| ValidationError::invalid_format("status", format!("unknown status '{}'", s)))
    }
}
