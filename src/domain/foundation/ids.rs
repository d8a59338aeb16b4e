//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random SessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order identifier: `ORD` followed by exactly five digits.
///
/// Parsing is case-insensitive; the stored form is always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

impl OrderId {
    /// Creates an OrderId, validating the `ORD#####` format.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = id.as_ref().trim();
        if raw.is_empty() {
            return Err(ValidationError::empty_field("order_id"));
        }
        let upper = raw.to_ascii_uppercase();
        let valid = upper.len() == 8
            && upper.starts_with("ORD")
            && upper[3..].chars().all(|c| c.is_ascii_digit());
        if !valid {
            return Err(ValidationError::invalid_format(
                "order_id",
                "expected ORD followed by 5 digits",
            ));
        }
        Ok(Self(upper))
    }

    /// Builds the id for a numeric suffix (e.g. `10001` -> `ORD10001`).
    pub fn from_number(n: u32) -> Result<Self, ValidationError> {
        Self::new(format!("ORD{:05}", n))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for OrderId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sequence number of an entry in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(u64);

impl ActionId {
    /// Creates an ActionId from a sequence number.
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Returns the sequence number.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_generates_unique_values() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn order_id_accepts_valid_format() {
        let id = OrderId::new("ORD10001").unwrap();
        assert_eq!(id.as_str(), "ORD10001");
    }

    #[test]
    fn order_id_normalizes_case() {
        let id = OrderId::new("ord10071").unwrap();
        assert_eq!(id.to_string(), "ORD10071");
    }

    #[test]
    fn order_id_rejects_empty() {
        assert!(matches!(
            OrderId::new("  "),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn order_id_rejects_bad_formats() {
        for bad in ["ORD1234", "ORD123456", "ABC12345", "ORD12a45", "12345"] {
            assert!(
                matches!(OrderId::new(bad), Err(ValidationError::InvalidFormat { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn order_id_from_number_pads() {
        assert_eq!(OrderId::from_number(10260).unwrap().as_str(), "ORD10260");
        assert_eq!(OrderId::from_number(42).unwrap().as_str(), "ORD00042");
    }

    #[test]
    fn order_id_serializes_as_plain_string() {
        let id = OrderId::new("ORD10001").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ORD10001\"");
        let back: OrderId = serde_json::from_str("\"ord10001\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<OrderId>("\"nope\"").is_err());
    }

    #[test]
    fn action_id_displays_with_hash() {
        assert_eq!(ActionId::new(3).to_string(), "#3");
        assert_eq!(ActionId::new(3).value(), 3);
    }
}
