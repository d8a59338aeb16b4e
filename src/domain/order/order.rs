//! Order entity.
//!
//! An order is identified by its `OrderId`, carries the items purchased and a
//! set of lifecycle dates. Only the store's mutators change it after
//! construction (status, address, refund status).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::domain::foundation::{OrderId, ValidationError};

/// A single purchase record.
///
/// # Invariants
///
/// - `items` is non-empty (validated at construction) and never changes
/// - `order_id` never changes
/// - `image_url` is derived from `order_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_id: OrderId,
    status: OrderStatus,
    items: Vec<String>,
    customer_phone: String,
    customer_name: Option<String>,
    customer_email: Option<String>,
    address_line: String,
    order_date: Option<NaiveDate>,
    ship_date: Option<NaiveDate>,
    est_delivery_date: Option<NaiveDate>,
    delivered_date: Option<NaiveDate>,
    return_eligible_until: Option<NaiveDate>,
    courier: Option<String>,
    tracking_id: Option<String>,
    refund_status: Option<String>,
    return_status: Option<String>,
    payment_method: Option<String>,
    image_url: String,
}

impl Order {
    /// Creates an order with the required fields; dates and fulfillment
    /// details are attached with the `with_*` builders.
    pub fn new(
        order_id: OrderId,
        status: OrderStatus,
        items: Vec<String>,
        customer_phone: impl Into<String>,
        address_line: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let items: Vec<String> = items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        if items.is_empty() {
            return Err(ValidationError::empty_field("items"));
        }
        let image_url = image_url_for(&order_id);
        Ok(Self {
            order_id,
            status,
            items,
            customer_phone: customer_phone.into(),
            customer_name: None,
            customer_email: None,
            address_line: address_line.into(),
            order_date: None,
            ship_date: None,
            est_delivery_date: None,
            delivered_date: None,
            return_eligible_until: None,
            courier: None,
            tracking_id: None,
            refund_status: None,
            return_status: None,
            payment_method: None,
            image_url,
        })
    }

    pub fn with_order_date(mut self, date: NaiveDate) -> Self {
        self.order_date = Some(date);
        self
    }

    /// Attaches courier handover details.
    pub fn with_shipment(
        mut self,
        courier: impl Into<String>,
        tracking_id: impl Into<String>,
        ship_date: Option<NaiveDate>,
    ) -> Self {
        self.courier = Some(courier.into());
        self.tracking_id = Some(tracking_id.into());
        self.ship_date = ship_date;
        self
    }

    pub fn with_ship_date(mut self, date: NaiveDate) -> Self {
        self.ship_date = Some(date);
        self
    }

    pub fn with_est_delivery_date(mut self, date: NaiveDate) -> Self {
        self.est_delivery_date = Some(date);
        self
    }

    pub fn with_delivered_date(mut self, date: NaiveDate) -> Self {
        self.delivered_date = Some(date);
        self
    }

    pub fn with_return_eligible_until(mut self, date: NaiveDate) -> Self {
        self.return_eligible_until = Some(date);
        self
    }

    pub fn with_refund_status(mut self, status: impl Into<String>) -> Self {
        self.refund_status = Some(status.into());
        self
    }

    pub fn with_return_status(mut self, status: impl Into<String>) -> Self {
        self.return_status = Some(status.into());
        self
    }

    pub fn with_customer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Getters
    // ═══════════════════════════════════════════════════════════════════════

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// First item, used for item-scoped statistics and the card image.
    pub fn primary_item(&self) -> &str {
        // items is non-empty by construction
        self.items.first().map(String::as_str).unwrap_or_default()
    }

    pub fn customer_phone(&self) -> &str {
        &self.customer_phone
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_email.as_deref()
    }

    pub fn address_line(&self) -> &str {
        &self.address_line
    }

    pub fn order_date(&self) -> Option<NaiveDate> {
        self.order_date
    }

    pub fn ship_date(&self) -> Option<NaiveDate> {
        self.ship_date
    }

    pub fn est_delivery_date(&self) -> Option<NaiveDate> {
        self.est_delivery_date
    }

    pub fn delivered_date(&self) -> Option<NaiveDate> {
        self.delivered_date
    }

    pub fn return_eligible_until(&self) -> Option<NaiveDate> {
        self.return_eligible_until
    }

    pub fn courier(&self) -> Option<&str> {
        self.courier.as_deref()
    }

    pub fn tracking_id(&self) -> Option<&str> {
        self.tracking_id.as_deref()
    }

    pub fn refund_status(&self) -> Option<&str> {
        self.refund_status.as_deref()
    }

    pub fn return_status(&self) -> Option<&str> {
        self.return_status.as_deref()
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// True if any item contains `needle` (already lower-cased).
    pub(crate) fn has_item_matching(&self, needle_lower: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.to_lowercase().contains(needle_lower))
    }

    /// True if `item` is one of this order's items (exact match).
    pub fn contains_item(&self, item: &str) -> bool {
        self.items.iter().any(|it| it == item)
    }

    // Raw writes used by the store; eligibility is checked by the toolkit.

    pub(crate) fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    pub(crate) fn set_address(&mut self, address: impl Into<String>) {
        self.address_line = address.into();
    }

    pub(crate) fn set_refund_status(&mut self, status: impl Into<String>) {
        self.refund_status = Some(status.into());
    }
}

fn image_url_for(order_id: &OrderId) -> String {
    format!("https://picsum.photos/seed/{}/100/100", order_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> OrderId {
        OrderId::new(s).unwrap()
    }

    #[test]
    fn new_order_requires_items() {
        let result = Order::new(id("ORD10001"), OrderStatus::Processing, vec![], "9876543210", "MG Road");
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));

        let blank = Order::new(
            id("ORD10001"),
            OrderStatus::Processing,
            vec!["  ".to_string()],
            "9876543210",
            "MG Road",
        );
        assert!(blank.is_err());
    }

    #[test]
    fn image_url_is_deterministic_per_order() {
        let a = Order::new(id("ORD10001"), OrderStatus::Processing, vec!["Mouse".into()], "1", "x").unwrap();
        let b = Order::new(id("ORD10001"), OrderStatus::Shipped, vec!["Keyboard".into()], "2", "y").unwrap();
        assert_eq!(a.image_url(), b.image_url());
        assert!(a.image_url().contains("ORD10001"));
    }

    #[test]
    fn builders_populate_optional_fields() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let order = Order::new(id("ORD10002"), OrderStatus::Shipped, vec!["Power Bank".into()], "1", "x")
            .unwrap()
            .with_order_date(d)
            .with_shipment("Bluedart", "TRK123456", Some(d))
            .with_est_delivery_date(d)
            .with_customer("Aman", "aman12@gmail.com");

        assert_eq!(order.courier(), Some("Bluedart"));
        assert_eq!(order.tracking_id(), Some("TRK123456"));
        assert_eq!(order.ship_date(), Some(d));
        assert_eq!(order.customer_name(), Some("Aman"));
        assert_eq!(order.primary_item(), "Power Bank");
    }

    #[test]
    fn item_matching_is_case_insensitive_substring() {
        let order = Order::new(id("ORD10003"), OrderStatus::Delivered, vec!["Wireless Earbuds".into()], "1", "x")
            .unwrap();
        assert!(order.has_item_matching("earbud"));
        assert!(!order.has_item_matching("speaker"));
        assert!(order.contains_item("Wireless Earbuds"));
        assert!(!order.contains_item("wireless earbuds"));
    }
}
