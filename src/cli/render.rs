//! Plain-text rendering of orders, pending actions and the undo banner.

use chrono::NaiveDate;

use crate::application::Suggestions;
use crate::domain::conversation::{PendingConfirmation, Source};
use crate::domain::order::{LastActionInfo, Order, OrderStatus};

const MISSING: &str = "—";

/// Bracketed status label, e.g. `[Out for Delivery]`.
pub fn status_pill(status: OrderStatus) -> String {
    format!("[{}]", status.label())
}

fn date(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| MISSING.to_string(), |d| d.to_string())
}

/// Multi-line order card. The active order gets a `*` marker and the focused
/// item is wrapped in `**`.
pub fn order_card(order: &Order, highlight: bool, focused_item: Option<&str>) -> String {
    let items = order
        .items()
        .iter()
        .map(|it| match focused_item {
            Some(focus) if focus == it => format!("**{}**", it),
            _ => it.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let marker = if highlight { "* " } else { "  " };
    [
        format!("{}{} {}", marker, order.order_id(), status_pill(order.status())),
        format!("    Items:     {}", items),
        format!(
            "    Courier:   {}  Tracking: {}",
            order.courier().unwrap_or(MISSING),
            order.tracking_id().unwrap_or(MISSING)
        ),
        format!(
            "    ETA:       {}  Shipped: {}  Delivered: {}",
            date(order.est_delivery_date()),
            date(order.ship_date()),
            date(order.delivered_date())
        ),
        format!("    Return by: {}", date(order.return_eligible_until())),
        format!("    Address:   {}", order.address_line()),
    ]
    .join("\n")
}

/// One line per order: id, status, items.
pub fn order_line(order: &Order, highlight: bool) -> String {
    format!(
        "{}{}  {}  {}",
        if highlight { "* " } else { "  " },
        order.order_id(),
        status_pill(order.status()),
        order.items().join(", ")
    )
}

/// One-line reminder shown under a reply while an action awaits approval.
pub fn pending_notice(pending: &PendingConfirmation) -> String {
    format!(
        "Pending: {} on {}. /confirm to proceed, /dismiss to drop it.",
        pending.kind, pending.order_id
    )
}

pub fn undo_banner(info: &LastActionInfo) -> String {
    format!(
        "Last action: {} on {}. /undo available for {}s.",
        info.kind, info.order_id, info.remaining_secs
    )
}

pub fn sources(sources: &[Source]) -> String {
    if sources.is_empty() {
        return "No sources from the last web answer.".to_string();
    }
    sources
        .iter()
        .map(Source::citation)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn suggestions(s: &Suggestions) -> String {
    let ids = s
        .order_ids
        .iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let items = s.item_names.join(", ");
    format!(
        "Order IDs: {}\nItems:     {}",
        if ids.is_empty() { MISSING } else { ids.as_str() },
        if items.is_empty() { MISSING } else { items.as_str() }
    )
}
