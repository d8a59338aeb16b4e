//! Store policy answers.

use serde::{Deserialize, Serialize};

/// Policy topics the assistant can answer without a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaqTopic {
    ReturnsWindow,
    RefundTimeline,
    NonReturnable,
    Cancellation,
    Packaging,
}

impl FaqTopic {
    pub const ALL: [FaqTopic; 5] = [
        FaqTopic::ReturnsWindow,
        FaqTopic::RefundTimeline,
        FaqTopic::NonReturnable,
        FaqTopic::Cancellation,
        FaqTopic::Packaging,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FaqTopic::ReturnsWindow => "returns_window",
            FaqTopic::RefundTimeline => "refund_timeline",
            FaqTopic::NonReturnable => "non_returnable",
            FaqTopic::Cancellation => "cancellation",
            FaqTopic::Packaging => "packaging",
        }
    }

    pub fn answer(&self) -> &'static str {
        match self {
            FaqTopic::ReturnsWindow => {
                "You can return most items within 10 days of delivery if unused and in original packaging."
            }
            FaqTopic::RefundTimeline => {
                "Refunds are processed in 3–5 business days after the item passes QC."
            }
            FaqTopic::NonReturnable => {
                "Innerwear, perishable goods, and gift cards are not returnable."
            }
            FaqTopic::Cancellation => "Orders can be cancelled only before they are shipped.",
            FaqTopic::Packaging => {
                "Keep the original box, all accessories, and invoice for a smooth return."
            }
        }
    }
}

const REFUND_ANSWER: &str = "Refunds typically complete in **3–5 business days** after pickup and QC. \
You’ll see the credit in your original payment method.";

const RETURN_ANSWER: &str = "Most items are returnable within **10 days** of delivery if unused and \
in original packaging. Some items may be non-returnable for hygiene/safety.";

const GENERIC_ANSWER: &str =
    "Ask me about refunds/returns/address changes or tracking any order.";

/// Picks the policy answer for a free-text question. Refund wins over return.
pub fn policy_answer(text: &str) -> String {
    let t = text.to_lowercase();
    if t.contains("refund") {
        return REFUND_ANSWER.to_string();
    }
    if t.contains("return") {
        return RETURN_ANSWER.to_string();
    }
    let topic = if t.contains("cancel") {
        Some(FaqTopic::Cancellation)
    } else if t.contains("packag") || t.contains("box") {
        Some(FaqTopic::Packaging)
    } else if t.contains("innerwear") || t.contains("gift card") || t.contains("perishable") {
        Some(FaqTopic::NonReturnable)
    } else {
        None
    };
    topic.map_or_else(|| GENERIC_ANSWER.to_string(), |t| t.answer().to_string())
}
