//! User intents and the keyword classifier used when no model is reachable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::negation::is_negated_cancel;
use super::plan::ActionTag;
use crate::domain::foundation::ValidationError;

/// What the user wants from this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Track,
    Cancel,
    StartReturn,
    RefundPolicyOrStatus,
    ChangeAddress,
    ListOrders,
    DelayReason,
    AvgTime,
    GeneralQuestion,
    KeepOrder,
}

impl Intent {
    pub const ALL: [Intent; 10] = [
        Intent::Track,
        Intent::Cancel,
        Intent::StartReturn,
        Intent::RefundPolicyOrStatus,
        Intent::ChangeAddress,
        Intent::ListOrders,
        Intent::DelayReason,
        Intent::AvgTime,
        Intent::GeneralQuestion,
        Intent::KeepOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Track => "track",
            Intent::Cancel => "cancel",
            Intent::StartReturn => "start_return",
            Intent::RefundPolicyOrStatus => "refund_policy_or_status",
            Intent::ChangeAddress => "change_address",
            Intent::ListOrders => "list_orders",
            Intent::DelayReason => "delay_reason",
            Intent::AvgTime => "avg_time",
            Intent::GeneralQuestion => "general_question",
            Intent::KeepOrder => "keep_order",
        }
    }

    /// Actions that serve this intent when planning without a model.
    pub fn default_actions(&self) -> Vec<ActionTag> {
        use ActionTag::*;
        match self {
            Intent::Track => vec![SetActiveFromText, TrackOrder],
            Intent::Cancel => vec![SetActiveFromText, CancelOrder],
            Intent::StartReturn => vec![SetActiveFromText, StartReturn],
            Intent::RefundPolicyOrStatus => vec![SetActiveFromText, PolicyAnswer],
            Intent::ChangeAddress => vec![SetActiveFromText, ChangeAddress],
            Intent::ListOrders => vec![ListOrders],
            Intent::DelayReason => vec![SetActiveFromText, ExplainDelay],
            Intent::AvgTime => vec![SetActiveFromText, ComputeAvg],
            Intent::GeneralQuestion => vec![GeneralChat],
            Intent::KeepOrder => vec![CancelOrder],
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == needle)
            .ok_or_else(|| ValidationError::invalid_format("intent", format!("unknown intent '{}'", s)))
    }
}

/// Classifies user text into an intent.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Intent;
}

/// Ordered keyword rules over lower-cased text; first match wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntentClassifier;

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, text: &str) -> Intent {
        let lowercase = text.to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| lowercase.contains(w));

        if is_negated_cancel(&lowercase) {
            return Intent::KeepOrder;
        }
        if has_any(&["where", "status", "track", "eta"]) {
            return Intent::Track;
        }
        if lowercase.contains("cancel") {
            return Intent::Cancel;
        }
        if lowercase.contains("return") && !lowercase.contains("status") {
            return Intent::StartReturn;
        }
        if lowercase.contains("refund") {
            return Intent::RefundPolicyOrStatus;
        }
        if lowercase.contains("address") {
            return Intent::ChangeAddress;
        }
        if lowercase.contains("orders") {
            return Intent::ListOrders;
        }
        if has_any(&["so much time", "so long", "taking so long", "delay"]) {
            return Intent::DelayReason;
        }
        if lowercase.contains("average") && lowercase.contains("time") {
            return Intent::AvgTime;
        }
        Intent::GeneralQuestion
    }
}
