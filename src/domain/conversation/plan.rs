//! The per-turn plan.
//!
//! A model reply is first deserialized into [`RawPlan`], whose fields are all
//! optional, and then turned into a fully populated [`Plan`] by
//! [`Plan::from_raw`]. The negated-cancel override is applied there, so every
//! plan that reaches the dispatcher has already been checked.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::extractor::{extract_json_object, extract_new_address, PlanParseError};
use super::intent::Intent;
use super::negation::is_negated_cancel;
use crate::domain::foundation::{OrderId, ValidationError};

/// A sub-action the dispatcher knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTag {
    SetActiveFromText,
    TrackOrder,
    CancelOrder,
    StartReturn,
    ChangeAddress,
    ListOrders,
    ExplainDelay,
    ComputeAvg,
    WebResearch,
    GeneralChat,
    PolicyAnswer,
}

impl ActionTag {
    pub const ALL: [ActionTag; 11] = [
        ActionTag::SetActiveFromText,
        ActionTag::TrackOrder,
        ActionTag::CancelOrder,
        ActionTag::StartReturn,
        ActionTag::ChangeAddress,
        ActionTag::ListOrders,
        ActionTag::ExplainDelay,
        ActionTag::ComputeAvg,
        ActionTag::WebResearch,
        ActionTag::GeneralChat,
        ActionTag::PolicyAnswer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTag::SetActiveFromText => "set_active_from_text",
            ActionTag::TrackOrder => "track_order",
            ActionTag::CancelOrder => "cancel_order",
            ActionTag::StartReturn => "start_return",
            ActionTag::ChangeAddress => "change_address",
            ActionTag::ListOrders => "list_orders",
            ActionTag::ExplainDelay => "explain_delay",
            ActionTag::ComputeAvg => "compute_avg",
            ActionTag::WebResearch => "web_research",
            ActionTag::GeneralChat => "general_chat",
            ActionTag::PolicyAnswer => "policy_answer",
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ActionTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == needle)
            .ok_or_else(|| ValidationError::invalid_format("action", format!("unknown action '{}'", s)))
    }
}

/// Plan fields exactly as a model emitted them; anything may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPlan {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub need_web: Option<bool>,
    #[serde(default)]
    pub target_order_id: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub address_text: Option<String>,
    #[serde(default)]
    pub ask_clarify: Option<bool>,
    #[serde(default)]
    pub clarifying_question: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<String>>,
    #[serde(default)]
    pub web_queries: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawPlan {
    /// Parses the first balanced JSON object in a model reply.
    pub fn parse(reply: &str) -> Result<Self, PlanParseError> {
        let json = extract_json_object(reply)?;
        serde_json::from_str(json).map_err(|e| PlanParseError::ParseError(e.to_string()))
    }
}

/// A fully populated per-turn plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub intent: Intent,
    pub need_web: bool,
    pub target_order_id: Option<OrderId>,
    pub item_name: Option<String>,
    pub address_text: Option<String>,
    pub ask_clarify: bool,
    pub clarifying_question: Option<String>,
    pub actions: Vec<ActionTag>,
    pub web_queries: Vec<String>,
    pub notes: String,
}

impl Plan {
    /// Fills every field a model left out and applies the keep-order override.
    ///
    /// Defaults: intent from `fallback_intent`, target from the active order,
    /// actions `[general_chat]`, notes `"ok"`. Unknown action names and
    /// malformed order ids are dropped.
    pub fn from_raw(
        raw: RawPlan,
        user_text: &str,
        fallback_intent: Intent,
        active_order_id: Option<&OrderId>,
    ) -> Self {
        let intent = raw
            .intent
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(fallback_intent);

        let target_order_id = raw
            .target_order_id
            .as_deref()
            .and_then(|s| OrderId::new(s).ok())
            .or_else(|| active_order_id.cloned());

        let actions = match raw.actions {
            Some(names) => names
                .iter()
                .filter_map(|name| match name.parse::<ActionTag>() {
                    Ok(tag) => Some(tag),
                    Err(_) => {
                        debug!(action = %name, "dropping unknown plan action");
                        None
                    }
                })
                .collect(),
            None => vec![ActionTag::GeneralChat],
        };

        let mut plan = Self {
            intent,
            need_web: raw.need_web.unwrap_or(false),
            target_order_id,
            item_name: non_empty(raw.item_name),
            address_text: non_empty(raw.address_text),
            ask_clarify: raw.ask_clarify.unwrap_or(false),
            clarifying_question: non_empty(raw.clarifying_question),
            actions,
            web_queries: raw
                .web_queries
                .unwrap_or_default()
                .into_iter()
                .filter(|q| !q.trim().is_empty())
                .collect(),
            notes: raw.notes.unwrap_or_else(|| "ok".to_string()),
        };
        plan.apply_keep_order_override(user_text);
        plan
    }

    /// Deterministic plan used when no model is available.
    pub fn fallback(user_text: &str, intent: Intent, active_order_id: Option<&OrderId>) -> Self {
        let address_text = match intent {
            Intent::ChangeAddress => extract_new_address(user_text),
            _ => None,
        };
        let mut plan = Self {
            intent,
            need_web: false,
            target_order_id: active_order_id.cloned(),
            item_name: None,
            address_text,
            ask_clarify: false,
            clarifying_question: None,
            actions: intent.default_actions(),
            web_queries: Vec::new(),
            notes: "fallback".to_string(),
        };
        plan.apply_keep_order_override(user_text);
        plan
    }

    /// A negated-cancel phrase forces `keep_order` and puts `general_chat`
    /// first in the action list.
    pub fn apply_keep_order_override(&mut self, user_text: &str) {
        if !is_negated_cancel(user_text) {
            return;
        }
        self.intent = Intent::KeepOrder;
        if !self.actions.contains(&ActionTag::GeneralChat) {
            self.actions.insert(0, ActionTag::GeneralChat);
        }
    }

    pub fn has_action(&self, tag: ActionTag) -> bool {
        self.actions.contains(&tag)
    }

    /// Action names as they appear on the wire.
    pub fn action_names(&self) -> Vec<&'static str> {
        self.actions.iter().map(ActionTag::as_str).collect()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active() -> OrderId {
        OrderId::new("ORD10015").unwrap()
    }

    #[test]
    fn empty_raw_plan_gets_every_default() {
        let plan = Plan::from_raw(RawPlan::default(), "hello", Intent::GeneralQuestion, Some(&active()));

        assert_eq!(plan.intent, Intent::GeneralQuestion);
        assert!(!plan.need_web);
        assert_eq!(plan.target_order_id, Some(active()));
        assert_eq!(plan.actions, vec![ActionTag::GeneralChat]);
        assert!(plan.web_queries.is_empty());
        assert_eq!(plan.notes, "ok");
        assert!(!plan.ask_clarify);
    }

    #[test]
    fn parses_model_reply_with_prose() {
        let reply = r#"Here you go:
{"intent": "track", "need_web": false, "target_order_id": "ord10020",
 "actions": ["set_active_from_text", "track_order", "teleport"], "notes": "user asks status"}"#;

        let raw = RawPlan::parse(reply).unwrap();
        let plan = Plan::from_raw(raw, "where is ORD10020", Intent::Track, Some(&active()));

        assert_eq!(plan.intent, Intent::Track);
        assert_eq!(plan.target_order_id.unwrap().as_str(), "ORD10020");
        assert_eq!(plan.actions, vec![ActionTag::SetActiveFromText, ActionTag::TrackOrder]);
        assert_eq!(plan.notes, "user asks status");
    }

    #[test]
    fn unknown_intent_falls_back() {
        let raw = RawPlan {
            intent: Some("buy_more".into()),
            ..RawPlan::default()
        };
        let plan = Plan::from_raw(raw, "hmm", Intent::ListOrders, None);
        assert_eq!(plan.intent, Intent::ListOrders);
    }

    #[test]
    fn negated_cancel_overrides_model_cancel() {
        let raw = RawPlan {
            intent: Some("cancel".into()),
            actions: Some(vec!["cancel_order".into()]),
            ..RawPlan::default()
        };

        let plan = Plan::from_raw(raw, "please don't cancel my order", Intent::Cancel, Some(&active()));

        assert_eq!(plan.intent, Intent::KeepOrder);
        assert_eq!(plan.actions, vec![ActionTag::GeneralChat, ActionTag::CancelOrder]);
    }

    #[test]
    fn override_does_not_duplicate_general_chat() {
        let raw = RawPlan {
            actions: Some(vec!["track_order".into(), "general_chat".into()]),
            ..RawPlan::default()
        };
        let plan = Plan::from_raw(raw, "no need to cancel", Intent::KeepOrder, None);
        assert_eq!(plan.actions, vec![ActionTag::TrackOrder, ActionTag::GeneralChat]);
    }

    #[test]
    fn null_like_strings_are_treated_as_absent() {
        let raw = RawPlan {
            target_order_id: Some("null".into()),
            address_text: Some("  ".into()),
            clarifying_question: Some("null".into()),
            ..RawPlan::default()
        };
        let plan = Plan::from_raw(raw, "x", Intent::GeneralQuestion, Some(&active()));
        assert_eq!(plan.target_order_id, Some(active()));
        assert!(plan.address_text.is_none());
        assert!(plan.clarifying_question.is_none());
    }

    #[test]
    fn fallback_plan_routes_intent_to_actions() {
        let plan = Plan::fallback("cancel it", Intent::Cancel, Some(&active()));
        assert_eq!(plan.actions, vec![ActionTag::SetActiveFromText, ActionTag::CancelOrder]);
        assert_eq!(plan.notes, "fallback");
    }

    #[test]
    fn fallback_plan_parses_new_address() {
        let text = "change address for ORD10015 to 12 Park Lane, Mumbai";
        let plan = Plan::fallback(text, Intent::ChangeAddress, None);
        assert_eq!(plan.address_text.as_deref(), Some("12 Park Lane, Mumbai"));
    }

    #[test]
    fn fallback_keep_order_runs_chat_then_cancel_handler() {
        let plan = Plan::fallback("do not cancel", Intent::KeepOrder, None);
        assert_eq!(plan.intent, Intent::KeepOrder);
        assert_eq!(plan.action_names(), vec!["general_chat", "cancel_order"]);
    }
}
