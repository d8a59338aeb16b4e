//! Intent planner.
//!
//! Turns a user message into a [`Plan`]. With a model configured, the planner
//! prompt plus a small JSON payload is sent and the first JSON object in the
//! reply is parsed; anything the model leaves out is defaulted. Without a
//! model, or when the call fails, the keyword classifier drives a
//! deterministic plan.
//!
//! Either way the negated-cancel override is applied inside [`Plan`].

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::model::complete_text;
use super::prompts::{PLANNER_PROMPT, PLAN_TEMPERATURE};
use crate::domain::conversation::{
    IntentClassifier, KeywordIntentClassifier, Plan, RawPlan,
};
use crate::domain::foundation::{OrderId, SessionId};
use crate::ports::{AIProvider, CompletionPurpose};

/// Context sent alongside the user text.
#[derive(Debug, Serialize)]
struct PlannerPayload<'a> {
    user_text: &'a str,
    #[serde(rename = "ACTIVE_ORDER_ID")]
    active_order_id: &'a str,
    #[serde(rename = "HAS_ORDERS")]
    has_orders: bool,
}

/// Maps user text to a structured plan.
pub struct IntentPlanner {
    model: Option<Arc<dyn AIProvider>>,
    classifier: Arc<dyn IntentClassifier>,
}

impl IntentPlanner {
    pub fn new(model: Option<Arc<dyn AIProvider>>) -> Self {
        Self {
            model,
            classifier: Arc::new(KeywordIntentClassifier),
        }
    }

    /// Replaces the keyword classifier used for fallback intents.
    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Plans one turn.
    ///
    /// # Edge Cases
    /// - Model call fails: same as no model (keyword plan)
    /// - Reply has no parsable JSON object: every field defaulted, actions
    ///   `[general_chat]`
    pub async fn plan(
        &self,
        session_id: &SessionId,
        user_text: &str,
        active_order_id: Option<&OrderId>,
        has_orders: bool,
    ) -> Plan {
        let fallback_intent = self.classifier.classify(user_text);

        let Some(model) = &self.model else {
            return self.keyword_plan(user_text, active_order_id);
        };

        let payload = PlannerPayload {
            user_text,
            active_order_id: active_order_id.map(OrderId::as_str).unwrap_or(""),
            has_orders,
        };
        let payload = match serde_json::to_string(&payload) {
            Ok(json) => json,
            Err(e) => {
                debug!(error = %e, "planner payload serialization failed");
                return self.keyword_plan(user_text, active_order_id);
            }
        };

        let reply = match complete_text(
            model.as_ref(),
            session_id,
            CompletionPurpose::Plan,
            PLANNER_PROMPT,
            &payload,
            PLAN_TEMPERATURE,
        )
        .await
        {
            Ok(reply) => reply,
            Err(_) => return self.keyword_plan(user_text, active_order_id),
        };

        let raw = RawPlan::parse(&reply).unwrap_or_else(|e| {
            debug!(error = %e, "planner reply was not a plan");
            RawPlan::default()
        });
        let plan = Plan::from_raw(raw, user_text, fallback_intent, active_order_id);
        info!(
            intent = %plan.intent,
            actions = ?plan.action_names(),
            need_web = plan.need_web,
            "model plan"
        );
        plan
    }

    fn keyword_plan(&self, user_text: &str, active_order_id: Option<&OrderId>) -> Plan {
        let plan = Plan::fallback(user_text, self.classifier.classify(user_text), active_order_id);
        info!(intent = %plan.intent, actions = ?plan.action_names(), "keyword plan");
        plan
    }
}
