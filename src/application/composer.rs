//! Response composer.
//!
//! Merges the dispatcher's results into one reply. The model gets the full
//! bundle under a fixed style contract; without it (or when it fails) the
//! parts are stacked in a fixed order.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::model::complete_text;
use super::prompts::{COMPOSER_PROMPT, COMPOSE_TEMPERATURE, SYSTEM_PROMPT};
use crate::domain::conversation::{citation_block, Plan, Source};
use crate::domain::foundation::{OrderId, SessionId};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{AIProvider, CompletionPurpose};

const EMPTY_REPLY: &str = "I’m here to help.";

/// Order fields the model may quote; all empty when no order is in focus.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderContext {
    pub order_id: Option<OrderId>,
    pub status: Option<OrderStatus>,
    pub est_delivery_date: Option<NaiveDate>,
    pub courier: Option<String>,
    pub tracking_id: Option<String>,
    pub delivered_date: Option<NaiveDate>,
    pub return_eligible_until: Option<NaiveDate>,
    pub address_line: Option<String>,
    pub items: Option<Vec<String>>,
}

impl OrderContext {
    pub fn from_order(order: Option<&Order>) -> Self {
        let Some(order) = order else {
            return Self::default();
        };
        Self {
            order_id: Some(order.order_id().clone()),
            status: Some(order.status()),
            est_delivery_date: order.est_delivery_date(),
            courier: order.courier().map(str::to_string),
            tracking_id: order.tracking_id().map(str::to_string),
            delivered_date: order.delivered_date(),
            return_eligible_until: order.return_eligible_until(),
            address_line: Some(order.address_line().to_string()),
            items: Some(order.items().to_vec()),
        }
    }
}

/// Inputs for one composed reply.
#[derive(Debug, Clone, Copy)]
pub struct ComposeInput<'a> {
    pub user_text: &'a str,
    pub plan: &'a Plan,
    pub order_ctx: &'a OrderContext,
    pub local_result: Option<&'a str>,
    pub web_result: Option<&'a str>,
    pub sources: &'a [Source],
}

#[derive(Serialize)]
struct ComposeBundle<'a> {
    #[serde(rename = "USER_TEXT")]
    user_text: &'a str,
    #[serde(rename = "PLAN")]
    plan: &'a Plan,
    #[serde(rename = "ORDER_CTX")]
    order_ctx: &'a OrderContext,
    #[serde(rename = "LOCAL_RESULT")]
    local_result: Option<&'a str>,
    #[serde(rename = "WEB_RESULT")]
    web_result: Option<&'a str>,
    #[serde(rename = "SOURCES_TEXT")]
    sources_text: String,
}

/// Deterministic reply: local, web, clarifying question, sources.
pub fn fallback_compose(input: &ComposeInput<'_>) -> String {
    let mut parts: Vec<String> = [input.local_result, input.web_result]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if input.plan.ask_clarify {
        if let Some(question) = &input.plan.clarifying_question {
            parts.push(format!("Quick question: {}", question));
        }
    }
    let sources = citation_block(input.sources);
    if !sources.is_empty() {
        parts.push(format!("Sources:\n{}", sources));
    }

    if parts.is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        parts.join("\n\n")
    }
}

pub struct ResponseComposer {
    model: Option<Arc<dyn AIProvider>>,
}

impl ResponseComposer {
    pub fn new(model: Option<Arc<dyn AIProvider>>) -> Self {
        Self { model }
    }

    pub async fn compose(&self, session_id: &SessionId, input: &ComposeInput<'_>) -> String {
        let Some(model) = &self.model else {
            return fallback_compose(input);
        };

        let bundle = ComposeBundle {
            user_text: input.user_text,
            plan: input.plan,
            order_ctx: input.order_ctx,
            local_result: input.local_result,
            web_result: input.web_result,
            sources_text: citation_block(input.sources),
        };
        let payload = match serde_json::to_string(&bundle) {
            Ok(json) => json,
            Err(e) => {
                debug!(error = %e, "compose bundle serialization failed");
                return fallback_compose(input);
            }
        };

        let system = format!("{}\n{}", SYSTEM_PROMPT, COMPOSER_PROMPT);
        match complete_text(
            model.as_ref(),
            session_id,
            CompletionPurpose::Compose,
            &system,
            &payload,
            COMPOSE_TEMPERATURE,
        )
        .await
        {
            Ok(reply) if !reply.is_empty() => reply,
            _ => fallback_compose(input),
        }
    }
}
