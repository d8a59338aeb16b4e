//! Assistant facade.
//!
//! Owns the order store and the pipeline stages, and exposes everything the
//! presentation layer needs: chat turns, confirm / dismiss / undo, search and
//! suggestions, order listing and the conversation summary. All operations
//! take the caller's [`SessionContext`] explicitly.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use super::composer::{ComposeInput, OrderContext, ResponseComposer};
use super::dispatcher::ActionDispatcher;
use super::model::complete_text;
use super::planner::IntentPlanner;
use super::prompts::{SUMMARY_PROMPT, SUMMARY_TEMPERATURE};
use crate::domain::conversation::{
    extract_order_id, ChatMessage, PendingConfirmation, SearchFilter, SessionContext,
};
use crate::domain::foundation::{today, OrderId};
use crate::domain::order::{
    ActionKind, ActionToolkit, LastActionInfo, Order, OrderStore, ToolkitError,
};
use crate::ports::{AIProvider, CompletionPurpose, WebResearcher};

const DISMISSED: &str = "Okay, I won’t proceed with that action.";
const SUMMARY_MESSAGES: usize = 10;
const SUGGESTION_LIMIT: usize = 5;

/// Knobs the facade reads from configuration.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    /// Phone whose orders a session without its own orders sees.
    pub fallback_phone: String,
    /// Append the plan audit to every reply.
    pub show_audit_trail: bool,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            fallback_phone: "9876543210".to_string(),
            show_audit_trail: true,
        }
    }
}

/// Result of the order search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// An order id matched exactly.
    Order(OrderId),
    /// An item keyword matched; the first hit is now active.
    Item { order_id: OrderId, item: Option<String> },
    /// Nothing matched.
    NotFound(String),
}

/// Suggestions shown while typing in the search box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    pub order_ids: Vec<OrderId>,
    pub item_names: Vec<String>,
}

pub struct Assistant {
    store: OrderStore,
    planner: IntentPlanner,
    dispatcher: ActionDispatcher,
    composer: ResponseComposer,
    model: Option<Arc<dyn AIProvider>>,
    settings: AssistantSettings,
}

impl Assistant {
    pub fn new(
        store: OrderStore,
        model: Option<Arc<dyn AIProvider>>,
        researcher: Arc<dyn WebResearcher>,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            store,
            planner: IntentPlanner::new(model.clone()),
            dispatcher: ActionDispatcher::new(
                model.clone(),
                researcher,
                settings.fallback_phone.clone(),
            ),
            composer: ResponseComposer::new(model.clone()),
            model,
            settings,
        }
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Chat
    // ═══════════════════════════════════════════════════════════════════════

    /// Runs one chat turn and returns the reply that was appended to history.
    pub async fn handle_turn(&self, session: &mut SessionContext, user_text: &str) -> String {
        self.handle_turn_on(session, user_text, today()).await
    }

    pub async fn handle_turn_on(
        &self,
        session: &mut SessionContext,
        user_text: &str,
        today: NaiveDate,
    ) -> String {
        session.push_message(ChatMessage::user(user_text));

        let has_orders = !self.session_orders(session).is_empty();
        let active = session.active_order_id().cloned();
        let plan = self
            .planner
            .plan(session.id(), user_text, active.as_ref(), has_orders)
            .await;

        let outcome = self
            .dispatcher
            .dispatch(&plan, user_text, &self.store, session, today)
            .await;

        let focus = outcome
            .context_order_id
            .as_ref()
            .or(session.active_order_id())
            .and_then(|id| self.store.get_order(id));
        let order_ctx = OrderContext::from_order(focus);

        let input = ComposeInput {
            user_text,
            plan: &plan,
            order_ctx: &order_ctx,
            local_result: outcome.local_result.as_deref(),
            web_result: outcome.web_result.as_deref(),
            sources: &outcome.sources,
        };
        let mut reply = self.composer.compose(session.id(), &input).await;

        if self.settings.show_audit_trail {
            reply.push_str(&audit_trail(plan.need_web, outcome.intent.as_str(), session));
        }

        session.push_message(ChatMessage::assistant(reply.clone()));
        session.record_turn(outcome.intent, outcome.sources);
        reply
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Confirm / dismiss / undo
    // ═══════════════════════════════════════════════════════════════════════

    /// Executes the pending action; `None` when nothing is pending.
    pub fn confirm_pending(&mut self, session: &mut SessionContext) -> Option<String> {
        self.confirm_pending_on(session, today())
    }

    pub fn confirm_pending_on(
        &mut self,
        session: &mut SessionContext,
        today: NaiveDate,
    ) -> Option<String> {
        let pending = session.take_pending()?;
        let result = self.execute(&pending, today);
        let text = result.unwrap_or_else(|e| e.to_string());
        info!(kind = %pending.kind, order_id = %pending.order_id, "pending action confirmed");
        session.push_message(ChatMessage::assistant(text.clone()));
        Some(text)
    }

    fn execute(&mut self, pending: &PendingConfirmation, today: NaiveDate) -> Result<String, ToolkitError> {
        match pending.kind {
            ActionKind::Cancel => ActionToolkit::cancel_order(&mut self.store, &pending.order_id),
            ActionKind::StartReturn => {
                ActionToolkit::start_return_on(&mut self.store, &pending.order_id, today)
            }
            ActionKind::ChangeAddress => match pending.address.as_deref() {
                Some(address) => {
                    ActionToolkit::change_address(&mut self.store, &pending.order_id, address)
                }
                None => Err(ToolkitError::Ineligible {
                    order_id: pending.order_id.clone(),
                    reason: "No new address was given.".to_string(),
                }),
            },
        }
    }

    /// Drops the pending action; `None` when nothing is pending.
    pub fn dismiss_pending(&mut self, session: &mut SessionContext) -> Option<String> {
        let pending = session.take_pending()?;
        info!(kind = %pending.kind, order_id = %pending.order_id, "pending action dismissed");
        session.push_message(ChatMessage::assistant(DISMISSED));
        Some(DISMISSED.to_string())
    }

    /// Reverts the most recent action if still inside the grace period.
    pub fn undo_last(&mut self, session: &mut SessionContext) -> String {
        let text = self
            .store
            .undo_last()
            .unwrap_or_else(|e| e.to_string());
        session.push_message(ChatMessage::assistant(text.clone()));
        text
    }

    /// Data for the "you can still undo" banner.
    pub fn undo_banner(&self) -> Option<LastActionInfo> {
        self.store.last_action_info().filter(|info| info.can_undo)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Orders, search and focus
    // ═══════════════════════════════════════════════════════════════════════

    pub fn session_orders(&self, session: &SessionContext) -> Vec<&Order> {
        ActionToolkit::orders_for_session(&self.store, session.phone(), &self.settings.fallback_phone)
    }

    /// Session orders narrowed by the search filter and the status filter.
    pub fn visible_orders(&self, session: &SessionContext) -> Vec<&Order> {
        self.session_orders(session)
            .into_iter()
            .filter(|o| match session.search_filter() {
                SearchFilter::None => true,
                SearchFilter::Id(id) => o.order_id() == id,
                SearchFilter::Item(item) => o.contains_item(item),
            })
            .filter(|o| session.status_filter().map_or(true, |s| o.status() == s))
            .collect()
    }

    /// Makes `id` the active order and focuses its first item.
    pub fn select_order(&self, session: &mut SessionContext, id: &OrderId) -> Result<(), ToolkitError> {
        let order = ActionToolkit::lookup_order(&self.store, id)?;
        session.set_active_order(Some(id.clone()));
        session.set_active_item(Some(order.primary_item().to_string()));
        Ok(())
    }

    /// Focuses one item of the active order; `None` clears the focus.
    ///
    /// Returns false if there is no active order or it lacks the item.
    pub fn focus_item(&self, session: &mut SessionContext, item: Option<&str>) -> bool {
        let Some(item) = item else {
            session.set_active_item(None);
            return true;
        };
        let found = session
            .active_order_id()
            .and_then(|id| self.store.get_order(id))
            .and_then(|o| o.items().iter().find(|it| it.eq_ignore_ascii_case(item)).cloned());
        match found {
            Some(item) => {
                session.set_active_item(Some(item));
                true
            }
            None => false,
        }
    }

    /// Resolves an order id or an item keyword from the search box.
    pub fn search(&self, session: &mut SessionContext, query: &str) -> SearchOutcome {
        let query = query.trim();

        if let Some(id) = extract_order_id(query) {
            if self.store.get_order(&id).is_none() {
                return SearchOutcome::NotFound(format!("No order found with ID {}.", id));
            }
            session.set_active_order(Some(id.clone()));
            session.set_active_item(None);
            session.set_search_filter(SearchFilter::Id(id.clone()));
            return SearchOutcome::Order(id);
        }

        let needle = query.to_lowercase();
        let mut hits: Vec<&Order> = self
            .session_orders(session)
            .into_iter()
            .filter(|o| o.items().iter().any(|it| it.to_lowercase().contains(&needle)))
            .collect();
        if hits.is_empty() {
            hits = ActionToolkit::search_items(&self.store, query);
        }

        let Some(first) = hits.first().filter(|_| !needle.is_empty()) else {
            session.set_active_item(None);
            session.set_search_filter(SearchFilter::None);
            return SearchOutcome::NotFound("No matching orders found.".to_string());
        };

        let order_id = first.order_id().clone();
        let best = first
            .items()
            .iter()
            .find(|it| it.to_lowercase().contains(&needle))
            .cloned();
        session.set_active_order(Some(order_id.clone()));
        session.set_active_item(best.clone());
        session.set_search_filter(SearchFilter::Item(
            best.clone().unwrap_or_else(|| query.to_string()),
        ));
        SearchOutcome::Item { order_id, item: best }
    }

    /// Order ids from this login, item names from the whole catalogue.
    pub fn suggestions(&self, session: &SessionContext, query: &str) -> Suggestions {
        let mut order_ids = ActionToolkit::suggest_order_ids(
            &self.store,
            query,
            Some(session.phone()),
            SUGGESTION_LIMIT,
        );
        if order_ids.is_empty() {
            let needle = query.trim().to_uppercase();
            order_ids = self
                .session_orders(session)
                .into_iter()
                .map(|o| o.order_id())
                .filter(|id| id.as_str().contains(&needle))
                .take(SUGGESTION_LIMIT)
                .cloned()
                .collect();
        }
        Suggestions {
            order_ids,
            item_names: ActionToolkit::suggest_item_names(&self.store, query, SUGGESTION_LIMIT),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Summary
    // ═══════════════════════════════════════════════════════════════════════

    /// Three-bullet summary of the last ten messages.
    pub async fn summarize(&self, session: &SessionContext) -> String {
        let fallback = || {
            format!(
                "- Active order: {}\n- Intent: {}\n- Next: continue assisting.",
                session
                    .active_order_id()
                    .map(OrderId::to_string)
                    .unwrap_or_else(|| "not set".to_string()),
                session
                    .last_intent()
                    .map(|i| i.as_str())
                    .unwrap_or("none yet"),
            )
        };
        let Some(model) = &self.model else {
            return fallback();
        };

        let transcript = session
            .recent_messages(SUMMARY_MESSAGES)
            .iter()
            .map(ChatMessage::transcript_line)
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!("{}\n\nSummarize the conversation in 3 bullets.", transcript);

        match complete_text(
            model.as_ref(),
            session.id(),
            CompletionPurpose::Summarize,
            SUMMARY_PROMPT,
            &prompt,
            SUMMARY_TEMPERATURE,
        )
        .await
        {
            Ok(summary) if !summary.is_empty() => summary,
            _ => fallback(),
        }
    }
}

fn audit_trail(need_web: bool, intent: &str, session: &SessionContext) -> String {
    let lines = [
        format!("Intent → {}", intent),
        format!("Need web → {}", need_web),
        format!(
            "Active OID → {}",
            session
                .active_order_id()
                .map(OrderId::as_str)
                .unwrap_or("(none)")
        ),
        format!("Focused item → {}", session.active_item().unwrap_or("(none)")),
        format!(
            "Pending → {}",
            session.pending().map(|p| p.kind.as_str()).unwrap_or("(none)")
        ),
    ];
    let body = lines
        .iter()
        .map(|l| format!("- {}", l))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n\n—\n_Audit:_\n{}", body)
}
