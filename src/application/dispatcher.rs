//! Action dispatcher.
//!
//! Runs a plan's actions in order against the store, threading the working
//! target order id and the accumulated results. Destructive actions never
//! touch the store here: they only raise a [`PendingConfirmation`] on the
//! session, which the assistant later confirms or dismisses.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use super::model::complete_text;
use super::prompts::{CHAT_PROMPT, CHAT_TEMPERATURE};
use crate::domain::conversation::{
    extract_order_id, ActionTag, Intent, PendingConfirmation, Plan, SessionContext, Source,
};
use crate::domain::foundation::OrderId;
use crate::domain::order::{policy_answer, ActionToolkit, DeliveryAnalytics, OrderStatus, OrderStore};
use crate::ports::{AIProvider, CompletionPurpose, WebResearcher};

const GREETING: &str = "Hi! I’m here to help with your orders and questions.";
const KEEP_ORDER: &str = "Understood — I’ll keep your order as is. No cancellation.";
const WEB_DISABLED: &str = "Internet is disabled. Turn it on with /web on.";
const NO_ORDERS: &str = "I don’t see any orders on this login yet. If you placed orders with another number, tell me that number and I’ll look it up.";
const ORDERS_LISTED: usize = 5;

/// Everything a turn produced, ready for the composer.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// Plan intent, or `keep_order` when a cancel was declined.
    pub intent: Intent,
    pub local_result: Option<String>,
    pub web_result: Option<String>,
    pub sources: Vec<Source>,
    /// The order the turn was about, if any action resolved one.
    pub context_order_id: Option<OrderId>,
}

/// Whether the action loop keeps going.
enum Flow {
    Continue,
    Stop,
}

struct TurnState {
    target: Option<OrderId>,
    outcome: DispatchOutcome,
}

impl TurnState {
    fn local(&mut self, text: impl Into<String>) {
        self.outcome.local_result = Some(text.into());
    }

    fn focus(&mut self, id: &OrderId) {
        self.outcome.context_order_id = Some(id.clone());
    }
}

/// Executes plans.
pub struct ActionDispatcher {
    model: Option<Arc<dyn AIProvider>>,
    researcher: Arc<dyn WebResearcher>,
    fallback_phone: String,
}

impl ActionDispatcher {
    pub fn new(
        model: Option<Arc<dyn AIProvider>>,
        researcher: Arc<dyn WebResearcher>,
        fallback_phone: impl Into<String>,
    ) -> Self {
        Self {
            model,
            researcher,
            fallback_phone: fallback_phone.into(),
        }
    }

    /// Runs every action of `plan`, stopping early only when tracking has no
    /// order to report on.
    pub async fn dispatch(
        &self,
        plan: &Plan,
        user_text: &str,
        store: &OrderStore,
        session: &mut SessionContext,
        today: NaiveDate,
    ) -> DispatchOutcome {
        let mut turn = TurnState {
            target: plan
                .target_order_id
                .clone()
                .or_else(|| session.active_order_id().cloned()),
            outcome: DispatchOutcome {
                intent: plan.intent,
                local_result: None,
                web_result: None,
                sources: Vec::new(),
                context_order_id: None,
            },
        };

        for action in &plan.actions {
            debug!(action = %action, target = ?turn.target, "dispatching");
            let flow = match action {
                ActionTag::SetActiveFromText => {
                    self.set_active_from_text(&mut turn, user_text, store, session)
                }
                ActionTag::TrackOrder => self.track_order(&mut turn, store),
                ActionTag::CancelOrder => self.cancel_order(&mut turn, plan, store, session),
                ActionTag::StartReturn => self.start_return(&mut turn, store, session),
                ActionTag::ChangeAddress => self.change_address(&mut turn, plan, store, session),
                ActionTag::ListOrders => self.list_orders(&mut turn, store, session),
                ActionTag::ExplainDelay => self.explain_delay(&mut turn, store, today),
                ActionTag::ComputeAvg => self.compute_avg(&mut turn, plan, store),
                ActionTag::PolicyAnswer => self.policy_answer(&mut turn, user_text, store),
                ActionTag::WebResearch => self.web_research(&mut turn, plan, user_text, session).await,
                ActionTag::GeneralChat => self.general_chat(&mut turn, user_text, session).await,
            };
            if let Flow::Stop = flow {
                break;
            }
        }

        info!(
            intent = %turn.outcome.intent,
            has_local = turn.outcome.local_result.is_some(),
            has_web = turn.outcome.web_result.is_some(),
            pending = session.pending().is_some(),
            "dispatch complete"
        );
        turn.outcome
    }

    fn set_active_from_text(
        &self,
        turn: &mut TurnState,
        user_text: &str,
        store: &OrderStore,
        session: &mut SessionContext,
    ) -> Flow {
        if let Some(id) = extract_order_id(user_text).filter(|id| store.get_order(id).is_some()) {
            session.set_active_order(Some(id.clone()));
            turn.target = Some(id);
        }
        Flow::Continue
    }

    fn track_order(&self, turn: &mut TurnState, store: &OrderStore) -> Flow {
        let Some(id) = turn.target.clone() else {
            turn.local("Share your order ID (e.g., ORD10015) or pick one with /active.");
            return Flow::Stop;
        };
        let order = match ActionToolkit::lookup_order(store, &id) {
            Ok(order) => order,
            Err(e) => {
                turn.local(e.to_string());
                return Flow::Stop;
            }
        };
        turn.focus(&id);

        let status = order.status();
        let extra = match status {
            OrderStatus::Shipped | OrderStatus::OutForDelivery => {
                match (order.est_delivery_date(), order.courier()) {
                    (Some(eta), Some(courier)) => format!(
                        " ETA **{}** via {}, tracking **{}**.",
                        eta,
                        courier,
                        order.tracking_id().unwrap_or("—")
                    ),
                    _ => String::new(),
                }
            }
            OrderStatus::Delivered => match order.delivered_date() {
                Some(date) => format!(" Delivered on **{}**.", date),
                None => String::new(),
            },
            OrderStatus::Processing => " Being prepared for shipment.".to_string(),
            _ => String::new(),
        };
        turn.local(format!("**{}** status: **{}**.{}", id, status, extra));
        Flow::Continue
    }

    fn cancel_order(
        &self,
        turn: &mut TurnState,
        plan: &Plan,
        store: &OrderStore,
        session: &mut SessionContext,
    ) -> Flow {
        if plan.intent == Intent::KeepOrder {
            turn.outcome.intent = Intent::KeepOrder;
            turn.local(KEEP_ORDER);
            return Flow::Continue;
        }
        let Some(id) = turn.target.clone() else {
            turn.local("Which order should I cancel? (e.g., ORD10015)");
            return Flow::Continue;
        };
        if let Err(e) = ActionToolkit::lookup_order(store, &id) {
            turn.local(e.to_string());
            return Flow::Continue;
        }
        turn.focus(&id);
        session.propose(PendingConfirmation::cancel(id.clone()));
        turn.local(format!(
            "Please confirm: cancel **{}**? (Reply /confirm or /dismiss.)",
            id
        ));
        Flow::Continue
    }

    fn start_return(
        &self,
        turn: &mut TurnState,
        store: &OrderStore,
        session: &mut SessionContext,
    ) -> Flow {
        let Some(id) = turn.target.clone() else {
            turn.local("Share the order ID to start a return.");
            return Flow::Continue;
        };
        if let Err(e) = ActionToolkit::lookup_order(store, &id) {
            turn.local(e.to_string());
            return Flow::Continue;
        }
        turn.focus(&id);
        session.propose(PendingConfirmation::start_return(id.clone()));
        turn.local(format!(
            "Please confirm: start a **return** for **{}**? (Reply /confirm or /dismiss.)",
            id
        ));
        Flow::Continue
    }

    fn change_address(
        &self,
        turn: &mut TurnState,
        plan: &Plan,
        store: &OrderStore,
        session: &mut SessionContext,
    ) -> Flow {
        let Some(id) = turn.target.clone() else {
            turn.local(
                "Which order should I update the address for? Include the ID or pick one with /active.",
            );
            return Flow::Continue;
        };
        let Some(address) = plan.address_text.as_deref() else {
            turn.local(
                "Tell me the new address like: 'change address for ORD10015 to 12 Park Lane, Mumbai'",
            );
            return Flow::Continue;
        };
        if let Err(e) = ActionToolkit::lookup_order(store, &id) {
            turn.local(e.to_string());
            return Flow::Continue;
        }
        turn.focus(&id);
        session.propose(PendingConfirmation::change_address(id.clone(), address));
        turn.local(format!(
            "Please confirm: update **{}** address to:\n\n> {}\n\n(Reply /confirm or /dismiss.)",
            id, address
        ));
        Flow::Continue
    }

    fn list_orders(
        &self,
        turn: &mut TurnState,
        store: &OrderStore,
        session: &mut SessionContext,
    ) -> Flow {
        let mut orders = ActionToolkit::orders_for_session(store, session.phone(), &self.fallback_phone);
        if orders.is_empty() {
            turn.local(NO_ORDERS);
            return Flow::Continue;
        }
        orders.sort_by(|a, b| b.order_date().cmp(&a.order_date()));

        let top = orders[0].order_id().clone();
        session.set_active_order(Some(top.clone()));
        turn.target = Some(top.clone());
        turn.focus(&top);

        let lines = orders
            .iter()
            .take(ORDERS_LISTED)
            .map(|o| format!("- `{}` • {} • {}", o.order_id(), o.status(), o.items().join(", ")))
            .collect::<Vec<_>>()
            .join("\n");
        turn.local(format!(
            "I found **{}** orders on your account. I’ve set your most recent order **{}** as active.\n\nHere are a few recent ones:\n{}",
            orders.len(),
            top,
            lines
        ));
        Flow::Continue
    }

    fn explain_delay(&self, turn: &mut TurnState, store: &OrderStore, today: NaiveDate) -> Flow {
        let Some(id) = turn.target.clone() else {
            turn.local("Which order are you referring to? Set an active order or share its ID.");
            return Flow::Continue;
        };
        match ActionToolkit::lookup_order(store, &id) {
            Ok(order) => {
                turn.focus(&id);
                turn.local(DeliveryAnalytics::explain_delay(store, order, today));
            }
            Err(e) => turn.local(e.to_string()),
        }
        Flow::Continue
    }

    fn compute_avg(&self, turn: &mut TurnState, plan: &Plan, store: &OrderStore) -> Flow {
        let order = turn.target.as_ref().and_then(|id| store.get_order(id));
        let item = plan
            .item_name
            .clone()
            .or_else(|| order.map(|o| o.primary_item().to_string()));

        let scoped = item.as_deref().and_then(|it| {
            DeliveryAnalytics::average_delivery_days(store, Some(it), None).map(|avg| (it, avg))
        });
        let (scope, avg) = match scoped {
            Some((it, avg)) => (format!("for **{}**", it), avg),
            None => match DeliveryAnalytics::average_delivery_days(store, None, None) {
                Some(avg) => ("overall".to_string(), avg),
                None => return Flow::Continue,
            },
        };

        if let Some(order) = order {
            let id = order.order_id().clone();
            turn.focus(&id);
        }
        turn.local(format!(
            "Average delivery time {} in your dataset is about **{:.1} days** (n={}).",
            scope, avg.days, avg.samples
        ));
        Flow::Continue
    }

    fn policy_answer(&self, turn: &mut TurnState, user_text: &str, store: &OrderStore) -> Flow {
        let mut answer = policy_answer(user_text);
        if let Some(order) = turn.target.as_ref().and_then(|id| store.get_order(id)) {
            let id = order.order_id().clone();
            if let Some(refund) = order.refund_status() {
                answer.push_str(&format!(" Refund status for **{}**: **{}**.", id, refund));
            }
            turn.focus(&id);
        }
        turn.local(answer);
        Flow::Continue
    }

    async fn web_research(
        &self,
        turn: &mut TurnState,
        plan: &Plan,
        user_text: &str,
        session: &SessionContext,
    ) -> Flow {
        let web = session.web();
        if !web.enabled {
            turn.outcome.web_result = Some(WEB_DISABLED.to_string());
            return Flow::Continue;
        }
        let query = plan
            .web_queries
            .first()
            .map(String::as_str)
            .unwrap_or(user_text);
        let answer = self
            .researcher
            .research(session.id(), query, web.depth, web.max_sources)
            .await;
        turn.outcome.web_result = Some(answer.answer);
        turn.outcome.sources = answer.sources;
        Flow::Continue
    }

    async fn general_chat(
        &self,
        turn: &mut TurnState,
        user_text: &str,
        session: &SessionContext,
    ) -> Flow {
        if turn.outcome.web_result.is_some() {
            return Flow::Continue;
        }
        let reply = match &self.model {
            Some(model) => complete_text(
                model.as_ref(),
                session.id(),
                CompletionPurpose::Chat,
                CHAT_PROMPT,
                user_text,
                CHAT_TEMPERATURE,
            )
            .await
            .map(|reply| if reply.is_empty() { "Hi!".to_string() } else { reply })
            .unwrap_or_else(|_| GREETING.to_string()),
            None => GREETING.to_string(),
        };
        turn.outcome.web_result = Some(reply);
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::search::MockSearchProvider;
    use crate::application::research::SynthesizingResearcher;
    use crate::domain::conversation::{KeywordIntentClassifier, IntentClassifier};
    use crate::domain::order::{ActionKind, Order};
    use chrono::Duration;

    const PHONE: &str = "9876543210";

    fn oid(s: &str) -> OrderId {
        OrderId::new(s).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
    }

    fn order(id: &str, status: OrderStatus, item: &str, placed_days_ago: i64) -> Order {
        Order::new(oid(id), status, vec![item.to_string()], PHONE, "12 Park Lane, Mumbai")
            .unwrap()
            .with_order_date(today() - Duration::days(placed_days_ago))
    }

    fn store() -> OrderStore {
        OrderStore::with_orders(vec![
            order("ORD10001", OrderStatus::Processing, "USB-C Cable", 1),
            order("ORD10002", OrderStatus::Shipped, "Power Bank", 4).with_shipment(
                "Bluedart",
                "BD123456",
                Some(today() - Duration::days(3)),
            )
            .with_est_delivery_date(today() + Duration::days(2)),
            order("ORD10003", OrderStatus::Delivered, "Wireless Earbuds", 12)
                .with_shipment("Delhivery", "DL999", Some(today() - Duration::days(10)))
                .with_delivered_date(today() - Duration::days(6))
                .with_refund_status("Not Applicable"),
        ])
        .unwrap()
    }

    fn dispatcher() -> ActionDispatcher {
        let researcher = SynthesizingResearcher::new(
            Arc::new(MockSearchProvider::new().with_hit("Guide", "https://g.example", "Two to four days.")),
            None,
        );
        ActionDispatcher::new(None, Arc::new(researcher), PHONE)
    }

    fn plan_for(text: &str, active: Option<&OrderId>) -> Plan {
        Plan::fallback(text, KeywordIntentClassifier.classify(text), active)
    }

    async fn run(text: &str, session: &mut SessionContext) -> DispatchOutcome {
        let plan = plan_for(text, session.active_order_id());
        dispatcher().dispatch(&plan, text, &store(), session, today()).await
    }

    #[tokio::test]
    async fn track_adopts_id_from_text() {
        let mut session = SessionContext::for_phone(PHONE);
        let outcome = run("where is ORD10002?", &mut session).await;

        assert_eq!(
            outcome.local_result.as_deref(),
            Some("**ORD10002** status: **Shipped**. ETA **2024-06-22** via Bluedart, tracking **BD123456**.")
        );
        assert_eq!(session.active_order_id(), Some(&oid("ORD10002")));
        assert_eq!(outcome.context_order_id, Some(oid("ORD10002")));
    }

    #[tokio::test]
    async fn track_without_any_order_asks_for_one() {
        let mut session = SessionContext::for_phone(PHONE);
        let outcome = run("track my package", &mut session).await;

        assert!(outcome.local_result.unwrap().starts_with("Share your order ID"));
    }

    #[tokio::test]
    async fn track_unknown_target_stops() {
        let mut session = SessionContext::for_phone(PHONE);
        let plan = Plan {
            target_order_id: Some(oid("ORD99999")),
            ..plan_for("track it", None)
        };
        let outcome = dispatcher()
            .dispatch(&plan, "track it", &store(), &mut session, today())
            .await;

        assert_eq!(outcome.local_result.as_deref(), Some("I couldn't find ORD99999."));
    }

    #[tokio::test]
    async fn cancel_only_raises_pending() {
        let store = store();
        let mut session = SessionContext::for_phone(PHONE);
        let plan = plan_for("cancel ORD10001", None);
        let outcome = dispatcher()
            .dispatch(&plan, "cancel ORD10001", &store, &mut session, today())
            .await;

        assert!(outcome.local_result.unwrap().starts_with("Please confirm: cancel **ORD10001**?"));
        let pending = session.pending().unwrap();
        assert_eq!(pending.kind, ActionKind::Cancel);
        assert_eq!(pending.order_id, oid("ORD10001"));
        assert_eq!(store.get_order(&oid("ORD10001")).unwrap().status(), OrderStatus::Processing);
    }

    #[tokio::test]
    async fn negated_cancel_keeps_order_and_raises_nothing() {
        let mut session = SessionContext::for_phone(PHONE);
        session.set_active_order(Some(oid("ORD10001")));
        let outcome = run("no need to cancel, I want the order", &mut session).await;

        assert_eq!(outcome.intent, Intent::KeepOrder);
        assert_eq!(outcome.local_result.as_deref(), Some(KEEP_ORDER));
        assert_eq!(outcome.web_result.as_deref(), Some(GREETING));
        assert!(session.pending().is_none());
    }

    #[tokio::test]
    async fn cancel_without_target_asks_which() {
        let mut session = SessionContext::for_phone(PHONE);
        let outcome = run("cancel it", &mut session).await;
        assert_eq!(
            outcome.local_result.as_deref(),
            Some("Which order should I cancel? (e.g., ORD10015)")
        );
        assert!(session.pending().is_none());
    }

    #[tokio::test]
    async fn change_address_carries_parsed_address() {
        let mut session = SessionContext::for_phone(PHONE);
        let outcome = run("change address for ORD10001 to 4 Lake View, Pune", &mut session).await;

        assert!(outcome.local_result.unwrap().contains("> 4 Lake View, Pune"));
        assert_eq!(
            session.pending().unwrap().address.as_deref(),
            Some("4 Lake View, Pune")
        );
    }

    #[tokio::test]
    async fn change_address_without_address_explains_format() {
        let mut session = SessionContext::for_phone(PHONE);
        session.set_active_order(Some(oid("ORD10001")));
        let outcome = run("update my address please", &mut session).await;

        assert!(outcome.local_result.unwrap().starts_with("Tell me the new address"));
        assert!(session.pending().is_none());
    }

    #[tokio::test]
    async fn start_return_raises_pending() {
        let mut session = SessionContext::for_phone(PHONE);
        let outcome = run("I want to return ORD10003", &mut session).await;

        assert!(outcome.local_result.unwrap().contains("start a **return** for **ORD10003**"));
        assert_eq!(session.pending().unwrap().kind, ActionKind::StartReturn);
    }

    #[tokio::test]
    async fn list_orders_sets_most_recent_active() {
        let mut session = SessionContext::for_phone("1112223334");
        let outcome = run("show my orders", &mut session).await;

        let text = outcome.local_result.unwrap();
        assert!(text.starts_with("I found **3** orders"));
        assert!(text.contains("- `ORD10001` • Processing • USB-C Cable"));
        assert_eq!(session.active_order_id(), Some(&oid("ORD10001")));
    }

    #[tokio::test]
    async fn list_orders_on_empty_store() {
        let mut session = SessionContext::for_phone(PHONE);
        let plan = plan_for("show my orders", None);
        let outcome = dispatcher()
            .dispatch(&plan, "show my orders", &OrderStore::new(), &mut session, today())
            .await;
        assert_eq!(outcome.local_result.as_deref(), Some(NO_ORDERS));
    }

    #[tokio::test]
    async fn compute_avg_scopes_to_item_when_data_exists() {
        let mut session = SessionContext::for_phone(PHONE);
        session.set_active_order(Some(oid("ORD10003")));
        let outcome = run("average delivery time?", &mut session).await;

        assert_eq!(
            outcome.local_result.as_deref(),
            Some("Average delivery time for **Wireless Earbuds** in your dataset is about **4.0 days** (n=1).")
        );
    }

    #[tokio::test]
    async fn compute_avg_falls_back_to_overall() {
        let mut session = SessionContext::for_phone(PHONE);
        session.set_active_order(Some(oid("ORD10001")));
        let outcome = run("average delivery time?", &mut session).await;

        assert!(outcome.local_result.unwrap().contains("overall"));
    }

    #[tokio::test]
    async fn explain_delay_without_target() {
        let mut session = SessionContext::for_phone(PHONE);
        let outcome = run("why is it taking so long", &mut session).await;
        assert!(outcome.local_result.unwrap().starts_with("Which order are you referring to?"));
    }

    #[tokio::test]
    async fn policy_answer_includes_refund_status() {
        let mut session = SessionContext::for_phone(PHONE);
        session.set_active_order(Some(oid("ORD10003")));
        let outcome = run("when will my refund arrive", &mut session).await;

        assert!(outcome
            .local_result
            .unwrap()
            .ends_with("Refund status for **ORD10003**: **Not Applicable**."));
    }

    #[tokio::test]
    async fn web_research_respects_toggle() {
        let mut session = SessionContext::for_phone(PHONE);
        let plan = Plan {
            actions: vec![ActionTag::WebResearch, ActionTag::GeneralChat],
            ..plan_for("how long do couriers take", None)
        };

        let outcome = dispatcher()
            .dispatch(&plan, "how long do couriers take", &store(), &mut session, today())
            .await;
        assert_eq!(outcome.web_result.as_deref(), Some("Two to four days."));
        assert_eq!(outcome.sources.len(), 1);

        session.set_web_enabled(false);
        let outcome = dispatcher()
            .dispatch(&plan, "how long do couriers take", &store(), &mut session, today())
            .await;
        assert_eq!(outcome.web_result.as_deref(), Some(WEB_DISABLED));
        assert!(outcome.sources.is_empty());
    }

    #[tokio::test]
    async fn general_chat_uses_model_reply() {
        let mock = MockAIProvider::new().with_response("Happy to help!");
        let researcher = SynthesizingResearcher::new(Arc::new(MockSearchProvider::new()), None);
        let dispatcher = ActionDispatcher::new(Some(Arc::new(mock.clone())), Arc::new(researcher), PHONE);
        let mut session = SessionContext::for_phone(PHONE);

        let plan = plan_for("hello", None);
        let outcome = dispatcher
            .dispatch(&plan, "hello", &store(), &mut session, today())
            .await;

        assert_eq!(outcome.web_result.as_deref(), Some("Happy to help!"));
        assert_eq!(mock.call_purposes(), vec![CompletionPurpose::Chat]);
    }
}
