//! Per-user session state.
//!
//! Everything that used to be ambient UI state lives here: the logged-in
//! phone, the active order and focused item, the pending confirmation, web
//! settings and the chat history. The assistant takes it by `&mut` each turn.

use serde::{Deserialize, Serialize};

use super::extractor::normalize_login_phone;
use super::intent::Intent;
use super::message::ChatMessage;
use super::pending::PendingConfirmation;
use super::research::{ResearchDepth, Source};
use crate::domain::foundation::{OrderId, SessionId, ValidationError};
use crate::domain::order::OrderStatus;

/// Bounds for the number of sources a web answer may cite.
pub const MIN_SOURCES: usize = 2;
pub const MAX_SOURCES: usize = 6;

/// What the order list is narrowed to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum SearchFilter {
    #[default]
    None,
    Id(OrderId),
    Item(String),
}

/// Web research preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSettings {
    pub enabled: bool,
    pub depth: ResearchDepth,
    pub max_sources: usize,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            depth: ResearchDepth::Normal,
            max_sources: 4,
        }
    }
}

impl WebSettings {
    /// Sets `max_sources`, clamped to the supported range.
    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = max_sources.clamp(MIN_SOURCES, MAX_SOURCES);
        self
    }
}

/// Session context for one logged-in user.
#[derive(Debug, Clone)]
pub struct SessionContext {
    id: SessionId,
    phone: String,
    active_order_id: Option<OrderId>,
    active_item: Option<String>,
    pending: Option<PendingConfirmation>,
    messages: Vec<ChatMessage>,
    last_intent: Option<Intent>,
    last_sources: Vec<Source>,
    search_filter: SearchFilter,
    status_filter: Option<OrderStatus>,
    web: WebSettings,
}

impl SessionContext {
    /// Logs in with any input containing exactly ten digits.
    pub fn login(input: &str) -> Result<Self, ValidationError> {
        let phone = normalize_login_phone(input).ok_or_else(|| {
            ValidationError::invalid_format("phone", "enter any 10-digit phone number")
        })?;
        Ok(Self::for_phone(phone))
    }

    /// Session for an already-normalized phone number.
    pub fn for_phone(phone: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            phone: phone.into(),
            active_order_id: None,
            active_item: None,
            pending: None,
            messages: Vec::new(),
            last_intent: None,
            last_sources: Vec::new(),
            search_filter: SearchFilter::None,
            status_filter: None,
            web: WebSettings::default(),
        }
    }

    pub fn with_web_settings(mut self, web: WebSettings) -> Self {
        self.web = web;
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Getters
    // ═══════════════════════════════════════════════════════════════════════

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn active_order_id(&self) -> Option<&OrderId> {
        self.active_order_id.as_ref()
    }

    pub fn active_item(&self) -> Option<&str> {
        self.active_item.as_deref()
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_intent(&self) -> Option<Intent> {
        self.last_intent
    }

    pub fn last_sources(&self) -> &[Source] {
        &self.last_sources
    }

    pub fn search_filter(&self) -> &SearchFilter {
        &self.search_filter
    }

    pub fn status_filter(&self) -> Option<OrderStatus> {
        self.status_filter
    }

    pub fn web(&self) -> &WebSettings {
        &self.web
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Mutations
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_active_order(&mut self, id: Option<OrderId>) {
        self.active_order_id = id;
    }

    pub fn set_active_item(&mut self, item: Option<String>) {
        self.active_item = item;
    }

    /// Replaces any earlier proposal.
    pub fn propose(&mut self, pending: PendingConfirmation) {
        self.pending = Some(pending);
    }

    pub fn take_pending(&mut self) -> Option<PendingConfirmation> {
        self.pending.take()
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn record_turn(&mut self, intent: Intent, sources: Vec<Source>) {
        self.last_intent = Some(intent);
        self.last_sources = sources;
    }

    pub fn set_search_filter(&mut self, filter: SearchFilter) {
        self.search_filter = filter;
    }

    pub fn set_status_filter(&mut self, status: Option<OrderStatus>) {
        self.status_filter = status;
    }

    /// Drops the search filter and focused item.
    pub fn clear_search(&mut self) {
        self.search_filter = SearchFilter::None;
        self.active_item = None;
    }

    pub fn set_web_enabled(&mut self, enabled: bool) {
        self.web.enabled = enabled;
    }

    pub fn set_depth(&mut self, depth: ResearchDepth) {
        self.web.depth = depth;
    }

    pub fn set_max_sources(&mut self, max_sources: usize) {
        self.web = self.web.with_max_sources(max_sources);
    }

    /// The last `n` messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}
