//! Interactive terminal front end.
//!
//! Reads lines from stdin. Lines starting with `/` are commands; anything
//! else is a chat turn. The session lives here, so the assistant itself stays
//! free of presentation state.

pub mod render;

use clap::Parser;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::application::{Assistant, SearchOutcome};
use crate::domain::conversation::{ResearchDepth, SessionContext, WebSettings};
use crate::domain::foundation::{OrderId, ValidationError};
use crate::domain::order::OrderStatus;

/// Command line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "order-copilot", about = "Order tracking support assistant")]
pub struct Args {
    /// Log in immediately with this phone number (any 10 digits)
    #[arg(long)]
    pub phone: Option<String>,

    /// Start with web research turned off
    #[arg(long)]
    pub no_web: bool,

    /// Web answer depth: brief, normal or deep
    #[arg(long)]
    pub depth: Option<ResearchDepth>,

    /// Sources cited per web answer (2-6)
    #[arg(long)]
    pub max_sources: Option<usize>,
}

const LOGIN_FIRST: &str = "Log in first with /login <10-digit phone>.";
const NOTHING_PENDING: &str = "Nothing is waiting for confirmation.";

pub const HELP: &str = "\
Commands:
  /login <phone>      log in with any 10-digit number
  /orders             list orders on this login
  /active <ORD#####>  set the active order
  /focus <item|none>  focus an item of the active order
  /filter <status|all> filter the order list by status
  /search <text>      find an order by id or item name
  /clear              clear the search filter
  /suggest <text>     suggest order ids and item names
  /confirm, /dismiss  resolve the pending action
  /undo               revert the last action (5 minute window)
  /summary            summarize the conversation
  /sources            sources of the last web answer
  /web on|off         toggle web research
  /depth <level>      brief, normal or deep
  /max-sources <n>    2 to 6
  /help, /quit
Anything else is sent to the assistant.";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Login(String),
    Orders,
    Active(OrderId),
    Focus(Option<String>),
    Filter(Option<OrderStatus>),
    Search(String),
    ClearSearch,
    Suggest(String),
    Confirm,
    Dismiss,
    Undo,
    Summary,
    Sources,
    Web(bool),
    Depth(ResearchDepth),
    MaxSources(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command /{0}. Type /help for the list.")]
    Unknown(String),

    #[error("/{command} needs {expected}.")]
    MissingArgument { command: &'static str, expected: &'static str },

    #[error("{0}")]
    InvalidArgument(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Chat(line.to_string()));
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let required = |command: &'static str, expected: &'static str| {
            if arg.is_empty() {
                Err(CommandError::MissingArgument { command, expected })
            } else {
                Ok(arg.to_string())
            }
        };

        let command = match name.to_lowercase().as_str() {
            "login" => Command::Login(required("login", "a phone number")?),
            "orders" => Command::Orders,
            "active" => {
                let raw = required("active", "an order id")?;
                let id = OrderId::new(&raw).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
                Command::Active(id)
            }
            "focus" => match arg {
                "" | "none" => Command::Focus(None),
                item => Command::Focus(Some(item.to_string())),
            },
            "filter" => match arg.to_lowercase().as_str() {
                "" | "all" => Command::Filter(None),
                _ => Command::Filter(Some(
                    arg.parse()
                        .map_err(|e: ValidationError| CommandError::InvalidArgument(e.to_string()))?,
                )),
            },
            "search" => Command::Search(required("search", "an order id or item name")?),
            "clear" => Command::ClearSearch,
            "suggest" => Command::Suggest(required("suggest", "some text")?),
            "confirm" => Command::Confirm,
            "dismiss" => Command::Dismiss,
            "undo" => Command::Undo,
            "summary" => Command::Summary,
            "sources" => Command::Sources,
            "web" => match arg.to_lowercase().as_str() {
                "on" => Command::Web(true),
                "off" => Command::Web(false),
                _ => {
                    return Err(CommandError::MissingArgument {
                        command: "web",
                        expected: "on or off",
                    })
                }
            },
            "depth" => Command::Depth(
                required("depth", "brief, normal or deep")?
                    .parse()
                    .map_err(|e: ValidationError| CommandError::InvalidArgument(e.to_string()))?,
            ),
            "max-sources" => Command::MaxSources(
                required("max-sources", "a number from 2 to 6")?
                    .parse()
                    .map_err(|_| CommandError::InvalidArgument("Expected a number from 2 to 6.".to_string()))?,
            ),
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// What the REPL should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Print(String),
    Quit,
}

/// Session-holding command executor.
pub struct Repl {
    assistant: Assistant,
    session: Option<SessionContext>,
    web_defaults: WebSettings,
}

impl Repl {
    pub fn new(assistant: Assistant, web_defaults: WebSettings) -> Self {
        Self {
            assistant,
            session: None,
            web_defaults,
        }
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    pub fn login(&mut self, phone: &str) -> String {
        match SessionContext::login(phone) {
            Ok(session) => {
                let session = session.with_web_settings(self.web_defaults);
                let count = self.assistant.session_orders(&session).len();
                let text = format!(
                    "Logged in as {}. {} orders available. Type /orders or ask about an order.",
                    session.phone(),
                    count
                );
                self.session = Some(session);
                text
            }
            Err(e) => e.to_string(),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        let text = match command {
            Command::Quit => return Reply::Quit,
            Command::Help => HELP.to_string(),
            Command::Login(phone) => self.login(&phone),
            other => match self.session.as_mut() {
                Some(session) => in_session(&mut self.assistant, session, other).await,
                None => LOGIN_FIRST.to_string(),
            },
        };
        Reply::Print(text)
    }

    /// Runs until `/quit` or end of input.
    pub async fn run(&mut self) -> std::io::Result<()> {
        println!("Order Copilot. Type /help for commands.");
        if self.session.is_none() {
            println!("Log in with /login <10-digit phone>.");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let reply = match Command::parse(&line) {
                Ok(command) => {
                    debug!(?command, "command");
                    self.execute(command).await
                }
                Err(e) => Reply::Print(e.to_string()),
            };
            match reply {
                Reply::Print(text) if text.is_empty() => {}
                Reply::Print(text) => println!("{}\n", text),
                Reply::Quit => break,
            }
        }
        Ok(())
    }
}

async fn in_session(assistant: &mut Assistant, session: &mut SessionContext, command: Command) -> String {
    match command {
        Command::Chat(text) if text.is_empty() => String::new(),
        Command::Chat(text) => {
            let mut reply = assistant.handle_turn(session, &text).await;
            if let Some(pending) = session.pending() {
                reply.push_str("\n\n");
                reply.push_str(&render::pending_notice(pending));
            }
            reply
        }
        Command::Orders => {
            let active = session.active_order_id();
            let lines: Vec<String> = assistant
                .visible_orders(session)
                .into_iter()
                .map(|o| render::order_line(o, Some(o.order_id()) == active))
                .collect();
            if lines.is_empty() {
                "No orders to show.".to_string()
            } else {
                lines.join("\n")
            }
        }
        Command::Active(id) => match assistant.select_order(session, &id) {
            Ok(()) => active_card(assistant, session, &id),
            Err(e) => e.to_string(),
        },
        Command::Focus(item) => {
            if !assistant.focus_item(session, item.as_deref()) {
                return "That item is not part of the active order.".to_string();
            }
            match session.active_item() {
                Some(item) => format!("Focused on {}.", item),
                None => "Item focus cleared.".to_string(),
            }
        }
        Command::Filter(status) => {
            session.set_status_filter(status);
            match status {
                Some(status) => format!("Showing {} orders.", status),
                None => "Showing all statuses.".to_string(),
            }
        }
        Command::Search(query) => match assistant.search(session, &query) {
            SearchOutcome::Order(id) | SearchOutcome::Item { order_id: id, .. } => {
                active_card(assistant, session, &id)
            }
            SearchOutcome::NotFound(message) => message,
        },
        Command::ClearSearch => {
            session.clear_search();
            "Search cleared.".to_string()
        }
        Command::Suggest(query) => render::suggestions(&assistant.suggestions(session, &query)),
        Command::Confirm => match assistant.confirm_pending(session) {
            Some(text) => match assistant.undo_banner() {
                Some(info) => format!("{}\n{}", text, render::undo_banner(&info)),
                None => text,
            },
            None => NOTHING_PENDING.to_string(),
        },
        Command::Dismiss => assistant
            .dismiss_pending(session)
            .unwrap_or_else(|| NOTHING_PENDING.to_string()),
        Command::Undo => assistant.undo_last(session),
        Command::Summary => assistant.summarize(session).await,
        Command::Sources => render::sources(session.last_sources()),
        Command::Web(enabled) => {
            session.set_web_enabled(enabled);
            format!("Web research {}.", if enabled { "on" } else { "off" })
        }
        Command::Depth(depth) => {
            session.set_depth(depth);
            format!("Web answers will be {}.", depth)
        }
        Command::MaxSources(n) => {
            session.set_max_sources(n);
            format!("Citing up to {} sources.", session.web().max_sources)
        }
        // handled before a session is required
        Command::Help | Command::Quit | Command::Login(_) => String::new(),
    }
}

fn active_card(assistant: &Assistant, session: &SessionContext, id: &OrderId) -> String {
    match assistant.store().get_order(id) {
        Some(order) => render::order_card(order, true, session.active_item()),
        None => format!("Active order set to {}.", id),
    }
}

/// Web settings for new sessions from the command line over config.
pub fn web_settings(args: &Args, base: WebSettings) -> WebSettings {
    let settings = WebSettings {
        enabled: base.enabled && !args.no_web,
        depth: args.depth.unwrap_or(base.depth),
        ..base
    };
    settings.with_max_sources(args.max_sources.unwrap_or(base.max_sources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::search::MockSearchProvider;
    use crate::application::{AssistantSettings, SynthesizingResearcher};
    use crate::domain::order::{seed_store, SeedOptions};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn repl() -> Repl {
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let store = seed_store(&SeedOptions::default(), today).unwrap();
        let researcher = SynthesizingResearcher::new(Arc::new(MockSearchProvider::new()), None);
        let assistant = Assistant::new(
            store,
            None,
            Arc::new(researcher),
            AssistantSettings {
                show_audit_trail: false,
                ..AssistantSettings::default()
            },
        );
        Repl::new(assistant, WebSettings::default())
    }

    fn print(reply: Reply) -> String {
        match reply {
            Reply::Print(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn parses_commands_and_chat() {
        assert_eq!(Command::parse("where is my order"), Ok(Command::Chat("where is my order".into())));
        assert_eq!(Command::parse("/confirm"), Ok(Command::Confirm));
        assert_eq!(Command::parse("/web off"), Ok(Command::Web(false)));
        assert_eq!(Command::parse("/depth DEEP"), Ok(Command::Depth(ResearchDepth::Deep)));
        assert_eq!(Command::parse("/filter out for delivery"), Ok(Command::Filter(Some(OrderStatus::OutForDelivery))));
        assert_eq!(Command::parse("/filter all"), Ok(Command::Filter(None)));
        assert_eq!(Command::parse("/focus none"), Ok(Command::Focus(None)));
        assert_eq!(Command::parse("/active ord10015"), Ok(Command::Active(OrderId::new("ORD10015").unwrap())));
        assert_eq!(Command::parse("/max-sources 3"), Ok(Command::MaxSources(3)));
    }

    #[test]
    fn rejects_bad_commands() {
        assert_eq!(Command::parse("/teleport"), Err(CommandError::Unknown("teleport".into())));
        assert!(matches!(Command::parse("/search"), Err(CommandError::MissingArgument { command: "search", .. })));
        assert!(matches!(Command::parse("/active 15"), Err(CommandError::InvalidArgument(_))));
        assert!(matches!(Command::parse("/web maybe"), Err(CommandError::MissingArgument { .. })));
    }

    #[test]
    fn cli_flags_override_web_defaults() {
        let args = Args::parse_from(["order-copilot", "--no-web", "--depth", "brief", "--max-sources", "9"]);
        let settings = web_settings(&args, WebSettings::default());
        assert!(!settings.enabled);
        assert_eq!(settings.depth, ResearchDepth::Brief);
        assert_eq!(settings.max_sources, 6);
    }

    #[tokio::test]
    async fn commands_need_login() {
        let mut repl = repl();
        let text = print(repl.execute(Command::Orders).await);
        assert!(text.starts_with("Log in first"));

        let text = print(repl.execute(Command::Login("12345".into())).await);
        assert!(repl.session().is_none());
        assert!(!text.is_empty());
    }

    #[tokio::test]
    async fn demo_login_lists_orders_and_quits() {
        let mut repl = repl();
        let text = print(repl.execute(Command::Login("98765-43210".into())).await);
        assert!(text.starts_with("Logged in as 9876543210. 10 orders"));

        let listing = print(repl.execute(Command::Orders).await);
        assert_eq!(listing.lines().count(), 10);

        assert_eq!(repl.execute(Command::Quit).await, Reply::Quit);
    }

    #[tokio::test]
    async fn web_toggle_and_sources() {
        let mut repl = repl();
        repl.execute(Command::Login("9876543210".into())).await;

        assert_eq!(print(repl.execute(Command::Web(false)).await), "Web research off.");
        assert!(!repl.session().unwrap().web().enabled);
        assert_eq!(
            print(repl.execute(Command::Sources).await),
            "No sources from the last web answer."
        );
        assert_eq!(
            print(repl.execute(Command::MaxSources(1)).await),
            "Citing up to 2 sources."
        );
    }
}
