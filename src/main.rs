use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use order_copilot::adapters::ai::{OpenAIConfig, OpenAIProvider};
use order_copilot::adapters::search::{DuckDuckGoConfig, DuckDuckGoSearch};
use order_copilot::application::{Assistant, AssistantSettings, SynthesizingResearcher};
use order_copilot::cli::{web_settings, Args, Repl};
use order_copilot::config::AppConfig;
use order_copilot::domain::foundation::today;
use order_copilot::domain::order::seed_store;
use order_copilot::ports::AIProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::load()?;
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store = seed_store(&config.demo.seed_options(), today())?;
    info!(orders = store.len(), "demo store seeded");

    let model = build_model(&config);
    let search = DuckDuckGoSearch::new(
        DuckDuckGoConfig::default()
            .with_endpoint(config.web.search_endpoint.clone())
            .with_timeout(config.web.timeout()),
    )?;
    let researcher = SynthesizingResearcher::new(Arc::new(search), model.clone());

    let assistant = Assistant::new(
        store,
        model,
        Arc::new(researcher),
        AssistantSettings {
            fallback_phone: config.demo.fallback_phone.clone(),
            show_audit_trail: config.features.show_audit_trail,
        },
    );

    let mut repl = Repl::new(assistant, web_settings(&args, config.web.session_defaults()));
    if let Some(phone) = &args.phone {
        println!("{}", repl.login(phone));
    }
    repl.run().await?;
    Ok(())
}

/// OpenAI provider when a usable key is configured, otherwise keyword mode.
fn build_model(config: &AppConfig) -> Option<Arc<dyn AIProvider>> {
    let Some(key) = config.ai.usable_key() else {
        info!("no usable OpenAI key, running in keyword mode");
        return None;
    };
    let openai = OpenAIConfig::from_usable_key(key)?
        .with_model(config.ai.model.clone())
        .with_base_url(config.ai.base_url.clone())
        .with_timeout(config.ai.timeout())
        .with_max_retries(config.ai.max_retries);

    match OpenAIProvider::new(openai) {
        Ok(provider) => {
            info!(model = %config.ai.model, "language model enabled");
            let provider: Arc<dyn AIProvider> = Arc::new(provider);
            Some(provider)
        }
        Err(e) => {
            warn!(error = %e, "could not build OpenAI client, running in keyword mode");
            None
        }
    }
}
