use std::fs;
use std::sync::Arc;
use std::sync::OnceLock;

use axum::Router;
use llm_gateway::{CommandInterpreter, LlmClient};
use swap_core::config::CONFIG;
use swap_core::vocabulary::Vocabulary;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use api_server::config::load_app_config;
use api_server::{api_routes, AppState};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = load_app_config().unwrap_or_else(|err| {
        tracing::warn!("failed to load config: {err:?}, using defaults");
        Default::default()
    });

    let llm_client: Option<Arc<dyn CommandInterpreter>> = match LlmClient::from_app_config(&CONFIG)
    {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            tracing::warn!(%err, "failed to initialise LLM client; API calls will fail until configured");
            None
        }
    };

    let vocabulary = Vocabulary::default();
    let app_state = AppState::new(llm_client);

    let bind_addr = settings
        .bind_addr()
        .unwrap_or_else(|_| "0.0.0.0:3001".parse().expect("invalid default addr"));

    let router = Router::new()
        .nest("/api", api_routes())
        .with_state(app_state)
        .layer(CorsLayer::new().allow_methods(Any).allow_origin(Any));

    info!("Starting API server on {bind_addr}");
    info!(tickers = %vocabulary.ticker_list(), "allowed tickers");
    info!(operations = %vocabulary.operations().join(", "), "supported operations");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    let log_dir = std::path::Path::new("logs");
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {log_dir:?}: {err}");
    }

    let file_appender: RollingFileAppender =
        tracing_appender::rolling::daily(log_dir, "api-server.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());

    let fmt_stdout = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);
    let fmt_file = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(fmt_stdout)
        .with(fmt_file);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("tracing already initialised");
    }
}
