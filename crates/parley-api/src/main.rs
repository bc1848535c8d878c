use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parley_api::{build_router, config::Config, state::AppState};
use parley_llm::FoundryClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Refuse to start without upstream credentials
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Parley API server");
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    let upstream = config.upstream_config();
    tracing::info!(
        endpoint = %upstream.endpoint,
        auth_style = ?upstream.auth_style.resolve(&upstream.endpoint),
        timeout_secs = upstream.timeout_secs,
        "Initializing completion client"
    );
    let client = Arc::new(FoundryClient::from_config(&upstream)?);

    match &config.search {
        Some(search) => tracing::info!(index = %search.index, "Retrieval augmentation enabled"),
        None => tracing::info!("Retrieval augmentation disabled"),
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, client));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
