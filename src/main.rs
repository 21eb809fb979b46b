use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use translator_backend::config::Config;
use translator_backend::routes;
use translator_backend::server;
use translator_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Before the subscriber so RUST_LOG may come from .env
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("translator_backend=debug,tower_http=debug")),
        )
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from: {}", path.display());
    }

    // Refuses to start without the provider credential
    let config = Config::load(None)?;
    info!(
        "Using {} provider with model {}",
        config.llm.provider, config.llm.model
    );

    let listener = server::bind_listener(&config.server).await?;

    let app_state = AppState::new(config)?;
    let app = routes::build_app(app_state);

    info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
