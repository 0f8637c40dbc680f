//! TrainLog - Self-Hosted Workout Logging Web Application
//!
//! Main entry point for the application.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trainlog::storage::config;
use trainlog::storage::Database;
use trainlog::web::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure tracing subscriber
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TrainLog v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config()?;
    let db_path = config.database_path();

    // Schema creation must succeed before the server accepts requests; a
    // failure here aborts startup.
    Database::open(&db_path)?;
    tracing::info!("Database ready at {}", db_path.display());

    let app = web::router(AppState::new(db_path));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
