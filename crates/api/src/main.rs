use anyhow::{Context, Result};
use tracing::info;

use love2share_api::{app, config, middleware, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics();

    info!("Starting Love2Share API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&(&config.database).into()).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let state = app::AppState::new(config.clone(), pool)
        .context("Failed to load the identity provider public key")?;

    let summary = services::bootstrap_admins(state.admin_authority.as_ref(), &config.admin.seed_emails)
        .await?;
    info!(
        added = summary.added,
        already_present = summary.already_present,
        "Admin bootstrap finished"
    );

    let app = app::build_router(state);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
