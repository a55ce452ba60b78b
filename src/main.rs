use dotenvy::dotenv;
use share_in::{
    api::{self, AppState},
    config::{AppConfig, database, seed},
    errors::Result,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Build the application configuration
    let app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Invalid application configuration: {}", e))?;
    if app_config.api_token.is_none() {
        warn!("API_TOKEN is not set, the API accepts unauthenticated requests");
    }

    // 4. Connect to the database
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    // 5. Create tables from the entity definitions
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 6. Seed lookup lists and company settings
    let seed_config = seed::load_seed_config_or_default(&app_config.seed_config)?;
    seed::seed_database(&db, &seed_config)
        .await
        .inspect_err(|e| error!("Failed to seed database: {}", e))?;

    // 7. Serve the API until Ctrl-C
    let app = api::router(AppState::new(db, app_config.api_token.clone()));
    let listener = TcpListener::bind(app_config.bind_address).await?;
    info!("Listening on http://{}", app_config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
