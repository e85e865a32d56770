use std::sync::Arc;

use tokio::net::TcpListener;

use users_backend::{logging, routes, AppState, Config, SqliteUserRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()
        .map_err(|e| format!("Failed to load configuration: {}", e))?;

    logging::init_tracing(&config.logging.level);

    tracing::info!("Starting users service");

    let repository = Arc::new(SqliteUserRepository::new(&config.database.url)?);
    tracing::info!(
        "Minimum user age: {}, users path: {}",
        config.validation.minimum_age,
        config.routes.users_path
    );

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, repository));
    let app = routes::app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
