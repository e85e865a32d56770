//! Helpers shared by unit and integration tests.

use std::sync::Arc;

use axum::Router;
use serde_json::{json, Value};

use crate::config::{
    Config, CorsConfig, DatabaseConfig, LinksConfig, LoggingConfig, RoutesConfig, ValidationConfig,
};
use crate::repository::{RepositoryError, SqliteUserRepository};
use crate::{routes, AppState};

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 8080,
        database: DatabaseConfig {
            url: ":memory:".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        cors: CorsConfig {
            origins: "*".to_string(),
        },
        validation: ValidationConfig { minimum_age: 18 },
        routes: RoutesConfig {
            users_path: "/users".to_string(),
        },
        links: LinksConfig {
            base_url: String::new(),
        },
    }
}

/// State over a fresh in-memory database.
pub fn create_test_state(config: Config) -> Result<Arc<AppState>, RepositoryError> {
    let repository = Arc::new(SqliteUserRepository::new(&config.database.url)?);
    Ok(Arc::new(AppState::new(config, repository)))
}

/// Full application router over a fresh in-memory database.
pub fn create_test_app() -> Result<Router, RepositoryError> {
    Ok(routes::app(create_test_state(test_config())?))
}

/// Create-request body for a valid user.
pub fn user_json(email: &str, birth_date: &str) -> Value {
    json!({
        "email": email,
        "firstName": "John",
        "lastName": "Doe",
        "birthDate": birth_date,
    })
}
