pub mod config;
pub mod error;
pub mod links;
pub mod logging;
pub mod repository;
pub mod routes;
pub mod service;
pub mod test_util;

pub use config::Config;
pub use error::{ApiError, Error, ErrorResponse};
pub use links::{RouteTable, UserModelAssembler};
pub use repository::{RepositoryError, SqliteUserRepository, UserRepository};
pub use service::UserService;

use std::sync::Arc;

use users_common::UserValidator;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// User operations (validation, patching, persistence).
    pub users: UserService,
    /// HAL link assembly, built from the same route table as the router.
    pub assembler: UserModelAssembler,
}

impl AppState {
    pub fn new(config: Config, repository: Arc<dyn UserRepository>) -> Self {
        let users = UserService::new(
            repository,
            UserValidator::new(config.validation.minimum_age),
        );
        let assembler = UserModelAssembler::from_config(&config);

        Self {
            config,
            users,
            assembler,
        }
    }
}
