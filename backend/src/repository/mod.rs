//! Persistence port for users.
//!
//! The service only talks to [`UserRepository`]; [`SqliteUserRepository`]
//! is the shipped implementation.

mod sqlite;

pub use sqlite::SqliteUserRepository;

use async_trait::async_trait;
use chrono::NaiveDate;
use users_common::User;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("No stored user with id {0}")]
    NotFound(i64),
    #[error("Corrupt row for user {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        RepositoryError::Database(e.to_string())
    }
}

/// Storage operations the users service depends on.
///
/// Every call is atomic on its own; no cross-call transaction is implied.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user without id, or overwrite the stored user with the same
    /// id. Returns the stored user with its id set; an id with no stored row
    /// is [`RepositoryError::NotFound`].
    async fn save(&self, user: User) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError>;

    /// All users, in storage order.
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;

    /// Users whose birth date lies in `[from, to]`, both ends inclusive.
    async fn find_by_birth_date_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<User>, RepositoryError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;

    /// Cheap reachability check for health reporting.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
