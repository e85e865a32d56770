//! User resource operations: validation, patching and persistence.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};
use users_common::{apply_patch, User, UserValidator};

use crate::error::{Error, Result};
use crate::repository::UserRepository;

pub const SEARCH_RANGE_MESSAGE: &str = "Parameter 'from' must be less than 'to'";

/// Orchestrates user operations over a [`UserRepository`].
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    validator: UserValidator,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, validator: UserValidator) -> Self {
        Self {
            repository,
            validator,
        }
    }

    pub fn repository(&self) -> &Arc<dyn UserRepository> {
        &self.repository
    }

    /// Validate and store a new user. Any id on the candidate is discarded.
    pub async fn create(&self, mut candidate: User) -> Result<User> {
        candidate.id = None;
        self.validator.validate(&candidate)?;

        let user = self.repository.save(candidate).await?;
        tracing::info!("Created user {:?}", user.id);
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User> {
        tracing::debug!("Fetching user {}", id);
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(Error::UserNotFound(id))
    }

    pub async fn get_all(&self) -> Result<Vec<User>> {
        Ok(self.repository.find_all().await?)
    }

    /// Full replace.
    ///
    /// `address` / `phoneNumber` absent on the candidate keep their stored
    /// values. The merged user is validated like a new one.
    pub async fn replace(&self, id: i64, candidate: User) -> Result<User> {
        let mut user = self.get_by_id(id).await?;
        user.replace_with(candidate);
        self.validator.validate(&user)?;

        let user = self.repository.save(user).await?;
        tracing::info!("Replaced user {}", id);
        Ok(user)
    }

    /// Apply a field-name keyed patch and store the result without revalidating.
    pub async fn patch_fields(&self, id: i64, fields: Map<String, Value>) -> Result<User> {
        let mut user = self.get_by_id(id).await?;
        let names: Vec<String> = fields.keys().cloned().collect();
        apply_patch(&mut user, fields)?;

        let user = self.repository.save(user).await?;
        tracing::info!("Patched user {} fields {:?}", id, names);
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.get_by_id(id).await?;
        self.repository.delete_by_id(id).await?;
        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Users born in `[from, to]`.
    ///
    /// Neither bound may lie after today and `from` must be strictly
    /// before `to`; otherwise nothing is queried.
    pub async fn search_by_birth_date(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<User>> {
        self.search_by_birth_date_on(from, to, Utc::now().date_naive())
            .await
    }

    pub async fn search_by_birth_date_on(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
    ) -> Result<Vec<User>> {
        if from > today || to > today || from >= to {
            return Err(Error::InvalidParameter(SEARCH_RANGE_MESSAGE.to_string()));
        }

        tracing::debug!("Searching users born between {} and {}", from, to);
        Ok(self.repository.find_by_birth_date_between(from, to).await?)
    }
}
