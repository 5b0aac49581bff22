use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::store::{DynStore, UserRepository};

/// Maps identity-provider subjects to internal users.
#[derive(Clone)]
pub struct UserService {
    store: DynStore,
}

impl UserService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Finds the user for `external_id`, creating it on first sight. Two
    /// concurrent first requests both end up with the same row.
    pub async fn resolve(
        &self,
        external_id: &str,
        email: Option<String>,
        name: Option<String>,
    ) -> AppResult<User> {
        if let Some(user) = self.store.find_user_by_external_id(external_id).await? {
            return Ok(user);
        }

        let candidate = User::new(external_id, email, name);
        if let Some(user) = self.store.insert_user(&candidate).await? {
            info!(user_id = %user.id, "Created user on first sign-in");
            return Ok(user);
        }

        // lost the insert race; the winner's row is there now
        self.store
            .find_user_by_external_id(external_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("user vanished after conflicting insert")))
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    pub async fn complete_onboarding(&self, user_id: Uuid) -> AppResult<User> {
        self.store
            .complete_onboarding(user_id)
            .await?
            .ok_or(AppError::NotFound("User"))
    }
}
