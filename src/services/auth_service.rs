//! Domain service for registration, login and user management.

use serde::Deserialize;

use crate::domain::UserId;
use crate::models::user::{Actor, User};
use crate::services::RosterError;

/// Fields submitted by the registration form, unvalidated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "password2")]
    pub password_confirm: String,
    pub shirt_size: String,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Validates the form and creates the account.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Validation`] for the first failing field and
    /// [`RosterError::Conflict`] if the email is taken.
    async fn register(&self, registration: Registration) -> Result<User, RosterError>;

    /// Checks credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::InvalidCredentials`] for an unknown email and for
    /// a wrong password alike.
    async fn verify(&self, email: &str, password: &str) -> Result<User, RosterError>;

    /// Resolves the user behind a session. A deleted user resolves to `None`.
    async fn current_actor(&self, user_id: UserId) -> Result<Option<User>, RosterError>;

    async fn get_user(&self, user_id: UserId) -> Result<User, RosterError>;

    async fn list_users(&self) -> Result<Vec<User>, RosterError>;

    async fn count_users(&self) -> Result<u64, RosterError>;

    /// Only the user themself may change their shirt size.
    async fn update_shirt_size(
        &self,
        actor: &Actor,
        user_id: UserId,
        shirt_size: &str,
    ) -> Result<User, RosterError>;

    /// Site admins only. Leaves the user's team first, with the same
    /// disband/transfer rules as a voluntary leave.
    ///
    /// Returns a status message for the admin.
    async fn delete_user(&self, actor: &Actor, user_id: UserId) -> Result<String, RosterError>;

    /// Grants site administrator rights.
    async fn promote(&self, email: &str) -> Result<(), RosterError>;
}
