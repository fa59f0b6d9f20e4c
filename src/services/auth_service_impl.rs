//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{RegistrationConfig, SecurityConfig};
use crate::db::repositories::user::{hash_password, is_unique_violation, verify_password};
use crate::db::{Store, TeamRepository, UserRepository};
use crate::domain::UserId;
use crate::models::user::{Actor, NewUser, User};
use crate::services::RosterError;
use crate::services::auth_service::{AuthService, Registration};
use crate::services::membership::{MembershipLock, detach_member};
use crate::services::validation::{validate_email, validate_shirt_size};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    registration: RegistrationConfig,
    membership_lock: MembershipLock,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(
        store: Store,
        security: SecurityConfig,
        registration: RegistrationConfig,
        membership_lock: MembershipLock,
    ) -> Self {
        Self {
            store,
            security,
            registration,
            membership_lock,
        }
    }

    fn check_registration(&self, form: &Registration) -> Result<(), RosterError> {
        if form.name.trim().is_empty() {
            return Err(RosterError::validation("You have to enter a name"));
        }

        validate_email(&form.email, self.registration.allowed_email_domain.as_deref())?;

        if form.password.is_empty() {
            return Err(RosterError::validation("You have to enter a password"));
        }

        if form.password.chars().count() < self.security.min_password_length {
            return Err(RosterError::validation(format!(
                "Passwords must be at least {} characters",
                self.security.min_password_length
            )));
        }

        if form.password != form.password_confirm {
            return Err(RosterError::validation("The two passwords do not match"));
        }

        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, form: Registration) -> Result<User, RosterError> {
        self.check_registration(&form)?;

        let users = self.store.user_repo();
        if users.get_by_email(&form.email).await?.is_some() {
            return Err(RosterError::conflict("The email is already registered"));
        }

        let shirt_size = validate_shirt_size(&form.shirt_size)?;

        let security = self.security.clone();
        let password = form.password;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, &security))
                .await
                .map_err(|e| RosterError::Internal(format!("Hashing task failed: {e}")))??;

        // A concurrent registration can claim the email while we hash.
        let user = match users
            .create(NewUser {
                name: form.name.trim().to_string(),
                email: form.email,
                password_hash,
                shirt_size,
            })
            .await
        {
            Ok(user) => user,
            Err(err) if is_unique_violation(&err) => {
                return Err(RosterError::conflict("The email is already registered"));
            }
            Err(err) => return Err(err.into()),
        };

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn verify(&self, email: &str, password: &str) -> Result<User, RosterError> {
        let Some((user, password_hash)) =
            self.store.user_repo().get_by_email_with_password(email).await?
        else {
            warn!("Login attempt for unknown email");
            return Err(RosterError::InvalidCredentials);
        };

        let password = password.to_string();
        let is_valid =
            tokio::task::spawn_blocking(move || verify_password(&password_hash, &password))
                .await
                .map_err(|e| RosterError::Internal(format!("Verification task failed: {e}")))??;

        if !is_valid {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(RosterError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn current_actor(&self, user_id: UserId) -> Result<Option<User>, RosterError> {
        Ok(self.store.user_repo().get_by_id(user_id).await?)
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, RosterError> {
        self.store
            .user_repo()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| RosterError::not_found(format!("User {user_id} not found")))
    }

    async fn list_users(&self) -> Result<Vec<User>, RosterError> {
        Ok(self.store.user_repo().list().await?)
    }

    async fn count_users(&self) -> Result<u64, RosterError> {
        Ok(self.store.user_repo().count().await?)
    }

    async fn update_shirt_size(
        &self,
        actor: &Actor,
        user_id: UserId,
        shirt_size: &str,
    ) -> Result<User, RosterError> {
        if actor.id != user_id {
            return Err(RosterError::not_authorized(
                "You can only change your own shirt size.",
            ));
        }

        let size = validate_shirt_size(shirt_size)?;
        let users = self.store.user_repo();
        if !users.update_shirt_size(user_id, size).await? {
            return Err(RosterError::not_found(format!("User {user_id} not found")));
        }

        self.get_user(user_id).await
    }

    async fn delete_user(&self, actor: &Actor, user_id: UserId) -> Result<String, RosterError> {
        if !actor.is_admin {
            return Err(RosterError::not_authorized(
                "Only site administrators can delete users.",
            ));
        }

        if actor.id == user_id {
            return Err(RosterError::validation("You cannot delete your own account."));
        }

        let _guard = self.membership_lock.acquire().await;
        let txn = self.store.begin().await?;

        let users = UserRepository::new(&txn);
        let user = users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| RosterError::not_found(format!("User {user_id} not found")))?;

        let mut message = format!("{} has been deleted.", user.name);

        let team = match user.team_id {
            Some(team_id) => TeamRepository::new(&txn).get(team_id).await?,
            None => None,
        };
        if let Some(team) = team {
            let departure = detach_member(&txn, user.id, &team).await?;
            if let Some(extra) = departure.describe(&team.name) {
                message.push(' ');
                message.push_str(&extra);
            }
        }

        users.delete(user.id).await?;
        txn.commit().await?;

        info!(
            user_id = %user.id,
            deleted_by = %actor.id,
            "User deleted"
        );
        Ok(message)
    }

    async fn promote(&self, email: &str) -> Result<(), RosterError> {
        if self.store.user_repo().set_site_admin(email, true).await? {
            info!("Granted site admin rights");
            Ok(())
        } else {
            Err(RosterError::not_found(format!("No user registered as {email}")))
        }
    }
}
