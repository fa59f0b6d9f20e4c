use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, sea_query::Expr,
};

use crate::config::SecurityConfig;
use crate::domain::{ShirtSize, TeamId, UserId};
use crate::entities::users;
use crate::models::user::{NewUser, User};

/// User rows, over either the pool or an open transaction.
pub struct UserRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let active_model = users::ActiveModel {
            name: Set(new_user.name),
            email: Set(normalize_email(&new_user.email)),
            password_hash: Set(new_user.password_hash),
            shirt_size: Set(new_user.shirt_size.as_str().to_string()),
            team_id: Set(None),
            is_admin: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active_model
            .insert(self.conn)
            .await
            .context("Failed to insert user")?;

        User::try_from(model)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        users::Entity::find_by_id(id.value())
            .one(self.conn)
            .await
            .context("Failed to query user by ID")?
            .map(User::try_from)
            .transpose()
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .get_by_email_with_password(email)
            .await?
            .map(|(user, _)| user))
    }

    /// Get user by email together with the stored password hash (for login)
    pub async fn get_by_email_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(self.conn)
            .await
            .context("Failed to query user by email")?;

        user.map(|u| {
            let password_hash = u.password_hash.clone();
            User::try_from(u).map(|user| (user, password_hash))
        })
        .transpose()
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list users")?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    pub async fn count(&self) -> Result<u64> {
        users::Entity::find()
            .count(self.conn)
            .await
            .context("Failed to count users")
    }

    pub async fn update_shirt_size(&self, id: UserId, size: ShirtSize) -> Result<bool> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::ShirtSize, Expr::value(size.as_str()))
            .filter(users::Column::Id.eq(id.value()))
            .exec(self.conn)
            .await
            .context("Failed to update shirt size")?;

        Ok(result.rows_affected > 0)
    }

    /// Points a user at a team, or clears the reference with `None`.
    pub async fn set_team(&self, id: UserId, team_id: Option<TeamId>) -> Result<()> {
        users::Entity::update_many()
            .col_expr(
                users::Column::TeamId,
                Expr::value(team_id.map(|t| t.value())),
            )
            .filter(users::Column::Id.eq(id.value()))
            .exec(self.conn)
            .await
            .context("Failed to update team reference")?;

        Ok(())
    }

    /// Grants or revokes site administrator rights. Returns false if no user has that email.
    pub async fn set_site_admin(&self, email: &str, is_admin: bool) -> Result<bool> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::IsAdmin, Expr::value(is_admin))
            .filter(users::Column::Email.eq(normalize_email(email)))
            .exec(self.conn)
            .await
            .context("Failed to update admin flag")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete(&self, id: UserId) -> Result<bool> {
        let result = users::Entity::delete_by_id(id.value())
            .exec(self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }
}

/// True when a repository error came from a unique index, e.g. an email that
/// another insert claimed first.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
}

/// Emails are stored and looked up trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None, // output length (use default)
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored PHC hash. The params are read from the hash itself.
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse", &cheap_params()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("not-a-phc-string", "x").is_err());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let store = crate::db::Store::new("sqlite::memory:").await.unwrap();
        let new_user = |email: &str| NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "unused".to_string(),
            shirt_size: ShirtSize::Medium,
        };

        store.user_repo().create(new_user("ada@example.com")).await.unwrap();
        let err = store
            .user_repo()
            .create(new_user(" ADA@example.com"))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));

        let other = anyhow::anyhow!("something else");
        assert!(!is_unique_violation(&other));
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Ada@MTU.edu "), "ada@mtu.edu");
    }
}
