use anyhow::Context;
use serde::Serialize;

use crate::domain::{ShirtSize, TeamId, UserId};
use crate::entities::users;

/// A registered user, without the password hash.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub shirt_size: ShirtSize,
    pub team_id: Option<TeamId>,
    pub is_admin: bool,
    pub created_at: String,
}

impl TryFrom<users::Model> for User {
    type Error = anyhow::Error;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        let shirt_size = model
            .shirt_size
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("User {} has a corrupt shirt size", model.id))?;

        Ok(Self {
            id: UserId::new(model.id),
            name: model.name,
            email: model.email,
            shirt_size,
            team_id: model.team_id.map(TeamId::new),
            is_admin: model.is_admin,
            created_at: model.created_at,
        })
    }
}

/// The authenticated user performing an action, resolved once per request.
///
/// Carries no team reference; membership is re-read inside each operation's
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub is_admin: bool,
}

impl Actor {
    /// The operator running CLI commands: a site admin whose id (0) never
    /// belongs to a stored user.
    #[must_use]
    pub fn operator() -> Self {
        Self {
            id: UserId::new(0),
            name: "operator".to_string(),
            is_admin: true,
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Input for creating a user row. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub shirt_size: ShirtSize,
}
