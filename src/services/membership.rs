//! Shared pieces of every operation that changes who is on which team.

use std::sync::Arc;

use anyhow::Result;
use sea_orm::ConnectionTrait;
use tokio::sync::{Mutex, MutexGuard};

use crate::db::{TeamRepository, UserRepository};
use crate::domain::UserId;
use crate::models::team::{Member, Team};

/// Serializes membership mutations within the process.
///
/// Held across the whole check-then-write transaction, so the member count a
/// join reads is still the count when it commits. Reads never take it.
#[derive(Clone, Default)]
pub struct MembershipLock {
    inner: Arc<Mutex<()>>,
}

impl MembershipLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().await
    }
}

/// What happened to a team after one of its members left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The member was the last one; the team row is gone.
    Disbanded,
    /// The admin left; the lowest remaining user id took over.
    AdminTransferred(Member),
    Left,
}

impl Departure {
    /// The sentence appended to "You left <team>." style messages.
    #[must_use]
    pub fn describe(&self, team_name: &str) -> Option<String> {
        match self {
            Self::Disbanded => Some(format!("{team_name} was disbanded.")),
            Self::AdminTransferred(successor) => {
                Some(format!("{} is now the team admin.", successor.name))
            }
            Self::Left => None,
        }
    }
}

/// Removes `user_id` from `team`, disbanding it when empty and handing the
/// admin role on when the admin leaves. Must run inside the caller's
/// transaction with the [`MembershipLock`] held.
pub async fn detach_member<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    team: &Team,
) -> Result<Departure> {
    let users = UserRepository::new(conn);
    let teams = TeamRepository::new(conn);

    teams.lock(team.id).await?;
    users.set_team(user_id, None).await?;

    let remaining = teams.members(team).await?;
    let departure = match remaining.into_iter().next() {
        None => {
            teams.delete(team.id).await?;
            Departure::Disbanded
        }
        Some(successor) if team.admin_id == user_id => {
            teams.set_admin(team.id, successor.id).await?;
            Departure::AdminTransferred(Member {
                is_team_admin: true,
                ..successor
            })
        }
        Some(_) => Departure::Left,
    };

    Ok(departure)
}
