//! Domain service for the team membership workflow.
//!
//! Users create a team (becoming its admin), join an existing one by name,
//! leave, and, as admin, rename or delete it. A team holds at most
//! [`CAPACITY`](crate::constants::team::CAPACITY) members.

use serde::{Deserialize, Serialize};

use crate::domain::TeamId;
use crate::models::team::{Team, TeamDetail, TeamSummary};
use crate::models::user::Actor;
use crate::services::RosterError;

/// The team registration form: either a new name, or the name of an existing
/// team picked from the joinable list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRegistration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub select_name: String,
    #[serde(default)]
    pub hardware: bool,
}

impl TeamRegistration {
    #[must_use]
    pub fn create(name: &str, hardware: bool) -> Self {
        Self {
            name: name.to_string(),
            hardware,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn join(name: &str) -> Self {
        Self {
            select_name: name.to_string(),
            ..Self::default()
        }
    }
}

/// The affected team as it stood after the operation (or just before it was
/// removed), plus the status line shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct TeamOutcome {
    pub team: Team,
    pub message: String,
}

#[async_trait::async_trait]
pub trait TeamService: Send + Sync {
    /// Creates a team owned by the actor, or joins an existing one when no
    /// new name is given.
    ///
    /// # Errors
    ///
    /// - [`RosterError::Conflict`] if the actor is already on a team, the name
    ///   is taken, or the target team is full.
    /// - [`RosterError::Validation`] if neither name is usable.
    /// - [`RosterError::NotFound`] if the selected team does not exist.
    async fn create_or_join(
        &self,
        actor: &Actor,
        registration: TeamRegistration,
    ) -> Result<TeamOutcome, RosterError>;

    /// Removes the actor from the team. The last member leaving disbands it;
    /// an admin leaving hands the role to the lowest remaining user id.
    async fn leave(&self, actor: &Actor, team_id: TeamId) -> Result<TeamOutcome, RosterError>;

    /// Team admin only. Clears every member and removes the team.
    async fn delete(&self, actor: &Actor, team_id: TeamId) -> Result<TeamOutcome, RosterError>;

    /// Team admin only.
    async fn rename(
        &self,
        actor: &Actor,
        team_id: TeamId,
        new_name: &str,
    ) -> Result<TeamOutcome, RosterError>;

    async fn list(&self) -> Result<Vec<TeamSummary>, RosterError>;

    /// Teams with room for another member.
    async fn joinable(&self) -> Result<Vec<TeamSummary>, RosterError>;

    async fn detail(&self, team_id: TeamId) -> Result<TeamDetail, RosterError>;

    async fn count(&self) -> Result<u64, RosterError>;
}
