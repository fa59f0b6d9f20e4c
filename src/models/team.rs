use serde::Serialize;

use crate::constants::team::CAPACITY;
use crate::domain::{TeamId, UserId};
use crate::entities::teams;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub admin_id: UserId,
    pub hardware: bool,
    pub created_at: String,
}

impl From<teams::Model> for Team {
    fn from(model: teams::Model) -> Self {
        Self {
            id: TeamId::new(model.id),
            name: model.name,
            admin_id: UserId::new(model.admin_id),
            hardware: model.hardware,
            created_at: model.created_at,
        }
    }
}

/// A team row together with how full it is.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    #[serde(flatten)]
    pub team: Team,
    pub member_count: usize,
    pub capacity: usize,
    pub is_full: bool,
}

impl TeamSummary {
    #[must_use]
    pub const fn new(team: Team, member_count: usize) -> Self {
        Self {
            team,
            member_count,
            capacity: CAPACITY,
            is_full: member_count >= CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Member {
    pub id: UserId,
    pub name: String,
    pub is_team_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub summary: TeamSummary,
    pub members: Vec<Member>,
}
