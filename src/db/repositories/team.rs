use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use std::collections::HashMap;

use crate::domain::{TeamId, UserId};
use crate::entities::{teams, users};
use crate::models::team::{Member, Team, TeamSummary};

/// Team rows and membership counts, over either the pool or an open transaction.
pub struct TeamRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TeamRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: TeamId) -> Result<Option<Team>> {
        let team = teams::Entity::find_by_id(id.value())
            .one(self.conn)
            .await
            .context("Failed to query team by ID")?;

        Ok(team.map(Team::from))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Team>> {
        let team = teams::Entity::find()
            .filter(teams::Column::Name.eq(name))
            .one(self.conn)
            .await
            .context("Failed to query team by name")?;

        Ok(team.map(Team::from))
    }

    /// Takes the write lock on a team row by touching it, so the rest of the
    /// transaction sees a membership nobody else can change underneath it.
    /// Returns false if the team does not exist.
    pub async fn lock(&self, id: TeamId) -> Result<bool> {
        let result = teams::Entity::update_many()
            .col_expr(teams::Column::Id, Expr::col(teams::Column::Id).into())
            .filter(teams::Column::Id.eq(id.value()))
            .exec(self.conn)
            .await
            .context("Failed to lock team row")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn create(&self, name: &str, admin_id: UserId, hardware: bool) -> Result<Team> {
        let active_model = teams::ActiveModel {
            name: Set(name.to_string()),
            admin_id: Set(admin_id.value()),
            hardware: Set(hardware),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active_model
            .insert(self.conn)
            .await
            .context("Failed to insert team")?;

        Ok(Team::from(model))
    }

    pub async fn member_count(&self, id: TeamId) -> Result<usize> {
        let count = users::Entity::find()
            .filter(users::Column::TeamId.eq(id.value()))
            .count(self.conn)
            .await
            .context("Failed to count team members")?;

        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }

    /// Members ordered by user id, lowest first.
    pub async fn members(&self, team: &Team) -> Result<Vec<Member>> {
        let rows = users::Entity::find()
            .filter(users::Column::TeamId.eq(team.id.value()))
            .order_by_asc(users::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list team members")?;

        Ok(rows
            .into_iter()
            .map(|u| Member {
                id: UserId::new(u.id),
                is_team_admin: u.id == team.admin_id.value(),
                name: u.name,
            })
            .collect())
    }

    pub async fn set_admin(&self, id: TeamId, admin_id: UserId) -> Result<()> {
        teams::Entity::update_many()
            .col_expr(teams::Column::AdminId, Expr::value(admin_id.value()))
            .filter(teams::Column::Id.eq(id.value()))
            .exec(self.conn)
            .await
            .context("Failed to update team admin")?;

        Ok(())
    }

    pub async fn rename(&self, id: TeamId, name: &str) -> Result<()> {
        teams::Entity::update_many()
            .col_expr(teams::Column::Name, Expr::value(name))
            .filter(teams::Column::Id.eq(id.value()))
            .exec(self.conn)
            .await
            .context("Failed to rename team")?;

        Ok(())
    }

    /// Clears every member's team reference, then deletes the team row.
    pub async fn delete(&self, id: TeamId) -> Result<bool> {
        users::Entity::update_many()
            .col_expr(users::Column::TeamId, Expr::value(Option::<i32>::None))
            .filter(users::Column::TeamId.eq(id.value()))
            .exec(self.conn)
            .await
            .context("Failed to clear team members")?;

        let result = teams::Entity::delete_by_id(id.value())
            .exec(self.conn)
            .await
            .context("Failed to delete team")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        teams::Entity::find()
            .count(self.conn)
            .await
            .context("Failed to count teams")
    }

    /// Every team with its member count, ordered by name.
    pub async fn list_summaries(&self) -> Result<Vec<TeamSummary>> {
        let teams = teams::Entity::find()
            .order_by_asc(teams::Column::Name)
            .all(self.conn)
            .await
            .context("Failed to list teams")?;

        let counts: HashMap<i32, i64> = users::Entity::find()
            .select_only()
            .column(users::Column::TeamId)
            .column_as(Expr::col(users::Column::Id).count(), "member_count")
            .filter(users::Column::TeamId.is_not_null())
            .group_by(users::Column::TeamId)
            .into_tuple::<(i32, i64)>()
            .all(self.conn)
            .await
            .context("Failed to count members per team")?
            .into_iter()
            .collect();

        Ok(teams
            .into_iter()
            .map(|t| {
                let count = counts.get(&t.id).copied().unwrap_or(0);
                TeamSummary::new(Team::from(t), usize::try_from(count).unwrap_or(0))
            })
            .collect())
    }
}
