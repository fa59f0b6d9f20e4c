//! `SeaORM` implementation of the `TeamService` trait.
//!
//! Every mutation takes the [`MembershipLock`], opens a transaction and
//! re-reads the actor and the team inside it before writing. Errors drop the
//! transaction, which rolls it back.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::constants::team::CAPACITY;
use crate::db::{Store, TeamRepository, UserRepository};
use crate::domain::TeamId;
use crate::models::team::{Team, TeamDetail, TeamSummary};
use crate::models::user::{Actor, User};
use crate::services::RosterError;
use crate::services::membership::{MembershipLock, detach_member};
use crate::services::team_service::{TeamOutcome, TeamRegistration, TeamService};
use crate::services::validation::{INVALID_TEAM_NAME, validate_team_name};

const ALREADY_ON_TEAM: &str = "You are already signed up for a team";
const NAME_TAKEN: &str = "That team name is already taken";
const NOT_TEAM_ADMIN: &str = "You are not the administrator of this team.";
const NOT_A_MEMBER: &str = "You are not a member of this team";

pub struct SeaOrmTeamService {
    store: Store,
    membership_lock: MembershipLock,
}

impl SeaOrmTeamService {
    #[must_use]
    pub const fn new(store: Store, membership_lock: MembershipLock) -> Self {
        Self {
            store,
            membership_lock,
        }
    }
}

fn team_not_found(team_id: TeamId) -> RosterError {
    RosterError::not_found(format!("Team {team_id} not found"))
}

fn team_full(name: &str) -> RosterError {
    RosterError::conflict(format!(
        "{name} is currently full, please choose another team or create a new one."
    ))
}

/// The session may outlive the account; treat a vanished actor as logged out.
fn require_actor(user: Option<User>) -> Result<User, RosterError> {
    user.ok_or(RosterError::NotAuthenticated)
}

#[async_trait]
impl TeamService for SeaOrmTeamService {
    async fn create_or_join(
        &self,
        actor: &Actor,
        registration: TeamRegistration,
    ) -> Result<TeamOutcome, RosterError> {
        let _guard = self.membership_lock.acquire().await;
        let txn = self.store.begin().await?;
        let users = UserRepository::new(&txn);
        let teams = TeamRepository::new(&txn);

        let me = require_actor(users.get_by_id(actor.id).await?)?;
        if me.team_id.is_some() {
            return Err(RosterError::conflict(ALREADY_ON_TEAM));
        }

        let new_name = registration.name.trim();
        let (team, created) = if new_name.is_empty() {
            let selected = registration.select_name.trim();
            if selected.is_empty() {
                return Err(RosterError::validation(INVALID_TEAM_NAME));
            }

            let team = teams
                .get_by_name(selected)
                .await?
                .ok_or_else(|| RosterError::not_found(format!("No team is named {selected}")))?;
            teams.lock(team.id).await?;
            (team, false)
        } else {
            let name = validate_team_name(new_name)?;
            if teams.get_by_name(name).await?.is_some() {
                return Err(RosterError::conflict(NAME_TAKEN));
            }

            (teams.create(name, actor.id, registration.hardware).await?, true)
        };

        let member_count = teams.member_count(team.id).await?;
        if member_count >= CAPACITY {
            metrics::counter!("roster_team_join_rejected_total").increment(1);
            warn!(
                team_id = %team.id,
                user_id = %actor.id,
                member_count,
                "Team is full, join rejected"
            );
            return Err(team_full(&team.name));
        }

        users.set_team(actor.id, Some(team.id)).await?;
        txn.commit().await?;

        let message = if created {
            metrics::counter!("roster_teams_created_total").increment(1);
            info!(team_id = %team.id, user_id = %actor.id, name = %team.name, "Team created");
            format!("You successfully created {}!", team.name)
        } else {
            metrics::counter!("roster_team_joins_total").increment(1);
            info!(team_id = %team.id, user_id = %actor.id, "Joined team");
            format!("You successfully joined {}!", team.name)
        };

        Ok(TeamOutcome { team, message })
    }

    async fn leave(&self, actor: &Actor, team_id: TeamId) -> Result<TeamOutcome, RosterError> {
        let _guard = self.membership_lock.acquire().await;
        let txn = self.store.begin().await?;
        let users = UserRepository::new(&txn);

        let team = TeamRepository::new(&txn)
            .get(team_id)
            .await?
            .ok_or_else(|| team_not_found(team_id))?;

        let me = require_actor(users.get_by_id(actor.id).await?)?;
        if me.team_id != Some(team.id) {
            return Err(RosterError::conflict(NOT_A_MEMBER));
        }

        let departure = detach_member(&txn, actor.id, &team).await?;
        txn.commit().await?;

        info!(team_id = %team.id, user_id = %actor.id, ?departure, "Left team");

        let mut message = format!("You left {}.", team.name);
        if let Some(extra) = departure.describe(&team.name) {
            message.push(' ');
            message.push_str(&extra);
        }

        Ok(TeamOutcome { team, message })
    }

    async fn delete(&self, actor: &Actor, team_id: TeamId) -> Result<TeamOutcome, RosterError> {
        let _guard = self.membership_lock.acquire().await;
        let txn = self.store.begin().await?;
        let teams = TeamRepository::new(&txn);

        let team = teams.get(team_id).await?.ok_or_else(|| team_not_found(team_id))?;
        if team.admin_id != actor.id {
            return Err(RosterError::not_authorized(NOT_TEAM_ADMIN));
        }

        teams.delete(team.id).await?;
        txn.commit().await?;

        info!(team_id = %team.id, user_id = %actor.id, "Team deleted");

        let message = format!("{} has been deleted.", team.name);
        Ok(TeamOutcome { team, message })
    }

    async fn rename(
        &self,
        actor: &Actor,
        team_id: TeamId,
        new_name: &str,
    ) -> Result<TeamOutcome, RosterError> {
        let _guard = self.membership_lock.acquire().await;
        let txn = self.store.begin().await?;
        let teams = TeamRepository::new(&txn);

        let team = teams.get(team_id).await?.ok_or_else(|| team_not_found(team_id))?;
        if team.admin_id != actor.id {
            return Err(RosterError::not_authorized(NOT_TEAM_ADMIN));
        }

        let name = validate_team_name(new_name)?;
        let taken = teams
            .get_by_name(name)
            .await?
            .is_some_and(|existing| existing.id != team.id);
        if taken {
            return Err(RosterError::conflict(NAME_TAKEN));
        }

        teams.rename(team.id, name).await?;
        txn.commit().await?;

        info!(team_id = %team.id, from = %team.name, to = %name, "Team renamed");

        Ok(TeamOutcome {
            message: format!("Team renamed to {name}."),
            team: Team {
                name: name.to_string(),
                ..team
            },
        })
    }

    async fn list(&self) -> Result<Vec<TeamSummary>, RosterError> {
        Ok(self.store.team_repo().list_summaries().await?)
    }

    async fn joinable(&self) -> Result<Vec<TeamSummary>, RosterError> {
        let mut teams = self.list().await?;
        teams.retain(|t| !t.is_full);
        Ok(teams)
    }

    async fn detail(&self, team_id: TeamId) -> Result<TeamDetail, RosterError> {
        let repo = self.store.team_repo();
        let team = repo.get(team_id).await?.ok_or_else(|| team_not_found(team_id))?;
        let members = repo.members(&team).await?;

        Ok(TeamDetail {
            summary: TeamSummary::new(team, members.len()),
            members,
        })
    }

    async fn count(&self) -> Result<u64, RosterError> {
        Ok(self.store.team_repo().count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ShirtSize, UserId};
    use crate::models::user::NewUser;
    use std::sync::Arc;

    async fn setup() -> (Store, SeaOrmTeamService) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let service = SeaOrmTeamService::new(store.clone(), MembershipLock::new());
        (store, service)
    }

    async fn add_user(store: &Store, name: &str) -> Actor {
        let user = store
            .user_repo()
            .create(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "unused".to_string(),
                shirt_size: ShirtSize::Medium,
            })
            .await
            .unwrap();
        Actor::from(&user)
    }

    async fn team_of(store: &Store, actor: &Actor) -> Option<TeamId> {
        store
            .user_repo()
            .get_by_id(actor.id)
            .await
            .unwrap()
            .unwrap()
            .team_id
    }

    /// Creates "Alpha" with `size` members; the first is the admin.
    async fn full_team(
        store: &Store,
        service: &SeaOrmTeamService,
        size: usize,
    ) -> (Team, Vec<Actor>) {
        let mut members = Vec::new();
        let admin = add_user(store, "Member0").await;
        let team = service
            .create_or_join(&admin, TeamRegistration::create("Alpha", true))
            .await
            .unwrap()
            .team;
        members.push(admin);

        for i in 1..size {
            let actor = add_user(store, &format!("Member{i}")).await;
            service
                .create_or_join(&actor, TeamRegistration::join("Alpha"))
                .await
                .unwrap();
            members.push(actor);
        }

        (team, members)
    }

    #[tokio::test]
    async fn create_makes_actor_admin_and_sole_member() {
        let (store, service) = setup().await;
        let ada = add_user(&store, "Ada").await;

        let outcome = service
            .create_or_join(&ada, TeamRegistration::create("  Alpha ", true))
            .await
            .unwrap();

        assert_eq!(outcome.message, "You successfully created Alpha!");
        assert_eq!(outcome.team.name, "Alpha");
        assert_eq!(outcome.team.admin_id, ada.id);
        assert!(outcome.team.hardware);

        let detail = service.detail(outcome.team.id).await.unwrap();
        assert_eq!(detail.members.len(), 1);
        assert!(detail.members[0].is_team_admin);
        assert_eq!(team_of(&store, &ada).await, Some(outcome.team.id));
    }

    #[tokio::test]
    async fn join_by_selected_name() {
        let (store, service) = setup().await;
        let (team, _) = full_team(&store, &service, 1).await;
        let bob = add_user(&store, "Bob").await;

        let outcome = service
            .create_or_join(&bob, TeamRegistration::join("Alpha"))
            .await
            .unwrap();

        assert_eq!(outcome.message, "You successfully joined Alpha!");
        assert_eq!(team_of(&store, &bob).await, Some(team.id));
    }

    #[tokio::test]
    async fn new_name_wins_over_selected_name() {
        let (store, service) = setup().await;
        full_team(&store, &service, 1).await;
        let bob = add_user(&store, "Bob").await;

        let outcome = service
            .create_or_join(
                &bob,
                TeamRegistration {
                    name: "Beta".to_string(),
                    select_name: "Alpha".to_string(),
                    hardware: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.team.name, "Beta");
        assert_eq!(outcome.team.admin_id, bob.id);
    }

    #[tokio::test]
    async fn already_on_a_team_is_rejected() {
        let (store, service) = setup().await;
        let (team, members) = full_team(&store, &service, 2).await;

        for registration in [
            TeamRegistration::create("Beta", false),
            TeamRegistration::join("Alpha"),
        ] {
            let err = service
                .create_or_join(&members[1], registration)
                .await
                .unwrap_err();
            assert!(matches!(err, RosterError::Conflict(ref m) if m == ALREADY_ON_TEAM));
        }

        assert_eq!(team_of(&store, &members[1]).await, Some(team.id));
        assert!(store.team_repo().get_by_name("Beta").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_names_and_unknown_teams() {
        let (store, service) = setup().await;
        let ada = add_user(&store, "Ada").await;

        let err = service
            .create_or_join(&ada, TeamRegistration::create("   ", false))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::Validation(ref m) if m == INVALID_TEAM_NAME));

        let err = service
            .create_or_join(&ada, TeamRegistration::join("Nowhere"))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
        assert_eq!(team_of(&store, &ada).await, None);
    }

    #[tokio::test]
    async fn duplicate_and_overlong_names_are_rejected() {
        let (store, service) = setup().await;
        full_team(&store, &service, 1).await;
        let bob = add_user(&store, "Bob").await;

        let err = service
            .create_or_join(&bob, TeamRegistration::create("Alpha", false))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::Conflict(ref m) if m == NAME_TAKEN));

        let err = service
            .create_or_join(&bob, TeamRegistration::create(&"x".repeat(63), false))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::Validation(_)));
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn full_team_rejects_sixth_member() {
        let (store, service) = setup().await;
        let (team, _) = full_team(&store, &service, CAPACITY).await;
        let late = add_user(&store, "Late").await;

        let err = service
            .create_or_join(&late, TeamRegistration::join("Alpha"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RosterError::Conflict(ref m)
                if m == "Alpha is currently full, please choose another team or create a new one."
        ));

        assert_eq!(team_of(&store, &late).await, None);
        let detail = service.detail(team.id).await.unwrap();
        assert_eq!(detail.members.len(), CAPACITY);
        assert!(detail.summary.is_full);
        assert!(service.joinable().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_joins_never_exceed_capacity() {
        let path = std::env::temp_dir().join(format!("roster-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite:{}", path.display());
        let store = Store::new(&url).await.unwrap();
        let service = Arc::new(SeaOrmTeamService::new(store.clone(), MembershipLock::new()));

        let (team, _) = full_team(&store, &service, 1).await;

        let mut joiners = Vec::new();
        for i in 0..10 {
            joiners.push(add_user(&store, &format!("Joiner{i}")).await);
        }

        let handles: Vec<_> = joiners
            .into_iter()
            .map(|actor| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .create_or_join(&actor, TeamRegistration::join("Alpha"))
                        .await
                })
            })
            .collect();

        let mut joined = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => joined += 1,
                Err(RosterError::Conflict(_)) => rejected += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(joined, CAPACITY - 1);
        assert_eq!(rejected, 10 - (CAPACITY - 1));
        assert_eq!(
            store.team_repo().member_count(team.id).await.unwrap(),
            CAPACITY
        );

        store.conn.close().await.unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn admin_leaving_transfers_to_lowest_id() {
        let (store, service) = setup().await;
        let (team, members) = full_team(&store, &service, 3).await;

        let outcome = service.leave(&members[0], team.id).await.unwrap();
        assert_eq!(
            outcome.message,
            "You left Alpha. Member1 is now the team admin."
        );

        let detail = service.detail(team.id).await.unwrap();
        assert_eq!(detail.summary.team.admin_id, members[1].id);
        assert_eq!(detail.members.len(), 2);
        assert_eq!(team_of(&store, &members[0]).await, None);
    }

    #[tokio::test]
    async fn member_leaving_keeps_admin() {
        let (store, service) = setup().await;
        let (team, members) = full_team(&store, &service, 3).await;

        let outcome = service.leave(&members[2], team.id).await.unwrap();
        assert_eq!(outcome.message, "You left Alpha.");

        let detail = service.detail(team.id).await.unwrap();
        assert_eq!(detail.summary.team.admin_id, members[0].id);
        assert_eq!(detail.members.len(), 2);
    }

    #[tokio::test]
    async fn last_member_leaving_disbands_team() {
        let (store, service) = setup().await;
        let (team, members) = full_team(&store, &service, 1).await;

        let outcome = service.leave(&members[0], team.id).await.unwrap();
        assert_eq!(outcome.message, "You left Alpha. Alpha was disbanded.");

        assert!(matches!(
            service.detail(team.id).await,
            Err(RosterError::NotFound(_))
        ));
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn leaving_a_team_you_are_not_on() {
        let (store, service) = setup().await;
        let (team, _) = full_team(&store, &service, 1).await;
        let bob = add_user(&store, "Bob").await;

        assert!(matches!(
            service.leave(&bob, team.id).await,
            Err(RosterError::Conflict(ref m)) if m == NOT_A_MEMBER
        ));
        assert!(matches!(
            service.leave(&bob, TeamId::new(404)).await,
            Err(RosterError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn only_admin_may_delete() {
        let (store, service) = setup().await;
        let (team, members) = full_team(&store, &service, 3).await;

        assert!(matches!(
            service.delete(&members[1], team.id).await,
            Err(RosterError::NotAuthorized(_))
        ));

        let outcome = service.delete(&members[0], team.id).await.unwrap();
        assert_eq!(outcome.message, "Alpha has been deleted.");

        for member in &members {
            assert_eq!(team_of(&store, member).await, None);
        }
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rename_rules() {
        let (store, service) = setup().await;
        let (team, members) = full_team(&store, &service, 2).await;
        let carol = add_user(&store, "Carol").await;
        service
            .create_or_join(&carol, TeamRegistration::create("Beta", false))
            .await
            .unwrap();

        assert!(matches!(
            service.rename(&members[1], team.id, "Gamma").await,
            Err(RosterError::NotAuthorized(_))
        ));
        assert!(matches!(
            service.rename(&members[0], team.id, &"x".repeat(63)).await,
            Err(RosterError::Validation(_))
        ));
        assert!(matches!(
            service.rename(&members[0], team.id, "Beta").await,
            Err(RosterError::Conflict(_))
        ));
        assert_eq!(service.detail(team.id).await.unwrap().summary.team.name, "Alpha");

        let outcome = service.rename(&members[0], team.id, " Gamma ").await.unwrap();
        assert_eq!(outcome.message, "Team renamed to Gamma.");
        assert_eq!(outcome.team.name, "Gamma");
        assert_eq!(service.detail(team.id).await.unwrap().summary.team.name, "Gamma");
    }

    #[tokio::test]
    async fn list_orders_by_name_with_counts() {
        let (store, service) = setup().await;
        full_team(&store, &service, 2).await;
        let zed = add_user(&store, "Zed").await;
        service
            .create_or_join(&zed, TeamRegistration::create("Aardvarks", false))
            .await
            .unwrap();

        let teams = service.list().await.unwrap();
        let names: Vec<_> = teams.iter().map(|t| t.team.name.as_str()).collect();
        assert_eq!(names, ["Aardvarks", "Alpha"]);
        assert_eq!(teams[0].member_count, 1);
        assert_eq!(teams[1].member_count, 2);
        assert_eq!(teams[1].capacity, CAPACITY);
    }

    #[tokio::test]
    async fn vanished_actor_is_not_authenticated() {
        let (_store, service) = setup().await;
        let ghost = Actor {
            id: UserId::new(77),
            name: "Ghost".to_string(),
            is_admin: false,
        };

        assert!(matches!(
            service
                .create_or_join(&ghost, TeamRegistration::create("Alpha", false))
                .await,
            Err(RosterError::NotAuthenticated)
        ));
    }
}
