use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, MembershipLock, MessageService, SeaOrmAuthService, SeaOrmMessageService,
    SeaOrmTeamService, TeamService,
};

/// Services shared by the HTTP server and the CLI commands.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub team_service: Arc<dyn TeamService>,

    pub message_service: Arc<dyn MessageService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires the services over an already connected store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        // One lock for every path that changes team membership.
        let membership_lock = MembershipLock::new();

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
            config.registration.clone(),
            membership_lock.clone(),
        ));
        let team_service = Arc::new(SeaOrmTeamService::new(store.clone(), membership_lock));
        let message_service = Arc::new(SeaOrmMessageService::new(store.clone()));

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            team_service,
            message_service,
        }
    }
}
