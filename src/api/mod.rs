use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{MethodRouter, delete, get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{
    Expiry, MemoryStore, SessionManagerLayer, SessionStore, cookie::SameSite,
    session_store::ExpiredDeletion,
};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::{Config, ServerConfig};
use crate::services::{AuthService, MessageService, TeamService};
use crate::state::SharedState;

pub mod auth;
mod error;
mod messages;
mod observability;
mod system;
mod teams;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn team_service(&self) -> &Arc<dyn TeamService> {
        &self.shared.team_service
    }

    #[must_use]
    pub fn message_service(&self) -> &Arc<dyn MessageService> {
        &self.shared.message_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Builds the full application router. Sessions live in memory unless
/// `server.persist_sessions` is set, in which case they share the SQLite pool.
pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let server = state.config().read().await.server.clone();

    if server.persist_sessions {
        let pool = state.store().conn.get_sqlite_connection_pool().clone();
        let session_store = SqliteStore::new(pool);
        session_store.migrate().await?;

        tokio::task::spawn(
            session_store
                .clone()
                .continuously_delete_expired(tokio::time::Duration::from_secs(60)),
        );

        Ok(build_router(state, session_layer(session_store, &server), &server))
    } else {
        let session_store = MemoryStore::default();
        Ok(build_router(state, session_layer(session_store, &server), &server))
    }
}

fn session_layer<S: SessionStore + Clone>(
    store: S,
    server: &ServerConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_secure(server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )))
}

fn build_router<S: SessionStore + Clone>(
    state: Arc<AppState>,
    session_layer: SessionManagerLayer<S>,
    server: &ServerConfig,
) -> Router {
    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(system::health))
        .route("/stats", get(system::stats))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/messages",
            get(messages::timeline).merge(authenticated(
                &state,
                post(messages::post_message),
            )),
        )
        .layer(session_layer)
        .with_state(state.clone());

    let cors_origins = &server.cors_allowed_origins;
    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(
            cors_layer
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http().make_span_with(observability::make_span))
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn authenticated(
    state: &Arc<AppState>,
    route: MethodRouter<Arc<AppState>>,
) -> MethodRouter<Arc<AppState>> {
    route.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::auth_middleware,
    ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", delete(users::delete_user))
        .route("/users/{id}/shirt-size", put(users::update_shirt_size))
        .route("/teams", get(teams::list_teams))
        .route("/teams/joinable", get(teams::joinable_teams))
        .route("/teams/register", post(teams::register_team))
        .route("/teams/{id}", get(teams::get_team))
        .route("/teams/{id}", delete(teams::delete_team))
        .route("/teams/{id}/leave", post(teams::leave_team))
        .route("/teams/{id}/name", put(teams::rename_team))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
