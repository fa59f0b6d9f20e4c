use axum::{
    Extension, Json,
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, LoginRequest, UserDto};
use crate::constants::session::USER_ID_KEY;
use crate::domain::UserId;
use crate::models::user::{Actor, User};
use crate::services::Registration;

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session's user into an [`Actor`] request extension.
///
/// A session pointing at a deleted user is flushed and treated as anonymous.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = session
        .get::<i32>(USER_ID_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .map(UserId::new);

    let Some(user_id) = user_id else {
        return Err(ApiError::unauthenticated());
    };

    let Some(user) = state.auth_service().current_actor(user_id).await? else {
        tracing::warn!(user_id = %user_id, "Session refers to a deleted user");
        let _ = session.flush().await;
        return Err(ApiError::unauthenticated());
    };

    tracing::Span::current().record("user_id", user.id.value());
    request.extensions_mut().insert(Actor::from(&user));
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

async fn start_session(session: &Session, user: &User) -> Result<(), ApiError> {
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(USER_ID_KEY, user.id.value())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

/// POST /auth/register
/// Create an account and log it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<Registration>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.auth_service().register(payload).await?;
    start_session(&session, &user).await?;

    Ok(Json(ApiResponse::with_message(
        UserDto::private(user),
        "You were successfully registered and logged in",
    )))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .auth_service()
        .verify(&payload.email, &payload.password)
        .await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(ApiResponse::with_message(
        UserDto::private(user),
        "You were logged in",
    )))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    Json(ApiResponse::message("You were logged out"))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.auth_service().get_user(actor.id).await?;
    Ok(Json(ApiResponse::success(UserDto::private(user))))
}
