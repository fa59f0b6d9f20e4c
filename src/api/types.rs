use serde::{Deserialize, Serialize};

use crate::domain::{ShirtSize, TeamId, UserId};
use crate::models::team::TeamSummary;
use crate::models::user::User;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// A success carrying the status line shown to the user.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }
}

/// A user as other users see them. The shirt size and email are only filled
/// in for the user themself and for site admins.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shirt_size: Option<ShirtSize>,
    pub team_id: Option<TeamId>,
    pub is_admin: bool,
    pub created_at: String,
}

impl UserDto {
    #[must_use]
    pub fn public(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: None,
            shirt_size: None,
            team_id: user.team_id,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }

    #[must_use]
    pub fn private(user: User) -> Self {
        Self {
            email: Some(user.email.clone()),
            shirt_size: Some(user.shirt_size),
            ..Self::public(user)
        }
    }
}

/// Profile page: the user, their team if any, and how often they posted.
#[derive(Debug, Serialize)]
pub struct ProfileDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub team: Option<TeamSummary>,
    pub message_count: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsDto {
    pub user_count: u64,
    pub team_count: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub database: bool,
    pub uptime_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ShirtSizeRequest {
    pub shirt_size: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameTeamRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    pub limit: Option<u64>,
}
