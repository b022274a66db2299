use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::models::Principal;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let principal = state
        .auth_service
        .authenticate(&body.username, &body.password)
        .await
        .map_err(ApiError::from)?;

    let (token, expires_at) = state
        .auth_service
        .issue_login_token(&principal)
        .map_err(ApiError::from)?;

    tracing::info!(username = %principal.user.username, "User logged in");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData::new(&principal, token, expires_at),
    ))
}

/// HTTP request body for a login attempt (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    pub expires_at: i64,
    pub username: String,
    pub roles: Vec<String>,
    pub is_active: bool,
}

impl LoginResponseData {
    fn new(principal: &Principal, token: String, expires_at: i64) -> Self {
        Self {
            token,
            expires_at,
            username: principal.user.username.to_string(),
            roles: principal.roles.iter().cloned().collect(),
            is_active: principal.user.active,
        }
    }
}
