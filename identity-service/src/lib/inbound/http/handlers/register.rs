use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use crate::domain::registration::service::RegisterCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .registration_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// HTTP request body for employee signup (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    username: String,
    email: String,
    password: String,
    token: String,
}

impl RegisterRequest {
    /// Parse into domain value objects, reporting every invalid field
    /// rather than stopping at the first.
    fn try_into_command(self) -> Result<RegisterCommand, ApiError> {
        let mut errors = FieldErrors::new();

        let username = match Username::new(self.username) {
            Ok(username) => Some(username),
            Err(e) => {
                errors.push("username", e);
                None
            }
        };

        let email = match EmailAddress::new(self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push("email", e);
                None
            }
        };

        if self.password.len() < MIN_PASSWORD_LENGTH {
            errors.push(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }

        if self.token.trim().is_empty() {
            errors.push("token", "must not be empty");
        }

        errors.into_result()?;

        Ok(RegisterCommand {
            // Both unwraps guarded by the aggregate check above
            username: username.unwrap(),
            email: email.unwrap(),
            password: self.password,
            token: self.token,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub success: bool,
    pub message: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for RegisterResponseData {
    fn from(user: &User) -> Self {
        Self {
            success: true,
            message: "New Employee Registered".to_string(),
            username: user.username.to_string(),
            email: user.email.to_string(),
        }
    }
}
