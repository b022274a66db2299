use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::registration::models::RegistrationToken;
use crate::inbound::http::router::AppState;

pub async fn validate_registration_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<ApiSuccess<ValidateTokenResponseData>, ApiError> {
    state
        .registration_service
        .validate(&token)
        .await
        .map_err(ApiError::from)
        .map(|ref token| ApiSuccess::new(StatusCode::OK, token.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateTokenResponseData {
    pub email: String,
    pub valid: bool,
}

impl From<&RegistrationToken> for ValidateTokenResponseData {
    fn from(token: &RegistrationToken) -> Self {
        Self {
            email: token.email.to_string(),
            valid: true,
        }
    }
}
