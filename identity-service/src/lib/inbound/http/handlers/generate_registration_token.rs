use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::registration::models::RegistrationToken;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::middleware::SERVICE_ROLE;
use crate::inbound::http::router::AppState;

/// Roles allowed to issue registration invitations.
const ISSUER_ROLES: &[&str] = &["ROLE_HR", SERVICE_ROLE];

pub async fn generate_registration_token(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(body): Json<GenerateTokenRequest>,
) -> Result<ApiSuccess<GenerateTokenResponseData>, ApiError> {
    if !current_user.has_any_role(ISSUER_ROLES) {
        tracing::warn!(
            username = %current_user.username,
            "Registration token request without issuing privileges"
        );
        return Err(ApiError::Forbidden(
            "Insufficient privileges to issue registration tokens".to_string(),
        ));
    }

    let email = EmailAddress::new(body.email)
        .map_err(|e| ApiError::UnprocessableEntity(format!("email: {}", e)))?;

    let issuer = Username::new(current_user.username.clone())
        .map_err(|e| ApiError::BadRequest(format!("issuer: {}", e)))?;

    state
        .registration_service
        .generate(&email, &issuer)
        .await
        .map_err(ApiError::from)
        .map(|ref token| ApiSuccess::new(StatusCode::CREATED, token.into()))
}

/// HTTP request body for issuing a registration token (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerateTokenRequest {
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateTokenResponseData {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub message: String,
}

impl From<&RegistrationToken> for GenerateTokenResponseData {
    fn from(token: &RegistrationToken) -> Self {
        Self {
            token: token.token.clone(),
            expires_at: token.expires_at,
            message: "Registration token generated and sent via email.".to_string(),
        }
    }
}
