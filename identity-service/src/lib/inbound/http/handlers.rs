use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::registration::errors::RegistrationError;

pub mod generate_registration_token;
pub mod login;
pub mod register;
pub mod validate_registration_token;

pub use generate_registration_token::generate_registration_token;
pub use login::login;
pub use register::register;
pub use validate_registration_token::validate_registration_token;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, trace_id) = match self {
            // Unanticipated failures are logged with a trace id and
            // surfaced as a generic message; internal detail stays out
            // of the response body.
            ApiError::InternalServerError(detail) => {
                let trace_id = Uuid::new_v4().to_string();
                tracing::error!(trace_id = %trace_id, detail = %detail, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The system is busy, please try again later".to_string(),
                    Some(trace_id),
                )
            }
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
        };

        (
            status,
            Json(ApiResponseBody::new_error(status, message, trace_id)),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // Unknown user and wrong password share one outward signal.
            AuthError::InvalidCredentials => {
                ApiError::NotFound("Invalid username or password.".to_string())
            }
            AuthError::AccountDisabled => ApiError::Forbidden(err.to_string()),
            AuthError::Password(_)
            | AuthError::Signing(_)
            | AuthError::Role(_)
            | AuthError::Database(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::IssuerNotFound(_)
            | RegistrationError::TokenNotFound
            | RegistrationError::TokenExpired(_)
            | RegistrationError::EmailMismatch => ApiError::BadRequest(err.to_string()),
            RegistrationError::TokenAlreadyExists => ApiError::Conflict(err.to_string()),
            RegistrationError::UserAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            RegistrationError::Password(_) | RegistrationError::Database(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String, trace_id: Option<String>) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message, trace_id },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Collects per-field validation failures for a 422 response.
///
/// Mirrors the field-level `ValidationError` contract: each failure is
/// reported as a `field: message` pair, all of them aggregated into a
/// single response instead of stopping at the first.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl ToString) {
        self.0.push((field, message.to_string()));
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            return Ok(());
        }
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join(", ");
        Err(ApiError::UnprocessableEntity(joined))
    }
}
