use std::collections::BTreeSet;

use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Header carrying a shared secret for calls from trusted internal
/// services that hold no user account of their own.
pub const SERVICE_AUTH_HEADER: &str = "x-service-auth";

/// Username reported for trusted internal callers.
pub const SERVICE_PRINCIPAL: &str = "composite-service";

/// Role granted to trusted internal callers.
pub const SERVICE_ROLE: &str = "ROLE_SERVICE";

/// Identity attached to the request after authentication.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl CurrentUser {
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.roles.contains(*role))
    }
}

/// Resolves the caller's identity before privileged routes run.
///
/// A valid `x-service-auth` secret short-circuits token verification
/// and installs the fixed service principal; otherwise the bearer
/// token must verify against the signing key.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(service_caller) = verify_service_header(&state, &req) {
        req.extensions_mut().insert(service_caller);
        return Ok(next.run(req).await);
    }

    let token = extract_bearer_token(&req)?;

    let claims = state.signer.verify(token).map_err(|e| {
        tracing::warn!(error = %e, "Bearer token rejected");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(CurrentUser {
        username: claims.username,
        roles: claims.roles,
    });

    Ok(next.run(req).await)
}

fn verify_service_header(state: &AppState, req: &Request) -> Option<CurrentUser> {
    let presented = req.headers().get(SERVICE_AUTH_HEADER)?.to_str().ok()?;

    if !secret_matches(&state.service_auth_secrets, presented) {
        tracing::warn!("Service auth header present but secret not recognized");
        return None;
    }

    Some(CurrentUser {
        username: SERVICE_PRINCIPAL.to_string(),
        roles: BTreeSet::from([SERVICE_ROLE.to_string()]),
    })
}

/// Constant-time membership check for the pre-shared secret.
fn secret_matches(secrets: &[String], presented: &str) -> bool {
    secrets
        .iter()
        .any(|secret| bool::from(secret.as_bytes().ct_eq(presented.as_bytes())))
}

fn extract_bearer_token(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
    })
}
