use std::sync::Arc;
use std::time::Duration;

use auth::TokenSigner;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::generate_registration_token;
use super::handlers::login;
use super::handlers::register;
use super::handlers::validate_registration_token;
use super::middleware as auth_middleware;
use crate::domain::auth::service::AuthService;
use crate::domain::registration::service::RegistrationService;
use crate::outbound::repositories::registration_token::PostgresRegistrationTokenRepository;
use crate::outbound::repositories::role::PostgresRoleAssignmentRepository;
use crate::outbound::repositories::role::PostgresRoleRepository;
use crate::outbound::repositories::user::PostgresUserRepository;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService<PostgresUserRepository, PostgresRoleAssignmentRepository>>,
    pub registration_service: Arc<
        RegistrationService<
            PostgresRegistrationTokenRepository,
            PostgresUserRepository,
            PostgresRoleRepository,
            PostgresRoleAssignmentRepository,
        >,
    >,
    pub signer: Arc<TokenSigner>,
    pub service_auth_secrets: Arc<Vec<String>>,
}

pub fn create_router(
    auth_service: Arc<AuthService<PostgresUserRepository, PostgresRoleAssignmentRepository>>,
    registration_service: Arc<
        RegistrationService<
            PostgresRegistrationTokenRepository,
            PostgresUserRepository,
            PostgresRoleRepository,
            PostgresRoleAssignmentRepository,
        >,
    >,
    signer: Arc<TokenSigner>,
    service_auth_secrets: Arc<Vec<String>>,
) -> Router {
    let state = AppState {
        auth_service,
        registration_service,
        signer,
        service_auth_secrets,
    };

    // Login, signup, and token validation are reachable without a
    // bearer token; only issuing registration tokens is privileged.
    let public_routes = Router::new()
        .route("/login", post(login))
        .route("/signup", post(register))
        .route("/auth/token/:token", get(validate_registration_token));

    let privileged_routes = Router::new()
        .route("/auth/token", post(generate_registration_token))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::authenticate,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(privileged_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
