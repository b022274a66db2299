use std::sync::Arc;

use anyhow::Error;
use auth::TokenSigner;
use chrono::Duration;
use identity_service::config::Config;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::registration::service::RegistrationService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::PostgresRegistrationTokenRepository;
use identity_service::outbound::repositories::PostgresRoleAssignmentRepository;
use identity_service::outbound::repositories::PostgresRoleRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use identity_service::scheduler;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_expiration_hours = config.jwt.expiration_hours,
        token_expiration_hours = config.registration.token_expiration_hours,
        service_auth_secrets = config.service_auth.secrets.len(),
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let signer = Arc::new(TokenSigner::new(config.jwt.secret.as_bytes()));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let role_repository = Arc::new(PostgresRoleRepository::new(pg_pool.clone()));
    let assignment_repository = Arc::new(PostgresRoleAssignmentRepository::new(pg_pool.clone()));
    let token_repository = Arc::new(PostgresRegistrationTokenRepository::new(pg_pool));

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repository),
        Arc::clone(&assignment_repository),
        Arc::clone(&signer),
        Duration::hours(config.jwt.expiration_hours),
    ));

    let registration_service = Arc::new(RegistrationService::new(
        token_repository,
        user_repository,
        role_repository,
        assignment_repository,
        Duration::hours(config.registration.token_expiration_hours),
    ));

    scheduler::spawn_token_cleanup(Arc::clone(&registration_service));
    tracing::info!(cadence = "daily", "Registration token cleanup scheduled");

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(address = %http_address, "Server Listening");

    let application = create_router(
        auth_service,
        registration_service,
        signer,
        Arc::new(config.service_auth.secrets),
    );

    axum::serve(listener, application).await?;

    Ok(())
}
