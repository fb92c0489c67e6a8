use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use account_service::config::Config;
use account_service::domain::auth::service::AuthService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::LoginRateLimiter;
use auth::TokenService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Period of the background pass that clears stale login attempt state.
const SWEEP_PERIOD: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_token_ttl_hours = config.auth.access_token_ttl_hours,
        refresh_token_ttl_hours = config.auth.refresh_token_ttl_hours,
        max_failed_attempts = config.auth.max_failed_attempts,
        block_duration_secs = config.auth.block_duration_secs,
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

    let token_service = Arc::new(TokenService::new(
        config.auth.jwt_secret.as_bytes(),
        chrono::Duration::hours(config.auth.access_token_ttl_hours),
        chrono::Duration::hours(config.auth.refresh_token_ttl_hours),
    ));

    let rate_limiter = Arc::new(LoginRateLimiter::new(
        config.auth.max_failed_attempts,
        Duration::from_secs(config.auth.block_duration_secs),
    ));
    tokio::spawn(Arc::clone(&rate_limiter).run_sweeper(SWEEP_PERIOD));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let auth_service = Arc::new(AuthService::new(
        user_repository,
        Arc::clone(&token_service),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, token_service, rate_limiter);
    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
