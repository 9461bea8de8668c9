use std::sync::Arc;

use bcard_service::config::Config;
use bcard_service::config::StorageBackend;
use bcard_service::domain::card::ports::CardServicePort;
use bcard_service::domain::card::service::CardService;
use bcard_service::domain::clock::Clock;
use bcard_service::domain::clock::SystemClock;
use bcard_service::domain::user::ports::UserServicePort;
use bcard_service::domain::user::service::UserService;
use bcard_service::inbound::http::router::create_router;
use bcard_service::inbound::http::router::AppState;
use bcard_service::outbound::repositories::InMemoryRepository;
use bcard_service::outbound::repositories::PostgresCardRepository;
use bcard_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bcard_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "bcard-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        environment = %config.environment,
        storage = ?config.storage,
        http_port = config.server.http_port,
        allowed_origins = ?config.server.allowed_origins,
        max_login_attempts = config.auth.max_login_attempts,
        lock_hours = config.auth.lock_hours,
        token_expiry = %config.auth.token_expiry,
        "Configuration loaded"
    );

    let token_issuer = Arc::new(config.auth.token_issuer()?);
    let password_hasher = config.auth.password_hasher()?;
    let policy = config.auth.lockout_policy()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut pg_pool: Option<PgPool> = None;
    let (user_service, card_service): (Arc<dyn UserServicePort>, Arc<dyn CardServicePort>) =
        match config.storage {
            StorageBackend::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database.max_connections)
                    .connect(&config.database.url)
                    .await?;
                tracing::info!(
                    max_connections = config.database.max_connections,
                    database = "postgresql",
                    "Database connection pool created"
                );

                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!(database = "postgresql", "Database migrations completed");

                let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
                let card_repository = Arc::new(PostgresCardRepository::new(pool.clone()));
                pg_pool = Some(pool);

                let user_service: Arc<dyn UserServicePort> = Arc::new(UserService::new(
                    user_repository,
                    Arc::clone(&token_issuer),
                    password_hasher,
                    policy,
                    Arc::clone(&clock),
                ));
                let card_service: Arc<dyn CardServicePort> =
                    Arc::new(CardService::new(card_repository, Arc::clone(&clock)));
                (user_service, card_service)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on shutdown");
                let repository = Arc::new(InMemoryRepository::new());

                let user_service: Arc<dyn UserServicePort> = Arc::new(UserService::new(
                    Arc::clone(&repository),
                    Arc::clone(&token_issuer),
                    password_hasher,
                    policy,
                    Arc::clone(&clock),
                ));
                let card_service: Arc<dyn CardServicePort> =
                    Arc::new(CardService::new(repository, Arc::clone(&clock)));
                (user_service, card_service)
            }
        };

    let state = AppState {
        user_service,
        card_service,
        token_issuer,
        clock,
        environment: config.environment.clone(),
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(state, &config.server.allowed_origins);
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pg_pool {
        pool.close().await;
        tracing::info!(database = "postgresql", "Database connection pool closed");
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
