use site_admin::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
    storage::{S3StorageClient, StorageService, StorageState},
};
use sqlx::postgres::PgPoolOptions;
use std::{error::Error, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Startup: configuration (fail fast), logging, database + migrations, storage, then
/// the HTTP server. The pool is closed after the server stops.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "site_admin=debug,tower_http=info,sqlx=warn".into());

    // Pretty output for local debugging, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to connect to Postgres, check DATABASE_URL"))?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");

    let postgres = Arc::new(PostgresRepository::new(pool));
    let repo: RepositoryState = postgres.clone();

    let s3_client = S3StorageClient::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
    )
    .await;

    // LOCAL-ONLY: provision the MinIO bucket for the dockerized setup.
    if config.env == Env::Local {
        s3_client.ensure_bucket_exists().await;
    }
    let storage: StorageState = Arc::new(s3_client);

    if config.health_check_bearer_token.is_none() {
        tracing::warn!("HEALTH_CHECK_BEARER_TOKEN not set, /jobs/health-check will reject all calls");
    }
    if config.today_board_reset_job_token.is_none() {
        tracing::warn!("TODAY_BOARD_RESET_JOB_TOKEN not set, /jobs/today-board will reject all calls");
    }

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(repo, storage, config));

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    postgres.close().await;
    tracing::info!("database pool closed, bye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
