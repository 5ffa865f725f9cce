//! Recipe Finder - recipe search behind a username/password login.
//!
//! This binary serves the site on `RECIPE_FINDER_HOST:RECIPE_FINDER_PORT`
//! (127.0.0.1:3000 by default).
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates for server-side rendering
//! - `SQLite` for user accounts and sessions
//! - Spoonacular API for recipe search, called per request

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::time::Duration;

use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tower_sessions::ExpiredDeletion;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipe_finder_web::config::{ConfigError, SiteConfig};
use recipe_finder_web::recipes::RecipeApiError;
use recipe_finder_web::state::AppState;
use recipe_finder_web::{app, db};

/// How often expired sessions are purged from the store.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Errors that abort startup.
#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("recipe client error: {0}")]
    RecipeClient(#[from] RecipeApiError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SiteConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from environment (needed for Sentry init)
    let config = match SiteConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Tracing is not initialized yet
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "recipe_finder_web=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: SiteConfig) -> Result<(), StartupError> {
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // The schema is tiny and additive, so it is applied on every start.
    db::run_migrations(&pool).await?;

    let store = app::session_store(&pool).await?;
    let deletion_task = tokio::task::spawn(
        store
            .clone()
            .continuously_delete_expired(SESSION_CLEANUP_INTERVAL),
    );

    let addr = config.socket_addr();
    let state = AppState::new(config, pool)?;
    let router = app::build_router(state, store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("recipe-finder listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    deletion_task.abort();
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
