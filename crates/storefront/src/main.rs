//! Lucid Storefront - JSON API for the storefront web client.
//!
//! This binary serves the catalog, session cart, accounts and waitlist on
//! port 5003, moving up to the next free port when that one is taken.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - tower-sessions cookie sessions (cart ownership and login state)
//! - Storage behind a trait: in-memory or `PostgreSQL` (`LUCID_STORAGE`)
//! - Sentry for error tracking, `tracing` for logs

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use sentry::integrations::tracing as sentry_tracing;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lucid_storefront::config::{StorageBackend, StorefrontConfig};
use lucid_storefront::db::{
    self, memory::MemoryStorage, postgres::PgStorage, sessions::MemorySessionStore,
};
use lucid_storefront::state::AppState;
use lucid_storefront::{app, server};

/// How often expired sessions are purged from the session store.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lucid_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(config).await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run(config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        server::bind_with_fallback(config.host, config.port, config.port_attempts).await?;
    let addr = listener.local_addr()?;

    let router = match config.storage {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage; data is lost on restart");
            let session_store = MemorySessionStore::default();
            tokio::spawn(
                session_store
                    .clone()
                    .continuously_delete_expired(SESSION_CLEANUP_INTERVAL),
            );

            let state = AppState::new(config, Arc::new(MemoryStorage::seeded()));
            app::build(state, session_store)?
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .clone()
                .ok_or("LUCID_DATABASE_URL is required for postgres storage")?;
            let pool = db::create_pool(&database_url).await?;
            tracing::info!("Database pool created");

            // NOTE: Migrations are NOT run automatically on startup.
            // Run them explicitly via: cargo run -p lucid-cli -- migrate

            let session_store = PostgresStore::new(pool.clone());
            tokio::spawn(
                session_store
                    .clone()
                    .continuously_delete_expired(SESSION_CLEANUP_INTERVAL),
            );

            let state = AppState::new(config, Arc::new(PgStorage::new(pool)));
            app::build(state, session_store)?
        }
    };

    tracing::info!("storefront listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    Ok(())
}
