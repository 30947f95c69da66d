use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solarbos_api::config::{ConfigError, ServerConfig};
use solarbos_api::error::AppError;
use solarbos_api::router::build_app_router;
use solarbos_api::state::AppState;
use solarbos_core::{DocumentStore, InMemoryStore};
use solarbos_db::PgDocumentStore;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("document store unavailable: {0}")]
    Store(#[from] AppError),
    #[error("server i/o: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "solarbos_api=debug,solarbos_core=debug,solarbos_db=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;
    let addr = config.bind_addr();
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    let store = build_store(&config).await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to initialise the document store");
    })?;
    let app = build_app_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "BOS chain service listening");

    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };

    tokio::select! {
        result = server => result?,
        () = async {
            shutdown_signal().await;
            tokio::time::sleep(drain).await;
        } => {
            tracing::warn!(
                timeout_secs = drain.as_secs(),
                "In-flight requests did not drain in time, forcing shutdown"
            );
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// PostgreSQL when `DATABASE_URL` is set, otherwise a process-local store.
async fn build_store(config: &ServerConfig) -> Result<Arc<dyn DocumentStore>, AppError> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, documents are kept in memory and lost on restart");
        return Ok(Arc::new(InMemoryStore::new()));
    };

    let pool = solarbos_db::create_pool(database_url).await?;
    solarbos_db::health_check(&pool).await?;
    solarbos_db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::InternalError(format!("Migrations failed: {e}")))?;
    tracing::info!("Database ready, migrations applied");

    Ok(Arc::new(PgDocumentStore::new(pool)))
}

/// Resolves on SIGINT or, on Unix, SIGTERM. A handler that cannot be
/// installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
