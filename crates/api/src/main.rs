//! API server entry point.

use std::time::Duration;

use api::config::{Config, LogFormat};
use ledger::{AuditLedger, CsvLedger};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve<L, S>(config: &Config, ledger: L, store: S, metrics_handle: PrometheusHandle)
where
    L: AuditLedger + 'static,
    S: OrderStore + 'static,
{
    let state = api::create_state(ledger, store);
    let sweeper = state.sessions.spawn_idle_sweeper(
        config.session_idle_timeout,
        SESSION_SWEEP_INTERVAL.min(config.session_idle_timeout),
    );
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, ledger = %config.ledger_path.display(), "starting POS order service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    sweeper.abort();
    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Configuration and tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Audit ledger
    let ledger = CsvLedger::new(&config.ledger_path);

    // 4. Order store, then serve
    match config.database_url.as_deref() {
        Some(url) => {
            let store =
                PostgresOrderStore::connect(url, config.db_max_connections, config.store_timeout)
                    .await
                    .expect("failed to connect to order store");
            store
                .ensure_schema()
                .await
                .expect("failed to create order store schema");
            serve(&config, ledger, store, metrics_handle).await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, submitted orders are kept in memory only");
            serve(&config, ledger, InMemoryOrderStore::new(), metrics_handle).await;
        }
    }
}
