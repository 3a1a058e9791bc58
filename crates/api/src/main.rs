//! API server entry point.

use api::config::Config;
use course_store::{CourseStore, InMemoryCourseStore, PostgresCourseStore};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

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

async fn serve<S: CourseStore + Clone + 'static>(
    config: &Config,
    store: S,
    metrics_handle: PrometheusHandle,
) {
    let app = api::build_app(config, store, metrics_handle).expect("invalid API_TOKEN_HEADER");

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Load .env (if present) and configuration
    let dotenv = dotenvy::dotenv();
    let config = Config::from_env();

    // 2. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "loaded environment file");
    }

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 4. Pick the course store and start serving
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await
                .expect("failed to connect to database");

            let mut store = PostgresCourseStore::new(pool);
            if let Some(schema) = &config.table_schema {
                store = store
                    .with_schema(schema)
                    .expect("invalid COURSES_TABLE_SCHEMA");
            }
            store
                .ensure_table()
                .await
                .expect("failed to create courses table");
            tracing::info!(table = %store.table(), "using PostgreSQL course store");

            serve(&config, store, metrics_handle).await;
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; using in-memory course store");
            serve(&config, InMemoryCourseStore::new(), metrics_handle).await;
        }
    }
}
