//! Touristoo Back binary entrypoint wiring the REST API and the storage
//! supervisor together.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use touristoo_back::{
    config::AppConfig,
    routes,
    state::{AppState, SharedState},
};

#[cfg(feature = "postgres-store")]
use touristoo_back::{
    dao::data_store::{DataStore, postgres::PostgresStore},
    services::storage_supervisor,
};

#[cfg(not(feature = "postgres-store"))]
use touristoo_back::dao::data_store::memory::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    tokio::spawn(run_storage_supervisor(app_state.clone()));
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Keep the PostgreSQL connection supervised; the API runs degraded until it
/// is up.
#[cfg(feature = "postgres-store")]
async fn run_storage_supervisor(state: SharedState) {
    let database_url = state.config().database_url.clone();
    storage_supervisor::run(state, move || {
        let database_url = database_url.clone();
        async move {
            let store = PostgresStore::connect(&database_url).await?;
            Ok(Arc::new(store) as Arc<dyn DataStore>)
        }
    })
    .await;
}

/// Without the postgres backend the in-memory store is installed directly;
/// it can never go unhealthy.
#[cfg(not(feature = "postgres-store"))]
async fn run_storage_supervisor(state: SharedState) {
    state
        .install_data_store(Arc::new(MemoryStore::new()))
        .await;
    info!("installed in-memory store");
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
