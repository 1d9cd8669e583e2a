use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use service::customer::{CustomerRepository, InMemoryCustomerRepository};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Config file when present and valid, otherwise environment variables.
pub fn load_config() -> AppConfig {
    match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config file unavailable, using environment");
            AppConfig::from_env()
        }
    }
}

/// Build the repository described by the storage config.
pub async fn build_repository(cfg: &AppConfig) -> Result<Arc<dyn CustomerRepository>, StartupError> {
    let repo: Arc<dyn CustomerRepository> = match &cfg.storage.data_file {
        Some(path) => Arc::new(InMemoryCustomerRepository::with_snapshot(path.clone()).await?),
        None => {
            info!("no data file configured; customers live in memory only");
            Arc::new(InMemoryCustomerRepository::new())
        }
    };
    Ok(repo)
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {raw}: {e}")))
}

/// Load `.env`, then install the tracing subscriber. Call once, before anything logs.
pub fn init_environment() {
    dotenv().ok();
    init_logging_from_env();
}

/// Worker count for the runtime: the configured value when positive, tokio's default otherwise.
pub fn worker_threads(cfg: &AppConfig) -> Option<usize> {
    cfg.server.worker_threads.filter(|w| *w > 0)
}

/// Multi-threaded runtime sized from `cfg`.
pub fn build_runtime(cfg: &AppConfig) -> std::io::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads(cfg) {
        builder.worker_threads(w);
    }
    builder.build()
}

/// Build the app described by `cfg` and serve it until the listener fails.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let customers = build_repository(&cfg).await?;
    let app: Router = routes::build_router(ServerState::new(customers), build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting customer server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
