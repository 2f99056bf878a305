use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::{runtime, BlogService};

use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Connect, migrate and assemble the router for `cfg`.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    runtime::ensure_env(&cfg.server.media_dir).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;

    let state = ServerState { blog: BlogService::from_config(db, cfg) };
    Ok(routes::build_router(state, build_cors()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; shutdown only by termination");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections");
}

/// Serve `cfg` until Ctrl+C, letting in-flight requests finish.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, cache_ttl_secs = cfg.cache.ttl_secs, per_page = cfg.pagination.per_page, "starting yatube server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
