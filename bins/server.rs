use std::process::ExitCode;

use configs::AppConfig;
use tracing::{error, info};
use uuid::Uuid;

/// Tokio runtime sized by `server.worker_threads`.
fn build_runtime(worker_threads: Option<usize>) -> std::io::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    builder.build()
}

fn main() -> ExitCode {
    // .env may carry RUST_LOG and DATABASE_URL, so it goes first.
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_default();

    let instance = Uuid::new_v4();
    std::panic::set_hook(Box::new(move |info| {
        error!(%instance, message = %info, "unhandled panic");
    }));

    let cfg = match AppConfig::load_or_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %format!("{e:#}"), "configuration rejected, not starting");
            return ExitCode::FAILURE;
        }
    };

    let rt = match build_runtime(cfg.server.worker_threads) {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        %instance,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        threads = cfg.server.worker_threads.unwrap_or_default(),
        db_sqlite = cfg.database.is_sqlite(),
        "yatube starting"
    );

    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(%instance, "yatube stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(%instance, error = %format!("{e:#}"), "yatube exited with an error");
            ExitCode::FAILURE
        }
    }
}
