use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use workout_log::{
    config::StoreKind,
    storage::{JsonSheetStore, MemorySheetStore, SheetStore},
    router, AppState, Config, WorkoutLog,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn SheetStore> = match config.store {
        StoreKind::Json => {
            if let Some(parent) = config.data_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            let store = JsonSheetStore::new(&config.data_path, &config.sheet_name);
            info!(path = %store.path().display(), sheet = %config.sheet_name, "using JSON workbook");
            Arc::new(store)
        }
        StoreKind::Memory => {
            info!("using in-memory store; nothing will be persisted");
            Arc::new(MemorySheetStore::new())
        }
    };

    let log = WorkoutLog::new(store, config.duration_policy);
    info!(policy = ?log.policy(), "workout log ready");
    let app = router(AppState::new(log));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
