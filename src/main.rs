mod config;
mod logging;
mod mcp;
mod router;
mod store;

use dotenv::dotenv;
use std::{process::ExitCode, sync::Arc};
use tracing::{error, info};

use crate::config::Config;
use crate::router::router::create_router;
use crate::store::store::{ActivityStore, JsonFileStore};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    logging::init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let addr = match config.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = Arc::new(JsonFileStore::new(&config.activities_file));
    info!(
        "Loaded {} activities from {}",
        store.load().len(),
        store.path().display()
    );

    let app = create_router(store, &config.static_dir);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Could not bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server starting on {}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
