//! HomeBridgr — caption-analysis backend server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("HOMEBRIDGR_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = homebridgr_core::HomeBridgrConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = homebridgr_store::SqliteStore::open(&config.data_paths.records)
        .map_err(|e| anyhow::anyhow!("Failed to open record store: {}", e))?;

    // The Bedrock client resolves its region and credentials on first use;
    // an unconfigured deployment still serves posts and reports 501 on
    // analysis requests.
    let transport = Arc::new(homebridgr_bedrock::BedrockClient::new());
    let analyzer = homebridgr_analysis::CaptionAnalyzer::new(transport);

    let state = Arc::new(AppState::new(config, Arc::new(store), analyzer));

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HomeBridgr server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
