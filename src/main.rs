use clap::Parser;
use headline_search::{
    routes::{init_tracing, make_app},
    utils::{
        config::{Cli, Config},
        state::AppState,
    },
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("Initializing application...");
    let config = Config::init(Cli::parse())?;
    info!("Configuration loaded successfully");

    let state = AppState::init(config)?;
    let shutdown = state.shutdown.clone();
    let addr = state.config.bind_addr();
    let app = make_app(state.clone());

    let listener = TcpListener::bind(&addr).await?;
    info!(
        "Application is listening on http://{} at {}",
        addr,
        chrono::Utc::now().to_rfc3339()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    let cache = state.news.cache();
    info!(
        "Stopped with {} cached responses ({} hits, {} misses)",
        cache.len(),
        cache.hits(),
        cache.misses()
    );

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down, cancelling in-flight fetches");
    shutdown.cancel();
}
