use std::sync::Arc;

use reelgate::{
    common::{
        AnyResult,
        banner::{BannerInfo, RuntimeInfo, print_banner},
        logger,
    },
    configs::Config,
    server::AppState,
    transport,
};
use tracing::info;

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    logger::init(&config);

    let state = Arc::new(AppState::from_config(config)?);
    let address = state.config.server.address();

    print_banner(
        &BannerInfo::default(),
        &RuntimeInfo {
            address: &address,
            target: state.config.resolver.target.as_str(),
            providers: state.source_names.len(),
        },
    );

    if state.source_names.is_empty() {
        tracing::warn!("No providers configured, every lookup will return 404");
    }

    let app = transport::http_server::router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Backend running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
