mod config;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use config::ServerConfig;
use picrate_adapters::{
    Base64PathCodec, ImageRootPaths, JsonTaskStore, LocalFileProbe, WalkdirImageScanner,
};
use picrate_application::{ApplicationService, TaskRepository};
use picrate_drivers::{build_router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::parse();
    info!("starting picrate v{}", env!("CARGO_PKG_VERSION"));
    info!("image root: {}", config.image_root.display());
    info!("data dir: {}", config.data_dir.display());

    let service = build_service(&config)?;
    let state = AppState::new(Arc::new(service));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("picrate listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_service(config: &ServerConfig) -> Result<ApplicationService> {
    let paths = ImageRootPaths::new(config.image_root.clone());
    let store = JsonTaskStore::new(config.data_dir.clone(), Box::new(paths.clone()));
    store.initialize()?;

    Ok(ApplicationService::new(
        Box::new(store),
        Box::new(WalkdirImageScanner),
        Box::new(paths),
        Box::new(Base64PathCodec),
        Box::new(LocalFileProbe),
    ))
}
