//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pos_backoffice::{
    config::{AppState, Config},
    routes,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    tracing::info!(?config, "configuration loaded");
    let bind_addr = config.bind_addr;

    let app_state = AppState::new(config).await?;
    let app = routes::router(app_state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
