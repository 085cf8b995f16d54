use anyhow::Context;

use urbantales_api::{build_router, config::AppConfig, initialize_app_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let app_state = initialize_app_state(&config)
        .await
        .context("failed to initialize services")?;

    let app = build_router(app_state);
    start_server(app, &config.bind_address()).await
}

async fn start_server(app: axum::Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("🚀 Server starting on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
