use dicebox::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("dicebox-server: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), DiceboxError> {
    let config = ServerConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!(?config, "loaded config");

    let server = DiceboxServer::builder()
        .bind(&config.addr())
        .registry_config(config.registry_config())
        .build()
        .await?;

    server.run_until(shutdown_signal()).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("could not listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
