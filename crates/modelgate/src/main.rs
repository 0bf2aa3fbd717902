use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use modelgate::config::Config;
use modelgate::llm::ProviderRegistry;
use modelgate::server::{self, AppState};

#[derive(Parser)]
#[command(name = "modelgate", version, about)]
struct Cli {
    /// Path to the YAML config file. A missing file means defaults.
    #[arg(short, long, default_value = "modelgate.yaml")]
    config: PathBuf,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // API keys may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let state = AppState {
        providers: ProviderRegistry::from_env(&config.providers),
    };
    let app = server::build_app(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("modelgate listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; serve until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
