use anyhow::{Context, Result};
use clap::Parser;
use osintviz_api::Server;
use osintviz_core::{ConfigManager, LoggingConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "osintviz-server")]
#[command(about = "OSINT visualizer search API", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./.osintviz.toml, then ~/.osintviz/config.toml)
    #[arg(short, long, env = "OSINTVIZ_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut manager = match &cli.config {
        Some(path) => ConfigManager::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ConfigManager::load().context("loading configuration")?,
    };

    {
        let config = manager.config_mut();
        if let Some(host) = cli.host {
            config.server.host = host;
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(level) = cli.log_level {
            config.logging.level = level;
        }
    }
    ConfigManager::validate_config(manager.config()).context("invalid configuration")?;

    init_tracing(&manager.config().logging);
    if let Some(path) = manager.config_path() {
        info!("Using config file {}", path.display());
    }

    let server = Server::new(manager.config())
        .await
        .context("binding server listener")?;
    server.run().await?;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "osintviz_api={level},osintviz_core={level},tower_http={level}",
            level = logging.level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "compact" {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}
