use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ecovila::{
    catalog::Catalog,
    config::{ConfigLoader, ServerConfig},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Ecovila classroom economy game server")]
struct Cli {
    /// Path to a YAML server config (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Directory holding the built client bundle
    #[arg(long, default_value = "dist")]
    dist_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let server = match &cli.config {
        Some(path) => ConfigLoader::new(".").load(path)?,
        None => ServerConfig::default(),
    };

    web::run(WebServerConfig {
        server,
        catalog: Catalog::standard(),
        dist_dir: cli.dist_dir,
        host: cli.host,
        port: cli.port,
    })
    .await
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();
}
