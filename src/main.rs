//! dnd-near - dice roller and weapon calculator daemon

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dnd_near::{Config, Server};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// dnd-near server
#[derive(Parser, Debug)]
#[command(name = "dnd-near", version, about = "Dice roller and weapon calculator")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// SQLite database file (overrides config; in-memory when unset)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Number of history entries to keep (overrides config)
    #[arg(long)]
    history_limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dnd_near=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(database) = args.database {
        config.db_path = Some(database.to_string_lossy().into_owned());
    }
    if let Some(limit) = args.history_limit {
        config.history_limit = limit;
    }
    info!(?config, "Configuration loaded");

    let server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
