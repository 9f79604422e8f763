//! tplstudio - versioned editor backend for PRTG-style configuration files.
//!
//! This is the main entry point for the tplstudio server.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::Config;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tplstudio_server::{create_router, AppState, AuthConfig};
use tplstudio_store::VersionedStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tplstudio")]
#[command(author, version, about = "Versioned document store for PRTG templates", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tplstudio.json")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind to, overriding the config file
        #[arg(short, long)]
        address: Option<SocketAddr>,
    },
    /// Create namespace directories and revision histories, then exit
    Init,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(&cli.config)?;

    match cli.command {
        Some(Commands::Config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::Init) => {
            let store = VersionedStore::new(config.namespace_table());
            store.bootstrap().context("bootstrap failed")?;
            info!("namespaces initialized");
            Ok(())
        }
        Some(Commands::Serve { address }) => serve(config, address).await,
        None => serve(config, None).await,
    }
}

async fn serve(config: Config, address: Option<SocketAddr>) -> anyhow::Result<()> {
    let store = VersionedStore::new(config.namespace_table());
    store.bootstrap().context("bootstrap failed")?;

    let state = AppState::new(
        Arc::new(store),
        AuthConfig {
            username: config.auth.username.clone(),
            password: config.auth.password.clone(),
        },
    );
    let router = create_router(state);

    let address = match address {
        Some(addr) => addr,
        None => format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .context("invalid server address in config")?,
    };

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, "tplstudio listening");

    axum::serve(listener, router).await.context("server error")
}
