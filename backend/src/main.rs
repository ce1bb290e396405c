// SessionGate Server entrypoint
//!
//! Loading configuration, logging and the server lifecycle live in dedicated
//! modules so this file remains a thin orchestrator.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use sessiongate_configs::{ServerConfig, ENV_CONFIG_PATH};
use sessiongate_server::lifecycle::{bootstrap, run};
use sessiongate_server::logging;

/// Forward-auth session gate for reverse proxies
#[derive(Parser, Debug)]
#[command(name = "sessiongate")]
#[command(version)]
#[command(about = "Authorizes proxied requests against server-side sessions", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long = "config", env = ENV_CONFIG_PATH, default_value = "config.toml")]
    config: PathBuf,
}

#[actix_web::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = start(&args).await {
        eprintln!("❌ FATAL: {:#}", e);
        log::error!("Server cannot start: {:#}", e);
        std::process::exit(1);
    }
}

async fn start(args: &Args) -> Result<()> {
    let config = ServerConfig::from_file(&args.config)?;
    eprintln!(
        "✅ Loaded config from: {}",
        std::fs::canonicalize(&args.config)
            .unwrap_or_else(|_| args.config.clone())
            .display()
    );

    // Logging before any other side effects
    logging::init_logging(&config.logging)?;

    info!("SessionGate v{}", env!("CARGO_PKG_VERSION"));
    info!("Host: {}  Port: {}", config.server.host, config.server.port);

    let components = bootstrap(&config).await?;
    run(&config, components).await
}
