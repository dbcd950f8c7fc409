//! `curator-api` binary entrypoint.
//!
//! Loads configuration from environment variables and starts the HTTP
//! server.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use anyhow::Result;

use curator_api::config::Config;
use curator_api::server::Server;
use curator_core::observability::{LogFormat, init_logging};

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(choose_log_format(&config));

    tracing::info!(
        router = %config.router_url(),
        registry = %config.registry(),
        "Starting Curator API"
    );
    if config.debug {
        tracing::warn!("Debug mode: preferred tags are held in memory only");
    }

    let server = Server::from_config(config);
    server.serve().await?;
    Ok(())
}
