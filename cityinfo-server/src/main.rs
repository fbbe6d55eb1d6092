//! Binary crate for the `cityinfo` relay.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Serving the HTTP API

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod api;
mod cli;
#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();

    let filter = if cmd.verbose {
        EnvFilter::new("cityinfo=debug,cityinfo_core=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    cmd.run().await
}
