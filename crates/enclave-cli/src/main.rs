//! Enclave CLI application
//!
//! Inspect how a sandbox config resolves for a workspace:
//!
//! ```bash
//! enclave validate
//! enclave resolve --path services/api
//! enclave check-call deploy -- --env=dev
//! ```

mod args;
mod commands;
mod console;
mod router;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence; --verbose raises the default to debug
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    router::route(cli)
}
