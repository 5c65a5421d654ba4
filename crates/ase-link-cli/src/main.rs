//! All Seeing Eye CLI - locate nodes on the local network and address them
//! by IP, hostname, or description.
//!
//! Known nodes are kept in a registry file so later commands do not need to
//! rediscover them.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let registry = commands::open_registry(cli.registry)?;
    tracing::debug!(registry = %registry.path().display(), "Using host registry");

    match cli.command {
        Commands::Discover(args) => commands::run_discover(args, registry, cli.json).await,
        Commands::List => commands::run_list(registry, cli.json).await,
        Commands::Resolve(args) => commands::run_resolve(args.query, registry, cli.json).await,
        Commands::Request(args) => {
            commands::run_request(args, registry, cli.timeout, cli.json).await
        }
        Commands::BleRanging(args) => {
            commands::run_ble_ranging(args, registry, cli.timeout, cli.json).await
        }
    }
}
