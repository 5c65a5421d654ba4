//! Discover command implementation.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use ase_link_core::discovery::{Discovery, DiscoveryOptions};
use ase_link_core::storage::HostRegistry;

use crate::cli::DiscoverArgs;
use crate::error::CliError;
use crate::output::get_formatter;

fn discovery_options(args: &DiscoverArgs) -> Result<DiscoveryOptions, CliError> {
    if args.no_mdns && args.no_scan {
        return Err(CliError::InvalidArgument(
            "--no-mdns and --no-scan together leave nothing to discover with".to_string(),
        ));
    }
    if args.duration == 0 {
        return Err(CliError::InvalidArgument(
            "--duration must be at least 1 second".to_string(),
        ));
    }

    Ok(DiscoveryOptions {
        use_mdns: !args.no_mdns,
        use_scan: !args.no_scan,
        timeout: Duration::from_secs(args.duration),
        workers: args.workers.max(1),
        subnet: args.subnet,
    })
}

/// Run the discover command
pub async fn run_discover(
    args: DiscoverArgs,
    registry: Arc<HostRegistry>,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let options = discovery_options(&args)?;
    let discovery = Discovery::new(registry, options);

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Discovering hosts...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = discovery.run_pass().await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", formatter.format_discovery(&report));

    if report.registry_size == 0 {
        return Err(CliError::NoHostsFound);
    }

    Ok(())
}
