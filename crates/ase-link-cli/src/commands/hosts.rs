//! Host listing and resolution.

use std::sync::Arc;

use ase_link_core::storage::HostRegistry;

use super::default_discovery;
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the list command
///
/// An empty registry triggers a discovery pass first.
pub async fn run_list(registry: Arc<HostRegistry>, json: bool) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let hosts = default_discovery(registry).ensure_hosts().await?;

    println!("{}", formatter.format_hosts(&hosts));

    if hosts.is_empty() {
        return Err(CliError::NoHostsFound);
    }

    Ok(())
}

/// Run the resolve command
pub async fn run_resolve(
    query: Option<String>,
    registry: Arc<HostRegistry>,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let host = registry.resolve(query.as_deref()).await?;

    println!("{}", formatter.format_host(&host));

    Ok(())
}
