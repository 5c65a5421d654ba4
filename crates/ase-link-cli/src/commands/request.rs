//! Requests to a resolved host.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use ase_link_core::device::{DeviceClient, RequestOutcome};
use ase_link_core::storage::HostRegistry;
use ase_link_core::Node;

use super::default_discovery;
use crate::cli::{HostArgs, RequestArgs};
use crate::error::CliError;
use crate::output::get_formatter;

/// Parse an optional JSON payload argument.
fn parse_payload(payload: Option<&str>) -> Result<Option<Value>, CliError> {
    payload
        .map(|raw| {
            serde_json::from_str(raw)
                .map_err(|e| CliError::InvalidArgument(format!("Invalid JSON payload: {}", e)))
        })
        .transpose()
}

/// Resolve the target host, discovering first when nothing is known yet.
async fn resolve_target(registry: Arc<HostRegistry>, target: &HostArgs) -> Result<Node, CliError> {
    let discovery = default_discovery(registry);
    discovery.ensure_hosts().await?;

    Ok(discovery.registry().resolve(target.host.as_deref()).await?)
}

fn finish(host: &Node, outcome: &RequestOutcome, json: bool) -> Result<(), CliError> {
    println!("{}", get_formatter(json).format_request(host, outcome));

    if !outcome.ok {
        return Err(CliError::RequestFailed {
            address: host.address.clone(),
            status_code: outcome.status_code,
        });
    }

    Ok(())
}

/// Run the request command
pub async fn run_request(
    args: RequestArgs,
    registry: Arc<HostRegistry>,
    timeout: u64,
    json: bool,
) -> Result<(), CliError> {
    let payload = parse_payload(args.payload.as_deref())?;
    let host = resolve_target(registry, &args.target).await?;

    let client = DeviceClient::new(&host.address, Duration::from_millis(timeout));
    let outcome = client
        .request(&args.action, &args.endpoint, payload.as_ref())
        .await?;

    finish(&host, &outcome, json)
}

/// Run the ble-ranging command
pub async fn run_ble_ranging(
    args: HostArgs,
    registry: Arc<HostRegistry>,
    timeout: u64,
    json: bool,
) -> Result<(), CliError> {
    let host = resolve_target(registry, &args).await?;

    let client = DeviceClient::new(&host.address, Duration::from_millis(timeout));
    let outcome = client.ble_ranging().await?;

    finish(&host, &outcome, json)
}
