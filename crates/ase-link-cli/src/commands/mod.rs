//! Command implementations.

pub mod discover;
pub mod hosts;
pub mod request;

pub use discover::run_discover;
pub use hosts::{run_list, run_resolve};
pub use request::{run_ble_ranging, run_request};

use std::path::PathBuf;
use std::sync::Arc;

use ase_link_core::discovery::{Discovery, DiscoveryOptions};
use ase_link_core::storage::{default_registry_path, HostRegistry};

use crate::error::CliError;

/// Open the registry at `path`, or at the platform default.
pub fn open_registry(path: Option<PathBuf>) -> Result<Arc<HostRegistry>, CliError> {
    let path = match path {
        Some(path) => path,
        None => default_registry_path().ok_or_else(|| {
            CliError::Other(
                "Could not determine a data directory; pass --registry <path>".to_string(),
            )
        })?,
    };

    Ok(Arc::new(HostRegistry::new(path)))
}

/// Discovery with default options, used to populate an empty registry.
pub fn default_discovery(registry: Arc<HostRegistry>) -> Discovery {
    Discovery::new(registry, DiscoveryOptions::default())
}
