//! Host registry storage.

pub mod registry;

pub use registry::HostRegistry;

/// File name of the registry inside the data directory
pub const REGISTRY_FILE_NAME: &str = "known_hosts.csv";

/// Get the default data directory for All Seeing Eye tools.
///
/// Uses the `directories` crate to find the appropriate platform-specific
/// data directory.
pub fn default_data_dir() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("", "all-seeing-eye", "ase-link")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Default registry location, `<data dir>/known_hosts.csv`.
pub fn default_registry_path() -> Option<std::path::PathBuf> {
    default_data_dir().map(|dir| dir.join(REGISTRY_FILE_NAME))
}
