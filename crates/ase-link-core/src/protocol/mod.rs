//! Node status protocol.
//!
//! Parsing for the JSON document served at [`STATUS_PATH`].

pub mod status;

pub use status::{PeerEntry, StatusReport};

/// HTTP path every node serves its status document on
pub const STATUS_PATH: &str = "/api/status";
