//! Shared data types.

use serde::{Deserialize, Serialize};

/// A known node as persisted in the host registry.
///
/// Field names match the registry file columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "ip_address")]
    pub address: String,
    #[serde(rename = "hostname")]
    pub display_name: String,
    pub description: String,
    /// Unix seconds of the most recent successful contact
    #[serde(rename = "last_seen_timestamp")]
    pub last_seen: i64,
}

impl Node {
    pub fn new(address: &str, display_name: &str, description: &str, last_seen: i64) -> Self {
        let display_name = if display_name.is_empty() {
            address
        } else {
            display_name
        };

        Self {
            address: address.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            last_seen,
        }
    }

    pub fn last_seen_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.last_seen, 0)
    }
}

/// Self-reported identity of a node, extracted from its status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub description: String,
    /// Normalized `(address, hint_name)` pairs
    pub peers: Vec<(String, String)>,
}

/// A candidate heard through service advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Advertisement {
    pub address: String,
    pub advertised_name: String,
}

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
