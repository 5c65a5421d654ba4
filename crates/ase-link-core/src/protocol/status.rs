//! Status document parsing.
//!
//! Nodes running different firmware revisions name the same fields
//! differently, so every field is looked up under a primary and a legacy
//! key. Only JSON objects are accepted as status documents.

use serde_json::Value;

use crate::error::DeviceError;
use crate::types::Identity;

const NAME_KEYS: [&str; 2] = ["hostname", "device"];
const DESCRIPTION_KEYS: [&str; 2] = ["description", "clusterName"];
const PEERS_KEYS: [&str; 2] = ["peers", "peerList"];
const PEER_ADDRESS_KEYS: [&str; 2] = ["ip", "address"];
const PEER_NAME_KEYS: [&str; 2] = ["hostname", "name"];

/// One entry of a node's self-reported peer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEntry {
    /// `"10.0.0.10"`
    BareAddress(String),
    /// `{"ip": "10.0.0.9", "hostname": "sensor9"}`
    NamedPeer { address: String, name: String },
}

impl PeerEntry {
    /// Classify a JSON peer entry. Shapes other than a string or an object
    /// are not peers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(address) => Some(PeerEntry::BareAddress(address.clone())),
            Value::Object(_) => Some(PeerEntry::NamedPeer {
                address: first_text(value, &PEER_ADDRESS_KEYS).unwrap_or_default(),
                name: first_text(value, &PEER_NAME_KEYS).unwrap_or_default(),
            }),
            _ => None,
        }
    }

    /// `(address, hint_name)`; `None` when the entry carries no address.
    pub fn normalize(self) -> Option<(String, String)> {
        let (address, name) = match self {
            PeerEntry::BareAddress(address) => (address, String::new()),
            PeerEntry::NamedPeer { address, name } => (address, name),
        };

        let address = address.trim().to_string();
        if address.is_empty() {
            return None;
        }

        Some((address, name))
    }
}

/// Parsed `/api/status` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub name: Option<String>,
    pub description: Option<String>,
    pub peers: Vec<PeerEntry>,
}

impl StatusReport {
    /// Parse a status document received from `ip`.
    pub fn parse(data: &[u8], ip: &str) -> Result<Self, DeviceError> {
        let json: Value = serde_json::from_slice(data).map_err(|e| DeviceError::InvalidResponse {
            ip: ip.to_string(),
            message: format!("Failed to parse JSON: {}", e),
        })?;

        Self::from_value(&json, ip)
    }

    pub fn from_value(json: &Value, ip: &str) -> Result<Self, DeviceError> {
        if !json.is_object() {
            return Err(DeviceError::InvalidResponse {
                ip: ip.to_string(),
                message: "Status is not a JSON object".to_string(),
            });
        }

        let peers = PEERS_KEYS
            .iter()
            .find_map(|key| json[*key].as_array())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(PeerEntry::from_value)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(Self {
            name: first_text(json, &NAME_KEYS),
            description: first_text(json, &DESCRIPTION_KEYS),
            peers,
        })
    }

    /// Normalized peers with duplicates removed, in report order.
    pub fn peer_addresses(&self) -> Vec<(String, String)> {
        let mut seen = Vec::new();
        for (address, name) in self.peers.iter().cloned().filter_map(PeerEntry::normalize) {
            if !seen.iter().any(|(a, n): &(String, String)| a == &address && n == &name) {
                seen.push((address, name));
            }
        }
        seen
    }

    /// Identity of the node at `address`, falling back to the address for
    /// the name and to empty for the description.
    pub fn identity(&self, address: &str) -> Identity {
        Identity {
            display_name: self.name.clone().unwrap_or_else(|| address.to_string()),
            description: self.description.clone().unwrap_or_default(),
            peers: self.peer_addresses(),
        }
    }
}

/// First non-empty textual value among `keys`. Numbers are rendered as
/// text; other types are skipped.
fn first_text(json: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match &json[*key] {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
