//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::json;

use super::OutputFormatter;
use ase_link_core::device::RequestOutcome;
use ase_link_core::discovery::DiscoveryReport;
use ase_link_core::Node;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_hosts(&self, hosts: &[Node]) -> String {
        Self::to_json(&hosts)
    }

    fn format_host(&self, host: &Node) -> String {
        Self::to_json(host)
    }

    fn format_discovery(&self, report: &DiscoveryReport) -> String {
        Self::to_json(report)
    }

    fn format_request(&self, _host: &Node, outcome: &RequestOutcome) -> String {
        Self::to_json(outcome)
    }
}
