//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use ase_link_core::device::RequestOutcome;
use ase_link_core::discovery::DiscoveryReport;
use ase_link_core::Node;

/// Output formatter trait
pub trait OutputFormatter {
    /// Format the known host list; the first host is the default
    fn format_hosts(&self, hosts: &[Node]) -> String;

    /// Format a single resolved host
    fn format_host(&self, host: &Node) -> String;

    /// Format the result of a discovery pass
    fn format_discovery(&self, report: &DiscoveryReport) -> String;

    /// Format the outcome of a request to a host
    fn format_request(&self, host: &Node, outcome: &RequestOutcome) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
