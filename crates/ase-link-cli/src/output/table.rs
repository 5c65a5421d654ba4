//! Table-formatted output for CLI.

use colored::*;
use comfy_table::{Cell, ContentArrangement, Table};

use super::OutputFormatter;
use ase_link_core::device::RequestOutcome;
use ase_link_core::discovery::DiscoveryReport;
use ase_link_core::Node;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn last_seen(host: &Node) -> String {
        host.last_seen_utc()
            .map(|ts| {
                ts.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "never".to_string())
    }

    fn host_table<'a>(hosts: impl Iterator<Item = &'a Node>, mark_default: bool) -> Table {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["IP", "Hostname", "Description", "Last Seen", ""]);

        for (index, host) in hosts.enumerate() {
            let marker = if mark_default && index == 0 {
                "(Default)"
            } else {
                ""
            };
            table.add_row(vec![
                Cell::new(&host.address),
                Cell::new(&host.display_name),
                Cell::new(&host.description),
                Cell::new(Self::last_seen(host)),
                Cell::new(marker),
            ]);
        }

        table
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_hosts(&self, hosts: &[Node]) -> String {
        if hosts.is_empty() {
            return "No known hosts.".to_string();
        }

        format!(
            "{}\n\n{} known host(s)",
            Self::host_table(hosts.iter(), true),
            hosts.len()
        )
    }

    fn format_host(&self, host: &Node) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Host: {} ({})", host.display_name.bold(), host.address));
        if !host.description.is_empty() {
            lines.push(format!("  Description: {}", host.description));
        }
        lines.push(format!("  Last Seen:   {}", Self::last_seen(host)));

        lines.join("\n")
    }

    fn format_discovery(&self, report: &DiscoveryReport) -> String {
        if report.discovered.is_empty() {
            return format!(
                "No hosts found by mDNS or subnet scan. Crawled {} known host(s); {} in registry.",
                report.crawled_seeds, report.registry_size
            );
        }

        format!(
            "{}\n\nDiscovered {} host(s), crawled {}, {} in registry",
            Self::host_table(report.discovered.iter(), false),
            report.discovered.len(),
            report.crawled_seeds,
            report.registry_size
        )
    }

    fn format_request(&self, host: &Node, outcome: &RequestOutcome) -> String {
        let status = if outcome.ok {
            format!("{}", outcome.status_code).green()
        } else if outcome.status_code == 0 {
            "unreachable".red()
        } else {
            format!("{}", outcome.status_code).red()
        };

        let body = match (&outcome.data, &outcome.details) {
            (Some(serde_json::Value::String(text)), _) => text.clone(),
            (Some(data), _) => serde_json::to_string_pretty(data).unwrap_or_default(),
            (None, Some(details)) => details.clone(),
            (None, None) => String::new(),
        };

        format!("{} ({}) -> {}\n{}", host.display_name, host.address, status, body)
    }
}
