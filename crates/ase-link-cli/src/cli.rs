//! CLI argument definitions using clap.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// All Seeing Eye CLI - locate nodes and talk to them by name
#[derive(Parser, Debug)]
#[command(name = "ase-link")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Request timeout in milliseconds
    #[arg(long, global = true, default_value = "5000", env = "ASE_TIMEOUT")]
    pub timeout: u64,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Host registry file (defaults to known_hosts.csv in the data directory)
    #[arg(long, global = true, env = "ASE_REGISTRY")]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a discovery pass and record found nodes
    Discover(DiscoverArgs),

    /// List known hosts
    List,

    /// Show which known host a query resolves to
    Resolve(ResolveArgs),

    /// Send an HTTP request to a known host
    Request(RequestArgs),

    /// Get the latest BLE ranging scan from a known host
    BleRanging(HostArgs),
}

// ==================== Discover ====================

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Skip mDNS service discovery
    #[arg(long)]
    pub no_mdns: bool,

    /// Skip the subnet scan
    #[arg(long)]
    pub no_scan: bool,

    /// Per-probe timeout and mDNS listening window, in seconds
    #[arg(short, long, default_value = "2")]
    pub duration: u64,

    /// Maximum concurrent probes during the subnet scan
    #[arg(long, default_value = "32")]
    pub workers: usize,

    /// Scan the /24 containing this address instead of the local one
    #[arg(long)]
    pub subnet: Option<Ipv4Addr>,
}

// ==================== Resolve / Request ====================

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// IP address, hostname, or description (quote if it contains spaces).
    /// Omit for the default host.
    pub query: Option<String>,
}

#[derive(Args, Debug)]
pub struct HostArgs {
    /// Target host by IP, hostname, or description (quote if spaces)
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    #[command(flatten)]
    pub target: HostArgs,

    /// HTTP method (get, post, ...)
    pub action: String,

    /// API endpoint, e.g. /api/status
    pub endpoint: String,

    /// JSON payload for the request body
    pub payload: Option<String>,
}
