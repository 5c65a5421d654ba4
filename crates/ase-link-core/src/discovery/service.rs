//! Discovery pass orchestration.
//!
//! A pass runs the mDNS listener and the subnet sweep side by side, records
//! every candidate they produce, then crawls the peer list of every known
//! node once.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use super::crawler::{crawl, record_candidate};
use super::listener::listen;
use super::pool::DEFAULT_WORKERS;
use super::scanner::scan;
use crate::device::{HttpStatusFetcher, StatusFetcher};
use crate::error::StorageError;
use crate::storage::HostRegistry;
use crate::types::Node;

/// Default timeout for discovery-time network operations
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Discovery options
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Listen for mDNS advertisements
    pub use_mdns: bool,
    /// Sweep the /24 subnet
    pub use_scan: bool,
    /// Per-operation timeout; also the mDNS listening window
    pub timeout: Duration,
    /// Concurrent liveness probes during the sweep
    pub workers: usize,
    /// Any address in the /24 to sweep instead of the local one
    pub subnet: Option<Ipv4Addr>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            use_mdns: true,
            use_scan: true,
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
            workers: DEFAULT_WORKERS,
            subnet: None,
        }
    }
}

/// Result of one discovery pass.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    /// Stored record for each mDNS/scan candidate, in discovery order
    pub discovered: Vec<Node>,
    /// Number of known nodes whose peer lists were crawled
    pub crawled_seeds: usize,
    /// Registry size after the pass
    pub registry_size: usize,
}

/// Discovery engine bound to a registry.
pub struct Discovery {
    registry: Arc<HostRegistry>,
    fetcher: Arc<dyn StatusFetcher>,
    options: DiscoveryOptions,
}

impl Discovery {
    /// Discovery over HTTP.
    pub fn new(registry: Arc<HostRegistry>, options: DiscoveryOptions) -> Self {
        Self::with_fetcher(registry, Arc::new(HttpStatusFetcher::new()), options)
    }

    pub fn with_fetcher(
        registry: Arc<HostRegistry>,
        fetcher: Arc<dyn StatusFetcher>,
        options: DiscoveryOptions,
    ) -> Self {
        Self {
            registry,
            fetcher,
            options,
        }
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    /// Run one full discovery pass.
    ///
    /// Only registry I/O failures are returned; unreachable addresses are
    /// absorbed along the way.
    pub async fn run_pass(&self) -> Result<DiscoveryReport, StorageError> {
        let options = &self.options;
        let timeout = options.timeout;

        let passive = async {
            if options.use_mdns {
                listen(timeout).await
            } else {
                Vec::new()
            }
        };
        let active = async {
            if options.use_scan {
                scan(self.fetcher.clone(), options.subnet, options.workers, timeout).await
            } else {
                Vec::new()
            }
        };
        let (advertised, scanned) = tokio::join!(passive, active);

        let candidates = advertised
            .into_iter()
            .map(|ad| (ad.address, ad.advertised_name))
            .chain(scanned.into_iter().map(|address| (address, String::new())));

        let mut discovered = Vec::new();
        for (address, hint_name) in candidates {
            let node = record_candidate(
                &self.registry,
                self.fetcher.as_ref(),
                &address,
                &hint_name,
                timeout,
            )
            .await?;
            discovered.push(node);
        }

        let known = self.registry.list().await?;
        for host in &known {
            let peers = crawl(&self.registry, self.fetcher.as_ref(), &host.address, timeout).await?;
            debug!(seed = %host.address, "Crawl recorded {} peer(s)", peers.len());
        }

        let registry_size = self.registry.list().await?.len();
        info!(
            discovered = discovered.len(),
            crawled = known.len(),
            registry_size,
            "Discovery pass complete"
        );

        Ok(DiscoveryReport {
            discovered,
            crawled_seeds: known.len(),
            registry_size,
        })
    }

    /// Known nodes, running a discovery pass first when there are none.
    pub async fn ensure_hosts(&self) -> Result<Vec<Node>, StorageError> {
        let hosts = self.registry.list().await?;
        if !hosts.is_empty() {
            return Ok(hosts);
        }

        info!("No known hosts, running discovery");
        self.run_pass().await?;
        self.registry.list().await
    }
}
