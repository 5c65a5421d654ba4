//! Active /24 subnet sweep.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use super::pool::run_bounded;
use crate::device::StatusFetcher;

/// Address used to learn the outward-facing interface. Connecting a UDP
/// socket sends no packets.
const ROUTE_PROBE_TARGET: &str = "8.8.8.8:80";

/// Best guess at this machine's LAN address.
///
/// Tries the route to an external address first, then resolution of the
/// local hostname.
pub async fn local_ipv4() -> Option<Ipv4Addr> {
    match outbound_ipv4().await {
        Some(ip) => Some(ip),
        None => hostname_ipv4().await,
    }
}

async fn outbound_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await.ok()?;
    socket.connect(ROUTE_PROBE_TARGET).await.ok()?;

    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

async fn hostname_ipv4() -> Option<Ipv4Addr> {
    let name = hostname::get().ok()?.into_string().ok()?;
    let mut addrs = tokio::net::lookup_host((name.as_str(), 0)).await.ok()?;

    addrs.find_map(|addr| match addr.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    })
}

/// The 254 host addresses of the /24 containing `ip`.
pub fn subnet_hosts(ip: Ipv4Addr) -> Vec<String> {
    let [a, b, c, _] = ip.octets();
    (1..=254u8)
        .map(|d| Ipv4Addr::new(a, b, c, d).to_string())
        .collect()
}

/// Sweep a /24 for nodes answering their status path.
///
/// `subnet` is any address inside the /24 to sweep; `None` sweeps the local
/// network. Addresses that time out, refuse, or answer with an error are
/// left out. Returns addresses in ascending order.
pub async fn scan(
    fetcher: Arc<dyn StatusFetcher>,
    subnet: Option<Ipv4Addr>,
    workers: usize,
    timeout: Duration,
) -> Vec<String> {
    let base = match subnet {
        Some(ip) => ip,
        None => match local_ipv4().await {
            Some(ip) => ip,
            None => {
                warn!("Could not determine local IP address, skipping subnet scan");
                return Vec::new();
            }
        },
    };

    let targets = subnet_hosts(base);
    debug!(%base, workers, "Scanning {} addresses", targets.len());

    let mut found = run_bounded(targets, workers, move |address: String| {
        let fetcher = fetcher.clone();
        async move {
            fetcher
                .check_alive(&address, timeout)
                .await
                .then_some(address)
        }
    })
    .await;

    found.sort_by_key(|address| address.parse::<Ipv4Addr>().ok());
    info!(%base, "Subnet scan found {} node(s)", found.len());

    found
}
