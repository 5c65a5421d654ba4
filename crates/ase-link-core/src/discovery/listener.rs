//! Passive mDNS / DNS-SD discovery.
//!
//! Browses for HTTP service records for a fixed window. When multicast DNS
//! is unavailable on the host the listener reports nothing rather than
//! failing; the subnet sweep still runs.

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::Duration;

use mdns_sd::{ServiceDaemon, ServiceEvent};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::types::Advertisement;

/// Service type nodes advertise their web API under
pub const HTTP_SERVICE_TYPE: &str = "_http._tcp.local.";

/// Listen for service advertisements for `duration`.
///
/// Returns every distinct `(address, advertised name)` pair heard, sorted.
pub async fn listen(duration: Duration) -> Vec<Advertisement> {
    let daemon = match ServiceDaemon::new() {
        Ok(daemon) => daemon,
        Err(e) => {
            warn!(error = %e, "mDNS unavailable, skipping passive discovery");
            return Vec::new();
        }
    };

    let receiver = match daemon.browse(HTTP_SERVICE_TYPE) {
        Ok(receiver) => receiver,
        Err(e) => {
            warn!(error = %e, "mDNS browse failed, skipping passive discovery");
            let _ = daemon.shutdown();
            return Vec::new();
        }
    };

    let mut found = BTreeSet::new();
    let deadline = Instant::now() + duration;

    loop {
        match timeout_at(deadline, receiver.recv_async()).await {
            Ok(Ok(ServiceEvent::ServiceResolved(info))) => {
                let addresses: Vec<IpAddr> = info.get_addresses().iter().copied().collect();
                debug!(name = info.get_fullname(), ?addresses, "Service resolved");
                found.extend(advertisements(info.get_fullname(), &addresses));
            }
            Ok(Ok(_)) => {}
            // Channel closed by the daemon
            Ok(Err(_)) => break,
            // Window elapsed
            Err(_) => break,
        }
    }

    let _ = daemon.stop_browse(HTTP_SERVICE_TYPE);
    let _ = daemon.shutdown();

    info!("mDNS discovery found {} advertisement(s)", found.len());
    found.into_iter().collect()
}

/// Instance label of a full service name, `eye-1._http._tcp.local.` -> `eye-1`.
pub fn instance_name(fullname: &str) -> &str {
    fullname
        .strip_suffix(HTTP_SERVICE_TYPE)
        .map(|name| name.trim_end_matches('.'))
        .filter(|name| !name.is_empty())
        .unwrap_or(fullname)
}

/// One advertisement per IPv4 address of a resolved service.
pub fn advertisements(fullname: &str, addresses: &[IpAddr]) -> Vec<Advertisement> {
    let name = instance_name(fullname);
    addresses
        .iter()
        .filter_map(|addr| match addr {
            IpAddr::V4(v4) => Some(Advertisement {
                address: v4.to_string(),
                advertised_name: name.to_string(),
            }),
            IpAddr::V6(_) => None,
        })
        .collect()
}
