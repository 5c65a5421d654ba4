//! Peer-list crawling.
//!
//! Each node reports the peers it knows about. Crawling a seed probes each
//! of those peers and records them, reaching nodes that neither mDNS nor
//! the subnet sweep can see. One call covers one hop; peers of peers are
//! picked up when the peer itself is crawled on a later pass.

use std::time::Duration;

use tracing::{debug, trace};

use crate::device::{fallback_name, probe, StatusFetcher};
use crate::error::StorageError;
use crate::storage::HostRegistry;
use crate::types::Node;

/// Crawl the peer list of `seed`, recording every reported peer.
///
/// An unreachable seed contributes nothing. Unreachable peers are recorded
/// only when their address is new. Returns the stored peer records in
/// report order.
pub async fn crawl(
    registry: &HostRegistry,
    fetcher: &dyn StatusFetcher,
    seed: &str,
    timeout: Duration,
) -> Result<Vec<Node>, StorageError> {
    let seed_identity = match probe(fetcher, seed, timeout).await {
        Ok(identity) => identity,
        Err(e) => {
            debug!(seed, error = %e, "Seed unreachable, nothing to crawl");
            return Ok(Vec::new());
        }
    };

    let peers = seed_identity.peers;
    debug!(seed, "Crawling {} peer(s)", peers.len());

    let mut stored = Vec::with_capacity(peers.len());
    for (address, hint_name) in peers {
        let node = record_candidate(registry, fetcher, &address, &hint_name, timeout).await?;
        stored.push(node);
    }

    Ok(stored)
}

/// Probe a candidate and store what was learned.
///
/// A reachable node is upserted with its self-reported identity. An
/// unreachable one is inserted under [`fallback_name`] if its address is
/// new; a stored record keeps its name and `last_seen`.
pub(crate) async fn record_candidate(
    registry: &HostRegistry,
    fetcher: &dyn StatusFetcher,
    address: &str,
    hint_name: &str,
    timeout: Duration,
) -> Result<Node, StorageError> {
    match probe(fetcher, address, timeout).await {
        Ok(identity) => {
            registry
                .upsert(address, &identity.display_name, Some(&identity.description))
                .await
        }
        Err(e) => {
            trace!(address, error = %e, "Identity probe failed");
            registry
                .insert_if_absent(address, fallback_name(address, hint_name), None)
                .await
        }
    }
}
