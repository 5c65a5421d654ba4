//! Node communication layer.
//!
//! Provides status probing for discovery and the request client used once a
//! node has been resolved.

pub mod client;
pub mod probe;

pub use client::{DeviceClient, RequestOutcome};
pub use probe::{fallback_name, probe, HttpStatusFetcher, StatusFetcher};
