//! Node discovery.
//!
//! Passive mDNS listening, an active /24 sweep, and one-hop peer crawling,
//! tied together by [`Discovery::run_pass`].

pub mod crawler;
pub mod listener;
pub mod pool;
pub mod scanner;
pub mod service;

pub use crawler::crawl;
pub use listener::listen;
pub use scanner::{local_ipv4, scan};
pub use service::{Discovery, DiscoveryOptions, DiscoveryReport, DEFAULT_DISCOVERY_TIMEOUT};
