//! All Seeing Eye core library.
//!
//! Locates nodes on the local network and keeps a persistent registry of
//! them, so a node can be addressed by IP, hostname, or description without
//! rediscovering it each time.

pub mod device;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod types;

pub use error::{CoreError, DeviceError, Result, StorageError};
pub use types::{Advertisement, Identity, Node};
