//! Resilient RESTCONF client.
//!
//! Discovers the RESTCONF root of a device, sends data requests through a
//! retry loop that separates transient device faults from permanent errors,
//! and optionally waits for datastore locks to clear after writes.

pub mod body;
pub mod client;
pub mod config;
pub mod discovery;
pub mod logging;
pub mod request;
pub mod response;
pub mod retry;
pub mod transport;
pub mod wait;
pub mod yang_patch;

#[cfg(test)]
pub(crate) mod test_support;

pub use body::Body;
pub use client::{BuildError, Client};
pub use config::ClientConfig;
pub use discovery::{Capabilities, DiscoveryError};
pub use request::Request;
pub use response::{ErrorRecord, ResponseEnvelope};
pub use retry::RequestError;
pub use transport::Method;
pub use wait::WaitError;
pub use yang_patch::{EditOperation, YangPatch, YangPatchEdit};
