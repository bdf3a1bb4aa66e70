//! RESTCONF root and capability discovery.
//!
//! Discovery runs at most once per client: the first call fetches
//! `/.well-known/host-meta`, extracts the `rel='restconf'` link and then
//! reads the capability list below that root. Concurrent callers block on
//! the same mutex, so only one of them talks to the device.
//!
//! A document without the link is a permanent failure and is remembered.
//! A transport failure leaves discovery unresolved so a later call can try
//! again. Capabilities are advisory: if they cannot be fetched or parsed the
//! client continues with an empty set.

mod parse;

use crate::config::KnownEndpoint;
use crate::transport::{HttpRequest, Transport, TransportError, XRD_XML, YANG_DATA_JSON};
use crate::yang_patch::YANG_PATCH_CAPABILITY;
use std::sync::Mutex;
use thiserror::Error;

/// Well-known discovery document (RFC 6415).
pub const HOST_META_PATH: &str = "/.well-known/host-meta";
/// Capability list, relative to `{root}/data/`.
pub const CAPABILITIES_RESOURCE: &str = "ietf-restconf-monitoring:restconf-state/capabilities";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("could not find RESTCONF API endpoint in discovery response (HTTP {status}): {body}")]
    EndpointNotFound { status: u16, body: String },
    #[error("discovery request failed: {0}")]
    Transport(#[from] TransportError),
}

/// Capability URIs advertised by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities(Vec<String>);

impl Capabilities {
    pub fn new(uris: Vec<String>) -> Self {
        Self(uris)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.0.iter().any(|c| c == uri)
    }

    /// Batched edits may be sent only when this is true; the client does
    /// not check it for you.
    pub fn has_yang_patch(&self) -> bool {
        self.contains(YANG_PATCH_CAPABILITY)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of a successful discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    /// RESTCONF root path, e.g. `/restconf`.
    pub endpoint: String,
    pub capabilities: Capabilities,
}

impl From<&KnownEndpoint> for Discovered {
    fn from(known: &KnownEndpoint) -> Self {
        let capabilities = if known.yang_patch {
            vec![YANG_PATCH_CAPABILITY.to_string()]
        } else {
            Vec::new()
        };
        Self {
            endpoint: known.path.trim_end_matches('/').to_string(),
            capabilities: Capabilities::new(capabilities),
        }
    }
}

#[derive(Debug, Clone)]
enum DiscoveryState {
    Unresolved,
    Resolved(Discovered),
    Failed(DiscoveryError),
}

/// Single-flight discovery state shared by all calls on one client.
#[derive(Debug)]
pub(crate) struct Discovery {
    state: Mutex<DiscoveryState>,
}

impl Discovery {
    pub(crate) fn new(known: Option<&KnownEndpoint>) -> Self {
        let state = match known {
            Some(k) => DiscoveryState::Resolved(k.into()),
            None => DiscoveryState::Unresolved,
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Current result without triggering discovery.
    pub(crate) fn current(&self) -> Option<Discovered> {
        match &*self.state.lock().unwrap_or_else(|e| e.into_inner()) {
            DiscoveryState::Resolved(d) => Some(d.clone()),
            _ => None,
        }
    }

    /// Resolve once; later calls return the cached outcome.
    pub(crate) fn ensure(
        &self,
        transport: &dyn Transport,
        base_url: &str,
    ) -> Result<Discovered, DiscoveryError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match &*state {
            DiscoveryState::Resolved(d) => return Ok(d.clone()),
            DiscoveryState::Failed(e) => return Err(e.clone()),
            DiscoveryState::Unresolved => {}
        }

        match discover(transport, base_url) {
            Ok(found) => {
                tracing::info!(
                    endpoint = %found.endpoint,
                    capabilities = found.capabilities.as_slice().len(),
                    yang_patch = found.capabilities.has_yang_patch(),
                    "RESTCONF discovery complete"
                );
                *state = DiscoveryState::Resolved(found.clone());
                Ok(found)
            }
            Err(e @ DiscoveryError::EndpointNotFound { .. }) => {
                tracing::error!(error = %e, "RESTCONF discovery failed");
                *state = DiscoveryState::Failed(e.clone());
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "RESTCONF discovery interrupted, will retry on next call");
                Err(e)
            }
        }
    }
}

fn discover(transport: &dyn Transport, base_url: &str) -> Result<Discovered, DiscoveryError> {
    let base = base_url.trim_end_matches('/');
    let res = transport.send(&HttpRequest::get(format!("{base}{HOST_META_PATH}"), XRD_XML))?;
    let doc = String::from_utf8_lossy(&res.body);
    let endpoint = parse::restconf_root(&doc).ok_or_else(|| DiscoveryError::EndpointNotFound {
        status: res.status,
        body: doc.to_string(),
    })?;

    let url = format!("{base}{endpoint}/data/{CAPABILITIES_RESOURCE}");
    let capabilities = match transport.send(&HttpRequest::get(url, YANG_DATA_JSON)) {
        Ok(res) if (200..=299).contains(&res.status) => parse::capability_list(&res.body)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to parse capabilities, continuing without");
                Vec::new()
            }),
        Ok(res) => {
            tracing::warn!(status = res.status, "capabilities not available, continuing without");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "capabilities request failed, continuing without");
            Vec::new()
        }
    };

    Ok(Discovered {
        endpoint,
        capabilities: Capabilities::new(capabilities),
    })
}
