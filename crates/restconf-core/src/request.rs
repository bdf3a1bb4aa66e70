//! Data requests relative to `{root}/data/`.

use crate::transport::{Method, YANG_DATA_JSON, YANG_PATCH_JSON};
use crate::yang_patch::YangPatch;
use std::time::Duration;

/// An immutable, replayable RESTCONF data request.
///
/// The body is kept as bytes so every retry attempt sends an identical copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Resource path below `{root}/data/`, e.g. `Cisco-IOS-XE-native:native/hostname`.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub media_type: &'static str,
    /// Poll datastore locks after a successful write.
    pub wait: bool,
    /// Per-attempt timeout override.
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            media_type: YANG_DATA_JSON,
            wait: false,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn post(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::Post, path).body(body)
    }

    pub fn put(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::Put, path).body(body)
    }

    pub fn patch(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::Patch, path).body(body)
    }

    /// YANG-Patch against the datastore root (`{root}/data`).
    pub fn yang_patch(patch: &YangPatch) -> Result<Self, serde_json::Error> {
        let mut req = Self::new(Method::Patch, "").body(patch.to_body()?);
        req.media_type = YANG_PATCH_JSON;
        Ok(req)
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a query parameter; repeated keys are kept.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Wait for datastore partial locks to clear after the write succeeds.
    /// Ignored for reads.
    pub fn wait(mut self) -> Self {
        self.wait = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_yang_patch(&self) -> bool {
        self.media_type == YANG_PATCH_JSON
    }
}
