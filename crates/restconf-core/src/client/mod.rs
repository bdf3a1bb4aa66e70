//! RESTCONF client: discovery, the retry pipeline and the completion wait
//! behind one handle.
//!
//! A [`Client`] is built once from a [`ClientConfig`] and shared across
//! threads. Writes are serialized by a client-wide lock held from discovery
//! through the retry loop and the optional completion wait; reads only
//! share the discovery lock.

use crate::config::ClientConfig;
use crate::discovery::{Capabilities, Discovery, DiscoveryError};
use crate::request::Request;
use crate::response::ResponseEnvelope;
use crate::retry::{BackoffPolicy, ErrorClassifier, Executor, RequestError, Sleeper, ThreadSleeper};
use crate::transport::{CurlTransport, HttpRequest, ProxySettings, Transport, TransportOptions};
use crate::wait::{self, DATASTORES_RESOURCE};
use crate::yang_patch::YangPatch;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use url::Url;


/// Client construction failure.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid device URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid transient rule pattern: {0}")]
    InvalidRule(#[from] regex::Error),
}

pub struct Client {
    base_url: String,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    executor: Executor,
    discovery: Discovery,
    write_lock: Mutex<()>,
}

impl Client {
    /// Client over libcurl, with proxy settings taken from the environment.
    pub fn new(config: &ClientConfig) -> Result<Self, BuildError> {
        let transport = CurlTransport::new(TransportOptions {
            username: config.username.clone(),
            password: config.password.clone(),
            insecure: config.insecure,
            timeout: config.request_timeout(),
            proxy: ProxySettings::from_env(),
        });
        Self::with_parts(config, Arc::new(transport), Arc::new(ThreadSleeper))
    }

    /// Client over a caller-supplied transport and sleeper. Credentials and
    /// TLS settings in `config` are the transport's concern and are ignored
    /// here.
    pub fn with_parts(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, BuildError> {
        Url::parse(&config.url)?;
        let classifier = match &config.transient_rules {
            Some(rules) => ErrorClassifier::from_config(rules)?,
            None => ErrorClassifier::default(),
        };
        let policy = BackoffPolicy::from(&config.retry_or_default());
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            transport,
            sleeper,
            executor: Executor::new(policy, classifier),
            discovery: Discovery::new(config.endpoint.as_ref()),
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run discovery now instead of on the first request. No-op once it has
    /// completed or when the endpoint was configured up front.
    pub fn ensure_discovered(&self) -> Result<(), DiscoveryError> {
        self.discovery.ensure(self.transport.as_ref(), &self.base_url)?;
        Ok(())
    }

    /// RESTCONF root path, once discovered.
    pub fn endpoint(&self) -> Option<String> {
        self.discovery.current().map(|d| d.endpoint)
    }

    /// Capabilities seen during discovery (empty before discovery).
    pub fn capabilities(&self) -> Capabilities {
        self.discovery
            .current()
            .map(|d| d.capabilities)
            .unwrap_or_default()
    }

    pub fn has_yang_patch(&self) -> bool {
        self.capabilities().has_yang_patch()
    }

    /// Send `request` through discovery, the retry loop and, for writes that
    /// asked for it, the completion wait.
    pub fn execute(&self, request: &Request) -> Result<ResponseEnvelope, RequestError> {
        if request.method.is_read() {
            return self.perform(request);
        }
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.perform(request)
    }

    fn perform(&self, request: &Request) -> Result<ResponseEnvelope, RequestError> {
        let found = self.discovery.ensure(self.transport.as_ref(), &self.base_url)?;
        let http = HttpRequest {
            method: request.method,
            url: self.data_url(&found.endpoint, &request.path, &request.query)?,
            media_type: request.media_type,
            body: request.body.clone(),
            timeout: request.timeout,
        };
        let envelope = self
            .executor
            .run(self.transport.as_ref(), self.sleeper.as_ref(), &http)?;

        if request.wait && !request.method.is_read() {
            let url = self.data_url(&found.endpoint, DATASTORES_RESOURCE, &[])?;
            wait::wait_for_completion(
                self.transport.as_ref(),
                self.sleeper.as_ref(),
                &url,
                request.timeout,
            )?;
        }
        Ok(envelope)
    }

    /// `{base}{root}/data/{path}?{query}`, with the query form-encoded.
    fn data_url(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(String, String)],
    ) -> Result<String, RequestError> {
        let path = path.trim_start_matches('/');
        let raw = if path.is_empty() {
            format!("{}{}/data", self.base_url, endpoint)
        } else {
            format!("{}{}/data/{}", self.base_url, endpoint, path)
        };
        let mut url = Url::parse(&raw).map_err(|source| RequestError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url.to_string())
    }

    pub fn get_data(&self, path: &str) -> Result<ResponseEnvelope, RequestError> {
        self.execute(&Request::get(path))
    }

    pub fn post_data(
        &self,
        path: &str,
        body: impl Into<Vec<u8>>,
    ) -> Result<ResponseEnvelope, RequestError> {
        self.execute(&Request::post(path, body))
    }

    pub fn put_data(
        &self,
        path: &str,
        body: impl Into<Vec<u8>>,
    ) -> Result<ResponseEnvelope, RequestError> {
        self.execute(&Request::put(path, body))
    }

    pub fn patch_data(
        &self,
        path: &str,
        body: impl Into<Vec<u8>>,
    ) -> Result<ResponseEnvelope, RequestError> {
        self.execute(&Request::patch(path, body))
    }

    pub fn delete_data(&self, path: &str) -> Result<ResponseEnvelope, RequestError> {
        self.execute(&Request::delete(path))
    }

    /// Apply a batch of edits in one YANG-Patch request. Check
    /// [`Client::has_yang_patch`] first; devices without the capability
    /// reject the media type.
    pub fn yang_patch_data(&self, patch: &YangPatch) -> Result<ResponseEnvelope, RequestError> {
        self.execute(&Request::yang_patch(patch)?)
    }
}
