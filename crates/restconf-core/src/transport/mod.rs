//! HTTP transport seam.
//!
//! The request pipeline only talks to a [`Transport`]; the production
//! implementation is [`CurlTransport`], tests plug in scripted transports.

mod libcurl;
mod proxy;

pub use libcurl::{CurlTransport, TransportOptions};
pub use proxy::ProxySettings;

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Media type for plain RESTCONF data requests.
pub const YANG_DATA_JSON: &str = "application/yang-data+json";
/// Media type for YANG-Patch (batched edit) requests.
pub const YANG_PATCH_JSON: &str = "application/yang-patch+json";
/// Media type requested for the host-meta discovery document.
pub const XRD_XML: &str = "application/xrd+xml";

/// HTTP method of a RESTCONF operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// True for operations that do not mutate device state.
    pub fn is_read(self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully resolved HTTP exchange to perform.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Used for both `Content-Type` and `Accept`.
    pub media_type: &'static str,
    pub body: Option<Vec<u8>>,
    /// Overrides the transport default when set.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, media_type: &'static str) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            media_type,
            body: None,
            timeout: None,
        }
    }
}

/// Raw HTTP response: status code and the fully read body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Failure below the HTTP status level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, DNS, TLS or timeout failure before any response arrived.
    #[error("HTTP connection failed: {0}")]
    Connect(String),
    /// The status line arrived but the body could not be read.
    #[error("reading response body failed: {message}")]
    BodyRead {
        status: Option<u16>,
        message: String,
    },
}

impl TransportError {
    pub fn is_body_read(&self) -> bool {
        matches!(self, TransportError::BodyRead { .. })
    }
}

/// Sends one HTTP request and returns the complete response.
///
/// Implementations are shared by every call on a client, so they must be
/// usable from several threads at once.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}
