//! libcurl-backed transport.
//!
//! Each request runs on the caller's thread. Easy handles are kept in a
//! small pool so connections and cookies survive between calls while
//! concurrent reads still get a handle of their own.

use super::{HttpRequest, HttpResponse, Method, ProxySettings, Transport, TransportError};
use curl::easy::{Auth, Easy, List};
use std::sync::Mutex;
use std::time::Duration;

/// Handles kept for reuse; extra handles beyond this are dropped.
const MAX_IDLE_HANDLES: usize = 8;

/// Connection settings fixed at transport construction.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub username: String,
    pub password: String,
    /// Skip TLS peer and host verification.
    pub insecure: bool,
    /// Default per-attempt timeout (overridable per request).
    pub timeout: Duration,
    pub proxy: ProxySettings,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            insecure: false,
            timeout: Duration::from_secs(60),
            proxy: ProxySettings::default(),
        }
    }
}

/// Blocking HTTP(S) transport on top of curl easy handles.
pub struct CurlTransport {
    options: TransportOptions,
    idle: Mutex<Vec<Easy>>,
}

impl CurlTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            options,
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    fn checkout(&self) -> Easy {
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        idle.pop().unwrap_or_else(Easy::new)
    }

    fn checkin(&self, mut easy: Easy) {
        // reset keeps live connections and cookies, drops per-request options
        easy.reset();
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        if idle.len() < MAX_IDLE_HANDLES {
            idle.push(easy);
        }
    }

    fn configure(&self, easy: &mut Easy, req: &HttpRequest) -> Result<(), curl::Error> {
        let opts = &self.options;
        easy.url(&req.url)?;
        let timeout = req.timeout.unwrap_or(opts.timeout);
        easy.timeout(timeout)?;
        easy.connect_timeout(timeout)?;
        easy.ssl_verify_peer(!opts.insecure)?;
        easy.ssl_verify_host(!opts.insecure)?;
        // in-memory cookie engine
        easy.cookie_file("")?;

        match opts.proxy.for_url(&req.url) {
            Some(proxy) => {
                easy.proxy(proxy)?;
                if let Some(no_proxy) = opts.proxy.no_proxy.as_deref() {
                    easy.noproxy(no_proxy)?;
                }
            }
            None => easy.proxy("")?,
        }

        if !opts.username.is_empty() {
            easy.username(&opts.username)?;
            easy.password(&opts.password)?;
            let mut auth = Auth::new();
            auth.basic(true);
            easy.http_auth(&auth)?;
        }

        let mut headers = List::new();
        headers.append(&format!("Content-Type: {}", req.media_type))?;
        headers.append(&format!("Accept: {}", req.media_type))?;
        headers.append("Expect:")?;
        easy.http_headers(headers)?;

        match req.method {
            Method::Get => easy.get(true)?,
            Method::Post => {
                easy.post(true)?;
                easy.post_fields_copy(req.body.as_deref().unwrap_or_default())?;
            }
            Method::Put | Method::Patch | Method::Delete => {
                if let Some(body) = req.body.as_deref() {
                    easy.post_fields_copy(body)?;
                }
                easy.custom_request(req.method.as_str())?;
            }
        }
        Ok(())
    }

    fn perform(&self, easy: &mut Easy, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.configure(easy, req)
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let mut body = Vec::new();
        let mut saw_status = false;
        let outcome = run_transfer(easy, &mut body, &mut saw_status);

        let status = easy.response_code().ok().and_then(|c| u16::try_from(c).ok());
        match outcome {
            Ok(()) => Ok(HttpResponse {
                status: status.unwrap_or(0),
                body,
            }),
            Err(e) if saw_status => Err(TransportError::BodyRead {
                status,
                message: e.to_string(),
            }),
            Err(e) => Err(TransportError::Connect(e.to_string())),
        }
    }
}

/// Perform the transfer, collecting the body and noting whether a status line arrived.
fn run_transfer(easy: &mut Easy, body: &mut Vec<u8>, saw_status: &mut bool) -> Result<(), curl::Error> {
    let mut transfer = easy.transfer();
    transfer.header_function(|line| {
        if line.starts_with(b"HTTP/") {
            *saw_status = true;
        }
        true
    })?;
    transfer.write_function(|data| {
        body.extend_from_slice(data);
        Ok(data.len())
    })?;
    transfer.perform()
}

impl Transport for CurlTransport {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut easy = self.checkout();
        let result = self.perform(&mut easy, req);
        self.checkin(easy);
        result
    }
}
