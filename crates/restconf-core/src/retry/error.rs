//! Errors surfaced by the request pipeline.

use crate::discovery::DiscoveryError;
use crate::response::{format_errors, ErrorRecord, ResponseEnvelope};
use crate::transport::TransportError;
use crate::wait::WaitError;
use thiserror::Error;

/// Failure of one client call.
///
/// Variants that saw an HTTP response keep the last envelope so callers
/// can inspect the status code and structured errors.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Connection or body-read failure, after retries were exhausted.
    #[error("{source} (after {attempts} attempts)")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// Transient fault still present when retries ran out.
    #[error(
        "HTTP request failed after {attempts} attempts: status {}, RESTCONF errors: {}",
        .response.status,
        format_errors(.response.all_errors())
    )]
    TransientExhausted {
        attempts: u32,
        response: Box<ResponseEnvelope>,
    },

    /// Non-2xx response that is not transient; never retried.
    #[error(
        "HTTP request failed: status {}, RESTCONF errors: {}",
        .response.status,
        format_errors(.response.all_errors())
    )]
    Http { response: Box<ResponseEnvelope> },

    /// 2xx response carrying structured errors.
    #[error(
        "RESTCONF request failed: status {}, errors: {}",
        .response.status,
        format_errors(.response.all_errors())
    )]
    Protocol { response: Box<ResponseEnvelope> },

    /// The write succeeded but the device became unreachable while waiting
    /// for its locks to clear.
    #[error(transparent)]
    Wait(#[from] WaitError),
}

impl RequestError {
    /// Last response seen, when the failure happened after one arrived.
    pub fn response(&self) -> Option<&ResponseEnvelope> {
        match self {
            RequestError::TransientExhausted { response, .. }
            | RequestError::Http { response }
            | RequestError::Protocol { response } => Some(&**response),
            _ => None,
        }
    }

    /// Last HTTP status code observed.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Transport {
                source: TransportError::BodyRead { status, .. },
                ..
            } => *status,
            other => other.response().map(|r| r.status),
        }
    }

    /// Structured errors of the last response (top-level, then per-edit).
    pub fn errors(&self) -> Vec<&ErrorRecord> {
        self.response()
            .map(|r| r.all_errors().collect())
            .unwrap_or_default()
    }

    /// Number of attempts made, where the pipeline ran at all.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            RequestError::Transport { attempts, .. }
            | RequestError::TransientExhausted { attempts, .. } => Some(*attempts),
            RequestError::Http { .. } | RequestError::Protocol { .. } => Some(1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(status: u16, tag: &str) -> Box<ResponseEnvelope> {
        Box::new(ResponseEnvelope {
            status,
            errors: vec![ErrorRecord {
                error_type: Some("protocol".to_string()),
                error_tag: Some(tag.to_string()),
                ..ErrorRecord::default()
            }],
            ..ResponseEnvelope::default()
        })
    }

    #[test]
    fn exhausted_keeps_last_status_and_errors() {
        let err = RequestError::TransientExhausted {
            attempts: 3,
            response: envelope(409, "lock-denied"),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.attempts(), Some(3));
        let msg = err.to_string();
        assert!(msg.contains("after 3 attempts"));
        assert!(msg.contains("status 409"));
        assert!(msg.contains("lock-denied"));
    }

    #[test]
    fn body_read_failure_reports_status() {
        let err = RequestError::Transport {
            attempts: 1,
            source: TransportError::BodyRead {
                status: Some(200),
                message: "connection reset".to_string(),
            },
        };
        assert_eq!(err.status(), Some(200));
        assert!(err.errors().is_empty());
        assert!(err.response().is_none());
    }

    #[test]
    fn connect_failure_has_no_status() {
        let err = RequestError::Transport {
            attempts: 3,
            source: TransportError::Connect("refused".to_string()),
        };
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn http_error_message_lists_errors() {
        let err = RequestError::Http {
            response: envelope(404, "invalid-value"),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("protocol/invalid-value"));
    }
}
