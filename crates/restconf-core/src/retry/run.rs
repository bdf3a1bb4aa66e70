//! Retry loop: send, classify, back off, until success or a terminal failure.

use super::classify::ErrorClassifier;
use super::error::RequestError;
use super::policy::BackoffPolicy;
use super::sleep::Sleeper;
use crate::response::{format_errors, parse_errors, ResponseEnvelope};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport, YANG_PATCH_JSON};

/// Backoff policy plus rule table, applied to every data request.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    pub policy: BackoffPolicy,
    pub classifier: ErrorClassifier,
}

impl Executor {
    pub fn new(policy: BackoffPolicy, classifier: ErrorClassifier) -> Self {
        Self { policy, classifier }
    }

    /// Run `request` until it succeeds or fails terminally.
    ///
    /// `request` is never modified; each attempt sends a fresh clone of it.
    pub fn run(
        &self,
        transport: &dyn Transport,
        sleeper: &dyn Sleeper,
        request: &HttpRequest,
    ) -> Result<ResponseEnvelope, RequestError> {
        let mut attempt = 0u32;
        loop {
            let outgoing = request.clone();
            tracing::debug!(
                method = %outgoing.method,
                url = %outgoing.url,
                attempt,
                body = %String::from_utf8_lossy(outgoing.body.as_deref().unwrap_or_default()),
                "HTTP request"
            );

            let raw = match transport.send(&outgoing) {
                Ok(raw) => raw,
                Err(e) => {
                    if self.pause(sleeper, &mut attempt) {
                        tracing::warn!(error = %e, attempt, "HTTP request failed, retrying");
                        continue;
                    }
                    tracing::error!(error = %e, "HTTP request failed");
                    return Err(RequestError::Transport {
                        attempts: attempt + 1,
                        source: e,
                    });
                }
            };

            let envelope = build_envelope(raw, request.media_type == YANG_PATCH_JSON);
            tracing::debug!(status = envelope.status, body = %envelope.text(), "HTTP response");

            // already-removed object
            if request.method == Method::Delete && envelope.status == 502 {
                tracing::debug!("DELETE returned 502, treating as done");
                return Ok(envelope);
            }

            if self.classifier.is_transient(&envelope) {
                if self.pause(sleeper, &mut attempt) {
                    tracing::warn!(
                        status = envelope.status,
                        errors = %format_errors(envelope.all_errors()),
                        attempt,
                        "transient RESTCONF failure, retrying"
                    );
                    continue;
                }
                tracing::error!(
                    status = envelope.status,
                    errors = %format_errors(envelope.all_errors()),
                    "transient RESTCONF failure, retries exhausted"
                );
                return Err(RequestError::TransientExhausted {
                    attempts: attempt + 1,
                    response: Box::new(envelope),
                });
            }

            if !envelope.is_success() {
                tracing::error!(
                    status = envelope.status,
                    errors = %format_errors(envelope.all_errors()),
                    "HTTP request failed"
                );
                return Err(RequestError::Http {
                    response: Box::new(envelope),
                });
            }

            if envelope.has_errors() {
                tracing::error!(
                    status = envelope.status,
                    errors = %format_errors(envelope.all_errors()),
                    "RESTCONF request failed"
                );
                return Err(RequestError::Protocol {
                    response: Box::new(envelope),
                });
            }

            return Ok(envelope);
        }
    }

    /// Sleep and advance `attempt` if the policy allows another try.
    fn pause(&self, sleeper: &dyn Sleeper, attempt: &mut u32) -> bool {
        match self.policy.backoff(*attempt) {
            Some(delay) => {
                sleeper.sleep(delay);
                *attempt += 1;
                true
            }
            None => false,
        }
    }
}

/// Wrap a raw response, extracting structured errors from the payload.
/// Unparseable error bodies degrade to "no structured errors".
fn build_envelope(raw: HttpResponse, yang_patch: bool) -> ResponseEnvelope {
    let mut envelope = ResponseEnvelope {
        status: raw.status,
        body: raw.body,
        ..ResponseEnvelope::default()
    };
    if envelope.body.is_empty() {
        return envelope;
    }
    match parse_errors(&envelope.body, yang_patch) {
        Ok(parsed) => {
            envelope.errors = parsed.errors;
            envelope.patch_status = parsed.patch_status;
        }
        Err(e) if envelope.status >= 300 => {
            tracing::debug!(error = %e, "failed to parse RESTCONF errors");
        }
        // 2xx data payloads need not be JSON
        Err(_) => {}
    }
    envelope
}
