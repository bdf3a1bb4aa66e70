//! Retry, backoff and transient-error classification.
//!
//! This module holds the request executor and the pieces it consults on
//! every attempt: the backoff policy that decides whether and how long to
//! wait, and the rule table that separates transient device faults (lock
//! contention, momentary inconsistency, 5xx) from permanent errors.

mod classify;
mod error;
mod policy;
mod run;
mod sleep;

pub use classify::{default_rules, ErrorClassifier, FieldPattern, TransientRule};
pub use error::RequestError;
pub use policy::BackoffPolicy;
pub use run::Executor;
pub use sleep::{Sleeper, ThreadSleeper};
