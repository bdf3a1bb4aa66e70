//! Post-write completion wait.
//!
//! After a write the device may still hold partial locks on the running
//! datastore while it applies the change. The waiter polls the NETCONF
//! monitoring datastore list at a fixed one-second spacing until the lock
//! clears, giving up quietly after ten polls: the write itself already
//! succeeded, so this only improves read-after-write visibility.

use crate::retry::Sleeper;
use crate::transport::{HttpRequest, Transport, TransportError, YANG_DATA_JSON};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Datastore list, relative to `{root}/data/`.
pub const DATASTORES_RESOURCE: &str = "ietf-netconf-monitoring:netconf-state/datastores/datastore";
/// Polls before giving up.
pub const WAIT_ATTEMPTS: u32 = 10;
/// Fixed spacing between polls.
pub const WAIT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitError {
    #[error("device unreachable while waiting for write completion: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Deserialize)]
struct Datastore {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    locks: Option<Locks>,
}

#[derive(Debug, Deserialize)]
struct Locks {
    #[serde(rename = "partial-lock", default)]
    partial_lock: Vec<Value>,
}

/// True when the running datastore reports an outstanding partial lock.
///
/// The datastore list may be keyed `datastore` or `<module>:datastore`; an
/// absent datastore `status` counts as valid. Bodies that do not parse are
/// treated as unlocked.
pub(crate) fn running_locked(body: &[u8]) -> bool {
    let Ok(root) = serde_json::from_slice::<Value>(body) else {
        return false;
    };
    let list = root.as_object().and_then(|obj| {
        obj.iter()
            .find(|(k, _)| *k == "datastore" || k.ends_with(":datastore"))
            .map(|(_, v)| v.clone())
    });
    let Some(list) = list else {
        return false;
    };
    let datastores: Vec<Datastore> = if list.is_array() {
        serde_json::from_value(list).unwrap_or_default()
    } else {
        serde_json::from_value(list).map(|d| vec![d]).unwrap_or_default()
    };
    datastores.iter().any(|ds| {
        ds.name == "running"
            && ds.status.as_deref().map_or(true, |s| s == "valid")
            && ds.locks.as_ref().is_some_and(|l| !l.partial_lock.is_empty())
    })
}

/// Poll until the running datastore has no partial lock, at most
/// [`WAIT_ATTEMPTS`] times. Only transport failures are errors.
pub fn wait_for_completion(
    transport: &dyn Transport,
    sleeper: &dyn Sleeper,
    datastores_url: &str,
    timeout: Option<Duration>,
) -> Result<(), WaitError> {
    for poll in 0..WAIT_ATTEMPTS {
        let mut req = HttpRequest::get(datastores_url, YANG_DATA_JSON);
        req.timeout = timeout;
        let res = transport.send(&req)?;
        if !(200..=299).contains(&res.status) {
            tracing::debug!(status = res.status, "datastore status unavailable, not waiting");
            return Ok(());
        }
        if !running_locked(&res.body) {
            tracing::debug!(poll, "running datastore unlocked");
            return Ok(());
        }
        tracing::debug!(poll, "running datastore still locked");
        sleeper.sleep(WAIT_INTERVAL);
    }
    tracing::warn!(
        attempts = WAIT_ATTEMPTS,
        "running datastore still locked, continuing without waiting further"
    );
    Ok(())
}
