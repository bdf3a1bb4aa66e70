//! RESTCONF response envelope: status, payload and structured errors.

mod parse;

pub(crate) use parse::parse_errors;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// One entry of a RESTCONF `errors.error` list (RFC 8040 section 7.1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ErrorRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_app_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// `error-info` is anydata on the wire; non-string values keep their JSON text.
    #[serde(
        default,
        deserialize_with = "string_or_json",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_info: Option<String>,
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.error_type.as_deref().unwrap_or("-"),
            self.error_tag.as_deref().unwrap_or("-")
        )?;
        if let Some(path) = &self.error_path {
            write!(f, " at {}", path)?;
        }
        if let Some(msg) = &self.error_message {
            write!(f, ": {}", msg)?;
        }
        Ok(())
    }
}

fn string_or_json<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// `{"error": [...]}` container shared by every envelope shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorList {
    #[serde(default)]
    pub error: Vec<ErrorRecord>,
}

/// Body of a `yang-patch-status` response (RFC 8072 section 2.3).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct YangPatchStatus {
    #[serde(default)]
    pub patch_id: Option<String>,
    #[serde(default)]
    pub global_status: Option<StatusEntry>,
    #[serde(default)]
    pub edit_status: Option<EditStatus>,
    #[serde(default)]
    pub errors: Option<ErrorList>,
}

/// `ok` / `errors` pair used by global and per-edit status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    #[serde(default)]
    pub ok: Option<Value>,
    #[serde(default)]
    pub errors: Option<ErrorList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditStatus {
    #[serde(default)]
    pub edit: Vec<EditStatusEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditStatusEntry {
    #[serde(rename = "edit-id", default)]
    pub edit_id: String,
    #[serde(flatten)]
    pub status: StatusEntry,
}

impl YangPatchStatus {
    /// Errors attached to individual edits, in edit order.
    pub fn edit_errors(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.edit_status
            .iter()
            .flat_map(|s| s.edit.iter())
            .filter_map(|e| e.status.errors.as_ref())
            .flat_map(|l| l.error.iter())
    }
}

/// Result of one attempt, as handed back to the caller on success or
/// attached to the error on failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    /// Raw response payload.
    pub body: Vec<u8>,
    /// Top-level structured errors (plain or namespaced envelope, or the
    /// global errors of a patch status).
    pub errors: Vec<ErrorRecord>,
    /// Present when the device answered a YANG-Patch with a status record.
    pub patch_status: Option<YangPatchStatus>,
}

impl ResponseEnvelope {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Top-level errors followed by per-edit errors of a patch status.
    pub fn all_errors(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.errors
            .iter()
            .chain(self.patch_status.iter().flat_map(|p| p.edit_errors()))
    }

    pub fn has_errors(&self) -> bool {
        self.all_errors().next().is_some()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Payload parsed as JSON; `None` for empty or non-JSON bodies.
    pub fn json(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }

    /// Value at a dotted path in the JSON payload (see [`crate::body::Body`] for path syntax).
    pub fn get(&self, path: &str) -> Option<Value> {
        let json = self.json()?;
        crate::body::lookup(&json, path).cloned()
    }
}

/// Render an error list for log lines and error messages.
pub fn format_errors<'a>(errors: impl IntoIterator<Item = &'a ErrorRecord>) -> String {
    let parts: Vec<String> = errors.into_iter().map(|e| e.to_string()).collect();
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &str) -> ErrorRecord {
        ErrorRecord {
            error_type: Some("application".to_string()),
            error_tag: Some(tag.to_string()),
            ..ErrorRecord::default()
        }
    }

    #[test]
    fn all_errors_chains_top_level_then_edit_errors() {
        let env = ResponseEnvelope {
            status: 409,
            errors: vec![record("operation-failed")],
            patch_status: Some(YangPatchStatus {
                edit_status: Some(EditStatus {
                    edit: vec![
                        EditStatusEntry {
                            edit_id: "1".to_string(),
                            status: StatusEntry {
                                ok: Some(Value::Array(vec![Value::Null])),
                                errors: None,
                            },
                        },
                        EditStatusEntry {
                            edit_id: "2".to_string(),
                            status: StatusEntry {
                                ok: None,
                                errors: Some(ErrorList {
                                    error: vec![record("lock-denied")],
                                }),
                            },
                        },
                    ],
                }),
                ..YangPatchStatus::default()
            }),
            ..ResponseEnvelope::default()
        };
        let tags: Vec<_> = env
            .all_errors()
            .map(|e| e.error_tag.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(tags, ["operation-failed", "lock-denied"]);
        assert!(env.has_errors());
    }

    #[test]
    fn error_info_accepts_structured_values() {
        let r: ErrorRecord = serde_json::from_str(
            r#"{"error-type":"protocol","error-tag":"lock-denied","error-info":{"session-id":42}}"#,
        )
        .unwrap();
        assert_eq!(r.error_info.as_deref(), Some(r#"{"session-id":42}"#));
    }

    #[test]
    fn display_includes_tag_path_and_message() {
        let r = ErrorRecord {
            error_type: Some("application".to_string()),
            error_tag: Some("invalid-value".to_string()),
            error_path: Some("/native/hostname".to_string()),
            error_message: Some("inconsistent value".to_string()),
            ..ErrorRecord::default()
        };
        assert_eq!(
            r.to_string(),
            "application/invalid-value at /native/hostname: inconsistent value"
        );
        assert_eq!(format_errors(std::iter::empty()), "none");
    }

    #[test]
    fn json_helpers_tolerate_non_json_payloads() {
        let env = ResponseEnvelope {
            status: 200,
            body: b"<html>".to_vec(),
            ..ResponseEnvelope::default()
        };
        assert!(env.json().is_none());
        assert!(env.get("a").is_none());
        assert_eq!(env.text(), "<html>");
    }

    #[test]
    fn get_reads_dotted_paths() {
        let env = ResponseEnvelope {
            status: 200,
            body: br#"{"Cisco-IOS-XE-native:native":{"hostname":"R1"}}"#.to_vec(),
            ..ResponseEnvelope::default()
        };
        assert_eq!(
            env.get("Cisco-IOS-XE-native:native.hostname"),
            Some(Value::String("R1".to_string()))
        );
    }
}
