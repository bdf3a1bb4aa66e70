//! YANG-Patch (RFC 8072) request models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Capability URI advertising YANG-Patch support.
pub const YANG_PATCH_CAPABILITY: &str = "urn:ietf:params:restconf:capability:yang-patch:1.0";

/// Edit operations defined by RFC 8072.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOperation {
    Create,
    Delete,
    Insert,
    Merge,
    Move,
    Replace,
    Remove,
}

/// One edit of a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct YangPatchEdit {
    pub edit_id: String,
    pub operation: EditOperation,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#where: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl YangPatchEdit {
    /// Edit without an id; [`YangPatch::new`] numbers edits that lack one.
    pub fn new(operation: EditOperation, target: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            edit_id: String::new(),
            operation,
            target: target.into(),
            point: None,
            r#where: None,
            value,
        }
    }
}

/// A batched edit: `{"ietf-yang-patch:yang-patch": {...}}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct YangPatch {
    pub patch_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub edit: Vec<YangPatchEdit>,
}

#[derive(Serialize)]
struct YangPatchRoot<'a> {
    #[serde(rename = "ietf-yang-patch:yang-patch")]
    patch: &'a YangPatch,
}

impl YangPatch {
    /// Build a patch; edits with an empty `edit_id` get their 1-based position.
    pub fn new(patch_id: impl Into<String>, edits: Vec<YangPatchEdit>) -> Self {
        let edit = edits
            .into_iter()
            .enumerate()
            .map(|(i, mut e)| {
                if e.edit_id.is_empty() {
                    e.edit_id = (i + 1).to_string();
                }
                e
            })
            .collect();
        Self {
            patch_id: patch_id.into(),
            comment: None,
            edit,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Serialize as a `application/yang-patch+json` request body.
    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&YangPatchRoot { patch: self })
    }
}
