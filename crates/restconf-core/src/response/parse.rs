//! Extract structured errors from a response payload.

use super::{ErrorList, ErrorRecord, YangPatchStatus};
use serde_json::{Map, Value};

/// Errors found in one payload.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ParsedErrors {
    pub errors: Vec<ErrorRecord>,
    pub patch_status: Option<YangPatchStatus>,
}

/// Parse `body` as a plain (`errors`) or namespaced (`<ns>:errors`) error
/// envelope, or, when `yang_patch` is set, as a `<ns>:yang-patch-status`.
///
/// Valid JSON without any recognised envelope yields no errors; only
/// malformed payloads are reported as `Err`.
pub(crate) fn parse_errors(body: &[u8], yang_patch: bool) -> Result<ParsedErrors, serde_json::Error> {
    let root: Value = serde_json::from_slice(body)?;
    let Some(obj) = root.as_object() else {
        return Ok(ParsedErrors::default());
    };

    if yang_patch {
        if let Some(v) = find_member(obj, "yang-patch-status") {
            let status: YangPatchStatus = serde_json::from_value(v.clone())?;
            let mut errors = Vec::new();
            if let Some(list) = &status.errors {
                errors.extend(list.error.iter().cloned());
            }
            if let Some(list) = status.global_status.as_ref().and_then(|g| g.errors.as_ref()) {
                errors.extend(list.error.iter().cloned());
            }
            return Ok(ParsedErrors {
                errors,
                patch_status: Some(status),
            });
        }
    }

    match find_member(obj, "errors") {
        Some(v) => {
            let list: ErrorList = serde_json::from_value(v.clone())?;
            Ok(ParsedErrors {
                errors: list.error,
                patch_status: None,
            })
        }
        None => Ok(ParsedErrors::default()),
    }
}

/// Member named `name` or `<module>:name`.
fn find_member<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.iter()
        .find(|(k, _)| {
            k.as_str() == name
                || k
                    .rsplit_once(':')
                    .is_some_and(|(_, local)| local == name)
        })
        .map(|(_, v)| v)
}
