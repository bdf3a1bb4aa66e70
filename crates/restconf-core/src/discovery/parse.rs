//! Parse the host-meta document and the capability list.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static RESTCONF_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"rel\s*=\s*['"]restconf['"]\s+href\s*=\s*['"]([^'"]+)['"]"#)
        .expect("restconf link regex is valid")
});

/// RESTCONF root path from the `rel='restconf'` link of a host-meta document.
/// A trailing slash is dropped so data paths can be appended directly.
pub(crate) fn restconf_root(host_meta: &str) -> Option<String> {
    let caps = RESTCONF_LINK.captures(host_meta)?;
    let href = caps.get(1)?.as_str().trim();
    let root = href.trim_end_matches('/');
    Some(root.to_string())
}

#[derive(Deserialize)]
struct CapabilityList {
    #[serde(default)]
    capability: Vec<String>,
}

/// Capability URIs from a `<module>:capabilities` payload.
pub(crate) fn capability_list(body: &[u8]) -> Result<Vec<String>, serde_json::Error> {
    let root: Value = serde_json::from_slice(body)?;
    let container = root
        .as_object()
        .and_then(|obj| {
            obj.iter()
                .find(|(k, _)| *k == "capabilities" || k.ends_with(":capabilities"))
                .map(|(_, v)| v.clone())
        })
        .unwrap_or(Value::Null);
    if container.is_null() {
        return Ok(Vec::new());
    }
    let list: CapabilityList = serde_json::from_value(container)?;
    Ok(list.capability)
}
