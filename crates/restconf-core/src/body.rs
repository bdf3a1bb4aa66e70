//! JSON request-body builder with dotted paths.
//!
//! Paths are split on `.`; a literal dot inside a key is written `\.`.
//! Missing intermediate objects are created, and a non-object value sitting
//! on the path is replaced by an object.
//!
//! ```
//! use restconf_core::body::Body;
//!
//! let body = Body::new()
//!     .set("Cisco-IOS-XE-native:native.hostname", "ROUTER-1")
//!     .set("Cisco-IOS-XE-native:native.ip.domain.name", "example.com");
//! assert_eq!(
//!     body.to_string(),
//!     r#"{"Cisco-IOS-XE-native:native":{"hostname":"ROUTER-1","ip":{"domain":{"name":"example.com"}}}}"#
//! );
//! ```

use serde_json::{Map, Value};
use std::fmt;

/// Incrementally built JSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    value: Value,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `path` to `value`.
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        insert(&mut self.value, &split_path(path), value.into());
        self
    }

    /// Set `path` to a raw JSON fragment, e.g. another body's string.
    pub fn set_raw(self, path: &str, raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(self.set(path, value))
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.value, path)
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Null => f.write_str("{}"),
            v => write!(f, "{}", v),
        }
    }
}

impl From<Body> for Vec<u8> {
    fn from(body: Body) -> Self {
        body.into_bytes()
    }
}

/// Value at a dotted path inside `root`.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    split_path(path)
        .iter()
        .try_fold(root, |node, key| node.as_object()?.get(key))
}

fn insert(node: &mut Value, keys: &[String], value: Value) {
    let Some((first, rest)) = keys.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.clone()).or_insert(Value::Null);
        insert(child, rest, value);
    }
}

fn split_path(path: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => current.push(next),
                None => current.push('\\'),
            },
            '.' => keys.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    if !path.is_empty() {
        keys.push(current);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_set_round_trips_through_parsing() {
        let body = Body::new()
            .set("a.b.c", "x")
            .set("a.b.d", 5)
            .set("a.e", true);
        let parsed: Value = serde_json::from_str(&body.to_string()).unwrap();
        assert_eq!(lookup(&parsed, "a.b.c"), Some(&json!("x")));
        assert_eq!(lookup(&parsed, "a.b.d"), Some(&json!(5)));
        assert_eq!(lookup(&parsed, "a.e"), Some(&json!(true)));
        assert_eq!(parsed, *body.as_value());
    }

    #[test]
    fn set_raw_nests_another_body() {
        let inner = Body::new().set("name", "a").to_string();
        let body = Body::new().set_raw("a", &inner).unwrap();
        assert_eq!(body.get("a.name"), Some(&json!("a")));
        assert!(Body::new().set_raw("a", "{not json").is_err());
    }

    #[test]
    fn escaped_dots_stay_in_the_key() {
        let body = Body::new().set(r"native.ip\.address", "10.0.0.1");
        assert_eq!(body.as_value(), &json!({"native": {"ip.address": "10.0.0.1"}}));
        assert_eq!(body.get(r"native.ip\.address"), Some(&json!("10.0.0.1")));
    }

    #[test]
    fn scalar_on_path_is_replaced_by_object() {
        let body = Body::new().set("a", 1).set("a.b", 2);
        assert_eq!(body.as_value(), &json!({"a": {"b": 2}}));
    }

    #[test]
    fn overwriting_keeps_siblings() {
        let body = Body::new().set("a.b", 1).set("a.c", 2).set("a.b", 3);
        assert_eq!(body.as_value(), &json!({"a": {"b": 3, "c": 2}}));
    }

    #[test]
    fn empty_body_renders_as_empty_object() {
        assert_eq!(Body::new().to_string(), "{}");
        assert!(Body::new().get("a").is_none());
    }
}
