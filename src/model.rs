//! Header and body value model.
//!
//! A case-insensitive, single-joined-value header map, and the request body
//! variants a [`crate::request_builder`] can produce.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Case-insensitive, multi-valued header map that always exposes a single
/// comma-joined value per name (no space between joined values).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    // keyed by lowercased header name; the stored string is already the
    // comma-joined observable value.
    inner: BTreeMap<String, String>,
}

impl HeaderMap {
    pub fn new() -> Self { HeaderMap::default() }

    fn norm(name: &str) -> String { name.to_ascii_lowercase() }

    /// Replaces any existing value for `name`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.inner.insert(Self::norm(name), value.into());
    }

    /// Appends `value` to any existing value for `name`, joined with `,`
    /// (no space), as happens when merging multi-valued server headers.
    pub fn append(&mut self, name: &str, value: impl AsRef<str>) {
        let key = Self::norm(name);
        match self.inner.get_mut(&key) {
            Some(existing) => {
                existing.push(',');
                existing.push_str(value.as_ref());
            },
            None => {
                self.inner.insert(key, value.as_ref().to_owned());
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> { self.inner.get(&Self::norm(name)).map(String::as_str) }

    pub fn contains(&self, name: &str) -> bool { self.inner.contains_key(&Self::norm(name)) }

    pub fn remove(&mut self, name: &str) -> Option<String> { self.inner.remove(&Self::norm(name)) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    pub fn len(&self) -> usize { self.inner.len() }

    /// Re-serializes the map as a JSON object, for deserializing a typed
    /// headers struct out of the raw response headers.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.inner
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut map = HeaderMap::new();
        for (k, v) in iter {
            map.append(k, v);
        }
        map
    }
}

/// A request body. Constructed by the request builder from a parameter
/// value plus the resolved content-type/encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// Raw bytes with an associated content-type.
    Bytes(Vec<u8>, String),
    /// Text with an associated content-type. Never constructed for an empty
    /// string; empty text bodies are suppressed.
    Text(String, String),
    /// A byte-range slice of a file on disk, read by the transport.
    FileSegment { path: PathBuf, offset: u64, length: u64 },
}

impl Body {
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Body::Bytes(_, ct) => Some(ct),
            Body::Text(_, ct) => Some(ct),
            Body::FileSegment { .. } => None,
        }
    }

    /// Builds a text body, suppressing empty strings.
    pub fn text_or_none(text: String, content_type: impl Into<String>) -> Option<Body> {
        if text.is_empty() {
            None
        } else {
            Some(Body::Text(text, content_type.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_append_joins_without_space() {
        let mut h = HeaderMap::new();
        h.append("Set-Cookie", "a=1");
        h.append("set-cookie", "b=2");
        h.append("SET-COOKIE", "c=3");
        assert_eq!(h.get("Set-Cookie"), Some("a=1,b=2,c=3"));
    }

    #[test]
    fn set_replaces_rather_than_appends() {
        let mut h = HeaderMap::new();
        h.set("X-Foo", "first");
        h.set("x-foo", "second");
        assert_eq!(h.get("X-FOO"), Some("second"));
    }

    #[test]
    fn empty_text_body_is_suppressed() {
        assert!(Body::text_or_none(String::new(), "text/plain").is_none());
        assert!(Body::text_or_none("hi".into(), "text/plain").is_some());
    }
}
