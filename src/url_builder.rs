//! URL builder: compose scheme+host+path+query with percent-encoding.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// The RFC 3986 reserved-character set for the query component. `NON_ALPHANUMERIC`
/// over-encodes (it also hits `-_.~` which RFC 3986 calls unreserved), so we
/// carve those four back out, matching what a PATH-PARAM/QUERY-PARAM caller
/// would expect to see left alone.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a single path or query segment per RFC 3986.
pub fn percent_encode(value: &str) -> String { utf8_percent_encode(value, QUERY_ENCODE_SET).to_string() }

/// Builds an absolute URL from a base (scheme+host), a path already resolved
/// from the method's URL template (placeholders substituted, each value
/// pre-encoded per its binding's already-encoded flag), and an ordered
/// sequence of `(name, encoded-value)` query pairs.
///
/// Pair order reflects descriptor order: query pairs are appended in the
/// order given, never sorted or deduplicated.
pub struct UrlBuilder<'a> {
    base: &'a Url,
    path: String,
    query_pairs: Vec<(String, String)>,
}

impl<'a> UrlBuilder<'a> {
    pub fn new(base: &'a Url, path: impl Into<String>) -> Self {
        UrlBuilder {
            base,
            path: path.into(),
            query_pairs: Vec::new(),
        }
    }

    /// Appends a query binding. `null` query values are omitted by the
    /// caller before reaching here; `value` is expected to already be
    /// percent-encoded if the binding was pre-encoded.
    pub fn query_pair(&mut self, name: &str, encoded_value: &str) -> &mut Self {
        self.query_pairs.push((name.to_owned(), encoded_value.to_owned()));
        self
    }

    pub fn build(&self) -> Result<Url, url::ParseError> {
        let mut url = self.base.join(&self.path)?;
        if !self.query_pairs.is_empty() {
            // Query pairs are inserted verbatim (already percent-encoded by
            // the caller) to preserve descriptor order and pre-encoded values
            // byte-for-byte; `url::Url`'s own `append_pair` would re-encode.
            let encoded: Vec<String> = self
                .query_pairs
                .iter()
                .map(|(k, v)| format!("{}={}", percent_encode(k), v))
                .collect();
            url.set_query(Some(&encoded.join("&")));
        }
        Ok(url)
    }
}

/// Substitutes every `{name}` occurrence of `path_template` with the
/// corresponding encoded value. Unresolved placeholders are the caller's
/// responsibility to detect (descriptor build validates this up front).
pub fn substitute_path(path_template: &str, params: &[(&str, String)]) -> String {
    let mut path = path_template.to_owned();
    for (name, value) in params {
        path = path.replace(&format!("{{{}}}", name), value);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_encodes_reserved_path_segment() {
        assert_eq!(percent_encode("a/b"), "a%2Fb");
    }

    #[test]
    fn leaves_unreserved_characters_alone() {
        assert_eq!(percent_encode("abc-XYZ_123.~"), "abc-XYZ_123.~");
    }

    #[test]
    fn query_pairs_preserve_declaration_order() {
        let base = Url::parse("https://example.com/").unwrap();
        let mut builder = UrlBuilder::new(&base, "items");
        builder.query_pair("b", "2").query_pair("a", "1");
        let url = builder.build().unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn substitute_path_replaces_named_placeholders() {
        let path = substitute_path("/items/{id}/sub/{id}", &[("id", "a%2Fb".to_owned())]);
        assert_eq!(path, "/items/a%2Fb/sub/a%2Fb");
    }
}
