//! The typed call site: a service method is a value implementing
//! [`RestOperation`]. Static per-method metadata lives on
//! [`crate::descriptor::MethodDescriptor`] (built once, cached by type),
//! while per-call argument *values* come from the operation instance itself.

use crate::descriptor::MethodDescriptor;
use crate::error::ClientError;
use crate::model::{Body, HeaderMap};
use serde::de::DeserializeOwned;
use std::any::Any;

/// One resolved PATH/QUERY/HOST-SUBSTITUTION argument: a name paired with its
/// already-encoded-or-not string value. `None` for a QUERY argument means the
/// binding is omitted entirely rather than sent as an empty value.
pub type NamedArg = (&'static str, Option<String>);

/// A fully specified REST operation: static shape via `descriptor()`,
/// per-call values via the rest of the trait.
pub trait RestOperation: Any + Send + Sync {
    type Response: DeserializeOwned + Send + 'static;
    /// The schema type to attempt when constructing a typed unexpected-status
    /// error body. Use `serde_json::Value` when the service has no specific
    /// error schema.
    type ErrorBody: DeserializeOwned + Send + 'static;
    /// The envelope's typed-headers slot. Set to `()` for operations whose
    /// descriptor does not set `uses_envelope`.
    type Headers: HeadersSpec + Send + 'static;

    /// Builds this operation's immutable descriptor. Called at most once per
    /// concrete `Self` type; the result is cached by [`crate::registry::DescriptorRegistry`].
    fn build_descriptor() -> Result<MethodDescriptor, ClientError>;

    /// PATH and HOST-SUBSTITUTION argument values, in descriptor binding order.
    fn path_args(&self) -> Vec<NamedArg> { Vec::new() }

    /// QUERY argument values, in descriptor binding order.
    fn query_args(&self) -> Vec<NamedArg> { Vec::new() }

    /// HEADER-PARAM argument values (HEADER-LITERAL values are baked into
    /// the descriptor and need no per-call value).
    fn header_args(&self) -> Vec<(&'static str, String)> { Vec::new() }

    /// The BODY argument value, if this operation declared a BODY binding.
    fn body_value(&self) -> Option<BodyValue> { None }
}

/// An un-encoded request body value, still needing content-type resolution
/// and encoding.
pub enum BodyValue {
    Bytes(Vec<u8>),
    Text(String),
    FileSegment { path: std::path::PathBuf, offset: u64, length: u64 },
    /// Any other serializable value; encoded via the codec (JSON/XML)
    /// once the content-type/encoding has been resolved.
    Json(serde_json::Value),
}

impl BodyValue {
    pub fn into_body(self, resolved_content_type: &str, encoding: crate::codec::Encoding) -> Result<Option<Body>, ClientError> {
        match self {
            BodyValue::FileSegment { path, offset, length } => Ok(Some(Body::FileSegment { path, offset, length })),
            BodyValue::Bytes(bytes) => Ok(Some(Body::Bytes(bytes, resolved_content_type.to_owned()))),
            BodyValue::Text(text) => Ok(Body::text_or_none(text, resolved_content_type)),
            BodyValue::Json(value) => {
                let encoded = crate::codec::encode_value(&value, encoding)
                    .map_err(|e| ClientError::serialization("request-body", e))?;
                Ok(Body::text_or_none(encoded, resolved_content_type))
            },
        }
    }
}

/// The status+headers+body envelope result type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope<H, B> {
    pub status: u16,
    pub headers: H,
    pub raw_headers: HeaderMap,
    pub body: B,
}

/// How an envelope's `H` slot is produced from the raw header map. A `()`
/// headers type skips this step entirely. We can't give `()` and
/// `T: Deserialize` overlapping blanket impls, so each concrete headers type
/// opts in, usually via [`impl_json_headers`].
pub trait HeadersSpec: Sized {
    fn from_header_map(headers: &HeaderMap) -> Result<Self, ClientError>;
}

impl HeadersSpec for () {
    fn from_header_map(_headers: &HeaderMap) -> Result<Self, ClientError> { Ok(()) }
}

/// Implements [`HeadersSpec`] for a `Deserialize` headers struct by
/// re-serializing the raw header map as a JSON object and deserializing into
/// `$ty`.
#[macro_export]
macro_rules! impl_json_headers {
    ($ty:ty) => {
        impl $crate::operation::HeadersSpec for $ty {
            fn from_header_map(headers: &$crate::model::HeaderMap) -> Result<Self, $crate::error::ClientError> {
                serde_json::from_value(headers.to_json_value())
                    .map_err(|e| $crate::error::ClientError::serialization("envelope-headers", e))
            }
        }
    };
}
