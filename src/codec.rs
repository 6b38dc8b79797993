//! Codec contract: `serialize`/`deserialize` against JSON or XML, plus the
//! content-type precedence/segmentation rules used by both the request
//! builder and the response handler.

use crate::error::ClientError;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Xml,
}

/// Picks JSON or XML from a `Content-Type` value, matching on the
/// media-type segment before the first `;` and ignoring parameters like
/// `charset`. Anything else (including a missing header) is treated as
/// opaque by the caller; this function is only consulted once a typed
/// (non-opaque) decode/encode is already underway, so it defaults to JSON
/// when the media type is unrecognized.
pub fn encoding_for_content_type(content_type: Option<&str>) -> Encoding {
    let media_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match media_type.as_str() {
        "application/xml" | "text/xml" => Encoding::Xml,
        _ => Encoding::Json,
    }
}

pub fn encode_value(value: &serde_json::Value, encoding: Encoding) -> Result<String, CodecError> {
    match encoding {
        Encoding::Json => serde_json::to_string(value).map_err(CodecError::Json),
        Encoding::Xml => quick_xml::se::to_string(value).map_err(CodecError::Xml),
    }
}

pub fn serialize<T: Serialize>(value: &T, encoding: Encoding) -> Result<String, CodecError> {
    match encoding {
        Encoding::Json => serde_json::to_string(value).map_err(CodecError::Json),
        Encoding::Xml => quick_xml::se::to_string(value).map_err(CodecError::Xml),
    }
}

pub fn deserialize<T: DeserializeOwned>(text: &str, encoding: Encoding) -> Result<T, CodecError> {
    match encoding {
        Encoding::Json => serde_json::from_str(text).map_err(CodecError::Json),
        Encoding::Xml => quick_xml::de::from_str(text).map_err(CodecError::XmlDe),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML codec error: {0}")]
    Xml(#[from] quick_xml::se::SeError),
    #[error("XML codec error: {0}")]
    XmlDe(#[from] quick_xml::de::DeError),
}

pub fn deserialize_for_response<T: DeserializeOwned>(
    method: &str,
    text: &str,
    content_type: Option<&str>,
) -> Result<T, ClientError> {
    let encoding = encoding_for_content_type(content_type);
    deserialize(text, encoding).map_err(|e| ClientError::serialization(method, e))
}

/// Content-type inference precedence: explicit annotation > existing
/// `Content-Type` header > inferred from the body value.
pub fn resolve_content_type(
    declared_annotation: Option<&str>,
    existing_header: Option<&str>,
    body_is_opaque_bytes_or_string: bool,
) -> String {
    if let Some(declared) = declared_annotation {
        return declared.to_owned();
    }
    if let Some(existing) = existing_header {
        return existing.to_owned();
    }
    if body_is_opaque_bytes_or_string {
        "application/octet-stream".to_owned()
    } else {
        "application/json".to_owned()
    }
}
