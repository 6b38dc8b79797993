//! Response handling: status gate, entity decoding, and envelope assembly.

use crate::codec::deserialize_for_response;
use crate::descriptor::{EntityKind, MethodDescriptor};
use crate::error::ClientError;
use crate::model::HeaderMap;
use crate::operation::{Envelope, HeadersSpec, RestOperation};
use serde::de::DeserializeOwned;

/// The transport's raw result: status, headers, and a fully materialized
/// body. Bodies are read eagerly at the transport boundary, so a
/// `ByteStream`/`ChunkedBytes` projection just re-emits this single buffer
/// rather than truly streaming it.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    fn content_type(&self) -> Option<&str> { self.headers.get("content-type") }

    fn body_text(&self) -> String { String::from_utf8_lossy(&self.body).into_owned() }
}

/// If `status` falls outside the descriptor's expected set, materializes the
/// body as text and builds an unexpected-status error with a best-effort
/// typed error body. A failure to deserialize the error body degrades to the
/// same variant with `typed_body: None` rather than losing the original
/// response text.
pub fn status_gate<Op: RestOperation>(descriptor: &MethodDescriptor, raw: &RawResponse) -> Result<(), ClientError> {
    if descriptor.expected_statuses.contains(&raw.status) {
        return Ok(());
    }

    let text = raw.body_text();
    let typed_body = if text.is_empty() {
        None
    } else {
        deserialize_for_response::<Op::ErrorBody>(descriptor.method_name, &text, raw.content_type())
            .ok()
            .and_then(|v| serde_json::to_value(v).ok())
    };

    Err(ClientError::UnexpectedStatus {
        method: descriptor.method_name.to_owned(),
        status: raw.status,
        body: text,
        typed_body,
    })
}

/// Decodes a `Typed` entity body into `T` via the codec, honoring the
/// content-type precedence table. Callers needing wire-type remapping apply
/// [`crate::wire::WireCarrier::into_final`] to the decoded value themselves,
/// since Rust's lack of specialization means a generic `T` here can't be
/// conditionally treated as both a plain `Deserialize` target and a wire
/// carrier.
pub fn decode_typed<T: DeserializeOwned>(method: &str, raw: &RawResponse) -> Result<T, ClientError> {
    let text = raw.body_text();
    deserialize_for_response(method, &text, raw.content_type())
}

/// Decodes the response into `T` according to the descriptor's
/// [`EntityKind`]. Non-`Typed` kinds never touch the wire codec directly;
/// instead each is re-expressed as the JSON literal its Rust result type
/// would naturally deserialize from (`null` for `Void`, `true`/`false` for
/// `HeadBoolean`, a JSON byte array for the `Bytes` family), so the
/// operation's declared `Response` type stays an ordinary `Deserialize`
/// implementor in every case instead of needing a second, kind-specific
/// trait bound that Rust's lack of specialization would make impossible to
/// combine with the `Typed` path.
pub fn decode_entity<T: DeserializeOwned>(method: &str, raw: &RawResponse, entity_kind: EntityKind) -> Result<T, ClientError> {
    match entity_kind {
        EntityKind::Void => decode_literal(method, "null"),
        EntityKind::HeadBoolean => {
            let ok = is_success(raw.status);
            decode_literal(method, if ok { "true" } else { "false" })
        },
        EntityKind::Bytes | EntityKind::ByteStream => {
            let literal = serde_json::to_string(&raw.body).map_err(|e| ClientError::serialization(method, e))?;
            decode_literal(method, &literal)
        },
        EntityKind::ChunkedBytes => {
            let chunks = vec![raw.body.clone()];
            let literal = serde_json::to_string(&chunks).map_err(|e| ClientError::serialization(method, e))?;
            decode_literal(method, &literal)
        },
        EntityKind::Typed => decode_typed(method, raw),
        EntityKind::TypedElementStream => unreachable!("rejected at descriptor-build time"),
    }
}

fn decode_literal<T: DeserializeOwned>(method: &str, literal: &str) -> Result<T, ClientError> {
    serde_json::from_str(literal).map_err(|e| ClientError::serialization(method, e))
}

/// `200 <= status < 300`. Goes through `http::StatusCode` rather than a raw
/// range check so an out-of-range `u16` (never actually produced by a real
/// transport) can't silently compare as "successful".
fn is_success(status: u16) -> bool {
    http::StatusCode::from_u16(status).map(|s| s.is_success()).unwrap_or(false)
}

/// Assembles the envelope when the descriptor declares `uses_envelope`.
/// Headers are skipped (left as `Op::Headers::from_header_map` of an empty
/// map never called) only when the headers type is `()`.
pub fn assemble_envelope<Op: RestOperation>(
    descriptor: &MethodDescriptor,
    raw: &RawResponse,
    body: Op::Response,
) -> Result<Envelope<Op::Headers, Op::Response>, ClientError> {
    let headers = Op::Headers::from_header_map(&raw.headers)?;
    let _ = descriptor;
    Ok(Envelope {
        status: raw.status,
        headers,
        raw_headers: raw.headers.clone(),
        body,
    })
}
