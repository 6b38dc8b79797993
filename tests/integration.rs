//! End-to-end scenarios run against a scripted transport.

mod common;

use common::{MockTransport, ScriptedResponse};
use restforge::config::ClientConfigBuilder;
use restforge::descriptor::{EntityKind, MethodDescriptor, MethodDescriptorBuilder, ParamBinding, Verb};
use restforge::model::HeaderMap;
use restforge::operation::{BodyValue, Envelope, NamedArg};
use restforge::wire::{Base64UrlBytes, Rfc1123DateTime, WireCarrier};
use restforge::{impl_json_headers, CallOutcome, Client, ClientError, RestOperation};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

fn client(transport: MockTransport) -> Client {
    let config = ClientConfigBuilder::new(Url::parse("https://api.example.com").unwrap()).build();
    Client::with_transport(config, Arc::new(restforge::cookie::InMemoryCookieJar::new()), Arc::new(transport)).unwrap()
}

// GET /items/{id}, unencoded path param, typed JSON response.
struct GetItem {
    id: String,
}

#[derive(Deserialize, Debug, PartialEq)]
struct Item {
    id: String,
    n: u32,
}

impl RestOperation for GetItem {
    type Response = Item;
    type ErrorBody = serde_json::Value;
    type Headers = ();

    fn build_descriptor() -> Result<MethodDescriptor, ClientError> {
        MethodDescriptorBuilder::new("get_item", Verb::Get, "/items/{id}")
            .binding(ParamBinding::path("id", false))
            .build()
    }

    fn path_args(&self) -> Vec<NamedArg> { vec![("id", Some(self.id.clone()))] }
}

#[tokio::test]
async fn path_param_encoded_and_typed_body_decoded() {
    let transport = MockTransport::new(vec![ScriptedResponse {
        status: 200,
        headers: HeaderMap::new(),
        body: br#"{"id":"a/b","n":1}"#.to_vec(),
    }]);
    let client = client(transport);

    let outcome = client.call(GetItem { id: "a/b".to_owned() }).await.unwrap();
    let item = match outcome {
        CallOutcome::Plain(item) => item,
        CallOutcome::Enveloped(_) => panic!("expected plain outcome"),
    };
    assert_eq!(item, Item { id: "a/b".to_owned(), n: 1 });
}

// HEAD /probe, boolean result driven by status, with an unexpected-status case.
struct Probe;

impl RestOperation for Probe {
    type Response = bool;
    type ErrorBody = serde_json::Value;
    type Headers = ();

    fn build_descriptor() -> Result<MethodDescriptor, ClientError> {
        MethodDescriptorBuilder::new("probe", Verb::Head, "/probe")
            .entity_kind(EntityKind::HeadBoolean)
            .build()
    }
}

#[tokio::test]
async fn head_boolean_true_on_204() {
    let transport = MockTransport::new(vec![ScriptedResponse { status: 204, headers: HeaderMap::new(), body: Vec::new() }]);
    let client = client(transport);

    let outcome = client.call(Probe).await.unwrap();
    match outcome {
        CallOutcome::Plain(result) => assert!(result),
        CallOutcome::Enveloped(_) => panic!("expected plain outcome"),
    }
}

#[tokio::test]
async fn head_unexpected_status_outside_expected_set() {
    let transport = MockTransport::new(vec![ScriptedResponse { status: 404, headers: HeaderMap::new(), body: Vec::new() }]);
    let client = client(transport);

    let err = client.call(Probe).await.unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedStatus { status: 404, .. }));
}

// POST /upload with a raw byte body, no content-type annotation.
struct Upload {
    bytes: Vec<u8>,
}

impl RestOperation for Upload {
    type Response = ();
    type ErrorBody = serde_json::Value;
    type Headers = ();

    fn build_descriptor() -> Result<MethodDescriptor, ClientError> {
        MethodDescriptorBuilder::new("upload", Verb::Post, "/upload")
            .binding(ParamBinding::body())
            .entity_kind(EntityKind::Void)
            .build()
    }

    fn body_value(&self) -> Option<BodyValue> { Some(BodyValue::Bytes(self.bytes.clone())) }
}

#[tokio::test]
async fn bytes_body_infers_octet_stream_content_type() {
    let transport = MockTransport::new(vec![ScriptedResponse { status: 204, headers: HeaderMap::new(), body: Vec::new() }]);
    let transport = Arc::new(transport);
    let config = ClientConfigBuilder::new(Url::parse("https://api.example.com").unwrap()).build();
    let client = Client::with_transport(config, Arc::new(restforge::cookie::InMemoryCookieJar::new()), transport.clone()).unwrap();

    client.call(Upload { bytes: vec![0x01, 0x02, 0x03] }).await.unwrap();

    let seen = transport.seen_requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].headers.get("content-type"), Some("application/octet-stream"));
}

// GET /token, bytes entity with BASE64URL wire remapping, applied by the
// caller via `WireCarrier::into_final` (see src/wire.rs module docs).
struct GetToken;

impl RestOperation for GetToken {
    type Response = Base64UrlBytes;
    type ErrorBody = serde_json::Value;
    type Headers = ();

    fn build_descriptor() -> Result<MethodDescriptor, ClientError> {
        MethodDescriptorBuilder::new("get_token", Verb::Get, "/token").build()
    }
}

#[tokio::test]
async fn base64url_wire_carrier_decodes_to_bytes() {
    let transport = MockTransport::new(vec![ScriptedResponse {
        status: 200,
        headers: HeaderMap::new(),
        body: br#""AQID""#.to_vec(),
    }]);
    let client = client(transport);

    let outcome = client.call(GetToken).await.unwrap();
    let carrier = match outcome {
        CallOutcome::Plain(c) => c,
        CallOutcome::Enveloped(_) => panic!("expected plain outcome"),
    };
    assert_eq!(carrier.into_final().unwrap(), vec![1u8, 2, 3]);
}

// GET /list, a list of datetimes with RFC1123 wire remapping.
struct ListDates;

impl RestOperation for ListDates {
    type Response = Vec<Rfc1123DateTime>;
    type ErrorBody = serde_json::Value;
    type Headers = ();

    fn build_descriptor() -> Result<MethodDescriptor, ClientError> {
        MethodDescriptorBuilder::new("list_dates", Verb::Get, "/list").build()
    }
}

#[tokio::test]
async fn list_of_rfc1123_dates_remap_elementwise() {
    let transport = MockTransport::new(vec![ScriptedResponse {
        status: 200,
        headers: HeaderMap::new(),
        body: br#"["Sun, 06 Nov 1994 08:49:37 GMT"]"#.to_vec(),
    }]);
    let client = client(transport);

    let outcome = client.call(ListDates).await.unwrap();
    let carriers = match outcome {
        CallOutcome::Plain(c) => c,
        CallOutcome::Enveloped(_) => panic!("expected plain outcome"),
    };
    let dates = carriers.into_final().unwrap();
    assert_eq!(dates.len(), 1);
    assert_eq!(dates[0].to_rfc3339(), "1994-11-06T08:49:37+00:00");
}

// GET /env, an envelope with a typed `etag` header and a `name` body field.
#[derive(Deserialize, Debug, PartialEq)]
struct EnvHeaders {
    etag: String,
}
impl_json_headers!(EnvHeaders);

#[derive(Deserialize, Debug, PartialEq)]
struct EnvBody {
    name: String,
}

struct GetEnv;

impl RestOperation for GetEnv {
    type Response = EnvBody;
    type ErrorBody = serde_json::Value;
    type Headers = EnvHeaders;

    fn build_descriptor() -> Result<MethodDescriptor, ClientError> {
        MethodDescriptorBuilder::new("get_env", Verb::Get, "/env").uses_envelope(true).build()
    }
}

#[tokio::test]
async fn envelope_carries_status_typed_headers_and_body() {
    let mut headers = HeaderMap::new();
    headers.set("etag", "\"xyz\"");
    let transport = MockTransport::new(vec![ScriptedResponse { status: 200, headers, body: br#"{"name":"n"}"#.to_vec() }]);
    let client = client(transport);

    let outcome = client.call(GetEnv).await.unwrap();
    let envelope: Envelope<EnvHeaders, EnvBody> = match outcome {
        CallOutcome::Enveloped(e) => e,
        CallOutcome::Plain(_) => panic!("expected enveloped outcome"),
    };
    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.headers, EnvHeaders { etag: "\"xyz\"".to_owned() });
    assert_eq!(envelope.body, EnvBody { name: "n".to_owned() });
}
