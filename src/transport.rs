//! Transport: the pipeline's terminal link. A single reqwest-backed
//! implementation behind a pluggable trait so tests can swap in an
//! in-memory double.

use crate::error::ClientError;
use crate::model::Body;
use crate::request_builder::Request;
use crate::response::RawResponse;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use std::str::FromStr;
use std::time::Duration;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<RawResponse, ClientError>;
}

/// The default, reqwest-backed transport. Bodies are read eagerly into
/// memory rather than streamed; `FileSegment` bodies are read from disk
/// here for the same reason.
pub struct NativeTransport {
    client: reqwest::Client,
}

impl NativeTransport {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::transport_io("transport-init", e))?;
        Ok(NativeTransport { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self { NativeTransport { client } }
}

#[async_trait]
impl Transport for NativeTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, ClientError> {
        let method = reqwest::Method::from_bytes(request.verb.as_bytes())
            .map_err(|e| ClientError::transport_io(request.method_name, e))?;

        let mut builder = self.client.request(method, request.url.clone());

        for (name, value) in request.headers.iter() {
            let header_name = HeaderName::from_str(name)
                .map_err(|e| ClientError::transport_io(request.method_name, e))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::transport_io(request.method_name, e))?;
            builder = builder.header(header_name, header_value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body_to_reqwest(body, request.method_name)?);
        }

        log::debug!("{} sending {} {}", request.method_name, request.verb, request.url);
        let response = builder
            .send()
            .await
            .map_err(|e| {
                log::warn!("{} transport I/O error: {}", request.method_name, e);
                ClientError::transport_io(request.method_name, e)
            })?;

        let status = response.status().as_u16();
        log::debug!("{} received status {}", request.method_name, status);
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport_io(request.method_name, e))?
            .to_vec();

        Ok(RawResponse { status, headers, body })
    }
}

fn body_to_reqwest(body: Body, method_name: &str) -> Result<reqwest::Body, ClientError> {
    match body {
        Body::Bytes(bytes, _) => Ok(reqwest::Body::from(bytes)),
        Body::Text(text, _) => Ok(reqwest::Body::from(text)),
        Body::FileSegment { path, offset, length } => {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = std::fs::File::open(&path).map_err(|e| ClientError::transport_io(method_name, e))?;
            file.seek(SeekFrom::Start(offset)).map_err(|e| ClientError::transport_io(method_name, e))?;
            let mut buf = vec![0u8; length as usize];
            file.read_exact(&mut buf).map_err(|e| ClientError::transport_io(method_name, e))?;
            Ok(reqwest::Body::from(buf))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_client_with_timeout() {
        assert!(NativeTransport::new(Duration::from_secs(30)).is_ok());
    }
}
