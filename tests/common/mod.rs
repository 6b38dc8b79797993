//! A scripted in-memory transport double for integration tests, standing in
//! for `NativeTransport` so scenarios never touch a real socket.

use async_trait::async_trait;
use restforge::model::HeaderMap;
use restforge::request_builder::Request;
use restforge::transport::Transport;
use restforge::ClientError;
use std::sync::Mutex;

pub struct ScriptedResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub struct MockTransport {
    responses: Mutex<Vec<ScriptedResponse>>,
    seen: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        MockTransport { responses: Mutex::new(responses), seen: Mutex::new(Vec::new()) }
    }

    pub fn seen_requests(&self) -> Vec<Request> {
        self.seen.lock().unwrap().iter().cloned().collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<restforge::response::RawResponse, ClientError> {
        self.seen.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(ClientError::transport_io(request.method_name, std::io::Error::new(std::io::ErrorKind::Other, "mock transport exhausted")));
        }
        let next = responses.remove(0);
        Ok(restforge::response::RawResponse { status: next.status, headers: next.headers, body: next.body })
    }
}
