//! Request policy pipeline: an ordered chain-of-responsibility of policies
//! terminating in a [`Transport`] (user-agent -> retry -> cookie jar ->
//! credentials -> transport).

use crate::error::ClientError;
use crate::request_builder::Request;
use crate::response::RawResponse;
use crate::transport::Transport;
use async_trait::async_trait;
use std::sync::Arc;

/// One link in the chain. A policy may rewrite the outgoing request,
/// inspect/retry on the response, or both, then delegates to `next`.
#[async_trait]
pub trait RequestPolicy: Send + Sync {
    async fn handle(&self, request: Request, next: &dyn PolicyChain) -> Result<RawResponse, ClientError>;
}

/// The remaining chain, as seen by a policy. Kept as a trait object so a
/// policy never needs to know how many links follow it.
#[async_trait]
pub trait PolicyChain: Send + Sync {
    async fn proceed(&self, request: Request) -> Result<RawResponse, ClientError>;
}

struct ChainLink<'a> {
    policies: &'a [Arc<dyn RequestPolicy>],
    transport: &'a dyn Transport,
}

#[async_trait]
impl<'a> PolicyChain for ChainLink<'a> {
    async fn proceed(&self, request: Request) -> Result<RawResponse, ClientError> {
        match self.policies.split_first() {
            Some((head, rest)) => {
                let next = ChainLink { policies: rest, transport: self.transport };
                head.handle(request, &next).await
            },
            None => self.transport.send(request).await,
        }
    }
}

/// An assembled, ordered policy pipeline over a concrete [`Transport`].
pub struct Pipeline {
    policies: Vec<Arc<dyn RequestPolicy>>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// Builds a pipeline from policies in declaration order (outermost
    /// first): the first policy given sees the request first and the
    /// response last, matching the default user-agent -> retry -> cookie jar
    /// -> credentials -> transport ordering.
    pub fn new(policies: Vec<Arc<dyn RequestPolicy>>, transport: Arc<dyn Transport>) -> Self {
        Pipeline { policies, transport }
    }

    pub async fn dispatch(&self, request: Request) -> Result<RawResponse, ClientError> {
        log::debug!("{} {} dispatching through {} polic{}", request.verb, request.url, self.policies.len(), if self.policies.len() == 1 { "y" } else { "ies" });
        let chain = ChainLink { policies: &self.policies, transport: self.transport.as_ref() };
        let result = chain.proceed(request).await;
        if let Err(ref err) = result {
            log::warn!("pipeline dispatch failed: {}", err);
        }
        result
    }
}

/// Sets a constant `User-Agent` header, the outermost policy in the default
/// ordering since it never needs to see a retried/decorated request.
pub struct UserAgentPolicy {
    user_agent: String,
}

impl UserAgentPolicy {
    pub fn new(user_agent: impl Into<String>) -> Self { UserAgentPolicy { user_agent: user_agent.into() } }
}

#[async_trait]
impl RequestPolicy for UserAgentPolicy {
    async fn handle(&self, mut request: Request, next: &dyn PolicyChain) -> Result<RawResponse, ClientError> {
        request.headers.set("user-agent", self.user_agent.clone());
        next.proceed(request).await
    }
}

/// Attaches an `Authorization` header from a configured credential. Placed
/// closest to the transport so retries and cookie handling never have to
/// reason about it.
pub struct CredentialsPolicy {
    credential: Option<crate::config::Credential>,
}

impl CredentialsPolicy {
    pub fn new(credential: Option<crate::config::Credential>) -> Self { CredentialsPolicy { credential } }
}

#[async_trait]
impl RequestPolicy for CredentialsPolicy {
    async fn handle(&self, mut request: Request, next: &dyn PolicyChain) -> Result<RawResponse, ClientError> {
        if let Some(credential) = &self.credential {
            request.headers.set("authorization", credential.header_value());
        }
        next.proceed(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Body, HeaderMap};
    use std::sync::Mutex;
    use url::Url;

    struct RecordingTransport {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: Request) -> Result<RawResponse, ClientError> {
            self.seen.lock().unwrap().push("transport".to_owned());
            let _ = request;
            Ok(RawResponse { status: 200, headers: HeaderMap::new(), body: Vec::new() })
        }
    }

    struct TaggingPolicy {
        tag: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RequestPolicy for TaggingPolicy {
        async fn handle(&self, request: Request, next: &dyn PolicyChain) -> Result<RawResponse, ClientError> {
            self.seen.lock().unwrap().push(self.tag.to_owned());
            next.proceed(request).await
        }
    }

    fn dummy_request() -> Request {
        Request {
            verb: "GET".to_owned(),
            url: Url::parse("https://example.com/items").unwrap(),
            headers: HeaderMap::new(),
            body: None::<Body>,
            method_name: "m",
        }
    }

    #[tokio::test]
    async fn policies_run_outermost_first_transport_last() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = Arc::new(RecordingTransport { seen: Mutex::new(Vec::new()) });
        let policies: Vec<Arc<dyn RequestPolicy>> = vec![
            Arc::new(TaggingPolicy { tag: "user-agent", seen: seen.clone() }),
            Arc::new(TaggingPolicy { tag: "retry", seen: seen.clone() }),
            Arc::new(TaggingPolicy { tag: "cookie-jar", seen: seen.clone() }),
            Arc::new(TaggingPolicy { tag: "credentials", seen: seen.clone() }),
        ];
        let pipeline = Pipeline::new(policies, transport);
        pipeline.dispatch(dummy_request()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["user-agent", "retry", "cookie-jar", "credentials"]);
    }
}
