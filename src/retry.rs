//! Retry policy: exponential backoff with jitter over transport-level
//! failures, the generalization of a
//! connect-and-retry loop a hand-rolled client would otherwise inline into
//! its dispatch function.

use crate::error::ClientError;
use crate::pipeline::{PolicyChain, RequestPolicy};
use crate::request_builder::Request;
use crate::response::RawResponse;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Retries a request when the transport itself fails (`TransportIo`) or the
/// response status is in the 5xx range. Does not retry `UnexpectedStatus`
/// for 4xx responses, or `Cancelled`/`MalformedInterface`/serialization
/// errors, since those indicate a request that will never succeed unchanged.
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self { RetryPolicy { config } }

    fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.config.base_delay.as_millis().saturating_mul(1u128 << attempt.min(16));
        let capped = exp.min(self.config.max_delay.as_millis());
        let jittered = rand::thread_rng().gen_range(0..=capped.max(1));
        Duration::from_millis(jittered as u64)
    }

    fn should_retry(status: u16) -> bool { (500..600).contains(&status) }
}

#[async_trait]
impl RequestPolicy for RetryPolicy {
    async fn handle(&self, request: Request, next: &dyn PolicyChain) -> Result<RawResponse, ClientError> {
        let mut attempt = 0;
        loop {
            let cloned = clone_request(&request);
            match next.proceed(cloned).await {
                Ok(response) if attempt + 1 >= self.config.max_attempts || !Self::should_retry(response.status) => {
                    return Ok(response);
                },
                Ok(response) => {
                    log::debug!("{} got retryable status {} on attempt {}", request.method_name, response.status, attempt + 1);
                },
                Err(ClientError::TransportIo { .. }) if attempt + 1 < self.config.max_attempts => {
                    log::debug!("{} transport error on attempt {}, retrying", request.method_name, attempt + 1);
                },
                Err(other) => return Err(other),
            }
            tokio::time::sleep(self.backoff(attempt)).await;
            attempt += 1;
        }
    }
}

fn clone_request(request: &Request) -> Request {
    Request {
        verb: request.verb.clone(),
        url: request.url.clone(),
        headers: request.headers.clone(),
        body: request.body.clone(),
        method_name: request.method_name,
    }
}
