//! Invocation façade: the `Client` callers actually hold. Adapts a built
//! request/response round-trip to the operation's declared [`ReturnShape`],
//! one generic entry point per shape.

use crate::cookie::{CookiePolicy, InMemoryCookieJar};
use crate::config::ClientConfig;
use crate::descriptor::ReturnShape;
use crate::error::ClientError;
use crate::operation::{Envelope, RestOperation};
use crate::pipeline::{CredentialsPolicy, Pipeline, RequestPolicy, UserAgentPolicy};
use crate::registry::DescriptorRegistry;
use crate::request_builder::RequestBuilder;
use crate::response;
use crate::retry::RetryPolicy;
use crate::transport::{NativeTransport, Transport};
use std::sync::Arc;

/// The result of a call, before the caller unwraps it according to the
/// method's declared `uses_envelope`/return-shape combination.
pub enum CallOutcome<Op: RestOperation> {
    Plain(Op::Response),
    Enveloped(Envelope<Op::Headers, Op::Response>),
}

struct Inner {
    registry: DescriptorRegistry,
    pipeline: Pipeline,
    config: ClientConfig,
}

/// A cheaply-cloneable handle to a configured client. Clone shares the
/// descriptor cache, pipeline, and configuration across call sites.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_cookie_jar(config, Arc::new(InMemoryCookieJar::new()))
    }

    pub fn with_cookie_jar(config: ClientConfig, cookie_jar: Arc<dyn crate::cookie::CookieJar>) -> Result<Self, ClientError> {
        let transport = Arc::new(NativeTransport::new(config.timeout)?);
        Self::with_transport(config, cookie_jar, transport)
    }

    /// Builds a client over an arbitrary [`Transport`], letting tests swap in
    /// a double in place of `NativeTransport`.
    pub fn with_transport(
        config: ClientConfig,
        cookie_jar: Arc<dyn crate::cookie::CookieJar>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        // Ordering: user-agent -> retry -> cookie jar -> credentials -> transport.
        let policies: Vec<Arc<dyn RequestPolicy>> = vec![
            Arc::new(UserAgentPolicy::new(config.user_agent.clone())),
            Arc::new(RetryPolicy::new(config.retry)),
            Arc::new(CookiePolicy::new(cookie_jar)),
            Arc::new(CredentialsPolicy::new(config.credential.clone())),
        ];
        let pipeline = Pipeline::new(policies, transport);
        Ok(Client {
            inner: Arc::new(Inner { registry: DescriptorRegistry::new(), pipeline, config }),
        })
    }

    async fn dispatch<Op: RestOperation>(&self, op: &Op) -> Result<CallOutcome<Op>, ClientError> {
        let descriptor = self.inner.registry.get_or_build::<Op>(Op::build_descriptor)?;
        log::debug!("{} invoked", descriptor.method_name);

        let request = RequestBuilder {
            descriptor: &descriptor,
            base_url: &self.inner.config.base_url,
            path_args: op.path_args(),
            query_args: op.query_args(),
            header_args: op.header_args(),
            body_value: op.body_value(),
            transport_supports_patch: self.inner.config.transport_supports_patch,
            default_headers: self.inner.config.default_headers.clone(),
        }
        .build()?;

        let raw = self.inner.pipeline.dispatch(request).await?;
        if let Err(err) = response::status_gate::<Op>(&descriptor, &raw) {
            log::error!("{} failed status gate: {}", descriptor.method_name, err);
            return Err(err);
        }

        let body: Op::Response = response::decode_entity(descriptor.method_name, &raw, descriptor.entity_kind)?;

        if descriptor.uses_envelope {
            let envelope = response::assemble_envelope::<Op>(&descriptor, &raw, body)?;
            Ok(CallOutcome::Enveloped(envelope))
        } else {
            Ok(CallOutcome::Plain(body))
        }
    }

    /// The `FUTURE<T>` return shape: an `async fn` call site.
    pub async fn call<Op: RestOperation>(&self, op: Op) -> Result<CallOutcome<Op>, ClientError> {
        self.dispatch(&op).await
    }

    /// The `SYNC<T>`/`VOID` return shapes: the single blocking suspension
    /// point, driving the async call to completion on a dedicated
    /// current-thread runtime rather than requiring the caller to already be
    /// inside one.
    pub fn call_blocking<Op: RestOperation>(&self, op: Op) -> Result<CallOutcome<Op>, ClientError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::transport_io("call_blocking", e))?;
        runtime.block_on(self.dispatch(&op))
    }

    /// The `COMPLETION-ONLY` return shape: fires the call on a spawned task
    /// and hands back a handle the caller can await later, or drop to
    /// fire-and-forget. Requires a running tokio runtime, same as any other
    /// `tokio::spawn` call site.
    pub fn call_completion<Op>(&self, op: Op) -> tokio::task::JoinHandle<Result<CallOutcome<Op>, ClientError>>
    where
        Op: RestOperation + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move { client.dispatch(&op).await })
    }

    /// Honors the declared [`ReturnShape`] by dispatching to the matching
    /// method above, for callers that want shape-directed behavior without
    /// matching on `ReturnShape` themselves. `CompletionOnly` still returns a
    /// `JoinHandle`-shaped outcome, reported as `Cancelled` if the task
    /// panicked or was aborted before completion.
    pub async fn call_by_shape<Op>(&self, op: Op, shape: ReturnShape) -> Result<CallOutcome<Op>, ClientError>
    where
        Op: RestOperation + 'static,
    {
        match shape {
            ReturnShape::Void | ReturnShape::Sync => tokio::task::block_in_place(|| self.call_blocking(op)),
            ReturnShape::Future => self.call(op).await,
            ReturnShape::CompletionOnly => {
                let method = Op::build_descriptor()?.method_name.to_owned();
                self.call_completion(op).await.map_err(|_| ClientError::Cancelled { method })?
            },
        }
    }
}
