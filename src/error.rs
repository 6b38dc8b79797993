use thiserror::Error;

/// The crate-wide error type. Every public fallible operation returns this type
/// (or a `Result` alias over it) rather than `anyhow`/`Box<dyn Error>`.
///
/// Parse-time variants (`MalformedInterface`, `UnsupportedReturnType`) surface
/// synchronously at binding construction. Everything else surfaces on the
/// future returned by a call, or when blocking for a synchronous return shape.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("MethodDescriptor for '{method}' is malformed: {reason}")]
    MalformedInterface { method: String, reason: String },

    #[error("unsupported return type on '{method}': {reason}")]
    UnsupportedReturnType { method: String, reason: String },

    #[error("transport I/O error calling '{method}': {source}")]
    TransportIo {
        method: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("serialization error in '{method}': {source}")]
    Serialization {
        method: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unexpected HTTP status {status} calling '{method}': {body}")]
    UnexpectedStatus {
        method: String,
        status: u16,
        body: String,
        /// Deserialized error body, when the declared error schema could be built from `body`.
        typed_body: Option<serde_json::Value>,
    },

    #[error("'{method}' was cancelled")]
    Cancelled { method: String },

    #[error("url construction failed for '{method}': {source}")]
    UrlParse {
        method: String,
        #[source]
        source: url::ParseError,
    },
}

impl ClientError {
    pub fn transport_io<E>(method: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClientError::TransportIo {
            method: method.into(),
            source: Box::new(source),
        }
    }

    pub fn serialization<E>(method: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClientError::Serialization {
            method: method.into(),
            source: Box::new(source),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
