//! Error types for the request pipeline.
//!
//! # Design
//! `NetworkClientError` is a closed taxonomy: every failure raised while
//! building, intercepting, sending, validating or decoding a request is
//! wrapped into exactly one variant before it leaves the pipeline.
//! Collaborator failures travel as `BoxError` so transports, codecs and
//! interceptors can use their own error types.
//!
//! Cancellation is not part of the taxonomy. `RunError` separates
//! `Cancelled` from `Failed` so callers can tell an aborted run from one that
//! exhausted its retries.

use thiserror::Error;

use crate::http::ResponseMetadata;

/// Boxed error produced by pluggable collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for pipeline stages that cannot be cancelled.
pub type Result<T> = std::result::Result<T, NetworkClientError>;

/// Fieldless view of a `NetworkClientError`, handy for branching and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedUrl,
    Encoding,
    Transport,
    UnacceptableStatusCode,
    Decoding,
    Interceptor,
    ResponseInterceptor,
    Unknown,
}

/// Every way a single attempt can fail.
#[derive(Debug, Error)]
pub enum NetworkClientError {
    /// The base URL, path or query could not be assembled into a URL.
    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    /// The request body could not be serialized.
    #[error("encoding error: {0}")]
    Encoding(#[source] BoxError),

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The response status is outside the acceptable set. Decoding was not
    /// attempted; `data` holds the raw body.
    #[error("unacceptable status code: {status}")]
    UnacceptableStatusCode {
        status: u16,
        metadata: ResponseMetadata,
        data: Vec<u8>,
    },

    /// The response body could not be decoded into the declared type.
    #[error("decoding error: {0}")]
    Decoding(#[source] BoxError),

    /// A request interceptor failed; the transport was not called.
    #[error("interceptor error: {0}")]
    Interceptor(#[source] BoxError),

    /// A response interceptor failed.
    #[error("response interceptor error: {0}")]
    ResponseInterceptor(#[source] BoxError),

    #[error("unknown error{}", .0.as_ref().map(|inner| format!(": {inner}")).unwrap_or_default())]
    Unknown(Option<BoxError>),
}

impl NetworkClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NetworkClientError::MalformedUrl(_) => ErrorKind::MalformedUrl,
            NetworkClientError::Encoding(_) => ErrorKind::Encoding,
            NetworkClientError::Transport(_) => ErrorKind::Transport,
            NetworkClientError::UnacceptableStatusCode { .. } => ErrorKind::UnacceptableStatusCode,
            NetworkClientError::Decoding(_) => ErrorKind::Decoding,
            NetworkClientError::Interceptor(_) => ErrorKind::Interceptor,
            NetworkClientError::ResponseInterceptor(_) => ErrorKind::ResponseInterceptor,
            NetworkClientError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Status code carried by `UnacceptableStatusCode`.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkClientError::UnacceptableStatusCode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Log line prefix for a failed attempt.
    pub(crate) fn log_label(&self) -> &'static str {
        match self.kind() {
            ErrorKind::MalformedUrl => "Malformed URL",
            ErrorKind::Encoding => "Encoding error",
            ErrorKind::Transport => "Transport error",
            ErrorKind::UnacceptableStatusCode => "Unacceptable status code",
            ErrorKind::Decoding => "Decoding error",
            ErrorKind::Interceptor => "Interceptor error",
            ErrorKind::ResponseInterceptor => "Response interceptor error",
            ErrorKind::Unknown => "Unknown error",
        }
    }

    /// Detail that follows the log label.
    pub(crate) fn log_detail(&self) -> String {
        match self {
            NetworkClientError::MalformedUrl(detail) => detail.clone(),
            NetworkClientError::Encoding(inner)
            | NetworkClientError::Transport(inner)
            | NetworkClientError::Decoding(inner)
            | NetworkClientError::Interceptor(inner)
            | NetworkClientError::ResponseInterceptor(inner) => inner.to_string(),
            NetworkClientError::UnacceptableStatusCode { status, metadata, .. } => {
                format!("{status} {}", metadata.url)
            }
            NetworkClientError::Unknown(inner) => inner
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "no further details".to_string()),
        }
    }
}

/// Outcome of a failed run: cancelled, or failed with a taxonomy error.
#[derive(Debug, Error)]
pub enum RunError {
    /// The run was cancelled; no further attempt or interceptor ran.
    #[error("request cancelled")]
    Cancelled,

    /// The last attempt failed with this error.
    #[error(transparent)]
    Failed(#[from] NetworkClientError),
}

impl RunError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Cancelled)
    }

    pub fn as_network_error(&self) -> Option<&NetworkClientError> {
        match self {
            RunError::Failed(error) => Some(error),
            RunError::Cancelled => None,
        }
    }

    pub fn into_network_error(self) -> Option<NetworkClientError> {
        match self {
            RunError::Failed(error) => Some(error),
            RunError::Cancelled => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.as_network_error().map(NetworkClientError::kind)
    }
}
