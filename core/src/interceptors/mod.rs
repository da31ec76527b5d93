//! Built-in interceptors.
//!
//! Request interceptors here only touch headers or the timeout of the
//! outgoing message. Response interceptors inspect the envelope and raw body;
//! none of them replaces the decoded value.

mod headers;
mod logging;
mod metrics;
mod retry_after;
mod status_validation;

pub use headers::{
    AcceptHeaderInterceptor, CacheControlInterceptor, CachePolicy, ContentTypeInterceptor, RequestIdInterceptor,
    TimeoutInterceptor, UserAgentInterceptor,
};
pub use logging::ResponseLoggingInterceptor;
pub use metrics::{MetricsCollectionInterceptor, MetricsCollector, ResponseMetrics};
pub use retry_after::{RetryAfter, RetryAfterError, RetryAfterInterceptor};
pub use status_validation::StatusCodeValidationInterceptor;
