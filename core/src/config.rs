//! Client configuration.
//!
//! # Design
//! `NetworkConfiguration` is an immutable value created once per client and
//! shared behind an `Arc` by every run. It is assembled with consuming
//! `with_*` methods. Replacing it at runtime means handing the client a new
//! value; runs already in flight keep the one they started with.
//!
//! `ClientSettings` is the serializable subset a host can load from a file
//! or environment and turn into a configuration once a transport exists.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::{Codec, JsonCodec};
use crate::http::AcceptableStatus;
use crate::interceptor::{RequestInterceptor, ResponseInterceptor};
use crate::logger::{LogLevel, NetworkLogger, TracingLogger};
use crate::retry::{Backoff, RetryStrategy};
use crate::transport::Transport;

/// Everything a client needs to run requests.
#[derive(Clone)]
pub struct NetworkConfiguration {
    transport: Arc<dyn Transport>,
    codec: Arc<dyn Codec>,
    base_url: String,
    retry_strategy: RetryStrategy,
    backoff: Backoff,
    logger: Option<Arc<dyn NetworkLogger>>,
    log_level: LogLevel,
    timeout: Option<Duration>,
    acceptable_status: AcceptableStatus,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl NetworkConfiguration {
    /// Configuration with a JSON codec, no retries, no logger and no
    /// interceptors.
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            codec: Arc::new(JsonCodec::new()),
            base_url: base_url.into(),
            retry_strategy: RetryStrategy::None,
            backoff: Backoff::None,
            logger: None,
            log_level: LogLevel::default(),
            timeout: None,
            acceptable_status: AcceptableStatus::default(),
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn NetworkLogger>, level: LogLevel) -> Self {
        self.logger = Some(logger);
        self.log_level = level;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_acceptable_status(mut self, acceptable: AcceptableStatus) -> Self {
        self.acceptable_status = acceptable;
        self
    }

    pub fn with_request_interceptors(mut self, interceptors: Vec<Arc<dyn RequestInterceptor>>) -> Self {
        self.request_interceptors = interceptors;
        self
    }

    pub fn with_response_interceptors(mut self, interceptors: Vec<Arc<dyn ResponseInterceptor>>) -> Self {
        self.response_interceptors = interceptors;
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_strategy(&self) -> RetryStrategy {
        self.retry_strategy
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    pub fn logger(&self) -> Option<&Arc<dyn NetworkLogger>> {
        self.logger.as_ref()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn acceptable_status(&self) -> &AcceptableStatus {
        &self.acceptable_status
    }

    pub fn request_interceptors(&self) -> &[Arc<dyn RequestInterceptor>] {
        &self.request_interceptors
    }

    pub fn response_interceptors(&self) -> &[Arc<dyn ResponseInterceptor>] {
        &self.response_interceptors
    }
}

impl fmt::Debug for NetworkConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfiguration")
            .field("base_url", &self.base_url)
            .field("retry_strategy", &self.retry_strategy)
            .field("backoff", &self.backoff)
            .field("has_logger", &self.logger.is_some())
            .field("log_level", &self.log_level)
            .field("timeout", &self.timeout)
            .field("acceptable_status", &self.acceptable_status)
            .field("request_interceptors", &self.request_interceptors.len())
            .field("response_interceptors", &self.response_interceptors.len())
            .finish_non_exhaustive()
    }
}

/// Serializable client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,

    /// Default request timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub retry: RetryStrategy,

    #[serde(default)]
    pub backoff: Backoff,

    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    #[serde(default)]
    pub acceptable_status: AcceptableStatus,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: None,
            retry: RetryStrategy::default(),
            backoff: Backoff::default(),
            log_level: default_log_level(),
            acceptable_status: AcceptableStatus::default(),
        }
    }

    /// Build a configuration that logs through `tracing`.
    pub fn into_configuration(self, transport: Arc<dyn Transport>) -> NetworkConfiguration {
        let mut configuration = NetworkConfiguration::new(transport, self.base_url)
            .with_retry_strategy(self.retry)
            .with_backoff(self.backoff)
            .with_logger(Arc::new(TracingLogger), self.log_level)
            .with_acceptable_status(self.acceptable_status);
        if let Some(timeout_ms) = self.timeout_ms {
            configuration = configuration.with_timeout(Duration::from_millis(timeout_ms));
        }
        configuration
    }
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}
