//! Header and timeout request interceptors.
//!
//! Each one overwrites the header it owns; values already on the message are
//! replaced.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::BoxError;
use crate::http::TransportRequest;
use crate::interceptor::RequestInterceptor;

const JSON: &str = "application/json";

/// Sets `Accept`, `application/json` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptHeaderInterceptor {
    accept: String,
}

impl AcceptHeaderInterceptor {
    pub fn new(accept: impl Into<String>) -> Self {
        Self { accept: accept.into() }
    }
}

impl Default for AcceptHeaderInterceptor {
    fn default() -> Self {
        Self::new(JSON)
    }
}

#[async_trait]
impl RequestInterceptor for AcceptHeaderInterceptor {
    async fn intercept(&self, mut request: TransportRequest) -> Result<TransportRequest, BoxError> {
        request.headers.set("Accept", self.accept.as_str());
        Ok(request)
    }
}

/// Sets `Content-Type` on messages that carry a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeInterceptor {
    content_type: String,
}

impl ContentTypeInterceptor {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
        }
    }
}

impl Default for ContentTypeInterceptor {
    fn default() -> Self {
        Self::new(JSON)
    }
}

#[async_trait]
impl RequestInterceptor for ContentTypeInterceptor {
    async fn intercept(&self, mut request: TransportRequest) -> Result<TransportRequest, BoxError> {
        if request.body.is_some() {
            request.headers.set("Content-Type", self.content_type.as_str());
        }
        Ok(request)
    }
}

/// Sets `User-Agent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentInterceptor {
    user_agent: String,
}

impl UserAgentInterceptor {
    /// `app/version (os)`, e.g. `Shop/2.1.0 (linux)`.
    pub fn new(app_name: &str, version: &str) -> Self {
        Self::custom(format!("{app_name}/{version} ({})", std::env::consts::OS))
    }

    pub fn custom(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl RequestInterceptor for UserAgentInterceptor {
    async fn intercept(&self, mut request: TransportRequest) -> Result<TransportRequest, BoxError> {
        request.headers.set("User-Agent", self.user_agent.as_str());
        Ok(request)
    }
}

/// Stamps every attempt with a fresh UUID v4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdInterceptor {
    header: String,
}

impl RequestIdInterceptor {
    pub const DEFAULT_HEADER: &'static str = "X-Request-ID";

    pub fn new(header: impl Into<String>) -> Self {
        Self { header: header.into() }
    }
}

impl Default for RequestIdInterceptor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HEADER)
    }
}

#[async_trait]
impl RequestInterceptor for RequestIdInterceptor {
    async fn intercept(&self, mut request: TransportRequest) -> Result<TransportRequest, BoxError> {
        request.headers.set(self.header.as_str(), Uuid::new_v4().to_string());
        Ok(request)
    }
}

/// Value of the `Cache-Control` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachePolicy {
    NoCache,
    NoStore,
    MaxAge(u64),
    Custom(String),
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachePolicy::NoCache => f.write_str("no-cache"),
            CachePolicy::NoStore => f.write_str("no-store"),
            CachePolicy::MaxAge(seconds) => write!(f, "max-age={seconds}"),
            CachePolicy::Custom(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheControlInterceptor {
    policy: CachePolicy,
}

impl CacheControlInterceptor {
    pub fn new(policy: CachePolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl RequestInterceptor for CacheControlInterceptor {
    async fn intercept(&self, mut request: TransportRequest) -> Result<TransportRequest, BoxError> {
        request.headers.set("Cache-Control", self.policy.to_string());
        Ok(request)
    }
}

/// Overrides the transport timeout of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutInterceptor {
    timeout: Duration,
}

impl TimeoutInterceptor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl RequestInterceptor for TimeoutInterceptor {
    async fn intercept(&self, mut request: TransportRequest) -> Result<TransportRequest, BoxError> {
        request.timeout = Some(self.timeout);
        Ok(request)
    }
}
