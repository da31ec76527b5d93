//! Transport port.
//!
//! # Design
//! The transport is the only place where bytes leave the process. It takes a
//! fully built and intercepted `TransportRequest` and returns the raw body
//! with its metadata. Any HTTP status is a successful send; status policy
//! belongs to the pipeline. The pipeline races every `send` against the
//! run's cancellation token, so dropping the future must be safe.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::http::{TransportRequest, TransportResponse};

#[cfg(feature = "reqwest")]
mod reqwest_transport;

#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;

/// Sends one request and returns the response bytes and metadata.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, BoxError>;
}
