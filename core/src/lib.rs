//! Asynchronous, typed HTTP client core built around a request pipeline.
//!
//! # Overview
//! A caller describes an endpoint with a [`NetworkRequest`] (method, path,
//! query, body, expected response type, per-request overrides) and hands it
//! to a [`NetworkClient`]. The client builds a transport message, runs it
//! through request interceptors, sends it via a pluggable [`Transport`],
//! validates the status, decodes the body and runs response interceptors.
//! Failed attempts are retried per [`RetryStrategy`]; every failure ends up
//! as a [`NetworkClientError`].
//!
//! # Design
//! - The network is behind the [`Transport`] trait, so the whole pipeline
//!   runs deterministically in tests with a scripted transport.
//! - [`NetworkConfiguration`] is immutable and shared by `Arc`; requests
//!   override individual fields without touching it.
//! - Cancellation is a separate outcome ([`RunError::Cancelled`]) and never
//!   a variant of the error taxonomy.
//! - Diagnostics go to an optional [`NetworkLogger`]; the crate also emits
//!   `tracing` spans and events of its own.

pub mod builder;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod interceptors;
pub mod logger;
pub mod request;
pub mod response;
pub mod retry;
pub mod transport;

mod pipeline;

pub use client::{NetworkClient, NetworkClientStatus};
pub use codec::{Codec, CodecError, JsonCodec};
pub use config::{ClientSettings, NetworkConfiguration};
pub use error::{BoxError, ErrorKind, NetworkClientError, RunError};
pub use http::{AcceptableStatus, Headers, HttpMethod, ResponseMetadata, TransportRequest, TransportResponse};
pub use interceptor::{RequestInterceptor, ResponseInterceptor};
pub use logger::{LogLevel, NetworkLogger, StdoutLogger, TracingLogger};
pub use request::{FormItem, NetworkRequest, Payload};
pub use response::{InterceptedResponse, NetworkResponse, NoContent};
pub use retry::{Backoff, RetryStrategy};
pub use transport::Transport;

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;

pub use tokio_util::sync::CancellationToken;
