//! Request and response interceptor ports, and chain execution.
//!
//! # Design
//! Each interceptor exposes a single `intercept` method. A chain is walked
//! strictly in list order as a left fold: the output of one interceptor is
//! the input of the next. The first failure stops the chain and is wrapped
//! into the matching taxonomy variant. Cancellation is checked before each
//! interceptor and raced against each `intercept` call.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, NetworkClientError, RunError};
use crate::http::TransportRequest;
use crate::pipeline::suspend;
use crate::response::InterceptedResponse;

/// Transforms the outgoing message before it reaches the transport.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn intercept(&self, request: TransportRequest) -> Result<TransportRequest, BoxError>;
}

/// Inspects or transforms a decoded response.
///
/// `data` is the raw body the value was decoded from.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn intercept(&self, response: InterceptedResponse, data: &[u8]) -> Result<InterceptedResponse, BoxError>;
}

pub(crate) async fn run_request_chain(
    chain: &[Arc<dyn RequestInterceptor>],
    request: TransportRequest,
    token: &CancellationToken,
) -> Result<TransportRequest, RunError> {
    let mut current = request;
    for interceptor in chain {
        current = suspend(token, interceptor.intercept(current))
            .await?
            .map_err(NetworkClientError::Interceptor)?;
    }
    Ok(current)
}

pub(crate) async fn run_response_chain(
    chain: &[Arc<dyn ResponseInterceptor>],
    response: InterceptedResponse,
    data: &[u8],
    token: &CancellationToken,
) -> Result<InterceptedResponse, RunError> {
    let mut current = response;
    for interceptor in chain {
        current = suspend(token, interceptor.intercept(current, data))
            .await?
            .map_err(NetworkClientError::ResponseInterceptor)?;
    }
    Ok(current)
}
