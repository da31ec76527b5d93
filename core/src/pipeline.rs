//! The request execution pipeline.
//!
//! # Design
//! One attempt walks these stages in order:
//!
//! `Building -> RequestIntercepting -> Transporting -> Validating ->
//! Decoding -> ResponseIntercepting`
//!
//! Any stage may fail. A failed attempt is logged, remembered as the last
//! error, and followed by a fresh attempt from `Building` while the retry
//! controller allows it. When every attempt fails, the last attempt's error
//! is returned.
//!
//! Cancellation is observed at every suspension point (each interceptor,
//! the transport call, the delay between attempts) and before each attempt.
//! It unwinds the whole run immediately and is never retried.
//!
//! The pipeline holds no shared mutable state: everything per run lives on
//! this function's stack, so concurrent runs against one configuration do
//! not interact.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::builder::build_transport_request;
use crate::codec::decode_model;
use crate::config::NetworkConfiguration;
use crate::error::{NetworkClientError, RunError};
use crate::http::TransportResponse;
use crate::interceptor::{run_request_chain, run_response_chain};
use crate::logger::LogSink;
use crate::request::NetworkRequest;
use crate::response::{InterceptedResponse, NetworkResponse};
use crate::retry::RetryController;

/// Stage of a single attempt, reported in trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Building,
    RequestIntercepting,
    Transporting,
    Validating,
    Decoding,
    ResponseIntercepting,
}

/// Await `future` unless `token` is cancelled first.
pub(crate) async fn suspend<F: Future>(token: &CancellationToken, future: F) -> Result<F::Output, RunError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(RunError::Cancelled),
        output = future => Ok(output),
    }
}

/// Run `request` to completion under `configuration`, retrying as allowed.
pub(crate) async fn execute<Req, Res>(
    configuration: &NetworkConfiguration,
    request: &NetworkRequest<Req, Res>,
    token: &CancellationToken,
) -> Result<NetworkResponse<Res>, RunError>
where
    Req: Serialize + Sync,
    Res: DeserializeOwned + Send + 'static,
{
    let retry = RetryController::resolve(
        request.retry_strategy(),
        configuration.retry_strategy(),
        configuration.backoff(),
    );
    let log = LogSink::new(configuration.logger().map(|logger| logger.as_ref()), configuration.log_level());
    let mut last_error = None;

    for attempt in retry.attempts() {
        if token.is_cancelled() {
            return Err(RunError::Cancelled);
        }
        if attempt > 0 {
            log.warning(|| format!("Retrying request... Attempt {attempt}"));
            let delay = retry.delay_before(attempt);
            if !delay.is_zero() {
                suspend(token, tokio::time::sleep(delay)).await?;
            }
        }

        match run_attempt(configuration, request, &log, token).await {
            Ok(response) => return Ok(response),
            Err(RunError::Cancelled) => return Err(RunError::Cancelled),
            Err(RunError::Failed(error)) => {
                log.error(|| format!("{}: {}", error.log_label(), error.log_detail()));
                tracing::debug!(attempt, kind = ?error.kind(), "attempt failed");
                last_error = Some(error);
                if !retry.should_retry(attempt) {
                    break;
                }
            }
        }
    }

    Err(last_error.unwrap_or(NetworkClientError::Unknown(None)).into())
}

async fn run_attempt<Req, Res>(
    configuration: &NetworkConfiguration,
    request: &NetworkRequest<Req, Res>,
    log: &LogSink<'_>,
    token: &CancellationToken,
) -> Result<NetworkResponse<Res>, RunError>
where
    Req: Serialize + Sync,
    Res: DeserializeOwned + Send + 'static,
{
    enter(Stage::Building);
    let message = build_transport_request(request, configuration)?;

    enter(Stage::RequestIntercepting);
    let request_chain = request
        .request_interceptors()
        .unwrap_or(configuration.request_interceptors());
    let message = run_request_chain(request_chain, message, token).await?;

    log.info(|| format!("Request: {} {}", message.method, message.url));
    log.debug(|| format!("Headers: {}", message.headers));
    if let Some(body) = &message.body {
        log.debug(|| format!("Request body: {}", String::from_utf8_lossy(body)));
    }

    enter(Stage::Transporting);
    let method = message.method;
    let TransportResponse { data, mut metadata } = suspend(token, configuration.transport().send(message))
        .await?
        .map_err(NetworkClientError::Transport)?;
    metadata.method.get_or_insert(method);

    log.info(|| format!("Response: {} {}", metadata.status, metadata.url));
    log.debug(|| format!("Response headers: {}", metadata.headers));
    log.debug(|| format!("Response data: {}", String::from_utf8_lossy(&data)));

    enter(Stage::Validating);
    let acceptable = request
        .acceptable_status()
        .unwrap_or(configuration.acceptable_status());
    if !acceptable.contains(metadata.status) {
        return Err(NetworkClientError::UnacceptableStatusCode {
            status: metadata.status,
            metadata,
            data,
        }
        .into());
    }

    enter(Stage::Decoding);
    let codec = request.codec().unwrap_or(configuration.codec());
    let value: Res = decode_model(codec.as_ref(), &data).map_err(|e| NetworkClientError::Decoding(Box::new(e)))?;

    enter(Stage::ResponseIntercepting);
    let response_chain = request
        .response_interceptors()
        .unwrap_or(configuration.response_interceptors());
    let intercepted = InterceptedResponse::erase(NetworkResponse::new(value, metadata));
    let intercepted = run_response_chain(response_chain, intercepted, &data, token).await?;

    intercepted.restore::<Res>().map_err(|_| {
        RunError::from(NetworkClientError::ResponseInterceptor(
            "response interceptor replaced the value with a different type".into(),
        ))
    })
}

fn enter(stage: Stage) {
    tracing::trace!(?stage, "entering stage");
}
