//! `Transport` backed by a `reqwest::Client`.

use async_trait::async_trait;
use reqwest::Method;

use super::Transport;
use crate::error::BoxError;
use crate::http::{Headers, ResponseMetadata, TransportRequest, TransportResponse};

/// Sends requests through a shared `reqwest::Client`.
///
/// Connection pooling, TLS and redirects are whatever the wrapped client was
/// built with.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, BoxError> {
        let method = Method::from_bytes(request.method.as_str().as_bytes())?;
        let mut builder = self.inner.request(method, request.url);

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let url = response.url().clone();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)))
            .collect();
        let data = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            data,
            metadata: ResponseMetadata {
                status,
                headers,
                url,
                method: Some(request.method),
            },
        })
    }
}
