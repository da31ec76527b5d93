use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::BoxError;
use crate::http::HttpMethod;
use crate::interceptor::ResponseInterceptor;
use crate::response::InterceptedResponse;

/// What is recorded for every response that reaches the interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetrics {
    /// Method of the request, when the response metadata carries it.
    pub method: Option<HttpMethod>,
    pub status: u16,
    /// Raw body length in bytes.
    pub response_size: usize,
    pub url: Url,
}

/// Receives collected response metrics.
#[async_trait]
pub trait MetricsCollector: Send + Sync {
    async fn collect(&self, metrics: ResponseMetrics);
}

/// Hands each response's metrics to a collector and passes it on unchanged.
#[derive(Clone)]
pub struct MetricsCollectionInterceptor {
    collector: Arc<dyn MetricsCollector>,
}

impl MetricsCollectionInterceptor {
    pub fn new(collector: Arc<dyn MetricsCollector>) -> Self {
        Self { collector }
    }
}

impl std::fmt::Debug for MetricsCollectionInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollectionInterceptor").finish_non_exhaustive()
    }
}

#[async_trait]
impl ResponseInterceptor for MetricsCollectionInterceptor {
    async fn intercept(&self, response: InterceptedResponse, data: &[u8]) -> Result<InterceptedResponse, BoxError> {
        let metrics = ResponseMetrics {
            method: response.metadata.method,
            status: response.status(),
            response_size: data.len(),
            url: response.metadata.url.clone(),
        };
        self.collector.collect(metrics).await;
        Ok(response)
    }
}
