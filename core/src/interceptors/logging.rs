use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::interceptor::ResponseInterceptor;
use crate::logger::{LogLevel, NetworkLogger};
use crate::response::InterceptedResponse;

/// Logs status, headers and body of each response at a fixed level.
///
/// Bypasses the configured minimum level: every line goes to `logger`.
#[derive(Clone)]
pub struct ResponseLoggingInterceptor {
    logger: Arc<dyn NetworkLogger>,
    level: LogLevel,
}

impl ResponseLoggingInterceptor {
    pub fn new(logger: Arc<dyn NetworkLogger>) -> Self {
        Self::with_level(logger, LogLevel::Debug)
    }

    pub fn with_level(logger: Arc<dyn NetworkLogger>, level: LogLevel) -> Self {
        Self { logger, level }
    }
}

impl std::fmt::Debug for ResponseLoggingInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseLoggingInterceptor")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ResponseInterceptor for ResponseLoggingInterceptor {
    async fn intercept(&self, response: InterceptedResponse, data: &[u8]) -> Result<InterceptedResponse, BoxError> {
        self.logger
            .log(self.level, &format!("Response interceptor - Status: {}", response.status()));
        self.logger
            .log(self.level, &format!("Response interceptor - Headers: {}", response.metadata.headers));
        if let Ok(body) = std::str::from_utf8(data) {
            self.logger.log(self.level, &format!("Response interceptor - Body: {body}"));
        }
        Ok(response)
    }
}
