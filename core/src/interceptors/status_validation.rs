use async_trait::async_trait;

use crate::error::{BoxError, NetworkClientError};
use crate::http::AcceptableStatus;
use crate::interceptor::ResponseInterceptor;
use crate::response::InterceptedResponse;

/// Rejects responses whose status falls outside `acceptable`.
///
/// The pipeline already enforces the configured [`AcceptableStatus`] before
/// decoding. This interceptor adds a second, stricter gate after decoding,
/// e.g. to accept only `200` for one endpoint. The failure is an
/// `UnacceptableStatusCode` error, reported wrapped as a response
/// interceptor error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCodeValidationInterceptor {
    acceptable: AcceptableStatus,
}

impl StatusCodeValidationInterceptor {
    pub fn new(acceptable: AcceptableStatus) -> Self {
        Self { acceptable }
    }

    pub fn codes(codes: impl IntoIterator<Item = u16>) -> Self {
        Self::new(AcceptableStatus::codes(codes))
    }

    pub fn range(range: std::ops::RangeInclusive<u16>) -> Self {
        Self::new(AcceptableStatus::range(range))
    }

    pub fn ranges(ranges: impl IntoIterator<Item = std::ops::RangeInclusive<u16>>) -> Self {
        Self::new(AcceptableStatus::ranges(ranges))
    }
}

#[async_trait]
impl ResponseInterceptor for StatusCodeValidationInterceptor {
    async fn intercept(&self, response: InterceptedResponse, data: &[u8]) -> Result<InterceptedResponse, BoxError> {
        let status = response.status();
        if self.acceptable.contains(status) {
            return Ok(response);
        }
        Err(Box::new(NetworkClientError::UnacceptableStatusCode {
            status,
            metadata: response.metadata,
            data: data.to_vec(),
        }))
    }
}
