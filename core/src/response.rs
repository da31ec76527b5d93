//! Response envelope and the no-content marker.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::http::ResponseMetadata;

/// Marker response type: decoding is skipped and this value is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NoContent;

/// A decoded value paired with the metadata of the response it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkResponse<T> {
    pub value: T,
    pub metadata: ResponseMetadata,
}

impl<T> NetworkResponse<T> {
    pub fn new(value: T, metadata: ResponseMetadata) -> Self {
        Self { value, metadata }
    }

    pub fn status(&self) -> u16 {
        self.metadata.status
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NetworkResponse<U> {
        NetworkResponse {
            value: f(self.value),
            metadata: self.metadata,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Type-erased value seen by response interceptors.
pub type AnyValue = Box<dyn Any + Send>;

/// Envelope as it travels through the response interceptor chain.
///
/// Interceptors are shared across requests with different response types, so
/// the value is erased here and restored once the chain has finished.
pub type InterceptedResponse = NetworkResponse<AnyValue>;

impl NetworkResponse<AnyValue> {
    pub(crate) fn erase<T: Send + 'static>(response: NetworkResponse<T>) -> Self {
        response.map(|value| Box::new(value) as AnyValue)
    }

    /// Recover the typed envelope, or give the erased one back if the value
    /// was replaced with another type.
    pub(crate) fn restore<T: 'static>(self) -> Result<NetworkResponse<T>, Self> {
        let NetworkResponse { value, metadata } = self;
        match value.downcast::<T>() {
            Ok(value) => Ok(NetworkResponse::new(*value, metadata)),
            Err(value) => Err(NetworkResponse::new(value, metadata)),
        }
    }

    pub fn value_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn value_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Swap the carried value. The replacement must have the request's
    /// declared response type, or the run fails.
    pub fn replace_value<T: Send + 'static>(self, value: T) -> Self {
        NetworkResponse::new(Box::new(value) as AnyValue, self.metadata)
    }
}
