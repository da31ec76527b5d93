//! Request descriptors.
//!
//! # Design
//! A `NetworkRequest` describes one logical call independently of any
//! transport. It is assembled with consuming `with_*` methods, never mutated
//! afterwards, and borrowed by the pipeline for every attempt so that each
//! retry rebuilds its transport message from the same description.
//!
//! Every optional override falls back to the client configuration when
//! absent. Interceptor lists given here replace the configured ones rather
//! than extending them.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::codec::Codec;
use crate::http::{AcceptableStatus, Headers, HttpMethod};
use crate::interceptor::{RequestInterceptor, ResponseInterceptor};
use crate::response::NoContent;
use crate::retry::RetryStrategy;

/// A name with an optional value, used for query strings and form bodies.
///
/// Items without a value are dropped when the URL or body is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormItem {
    pub name: String,
    pub value: Option<String>,
}

impl FormItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn without_value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// Request body: a typed model that goes through the codec, or bytes sent
/// as they are.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    Model(T),
    Raw(Vec<u8>),
}

/// Description of one HTTP call returning a `Res`.
pub struct NetworkRequest<Req = (), Res = NoContent> {
    path: Option<String>,
    method: HttpMethod,
    query_items: Vec<FormItem>,
    form_items: Option<Vec<FormItem>>,
    body: Option<Payload<Req>>,
    base_url: Option<String>,
    codec: Option<Arc<dyn Codec>>,
    additional_headers: Headers,
    request_interceptors: Option<Vec<Arc<dyn RequestInterceptor>>>,
    response_interceptors: Option<Vec<Arc<dyn ResponseInterceptor>>>,
    retry_strategy: Option<RetryStrategy>,
    timeout: Option<Duration>,
    acceptable_status: Option<AcceptableStatus>,
    _response: PhantomData<fn() -> Res>,
}

impl<Req, Res> NetworkRequest<Req, Res> {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            path: None,
            method,
            query_items: Vec::new(),
            form_items: None,
            body: None,
            base_url: None,
            codec: None,
            additional_headers: Headers::new(),
            request_interceptors: None,
            response_interceptors: None,
            retry_strategy: None,
            timeout: None,
            acceptable_status: None,
            _response: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get).with_path(path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post).with_path(path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put).with_path(path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch).with_path(path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete).with_path(path)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Replace the query items.
    pub fn with_query_items(mut self, items: impl IntoIterator<Item = FormItem>) -> Self {
        self.query_items = items.into_iter().collect();
        self
    }

    /// Append one query item.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_items.push(FormItem::new(name, value));
        self
    }

    /// Send a form body. Takes precedence over any typed or raw body.
    pub fn with_form_items(mut self, items: impl IntoIterator<Item = FormItem>) -> Self {
        self.form_items = Some(items.into_iter().collect());
        self
    }

    pub fn with_body(mut self, body: Req) -> Self {
        self.body = Some(Payload::Model(body));
        self
    }

    /// Send bytes without passing them through the codec.
    pub fn with_raw_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Payload::Raw(body.into()));
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_headers.set(name, value);
        self
    }

    pub fn with_request_interceptors(mut self, interceptors: Vec<Arc<dyn RequestInterceptor>>) -> Self {
        self.request_interceptors = Some(interceptors);
        self
    }

    pub fn with_response_interceptors(mut self, interceptors: Vec<Arc<dyn ResponseInterceptor>>) -> Self {
        self.response_interceptors = Some(interceptors);
        self
    }

    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = Some(strategy);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_acceptable_status(mut self, acceptable: AcceptableStatus) -> Self {
        self.acceptable_status = Some(acceptable);
        self
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn query_items(&self) -> &[FormItem] {
        &self.query_items
    }

    pub fn form_items(&self) -> Option<&[FormItem]> {
        self.form_items.as_deref()
    }

    pub fn body(&self) -> Option<&Payload<Req>> {
        self.body.as_ref()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn codec(&self) -> Option<&Arc<dyn Codec>> {
        self.codec.as_ref()
    }

    pub fn additional_headers(&self) -> &Headers {
        &self.additional_headers
    }

    pub fn request_interceptors(&self) -> Option<&[Arc<dyn RequestInterceptor>]> {
        self.request_interceptors.as_deref()
    }

    pub fn response_interceptors(&self) -> Option<&[Arc<dyn ResponseInterceptor>]> {
        self.response_interceptors.as_deref()
    }

    pub fn retry_strategy(&self) -> Option<RetryStrategy> {
        self.retry_strategy
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn acceptable_status(&self) -> Option<&AcceptableStatus> {
        self.acceptable_status.as_ref()
    }
}

impl<Req: fmt::Debug, Res> fmt::Debug for NetworkRequest<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkRequest")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("query_items", &self.query_items)
            .field("form_items", &self.form_items)
            .field("body", &self.body)
            .field("base_url", &self.base_url)
            .field("additional_headers", &self.additional_headers)
            .field("request_interceptors", &self.request_interceptors.as_ref().map(Vec::len))
            .field("response_interceptors", &self.response_interceptors.as_ref().map(Vec::len))
            .field("retry_strategy", &self.retry_strategy)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_constructors_set_method_and_path() {
        let request = NetworkRequest::<(), NoContent>::patch("/users/1");
        assert_eq!(request.method(), HttpMethod::Patch);
        assert_eq!(request.path(), Some("/users/1"));
        assert!(request.body().is_none());
        assert!(request.form_items().is_none());
    }

    #[test]
    fn overrides_are_absent_by_default() {
        let request = NetworkRequest::<(), NoContent>::new(HttpMethod::Get);
        assert!(request.path().is_none());
        assert!(request.request_interceptors().is_none());
        assert!(request.response_interceptors().is_none());
        assert!(request.retry_strategy().is_none());
        assert!(request.codec().is_none());
        assert!(request.acceptable_status().is_none());
    }

    #[test]
    fn with_query_appends_in_order() {
        let request = NetworkRequest::<(), NoContent>::get("/search")
            .with_query("q", "rust")
            .with_query("page", "2");
        let names: Vec<_> = request.query_items().iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["q", "page"]);
    }

    #[test]
    fn raw_body_replaces_model_body() {
        let request = NetworkRequest::<String, NoContent>::post("/upload")
            .with_body("model".to_string())
            .with_raw_body(b"bytes".to_vec());
        assert_eq!(request.body(), Some(&Payload::Raw(b"bytes".to_vec())));
    }

    #[test]
    fn headers_are_case_insensitive() {
        let request = NetworkRequest::<(), NoContent>::get("/")
            .with_header("X-Token", "a")
            .with_header("x-token", "b");
        assert_eq!(request.additional_headers().len(), 1);
        assert_eq!(request.additional_headers().get("X-TOKEN"), Some("b"));
    }

    #[test]
    fn empty_interceptor_override_is_kept() {
        let request = NetworkRequest::<(), NoContent>::get("/").with_request_interceptors(Vec::new());
        assert_eq!(request.request_interceptors().map(<[_]>::len), Some(0));
    }
}
