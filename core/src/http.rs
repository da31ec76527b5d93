//! HTTP transport types exchanged with the transport port.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! pipeline builds one `TransportRequest` per attempt, hands it to a
//! `Transport`, and receives a `TransportResponse` holding the raw bytes and
//! the `ResponseMetadata`. Nothing in this module performs I/O.
//!
//! All fields use owned types so values can move freely between interceptors,
//! transports and spawned tasks without lifetime concerns.

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list with case-insensitive names.
///
/// Setting a header that already exists replaces its value in place, so the
/// position of the first occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(index).1)
    }

    /// Copy every header of `other` onto `self`; `other` wins on conflict.
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (name, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name:?}: {value:?}")?;
        }
        f.write_str("}")
    }
}

/// An HTTP request described as plain data.
///
/// Built by the message builder for every attempt, then passed through the
/// request interceptor chain before reaching the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
            timeout: None,
        }
    }
}

/// Status, headers and final URL of a response, without the body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMetadata {
    pub status: u16,
    pub headers: Headers,
    pub url: Url,
    /// Method of the request this response answers. The pipeline fills it in
    /// when a transport leaves it empty.
    pub method: Option<HttpMethod>,
}

impl ResponseMetadata {
    pub fn new(status: u16, url: Url) -> Self {
        Self {
            status,
            headers: Headers::new(),
            url,
            method: None,
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// The `Location` header resolved against the response URL.
    pub fn location(&self) -> Option<Url> {
        let location = self.headers.get("Location")?;
        self.url.join(location).ok()
    }
}

/// What a transport hands back for one request: raw bytes plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub data: Vec<u8>,
    pub metadata: ResponseMetadata,
}

/// Set of status codes a response must fall into before it is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptableStatus {
    ranges: Vec<RangeInclusive<u16>>,
}

impl AcceptableStatus {
    /// Any 2xx status.
    pub fn success() -> Self {
        Self::range(200..=299)
    }

    pub fn range(range: RangeInclusive<u16>) -> Self {
        Self {
            ranges: vec![range],
        }
    }

    pub fn ranges(ranges: impl IntoIterator<Item = RangeInclusive<u16>>) -> Self {
        Self {
            ranges: ranges.into_iter().collect(),
        }
    }

    pub fn codes(codes: impl IntoIterator<Item = u16>) -> Self {
        Self::ranges(codes.into_iter().map(|code| code..=code))
    }

    pub fn contains(&self, status: u16) -> bool {
        self.ranges.iter().any(|range| range.contains(&status))
    }
}

impl Default for AcceptableStatus {
    fn default() -> Self {
        Self::success()
    }
}
