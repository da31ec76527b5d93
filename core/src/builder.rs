//! Turns a request descriptor into a transport message.
//!
//! # Design
//! Building is a pure transform with no network access:
//! 1. resolve the base URL (request override, else configuration),
//! 2. append the path,
//! 3. attach query items that carry a value, never leaving a bare `?`,
//! 4. pick the body: form items win over a typed or raw body,
//! 5. lay the request headers over the message and apply the timeout.
//!
//! Names and values are percent-encoded, with everything but unreserved
//! characters escaped (a space becomes `%20`).

use serde::Serialize;
use url::Url;

use crate::codec::encode_model;
use crate::config::NetworkConfiguration;
use crate::error::{NetworkClientError, Result};
use crate::http::TransportRequest;
use crate::request::{FormItem, NetworkRequest, Payload};

/// Build the transport message for one attempt.
pub fn build_transport_request<Req: Serialize, Res>(
    request: &NetworkRequest<Req, Res>,
    configuration: &NetworkConfiguration,
) -> Result<TransportRequest> {
    let url = make_url(request, configuration)?;
    let mut message = TransportRequest::new(request.method(), url);
    message.body = encode_body(request, configuration)?;
    message.headers.merge(request.additional_headers());
    message.timeout = request.timeout().or(configuration.timeout());
    Ok(message)
}

/// Resolve the absolute URL of a request.
pub fn make_url<Req, Res>(request: &NetworkRequest<Req, Res>, configuration: &NetworkConfiguration) -> Result<Url> {
    let base = request.base_url().unwrap_or(configuration.base_url());
    let mut url = Url::parse(base).map_err(|e| NetworkClientError::MalformedUrl(format!("{base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(NetworkClientError::MalformedUrl(format!("{base}: not a hierarchical URL")));
    }

    // The path goes into the path component; a query or fragment on the base
    // stays where it is.
    if let Some(path) = request.path().filter(|path| !path.is_empty()) {
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), path.trim_start_matches('/'));
        url.set_path(&joined);
    }

    if let Some(query) = encode_items(request.query_items()) {
        let combined = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
            _ => query,
        };
        url.set_query(Some(&combined));
    }
    Ok(url)
}

/// Percent-encode items as `name=value` pairs joined with `&`, skipping
/// items without a value. Returns `None` when nothing is left.
pub fn encode_items(items: &[FormItem]) -> Option<String> {
    let pairs: Vec<String> = items
        .iter()
        .filter_map(|item| {
            let value = item.value.as_deref()?;
            Some(format!("{}={}", urlencoding::encode(&item.name), urlencoding::encode(value)))
        })
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("&"))
    }
}

/// `application/x-www-form-urlencoded` body for `items`.
pub fn encode_form(items: &[FormItem]) -> Vec<u8> {
    encode_items(items).unwrap_or_default().into_bytes()
}

fn encode_body<Req: Serialize, Res>(
    request: &NetworkRequest<Req, Res>,
    configuration: &NetworkConfiguration,
) -> Result<Option<Vec<u8>>> {
    if let Some(items) = request.form_items() {
        return Ok(Some(encode_form(items)));
    }
    match request.body() {
        None => Ok(None),
        Some(Payload::Raw(bytes)) => Ok(Some(bytes.clone())),
        Some(Payload::Model(model)) => {
            let codec = request.codec().unwrap_or(configuration.codec());
            encode_model(codec.as_ref(), model)
                .map(Some)
                .map_err(|e| NetworkClientError::Encoding(Box::new(e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde::ser::Error as _;
    use serde::Serializer;

    use super::*;
    use crate::codec::{Codec, CodecError};
    use crate::error::{BoxError, ErrorKind};
    use crate::http::{HttpMethod, TransportResponse};
    use crate::response::NoContent;
    use crate::transport::Transport;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: TransportRequest) -> std::result::Result<TransportResponse, BoxError> {
            Err("unreachable".into())
        }
    }

    fn configuration() -> NetworkConfiguration {
        NetworkConfiguration::new(Arc::new(Unreachable), "https://api.example.com")
    }

    #[derive(Serialize)]
    struct User {
        id: u64,
        name: String,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("refused"))
        }
    }

    struct ShoutingCodec;

    impl Codec for ShoutingCodec {
        fn encode(&self, value: &serde_json::Value) -> std::result::Result<Vec<u8>, CodecError> {
            Ok(value.to_string().to_uppercase().into_bytes())
        }

        fn decode(&self, _data: &[u8]) -> std::result::Result<serde_json::Value, CodecError> {
            Err(CodecError::Deserialization("write only".into()))
        }
    }

    #[test]
    fn builds_post_with_json_body() {
        let request = NetworkRequest::<User, NoContent>::post("/users").with_body(User {
            id: 123,
            name: "John Doe".to_string(),
        });

        let message = build_transport_request(&request, &configuration()).unwrap();

        assert_eq!(message.url.as_str(), "https://api.example.com/users");
        assert_eq!(message.method, HttpMethod::Post);
        assert_eq!(message.body.as_deref(), Some(br#"{"id":123,"name":"John Doe"}"#.as_slice()));
    }

    #[test]
    fn path_joins_without_doubling_slashes() {
        let configuration = NetworkConfiguration::new(Arc::new(Unreachable), "https://api.example.com/v3/");
        let request = NetworkRequest::<(), NoContent>::get("/users");
        assert_eq!(
            make_url(&request, &configuration).unwrap().as_str(),
            "https://api.example.com/v3/users"
        );

        let bare = NetworkRequest::<(), NoContent>::get("users");
        assert_eq!(
            make_url(&bare, &configuration).unwrap().as_str(),
            "https://api.example.com/v3/users"
        );
    }

    #[test]
    fn base_url_query_stays_in_query() {
        let configuration = NetworkConfiguration::new(Arc::new(Unreachable), "https://api.example.com/v1?api_key=abc");
        let request = NetworkRequest::<(), NoContent>::get("/users").with_query("page", "2");

        let url = make_url(&request, &configuration).unwrap();

        assert_eq!(url.path(), "/v1/users");
        assert_eq!(url.query(), Some("api_key=abc&page=2"));
        assert_eq!(url.as_str(), "https://api.example.com/v1/users?api_key=abc&page=2");
    }

    #[test]
    fn base_url_fragment_is_kept_out_of_path() {
        let configuration = NetworkConfiguration::new(Arc::new(Unreachable), "https://api.example.com/v1/#docs");
        let request = NetworkRequest::<(), NoContent>::get("users/7");

        let url = make_url(&request, &configuration).unwrap();

        assert_eq!(url.path(), "/v1/users/7");
        assert_eq!(url.fragment(), Some("docs"));
    }

    #[test]
    fn missing_path_uses_base_url() {
        let request = NetworkRequest::<(), NoContent>::new(HttpMethod::Get);
        assert_eq!(make_url(&request, &configuration()).unwrap().as_str(), "https://api.example.com/");
    }

    #[test]
    fn request_base_url_overrides_configuration() {
        let request = NetworkRequest::<(), NoContent>::get("/status").with_base_url("https://other.example.org");
        assert_eq!(
            make_url(&request, &configuration()).unwrap().as_str(),
            "https://other.example.org/status"
        );
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let request = NetworkRequest::<(), NoContent>::get("/users").with_base_url("not a url");
        let err = build_transport_request(&request, &configuration()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUrl);
    }

    #[test]
    fn non_hierarchical_base_url_is_rejected() {
        let request = NetworkRequest::<(), NoContent>::new(HttpMethod::Get).with_base_url("mailto:someone@example.com");
        let err = make_url(&request, &configuration()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUrl);
    }

    #[test]
    fn empty_query_items_leave_no_separator() {
        let request = NetworkRequest::<(), NoContent>::get("/users").with_query_items(Vec::new());
        let url = make_url(&request, &configuration()).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/users");
        assert!(url.query().is_none());
    }

    #[test]
    fn absent_query_items_leave_no_separator() {
        let request = NetworkRequest::<(), NoContent>::get("/users");
        assert_eq!(
            make_url(&request, &configuration()).unwrap().as_str(),
            "https://api.example.com/users"
        );
    }

    #[test]
    fn query_items_without_values_are_dropped() {
        let request = NetworkRequest::<(), NoContent>::get("/search").with_query_items([
            FormItem::new("q", "rust lang"),
            FormItem::without_value("debug"),
            FormItem::new("page", "2"),
        ]);
        assert_eq!(
            make_url(&request, &configuration()).unwrap().as_str(),
            "https://api.example.com/search?q=rust%20lang&page=2"
        );
    }

    #[test]
    fn only_valueless_query_items_leave_no_separator() {
        let request = NetworkRequest::<(), NoContent>::get("/search").with_query_items([FormItem::without_value("flag")]);
        assert_eq!(
            make_url(&request, &configuration()).unwrap().as_str(),
            "https://api.example.com/search"
        );
    }

    #[test]
    fn form_items_win_over_body() {
        let request = NetworkRequest::<User, NoContent>::post("/login")
            .with_body(User {
                id: 1,
                name: "should not appear".to_string(),
            })
            .with_form_items([FormItem::new("field", "form data"), FormItem::new("email", "john@example.com")]);

        let message = build_transport_request(&request, &configuration()).unwrap();
        let body = String::from_utf8(message.body.unwrap()).unwrap();

        assert_eq!(body, "field=form%20data&email=john%40example.com");
    }

    #[test]
    fn raw_body_is_not_re_encoded() {
        let request = NetworkRequest::<User, NoContent>::put("/blob").with_raw_body(b"\x00\x01raw".to_vec());
        let message = build_transport_request(&request, &configuration()).unwrap();
        assert_eq!(message.body.as_deref(), Some(b"\x00\x01raw".as_slice()));
    }

    #[test]
    fn no_body_without_form_or_payload() {
        let request = NetworkRequest::<User, NoContent>::get("/users");
        let message = build_transport_request(&request, &configuration()).unwrap();
        assert!(message.body.is_none());
    }

    #[test]
    fn serialization_failure_is_an_encoding_error() {
        let request = NetworkRequest::<Unserializable, NoContent>::post("/x").with_body(Unserializable);
        let err = build_transport_request(&request, &configuration()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn request_codec_overrides_default() {
        let request = NetworkRequest::<User, NoContent>::post("/users")
            .with_codec(Arc::new(ShoutingCodec))
            .with_body(User {
                id: 1,
                name: "ada".to_string(),
            });
        let message = build_transport_request(&request, &configuration()).unwrap();
        assert_eq!(message.body.as_deref(), Some(br#"{"ID":1,"NAME":"ADA"}"#.as_slice()));
    }

    #[test]
    fn request_headers_are_copied() {
        let request = NetworkRequest::<(), NoContent>::get("/users")
            .with_header("Accept", "application/json")
            .with_header("X-Trace", "abc");
        let message = build_transport_request(&request, &configuration()).unwrap();
        assert_eq!(message.headers.get("accept"), Some("application/json"));
        assert_eq!(message.headers.get("x-trace"), Some("abc"));
    }

    #[test]
    fn request_timeout_overrides_configuration() {
        let configuration = configuration().with_timeout(Duration::from_secs(30));

        let default = NetworkRequest::<(), NoContent>::get("/");
        let message = build_transport_request(&default, &configuration).unwrap();
        assert_eq!(message.timeout, Some(Duration::from_secs(30)));

        let overridden = NetworkRequest::<(), NoContent>::get("/").with_timeout(Duration::from_secs(2));
        let message = build_transport_request(&overridden, &configuration).unwrap();
        assert_eq!(message.timeout, Some(Duration::from_secs(2)));
    }

    fn item() -> impl Strategy<Value = FormItem> {
        (".{0,12}", proptest::option::of(".{0,12}")).prop_map(|(name, value)| FormItem { name, value })
    }

    proptest! {
        #[test]
        fn query_matches_items_with_values(items in proptest::collection::vec(item(), 0..8)) {
            let request = NetworkRequest::<(), NoContent>::get("/p").with_query_items(items.clone());
            let url = make_url(&request, &configuration()).unwrap();

            let expected: Vec<(String, String)> = items
                .iter()
                .filter_map(|item| item.value.clone().map(|value| (item.name.clone(), value)))
                .collect();

            prop_assert!(!url.as_str().ends_with('?'));
            if expected.is_empty() {
                prop_assert!(url.query().is_none());
            } else {
                let decoded: Vec<(String, String)> = url.query_pairs().into_owned().collect();
                prop_assert_eq!(decoded, expected);
            }
        }

        #[test]
        fn form_body_always_wins(items in proptest::collection::vec(item(), 0..8), name in ".{0,12}") {
            let request = NetworkRequest::<User, NoContent>::post("/form")
                .with_body(User { id: 9, name })
                .with_form_items(items.clone());
            let message = build_transport_request(&request, &configuration()).unwrap();
            prop_assert_eq!(message.body.unwrap(), encode_form(&items));
        }

        #[test]
        fn form_body_decodes_to_items(items in proptest::collection::vec(item(), 0..8)) {
            let body = encode_form(&items);
            let decoded: Vec<(String, String)> = url::form_urlencoded::parse(&body).into_owned().collect();
            let expected: Vec<(String, String)> = items
                .iter()
                .filter_map(|item| item.value.clone().map(|value| (item.name.clone(), value)))
                .collect();
            prop_assert_eq!(decoded, expected);
        }
    }
}
