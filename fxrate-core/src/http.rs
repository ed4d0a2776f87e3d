//! Thin HTTP driver abstraction used by rate providers.
//!
//! Transport failures (DNS, refused connection, timeout) are not returned as errors: the
//! driver hands back an [`HttpResponse`] with status code `0` and the error description as a
//! text body, and leaves the interpretation to the caller.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{Map, Value};
use std::{fmt::Debug, str::FromStr, time::Duration};
use tracing::{debug, warn};

/// A single request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Malformed header line '{0}', expected 'Name: Value'")]
pub struct InvalidHeader(pub String);

impl FromStr for Header {
    type Err = InvalidHeader;

    /// Parses a raw `"Name: Value"` header line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s.split_once(':').ok_or_else(|| InvalidHeader(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidHeader(s.to_string()));
        }
        Ok(Header::new(name, value.trim()))
    }
}

/// Body of a POST request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as-is; callers set `Content-Type` through headers.
    Text(String),
    /// Sent URL-encoded as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

impl From<&str> for RequestBody {
    fn from(value: &str) -> Self {
        RequestBody::Text(value.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        RequestBody::Text(value)
    }
}

impl From<Vec<(String, String)>> for RequestBody {
    fn from(value: Vec<(String, String)>) -> Self {
        RequestBody::Form(value)
    }
}

/// Parsed response body: decoded JSON when the payload is valid JSON, the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    /// Field lookup on a JSON object body; `None` for text bodies and non-object JSON.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|value| value.get(key))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    status_code: u16,
    body: ResponseBody,
}

impl HttpResponse {
    /// Build a response from a raw payload.
    ///
    /// Empty or absent payloads become an empty JSON object; payloads that decode as JSON
    /// become [`ResponseBody::Json`]; anything else is kept unchanged as [`ResponseBody::Text`].
    pub fn parse(raw: Option<String>, status_code: u16) -> Self {
        let body = match raw {
            None => ResponseBody::Json(Value::Object(Map::new())),
            Some(text) if text.is_empty() => ResponseBody::Json(Value::Object(Map::new())),
            Some(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Text(text),
            },
        };

        Self { status_code, body }
    }

    /// Soft failure: status `0` with the transport error as an unparsed text body.
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self { status_code: 0, body: ResponseBody::Text(error.into()) }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status_code == 0
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Transport used by providers to talk to upstream APIs.
#[async_trait]
pub trait HttpClient: Send + Sync + Debug {
    /// Replace the headers applied to subsequent requests.
    fn with_headers(&mut self, headers: Vec<Header>) -> &mut dyn HttpClient;

    /// Issue a GET; non-empty `params` are appended as a URL-encoded query string.
    async fn get(&self, url: &str, params: &[(&str, String)]) -> HttpResponse;

    async fn post(&self, url: &str, data: RequestBody) -> HttpResponse;
}

/// Default driver backed by [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    http: Client,
    headers: Vec<Header>,
    timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-request timeout; without one, reqwest's defaults apply.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    async fn send(&self, mut request: RequestBuilder) -> HttpResponse {
        for header in &self.headers {
            request = request.header(header.name.as_str(), header.value.as_str());
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let res = match request.send().await {
            Ok(res) => res,
            Err(err) => {
                warn!(error = %err, "HTTP request failed before a response was received");
                return HttpResponse::transport_failure(err.to_string());
            }
        };

        let status = res.status().as_u16();
        match res.text().await {
            Ok(body) => {
                debug!(status, bytes = body.len(), "Received HTTP response");
                HttpResponse::parse(Some(body), status)
            }
            Err(err) => {
                warn!(error = %err, status, "Failed to read HTTP response body");
                HttpResponse::transport_failure(err.to_string())
            }
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    fn with_headers(&mut self, headers: Vec<Header>) -> &mut dyn HttpClient {
        self.headers = headers;
        self
    }

    async fn get(&self, url: &str, params: &[(&str, String)]) -> HttpResponse {
        debug!(url, params = params.len(), "GET");

        let mut request = self.http.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }

        self.send(request).await
    }

    async fn post(&self, url: &str, data: RequestBody) -> HttpResponse {
        debug!(url, "POST");

        let request = match data {
            RequestBody::Text(text) => self.http.post(url).body(text),
            RequestBody::Form(fields) => self.http.post(url).form(&fields),
        };

        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn empty_body_parses_to_empty_object() {
        let response = HttpResponse::parse(Some(String::new()), 200);
        assert_eq!(response.body(), &ResponseBody::Json(json!({})));
        assert_eq!(response.status_code(), 200);
    }

    #[test]
    fn absent_body_parses_to_empty_object() {
        let response = HttpResponse::parse(None, 204);
        assert_eq!(response.body(), &ResponseBody::Json(json!({})));
        assert_eq!(response.status_code(), 204);
    }

    #[test]
    fn json_body_is_decoded() {
        let data = json!({"message": "success", "data": {"key": "value"}});
        let response = HttpResponse::parse(Some(data.to_string()), 200);

        assert_eq!(response.body().as_json(), Some(&data));
        assert_eq!(response.body().get("message"), Some(&json!("success")));
    }

    #[test]
    fn nested_and_unicode_json_is_decoded() {
        let data = json!({
            "data": {
                "items": [{"id": 1, "name": "Item 1"}, {"id": 2, "name": "Item 2"}],
                "meta": {"total": 2, "page": 1}
            },
            "message": "Привет, мир! 你好，世界！"
        });
        let response = HttpResponse::parse(Some(data.to_string()), 200);

        let body = response.body().as_json().unwrap();
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["message"], "Привет, мир! 你好，世界！");
    }

    #[test]
    fn invalid_json_is_kept_as_text() {
        let invalid = r#"{"key": "value",}"#;
        let response = HttpResponse::parse(Some(invalid.to_string()), 200);
        assert_eq!(response.body().as_text(), Some(invalid));
        assert_eq!(response.body().get("key"), None);
    }

    #[test]
    fn plain_text_and_error_status_are_preserved() {
        let response = HttpResponse::parse(Some("Not Found".to_string()), 404);
        assert_eq!(response.body(), &ResponseBody::Text("Not Found".to_string()));
        assert_eq!(response.status_code(), 404);
        assert!(!response.is_success());
        assert!(!response.is_transport_failure());
    }

    #[test]
    fn header_lines_parse() {
        let parsed: Header = "Content-Type: application/json".parse().unwrap();
        assert_eq!(parsed, Header::new("Content-Type", "application/json"));

        assert!("no separator".parse::<Header>().is_err());
        assert!(": value only".parse::<Header>().is_err());
    }

    #[tokio::test]
    async fn get_appends_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("foo", "bar"))
            .and(query_param("test", "value"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"args":{"foo":"bar"}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new();
        let response = client
            .get(
                &format!("{}/get", server.uri()),
                &[("foo", "bar".to_string()), ("test", "value".to_string())],
            )
            .await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body().get("args"), Some(&json!({"foo": "bar"})));
    }

    #[tokio::test]
    async fn get_without_params_sends_bare_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain"))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new();
        let response = client.get(&format!("{}/get", server.uri()), &[]).await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body().as_text(), Some("plain"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn configured_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/headers"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = ReqwestHttpClient::new();
        let response = client
            .with_headers(vec!["Accept: application/json".parse().unwrap()])
            .get(&format!("{}/headers", server.uri()), &[])
            .await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(client.headers().len(), 1);
    }

    #[tokio::test]
    async fn post_sends_raw_text_body() {
        let server = MockServer::start().await;
        let payload = r#"{"foo":"bar","test":"value"}"#;
        Mock::given(method("POST"))
            .and(path("/post"))
            .and(header("content-type", "application/json"))
            .and(body_string(payload))
            .respond_with(ResponseTemplate::new(200).set_body_string(payload))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = ReqwestHttpClient::new();
        let response = client
            .with_headers(vec![Header::new("Content-Type", "application/json")])
            .post(&format!("{}/post", server.uri()), payload.into())
            .await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body().get("foo"), Some(&json!("bar")));
    }

    #[tokio::test]
    async fn post_sends_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/post"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("foo=bar&test=value"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new();
        let form = vec![
            ("foo".to_string(), "bar".to_string()),
            ("test".to_string(), "value".to_string()),
        ];
        let response = client.post(&format!("{}/post", server.uri()), form.into()).await;

        assert_eq!(response.status_code(), 201);
        assert_eq!(response.body(), &ResponseBody::Json(json!({})));
    }

    #[tokio::test]
    async fn transport_failure_is_reported_in_band() {
        // Nothing listens on port 1.
        let client = ReqwestHttpClient::new().with_timeout(Duration::from_secs(5));

        let get = client.get("http://127.0.0.1:1/unreachable", &[]).await;
        assert_eq!(get.status_code(), 0);
        assert!(get.is_transport_failure());
        assert!(!get.body().as_text().unwrap_or_default().is_empty());

        let post = client.post("http://127.0.0.1:1/unreachable", "data".into()).await;
        assert_eq!(post.status_code(), 0);
        assert!(post.body().as_text().is_some());
    }
}
