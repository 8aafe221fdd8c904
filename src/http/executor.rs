//! Request executor
//!
//! Sends one HTTP request and normalizes the outcome to a status code and a
//! body text. Transport failures never surface as errors: they come back as
//! status [`TRANSPORT_FAILURE`] with the error text as the body, so callers
//! branch on data instead of on error types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;

use crate::common::{Error, Result};

/// Status reported when no HTTP exchange took place
pub const TRANSPORT_FAILURE: u16 = 0;

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Serialized as JSON, `Content-Type: application/json` set automatically
    Json(serde_json::Value),
    /// Sent verbatim with the given content type
    Raw { bytes: Vec<u8>, content_type: String },
}

/// A single request to send
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Option<Body>,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {}", token))
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Normalized outcome of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    /// A response standing in for a request that never completed
    pub fn transport_failure(error: impl ToString) -> Self {
        Self {
            status: TRANSPORT_FAILURE,
            body: error.to_string(),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status == TRANSPORT_FAILURE
    }
}

/// Something that can carry a [`Request`] to the system under test
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request; must not fail, see [`TRANSPORT_FAILURE`]
    async fn execute(&self, request: Request) -> Response;
}

/// Transport backed by a real HTTP client
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    /// Build an executor whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    fn build(&self, request: Request) -> Result<reqwest::RequestBuilder> {
        let mut builder = self.client.request(request.method, &request.url);

        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidRequest(format!("header name `{}`: {}", name, e)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::InvalidRequest(format!("header value for `{}`: {}", name, e)))?;
            builder = builder.header(header_name, header_value);
        }

        builder = match request.body {
            Some(Body::Json(value)) => builder.json(&value),
            Some(Body::Raw {
                bytes,
                content_type,
            }) => builder.header(CONTENT_TYPE, content_type).body(bytes),
            None => builder,
        };

        Ok(builder)
    }
}

#[async_trait]
impl Transport for HttpExecutor {
    async fn execute(&self, request: Request) -> Response {
        let method = request.method.clone();
        let url = request.url.clone();

        let builder = match self.build(request) {
            Ok(b) => b,
            Err(e) => return Response::transport_failure(e),
        };

        tracing::debug!(%method, %url, "sending request");

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(%method, %url, error = %e, "transport failure");
                return Response::transport_failure(e);
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(bytes) => Response {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            },
            Err(e) => {
                tracing::debug!(%method, %url, status, error = %e, "failed to read response body");
                Response::transport_failure(format!("Failed to read response: {}", e))
            }
        }
    }
}
