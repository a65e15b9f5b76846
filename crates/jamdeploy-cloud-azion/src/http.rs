//! HTTP client adapter for the Azion resource API
//!
//! Every call is a single request: no retries, no caller-side timeout. The
//! API wraps payloads in a `{ "results": ... }` envelope; the adapter unwraps
//! it and hands the `results` value back together with the status code.

use crate::error::{AzionError, Result};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use serde_json::Value;

pub const AZION_API_BASE: &str = "https://api-origin.azionapi.net";
const ACCEPT_VERSION: &str = "application/json; version=3";

/// Credentials sent with each request; exactly one kind per client
#[derive(Debug, Clone)]
pub enum Auth {
    /// `Authorization: token <personal token>`
    Token(String),
    /// `Cookie: <name>=<value>` from a console session
    SessionCookie { name: String, value: String },
}

impl Auth {
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let (name, value) = match self {
            Auth::Token(token) => (AUTHORIZATION, format!("token {}", token)),
            Auth::SessionCookie { name, value } => (COOKIE, format!("{}={}", name, value)),
        };
        let value = HeaderValue::from_str(&value).map_err(|e| AzionError::Upstream {
            message: format!("invalid credentials header: {}", e),
            status: None,
            body: String::new(),
        })?;
        headers.insert(name, value);
        Ok(headers)
    }
}

/// Decoded response of a successful call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// `results` field of a JSON body, or the raw body text otherwise
    pub results: Value,
    pub status: u16,
}

/// Single-request HTTP client
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    auth: Auth,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one request against `path`
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, path, "Azion API request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.auth.headers()?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| transport_error(path, e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(path, e))?;

        if !status.is_success() {
            tracing::debug!(method = %method, path, status = status.as_u16(), "Azion API error");
            let reason = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Error undefined")
                    .to_string()
            } else {
                text.clone()
            };
            return Err(AzionError::Upstream {
                message: format!("{} - {}", reason, path),
                status: Some(status.as_u16()),
                body: text,
            });
        }

        Ok(ApiResponse {
            results: unwrap_envelope(text),
            status: status.as_u16(),
        })
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, None).await
    }
}

fn unwrap_envelope(text: String) -> Value {
    if text.is_empty() {
        return Value::String(text);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(mut map)) => map.remove("results").unwrap_or(Value::Null),
        Ok(_) => Value::Null,
        Err(_) => Value::String(text),
    }
}

fn transport_error(path: &str, e: reqwest::Error) -> AzionError {
    AzionError::Upstream {
        message: format!("{} - {}", e, path),
        status: e.status().map(|s| s.as_u16()),
        body: String::new(),
    }
}
