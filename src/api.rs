// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Request-shaping client for the mineral-agent backend.
//!
//! Every call resolves to an [`ApiResult`]: transport failures, non-2xx
//! statuses and malformed bodies are all folded into
//! [`ApiResult::Failure`], so views branch on success alone.

use std::time::Duration;

use anyhow::Result;
use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::Config;
use crate::utils::http_client;

/// Underlying cause of a failed call.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiError {
    /// The backend could not be reached or the body could not be read.
    #[error("{message}")]
    Transport { message: String },
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}")]
    Status { status: u16, body: Option<Value> },
    /// The body was not the JSON we expected.
    #[error("invalid response: {message}")]
    Decode { message: String },
    /// A 2xx response whose body reports an error instead of data.
    #[error("{message}")]
    Backend { message: String },
    /// The request could not be built (bad header, unserializable body).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

/// Uniform outcome of an API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult<T = Value> {
    Success(T),
    Failure { error: String, details: ApiError },
}

impl<T> ApiResult<T> {
    pub fn failure(details: ApiError) -> Self {
        ApiResult::Failure {
            error: details.to_string(),
            details,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResult::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResult::Success(d) => Some(d),
            ApiResult::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ApiResult::Success(d) => Some(d),
            ApiResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResult::Success(_) => None,
            ApiResult::Failure { error, .. } => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            ApiResult::Success(d) => ApiResult::Success(f(d)),
            ApiResult::Failure { error, details } => ApiResult::Failure { error, details },
        }
    }
}

impl ApiResult<Value> {
    /// Converts the JSON payload into a view-model. A shape mismatch becomes
    /// a `Decode` failure.
    pub fn decode<T: DeserializeOwned>(self) -> ApiResult<T> {
        match self {
            ApiResult::Success(v) => match serde_json::from_value::<T>(v) {
                Ok(t) => ApiResult::Success(t),
                Err(e) => ApiResult::failure(ApiError::Decode {
                    message: e.to_string(),
                }),
            },
            ApiResult::Failure { error, details } => ApiResult::Failure { error, details },
        }
    }
}

impl<T: Serialize> ApiResult<T> {
    /// `{success, data}` / `{success:false, error, details}`
    pub fn to_json(&self) -> Value {
        match self {
            ApiResult::Success(d) => json!({ "success": true, "data": d }),
            ApiResult::Failure { error, details } => json!({
                "success": false,
                "error": error,
                "details": details,
            }),
        }
    }
}

/// Per-call overrides. Headers replace the defaults on conflict.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(&cfg.api_url, cfg.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    pub fn get(&self, endpoint: &str) -> ApiResult {
        self.request(Method::GET, endpoint, None, &RequestOptions::default())
    }

    pub fn get_with(&self, endpoint: &str, opts: &RequestOptions) -> ApiResult {
        self.request(Method::GET, endpoint, None, opts)
    }

    pub fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResult {
        self.post_with(endpoint, body, &RequestOptions::default())
    }

    pub fn post_with<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        opts: &RequestOptions,
    ) -> ApiResult {
        match serde_json::to_value(body) {
            Ok(v) => self.request(Method::POST, endpoint, Some(v), opts),
            Err(e) => ApiResult::failure(ApiError::InvalidRequest {
                message: e.to_string(),
            }),
        }
    }

    pub fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResult {
        match serde_json::to_value(body) {
            Ok(v) => self.request(Method::PUT, endpoint, Some(v), &RequestOptions::default()),
            Err(e) => ApiResult::failure(ApiError::InvalidRequest {
                message: e.to_string(),
            }),
        }
    }

    pub fn delete(&self, endpoint: &str) -> ApiResult {
        self.request(Method::DELETE, endpoint, None, &RequestOptions::default())
    }

    pub fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        opts: &RequestOptions,
    ) -> ApiResult {
        let url = self.url(endpoint);
        let result = self.send(method.clone(), &url, body, opts);
        if let ApiResult::Failure { error, details } = &result {
            tracing::warn!(%method, %url, error = %error, details = ?details, "request failed");
        }
        result
    }

    fn send(&self, method: Method, url: &str, body: Option<Value>, opts: &RequestOptions) -> ApiResult {
        let headers = match build_headers(&opts.headers) {
            Ok(h) => h,
            Err(details) => return ApiResult::failure(details),
        };

        let mut req = self.http.request(method.clone(), url).headers(headers);
        if !opts.query.is_empty() {
            req = req.query(&opts.query);
        }
        if let Some(b) = body {
            match serde_json::to_vec(&b) {
                Ok(bytes) => req = req.body(bytes),
                Err(e) => {
                    return ApiResult::failure(ApiError::InvalidRequest {
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(%method, %url, "sending request");
        let resp = match req.send() {
            Ok(r) => r,
            Err(e) => {
                return ApiResult::failure(ApiError::Transport {
                    message: e.to_string(),
                });
            }
        };
        let status = resp.status();
        tracing::debug!(status = status.as_u16(), %url, "response received");

        let bytes = match resp.bytes() {
            Ok(b) => b,
            Err(e) => {
                return ApiResult::failure(ApiError::Transport {
                    message: e.to_string(),
                });
            }
        };

        if !status.is_success() {
            let body: Option<Value> = serde_json::from_slice(&bytes).ok();
            let error = body
                .as_ref()
                .and_then(detail_message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return ApiResult::Failure {
                error,
                details: ApiError::Status {
                    status: status.as_u16(),
                    body,
                },
            };
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(v) => ApiResult::Success(v),
            Err(e) => ApiResult::failure(ApiError::Decode {
                message: e.to_string(),
            }),
        }
    }
}

fn build_headers(overrides: &[(String, String)]) -> std::result::Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (k, v) in overrides {
        let name = HeaderName::from_bytes(k.as_bytes()).map_err(|e| ApiError::InvalidRequest {
            message: format!("header '{}': {}", k, e),
        })?;
        let value = HeaderValue::from_str(v).map_err(|e| ApiError::InvalidRequest {
            message: format!("header '{}': {}", k, e),
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Human-readable message from an error body's `detail` field.
pub fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
