//! Upstream scheduling-API client.
//!
//! Thin wrapper over a shared reqwest client. Calls are forwarded exactly
//! as the tool layer shaped them; there is no retry or added timeout, so
//! the caller sees upstream behavior unfiltered.

use std::time::Instant;

use serde_json::Value;

use crate::arguments::{self, ArgumentMap};
use crate::error::InvokeError;
use crate::projection::HttpMethod;

/// Base URL used when neither an override nor a described server exists.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8100";

/// Pick the upstream base URL: explicit override first, then the first
/// server the API description advertises, then the loopback default.
pub fn resolve_base_url(override_url: Option<&str>, described_url: Option<&str>) -> String {
    override_url
        .or(described_url)
        .unwrap_or(DEFAULT_API_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: String, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Execute one upstream call. GET sends the arguments as query
    /// parameters; every other method sends them as a JSON body, and the
    /// JSON content type is attached either way. A 2xx response is parsed
    /// as JSON when possible and passed through as raw text otherwise;
    /// anything else maps to an upstream error carrying the response
    /// payload.
    pub async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        args: &ArgumentMap,
    ) -> Result<Value, InvokeError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.to_reqwest(), &url);
        request = request.header(reqwest::header::CONTENT_TYPE, "application/json");

        if method.is_get() {
            request = request.query(&arguments::query_pairs(args));
        } else {
            request = request.json(args);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(method = %method, url = %url, "calling upstream API");
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        metrics::histogram!("remote_call_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        if !status.is_success() {
            let detail = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("no response body")
                    .to_string()
            } else {
                body
            };
            return Err(InvokeError::Upstream { status, detail });
        }

        Ok(match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) => Value::String(body),
        })
    }
}
