//! Thin JSON client for the portal REST API.
//!
//! Every call is a single attempt: no retry, no timeout, no backoff.
//! Non-2xx replies come back as [`ApiError::Status`] with the server's
//! payload; callers decide how to surface them.

use crate::error::ApiError;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::{Arc, RwLock};

/// Authenticated API client. Cheap to clone; clones share the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the bearer token attached to subsequent requests
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn has_token(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = self.token() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        request
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path), "GET", path).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path).json(body);
        self.send(request, "POST", path).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PATCH, path).json(body);
        self.send(request, "PATCH", path).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let _: Value = self
            .send(self.request(Method::DELETE, path), "DELETE", path)
            .await?;
        Ok(())
    }

    /// POST and hand back the raw response for streamed bodies.
    /// Non-2xx replies are still turned into errors.
    pub async fn post_stream<B>(&self, path: &str, body: &B) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let response = self.request(Method::POST, path).json(body).send().await?;
        let status = response.status();
        tracing::debug!(method = "POST", path, status = status.as_u16(), "API stream opened");
        if !status.is_success() {
            let text = response.text().await.map_err(|e| {
                tracing::warn!(method = "POST", path, error = %e, "Failed to read error body");
                ApiError::Transport(e)
            })?;
            return Err(status_error(status.as_u16(), text));
        }
        Ok(response)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &'static str,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(method, path, error = %e, "API request failed");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(method, path, status = status.as_u16(), "API response");

        if !status.is_success() {
            return Err(status_error(status.as_u16(), text));
        }

        // 204 and other empty bodies decode as JSON null
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(body)?)
    }
}

fn status_error(status: u16, text: String) -> ApiError {
    let payload = serde_json::from_str(&text).unwrap_or(Value::String(text));
    ApiError::Status { status, payload }
}

/// Append URL-encoded query parameters, skipping absent ones.
pub fn with_query(path: &str, params: &[(&str, Option<String>)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect();
    if query.is_empty() {
        path.to_string()
    } else {
        let sep = if path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", path, sep, query.join("&"))
    }
}

/// Percent-encode one path segment
pub fn segment(value: impl std::fmt::Display) -> String {
    urlencoding::encode(&value.to_string()).into_owned()
}
