use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use sync_logging::{sync_debug, sync_warn};

use crate::{FailureKind, TransportError};

#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Prefix prepended verbatim to every request path.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-exchange budget; exceeding it aborts the request.
    pub request_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    /// Merged over the default JSON content type; same-name headers win.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            body: Some(body.into()),
            headers: Vec::new(),
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    fn base_url(&self) -> &str;

    /// Issues one request. `Ok(None)` means the server answered 204 No Content.
    async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn build_headers(&self, extra: &[(String, String)]) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                TransportError::new(FailureKind::InvalidRequest, format!("bad header {name}: {err}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                TransportError::new(FailureKind::InvalidRequest, format!("bad header value: {err}"))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            return TransportError::new(
                FailureKind::Timeout,
                format!(
                    "request timed out after {} ms",
                    self.settings.request_timeout.as_millis()
                ),
            );
        }
        TransportError::new(FailureKind::Network, err.to_string())
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, TransportError> {
        let raw_url = format!("{}{}", self.settings.base_url, path);
        let url = reqwest::Url::parse(&raw_url).map_err(|err| {
            TransportError::new(FailureKind::InvalidRequest, format!("invalid url {raw_url}: {err}"))
        })?;
        let headers = self.build_headers(&options.headers)?;

        let mut builder = self
            .client
            .request(options.method.clone(), url)
            .headers(headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| {
            let err = self.map_reqwest_error(err);
            sync_warn!("{} {} failed: {}", options.method, path, err);
            err
        })?;
        let status = response.status();
        sync_debug!("{} {} -> {}", options.method, path, status.as_u16());

        if !status.is_success() {
            let body = response.text().await;
            let err = TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status_message(status.as_u16(), body),
            );
            sync_warn!("{} {} rejected: {}", options.method, path, err);
            return Err(err);
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|err| self.map_reqwest_error(err))?;
        serde_json::from_str(&text).map(Some).map_err(|err| {
            TransportError::new(FailureKind::Decode, format!("invalid JSON response: {err}"))
        })
    }
}

fn status_message<E: std::fmt::Display>(code: u16, body: Result<String, E>) -> String {
    match body {
        Ok(text) => format!("request failed: {code} {text}"),
        Err(err) => format!("request failed: {code} (body unreadable: {err})"),
    }
}
