use crate::api::{ApiResponse, RemoteApi};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// Connection settings for one provider endpoint.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub provider: String,
    pub base_url: String,
    /// Basic-auth user name.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    pub timeout: Duration,
    pub verify_ssl: bool,
}

/// JSON-over-HTTP transport with basic auth, shared by the provider clients.
///
/// Non-2xx responses are returned as an [`ApiResponse`], not as an error:
/// deciding what counts as a failure is the provider client's job.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    provider: String,
    base_url: String,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self> {
        url::Url::parse(&config.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid base URL '{}': {}", config.base_url, e),
                ErrorContext::new()
                    .with_field_path(format!("{}.base_url", config.provider))
                    .with_source("http_transport"),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            provider: config.provider,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource.trim_start_matches('/'))
    }
}

#[async_trait]
impl RemoteApi for HttpTransport {
    fn provider_id(&self) -> &str {
        &self.provider
    }

    async fn request(
        &self,
        method: Method,
        resource: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let url = self.url_for(resource);
        tracing::debug!(provider = %self.provider, %method, %url, "sending request");

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.username, Some(&self.password));

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(TransportError::Http)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(TransportError::Http)?;

        tracing::debug!(provider = %self.provider, status = status.as_u16(), "received response");

        // Empty bodies (204 on delete) become null; non-JSON bodies are kept verbatim.
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(json) => json,
                Err(_) => Value::String(text),
            }
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
