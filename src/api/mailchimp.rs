//! Mailchimp Marketing API (v3.0) client.

use async_trait::async_trait;
use md5::{Digest, Md5};
use serde_json::Value;
use std::time::Duration;

use super::{ApiResponse, Method, RemoteApi};
use crate::config::MailchimpCredentials;
use crate::error::ApiError;
use crate::transport::{HttpTransport, TransportConfig};
use crate::{Error, ErrorContext, Result};

pub const PROVIDER_ID: &str = "mailchimp";

/// Mailchimp client. Routes to the datacenter encoded in the API key.
#[derive(Debug, Clone)]
pub struct MailchimpClient {
    transport: HttpTransport,
}

impl MailchimpClient {
    pub fn new(credentials: &MailchimpCredentials) -> Result<Self> {
        if credentials.api_key.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "Mailchimp API key is required",
                ErrorContext::new()
                    .with_field_path("mailchimp.apiKey")
                    .with_details("set MAILCHIMP_APIKEY or mailchimp.apiKey"),
            ));
        }

        let base_url = match &credentials.base_url {
            Some(url) => url.clone(),
            None => format!(
                "https://{}.api.mailchimp.com/3.0",
                Self::datacenter(&credentials.api_key)?
            ),
        };

        let transport = HttpTransport::new(TransportConfig {
            provider: PROVIDER_ID.to_string(),
            base_url,
            username: "apikey".to_string(),
            password: credentials.api_key.clone(),
            timeout: Duration::from_secs(credentials.timeout_secs.max(1)),
            verify_ssl: credentials.ssl,
        })?;

        Ok(Self { transport })
    }

    /// Datacenter suffix of an API key (`xxxxxxxx-us10` -> `us10`).
    pub fn datacenter(api_key: &str) -> Result<&str> {
        match api_key.rsplit_once('-') {
            Some((_, dc)) if !dc.is_empty() => Ok(dc),
            _ => Err(Error::configuration_with_context(
                "Invalid MailChimp API key supplied.",
                ErrorContext::new()
                    .with_field_path("mailchimp.apiKey")
                    .with_details("expected a key ending in '-<datacenter>'"),
            )),
        }
    }

    /// Member identifier: hex MD5 of the lowercased address.
    pub fn subscriber_hash(email: &str) -> String {
        format!("{:x}", Md5::digest(email.to_lowercase().as_bytes()))
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Turn a failed response into an [`ApiError`]; pass successful bodies through.
    pub fn into_result(&self, response: ApiResponse) -> Result<Value> {
        if response.is_success() {
            return Ok(response.body);
        }
        let message = Self::last_error(&response);
        tracing::warn!(provider = PROVIDER_ID, status = response.status, "{}", message);
        Err(ApiError::response_error(message, PROVIDER_ID, Some(response.status)).into())
    }

    /// Mailchimp reports problems as `{status, title, detail}`.
    fn last_error(response: &ApiResponse) -> String {
        let body = &response.body;
        let status = body
            .get("status")
            .and_then(Value::as_u64)
            .unwrap_or(u64::from(response.status));

        if let Some(detail) = body.get("detail").and_then(Value::as_str) {
            return format!("{}: {}", status, detail);
        }
        if let Some(title) = body.get("title").and_then(Value::as_str) {
            return format!("{}: {}", status, title);
        }
        if response.reason.is_empty() {
            format!("HTTP {}", response.status)
        } else {
            response.reason.clone()
        }
    }
}

#[async_trait]
impl RemoteApi for MailchimpClient {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn request(
        &self,
        method: Method,
        resource: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        self.transport.request(method, resource, query, body).await
    }
}
