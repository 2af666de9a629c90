//! Mailjet REST API (v3) client.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{ApiResponse, Method, RemoteApi};
use crate::config::MailjetCredentials;
use crate::error::ApiError;
use crate::transport::{HttpTransport, TransportConfig};
use crate::{Error, ErrorContext, Result};

pub const PROVIDER_ID: &str = "mailjet";

const DEFAULT_BASE_URL: &str = "https://api.mailjet.com/v3/REST";

/// Resource paths used by the driver.
pub mod resources {
    use crate::api::path_segment;

    pub const CONTACT: &str = "contact";

    pub fn contact(email: &str) -> String {
        format!("contact/{}", path_segment(email))
    }

    pub fn contactslist_managecontact(list_id: &str) -> String {
        format!("contactslist/{}/managecontact", path_segment(list_id))
    }

    pub fn contact_getcontactslists(email: &str) -> String {
        format!("contact/{}/getcontactslists", path_segment(email))
    }

    pub fn contactstatistics(email: &str) -> String {
        format!("contactstatistics/{}", path_segment(email))
    }
}

#[derive(Debug, Clone)]
pub struct MailjetClient {
    transport: HttpTransport,
}

impl MailjetClient {
    pub fn new(credentials: &MailjetCredentials) -> Result<Self> {
        for (field, value) in [("mailjet.key", &credentials.key), ("mailjet.secret", &credentials.secret)] {
            if value.trim().is_empty() {
                return Err(Error::configuration_with_context(
                    "Mailjet API key pair is required",
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_details("set MJ_APIKEY_PUBLIC / MJ_APIKEY_PRIVATE"),
                ));
            }
        }

        let transport = HttpTransport::new(TransportConfig {
            provider: PROVIDER_ID.to_string(),
            base_url: credentials
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            username: credentials.key.clone(),
            password: credentials.secret.clone(),
            timeout: Duration::from_secs(credentials.timeout_secs.max(1)),
            verify_ssl: true,
        })?;

        Ok(Self { transport })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Fail on non-2xx, otherwise return the full body.
    pub fn into_result(&self, response: ApiResponse) -> Result<Value> {
        if response.is_success() {
            return Ok(response.body);
        }
        let message = Self::error_message(&response);
        tracing::warn!(provider = PROVIDER_ID, status = response.status, "{}", message);
        Err(ApiError::response_error(message, PROVIDER_ID, Some(response.status)).into())
    }

    /// Like [`into_result`](Self::into_result) but unwraps the `Data` envelope.
    pub fn into_data(&self, response: ApiResponse) -> Result<Value> {
        let mut body = self.into_result(response)?;
        Ok(match body.get_mut("Data") {
            Some(data) => data.take(),
            None => Value::Array(Vec::new()),
        })
    }

    fn error_message(response: &ApiResponse) -> String {
        match response.body.get("ErrorMessage").and_then(Value::as_str) {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ if !response.reason.is_empty() => response.reason.clone(),
            _ => format!("HTTP {}", response.status),
        }
    }
}

#[async_trait]
impl RemoteApi for MailjetClient {
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
