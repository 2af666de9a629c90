//! 服务商 API 客户端：Mailchimp / Mailjet 的最小 REST 封装
//!
//! Provider API clients. Both providers are plain JSON REST APIs behind basic
//! auth, so the clients are thin wrappers over [`HttpTransport`] that add the
//! provider-specific helpers drivers need (subscriber hashes, resource paths,
//! error-message extraction).
//!
//! [`HttpTransport`]: crate::transport::HttpTransport

pub mod mailchimp;
pub mod mailjet;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::Result;

pub use mailchimp::MailchimpClient;
pub use mailjet::MailjetClient;
pub use reqwest::Method;

/// Raw response of a remote call, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Canonical HTTP reason phrase for `status`.
    pub reason: String,
    /// Parsed JSON body; `Null` when the body was empty.
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Generic resource-oriented access to a provider API.
///
/// Returned by [`Newsletter::api`](crate::Newsletter::api) so callers can
/// reach endpoints the drivers do not wrap.
#[async_trait]
pub trait RemoteApi: Send + Sync + std::fmt::Debug {
    /// Provider identifier (`mailchimp`, `mailjet`).
    fn provider_id(&self) -> &str;

    /// Issue one request against `resource`, relative to the provider base URL.
    async fn request(
        &self,
        method: Method,
        resource: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse>;

    async fn get(&self, resource: &str, query: &[(String, String)]) -> Result<ApiResponse> {
        self.request(Method::GET, resource, query, None).await
    }

    async fn post(&self, resource: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::POST, resource, &[], Some(body)).await
    }

    async fn put(&self, resource: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::PUT, resource, &[], Some(body)).await
    }

    async fn patch(&self, resource: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::PATCH, resource, &[], Some(body)).await
    }

    async fn delete(&self, resource: &str) -> Result<ApiResponse> {
        self.request(Method::DELETE, resource, &[], None).await
    }
}

/// Percent-encode `raw` as a single URL path segment, so that `/`, `?`, `#`
/// and `%` inside an email address stay part of the resource name.
pub fn path_segment(raw: &str) -> String {
    let mut url = match url::Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(raw);
    }
    url.path().trim_start_matches('/').to_string()
}

/// Flatten an options map into query-string pairs. Strings are used as-is,
/// every other value is rendered as JSON.
pub fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}
