//! Mock HTTP server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use newsletter::config::{ListProperties, ListsConfig, MailchimpCredentials, MailjetCredentials};
use newsletter::drivers::{MailchimpDriver, MailjetDriver};
use newsletter::Newsletter;
use serde_json::Value;

/// Lists used across the driver tests: `list1` (id 123, default) and `list2` (id 456).
pub fn test_lists() -> ListsConfig {
    ListsConfig {
        default_list: "list1".to_string(),
        lists: [
            ("list1".to_string(), ListProperties::new("123")),
            ("list2".to_string(), ListProperties::new("456")),
        ]
        .into_iter()
        .collect(),
    }
}

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Mailchimp facade pointed at the mock server
    pub fn mailchimp(&self) -> Newsletter {
        let credentials = MailchimpCredentials::new("test-us10").with_base_url(&self.base_url);
        MailchimpDriver::new(&credentials, &test_lists())
            .expect("mailchimp driver")
            .into()
    }

    /// Mailjet facade pointed at the mock server
    pub fn mailjet(&self) -> Newsletter {
        let credentials = MailjetCredentials::new("public", "private").with_base_url(&self.base_url);
        MailjetDriver::new(&credentials, &test_lists())
            .expect("mailjet driver")
            .into()
    }

    /// Create a mock for a JSON response, matching the exact JSON request body when given
    pub async fn mock_json_response(
        &mut self,
        method: &str,
        path: &str,
        request_body: Option<Value>,
        status: usize,
        body: Value,
    ) -> Mock {
        let mut mock = self
            .server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string());
        if let Some(expected) = request_body {
            mock = mock.match_body(Matcher::Json(expected));
        }
        mock.create_async().await
    }

    /// Create a mock for a GET with query parameters
    pub async fn mock_query_response(
        &mut self,
        path: &str,
        query: Vec<(&str, &str)>,
        status: usize,
        body: Value,
    ) -> Mock {
        let matchers = query
            .into_iter()
            .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
            .collect();
        self.server
            .mock("GET", path)
            .match_query(Matcher::AllOf(matchers))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Create mocks that fail the test if any request reaches the server
    pub async fn mock_no_requests(&mut self) -> Vec<Mock> {
        let mut mocks = Vec::new();
        for method in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
            let mock = self
                .server
                .mock(method, Matcher::Any)
                .expect(0)
                .create_async()
                .await;
            mocks.push(mock);
        }
        mocks
    }
}
