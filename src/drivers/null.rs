//! No-op driver used when newsletters are disabled.

use async_trait::async_trait;
use serde_json::Value;

use super::{NewsletterDriver, Options};
use crate::api::RemoteApi;
use crate::Result;

pub const PROVIDER_ID: &str = "null";

/// Discards every call. With `log_calls` set, each call is recorded at debug
/// level so disabled environments can still see what would have been sent.
#[derive(Debug, Clone, Default)]
pub struct NullDriver {
    log_calls: bool,
}

impl NullDriver {
    pub fn new(log_calls: bool) -> Self {
        Self { log_calls }
    }

    pub fn logs_calls(&self) -> bool {
        self.log_calls
    }

    fn record(&self, method: &str, args: &[&str]) {
        if self.log_calls {
            tracing::debug!(method, ?args, "Called Newsletter facade method");
        }
    }

    fn record_with_options(&self, method: &str, args: &[&str], options: &Options) {
        if self.log_calls {
            tracing::debug!(method, ?args, ?options, "Called Newsletter facade method");
        }
    }
}

#[async_trait]
impl NewsletterDriver for NullDriver {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn subscribe(&self, email: &str, options: &Options, list_name: &str) -> Result<Value> {
        self.record_with_options("subscribe", &[email, list_name], options);
        Ok(Value::Null)
    }

    async fn subscribe_pending(
        &self,
        email: &str,
        options: &Options,
        list_name: &str,
    ) -> Result<Value> {
        self.record_with_options("subscribe_pending", &[email, list_name], options);
        Ok(Value::Null)
    }

    async fn subscribe_or_update(
        &self,
        email: &str,
        options: &Options,
        list_name: &str,
    ) -> Result<Value> {
        self.record_with_options("subscribe_or_update", &[email, list_name], options);
        Ok(Value::Null)
    }

    async fn add_member(&self, email: &str, options: &Options, list_name: &str) -> Result<Value> {
        self.record_with_options("add_member", &[email, list_name], options);
        Ok(Value::Null)
    }

    async fn get_members(&self, list_name: &str, parameters: &Options) -> Result<Value> {
        self.record_with_options("get_members", &[list_name], parameters);
        Ok(Value::Array(Vec::new()))
    }

    async fn get_member(&self, email: &str, list_name: &str) -> Result<Value> {
        self.record("get_member", &[email, list_name]);
        Ok(Value::Null)
    }

    async fn get_member_activity(&self, email: &str, list_name: &str) -> Result<Value> {
        self.record("get_member_activity", &[email, list_name]);
        Ok(Value::Null)
    }

    async fn has_member(&self, email: &str, list_name: &str) -> Result<bool> {
        self.record("has_member", &[email, list_name]);
        Ok(false)
    }

    async fn is_subscribed(&self, email: &str, list_name: &str) -> Result<bool> {
        self.record("is_subscribed", &[email, list_name]);
        Ok(false)
    }

    async fn unsubscribe(&self, email: &str, list_name: &str) -> Result<Value> {
        self.record("unsubscribe", &[email, list_name]);
        Ok(Value::Null)
    }

    async fn update_email_address(
        &self,
        current_email: &str,
        new_email: &str,
        list_name: &str,
    ) -> Result<Value> {
        self.record("update_email_address", &[current_email, new_email, list_name]);
        Ok(Value::Null)
    }

    async fn delete(&self, email: &str, list_name: &str) -> Result<Value> {
        self.record("delete", &[email, list_name]);
        Ok(Value::Null)
    }

    fn api(&self) -> Option<&dyn RemoteApi> {
        None
    }
}
