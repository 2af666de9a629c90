//! 邮件列表驱动抽象层：通过 trait 统一多个服务商的订阅管理接口
//!
//! Newsletter driver abstraction. Each provider (Mailchimp, Mailjet) implements
//! [`NewsletterDriver`]; the no-op [`NullDriver`] stands in when the feature is
//! disabled. The facade ([`crate::Newsletter`]) holds exactly one of them.
//!
//! # Contract
//!
//! - An empty `list_name` means the configured default list.
//! - Operations that target a list resolve it before any remote call; a
//!   resolution failure aborts the operation with
//!   [`InvalidNewsletterList`](crate::lists::InvalidNewsletterList).
//! - A remote failure is always surfaced as [`ApiError`](crate::ApiError).

pub mod mailchimp;
pub mod mailjet;
pub mod null;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::RemoteApi;
use crate::Result;

pub use mailchimp::MailchimpDriver;
pub use mailjet::MailjetDriver;
pub use null::NullDriver;

/// Caller-supplied request options (subscribe body fields, query parameters).
pub type Options = Map<String, Value>;

/// Shallow-merge `overrides` on top of `defaults`. Caller keys win.
pub fn merge_options(mut defaults: Options, overrides: &Options) -> Options {
    for (key, value) in overrides {
        defaults.insert(key.clone(), value.clone());
    }
    defaults
}

/// Subscription management against one remote provider.
#[async_trait]
pub trait NewsletterDriver: Send + Sync + std::fmt::Debug {
    /// Provider identifier (`mailchimp`, `mailjet`, `null`).
    fn provider_id(&self) -> &str;

    /// Subscribe `email` to a list.
    async fn subscribe(&self, email: &str, options: &Options, list_name: &str) -> Result<Value>;

    /// Subscribe with `status = pending`, whatever `options` say.
    async fn subscribe_pending(
        &self,
        email: &str,
        options: &Options,
        list_name: &str,
    ) -> Result<Value>;

    /// Create the member or replace its fields.
    async fn subscribe_or_update(
        &self,
        email: &str,
        options: &Options,
        list_name: &str,
    ) -> Result<Value>;

    /// Add a contact without leaving it subscribed: subscribe, then unsubscribe.
    async fn add_member(&self, email: &str, options: &Options, list_name: &str) -> Result<Value> {
        self.subscribe(email, options, list_name).await?;
        self.unsubscribe(email, list_name).await
    }

    async fn get_members(&self, list_name: &str, parameters: &Options) -> Result<Value>;

    async fn get_member(&self, email: &str, list_name: &str) -> Result<Value>;

    async fn get_member_activity(&self, email: &str, list_name: &str) -> Result<Value>;

    async fn has_member(&self, email: &str, list_name: &str) -> Result<bool>;

    async fn is_subscribed(&self, email: &str, list_name: &str) -> Result<bool>;

    async fn unsubscribe(&self, email: &str, list_name: &str) -> Result<Value>;

    async fn update_email_address(
        &self,
        current_email: &str,
        new_email: &str,
        list_name: &str,
    ) -> Result<Value>;

    async fn delete(&self, email: &str, list_name: &str) -> Result<Value>;

    /// Underlying provider API, for calls the driver does not wrap.
    fn api(&self) -> Option<&dyn RemoteApi>;
}
