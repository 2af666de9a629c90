//! Mailchimp 驱动：基于成员哈希的单成员查询与幂等 upsert
//!
//! Mailchimp driver. Members live under `lists/{list_id}/members/{hash}`,
//! where the hash is derived from the lowercased address:
//! - `subscribe` is a POST to the members collection.
//! - `subscribe_or_update` is an idempotent PUT on the member resource.
//! - Membership checks fetch the single member record; a 404 means "not a member".

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{merge_options, NewsletterDriver, Options};
use crate::api::mailchimp::PROVIDER_ID;
use crate::api::{query_pairs, MailchimpClient, RemoteApi};
use crate::config::{ListsConfig, MailchimpCredentials};
use crate::lists::{NewsletterList, NewsletterListCollection};
use crate::Result;

#[derive(Debug)]
pub struct MailchimpDriver {
    client: MailchimpClient,
    lists: NewsletterListCollection,
}

impl MailchimpDriver {
    pub fn new(credentials: &MailchimpCredentials, config: &ListsConfig) -> Result<Self> {
        Ok(Self {
            client: MailchimpClient::new(credentials)?,
            lists: NewsletterListCollection::create_from_config(config)?,
        })
    }

    pub fn client(&self) -> &MailchimpClient {
        &self.client
    }

    pub fn lists(&self) -> &NewsletterListCollection {
        &self.lists
    }

    fn members_path(list: &NewsletterList) -> String {
        format!("lists/{}/members", list.id())
    }

    fn member_path(list: &NewsletterList, email: &str) -> String {
        format!(
            "lists/{}/members/{}",
            list.id(),
            MailchimpClient::subscriber_hash(email)
        )
    }

    fn subscription_options(email: &str, options: &Options) -> Value {
        let mut defaults = Options::new();
        defaults.insert("email_address".into(), Value::String(email.to_string()));
        defaults.insert("status".into(), Value::String("subscribed".into()));
        defaults.insert("email_type".into(), Value::String("html".into()));
        Value::Object(merge_options(defaults, options))
    }

    /// Member record, or `None` when Mailchimp does not know the address.
    async fn find_member(&self, email: &str, list_name: &str) -> Result<Option<Value>> {
        let list = self.lists.find_by_name(list_name)?;
        let response = self.client.get(&Self::member_path(list, email), &[]).await?;
        if response.status == 404 {
            return Ok(None);
        }
        self.client.into_result(response).map(Some)
    }
}

#[async_trait]
impl NewsletterDriver for MailchimpDriver {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn subscribe(&self, email: &str, options: &Options, list_name: &str) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        let body = Self::subscription_options(email, options);
        let response = self.client.post(&Self::members_path(list), &body).await?;
        self.client.into_result(response)
    }

    async fn subscribe_pending(
        &self,
        email: &str,
        options: &Options,
        list_name: &str,
    ) -> Result<Value> {
        let mut options = options.clone();
        options.insert("status".into(), Value::String("pending".into()));
        self.subscribe(email, &options, list_name).await
    }

    async fn subscribe_or_update(
        &self,
        email: &str,
        options: &Options,
        list_name: &str,
    ) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        let body = Self::subscription_options(email, options);
        let response = self
            .client
            .put(&Self::member_path(list, email), &body)
            .await?;
        self.client.into_result(response)
    }

    async fn get_members(&self, list_name: &str, parameters: &Options) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        let response = self
            .client
            .get(&Self::members_path(list), &query_pairs(parameters))
            .await?;
        self.client.into_result(response)
    }

    async fn get_member(&self, email: &str, list_name: &str) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        let response = self.client.get(&Self::member_path(list, email), &[]).await?;
        self.client.into_result(response)
    }

    async fn get_member_activity(&self, email: &str, list_name: &str) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        let path = format!("{}/activity", Self::member_path(list, email));
        let response = self.client.get(&path, &[]).await?;
        self.client.into_result(response)
    }

    async fn has_member(&self, email: &str, list_name: &str) -> Result<bool> {
        let Some(member) = self.find_member(email, list_name).await? else {
            return Ok(false);
        };
        Ok(member
            .get("email_address")
            .and_then(Value::as_str)
            .map(|stored| stored.to_lowercase() == email.to_lowercase())
            .unwrap_or(false))
    }

    async fn is_subscribed(&self, email: &str, list_name: &str) -> Result<bool> {
        let Some(member) = self.find_member(email, list_name).await? else {
            return Ok(false);
        };
        Ok(member.get("status").and_then(Value::as_str) == Some("subscribed"))
    }

    async fn unsubscribe(&self, email: &str, list_name: &str) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        let response = self
            .client
            .patch(
                &Self::member_path(list, email),
                &json!({ "status": "unsubscribed" }),
            )
            .await?;
        self.client.into_result(response)
    }

    async fn update_email_address(
        &self,
        current_email: &str,
        new_email: &str,
        list_name: &str,
    ) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        let response = self
            .client
            .patch(
                &Self::member_path(list, current_email),
                &json!({ "email_address": new_email }),
            )
            .await?;
        self.client.into_result(response)
    }

    async fn delete(&self, email: &str, list_name: &str) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        let response = self.client.delete(&Self::member_path(list, email)).await?;
        self.client.into_result(response)
    }

    fn api(&self) -> Option<&dyn RemoteApi> {
        Some(&self.client)
    }
}
