//! Mailjet driver.
//!
//! Contacts are global in Mailjet; list membership is managed through the
//! `contactslist/{id}/managecontact` action endpoint (`addforce`, `unsub`,
//! `remove`). There is no upsert primitive and no single "member of list"
//! record, so membership checks scan the list page by page, or the contact's
//! lists.

use async_trait::async_trait;
use serde_json::Value;

use super::{merge_options, NewsletterDriver, Options};
use crate::api::mailjet::{resources, PROVIDER_ID};
use crate::api::{query_pairs, MailjetClient, RemoteApi};
use crate::config::{ListsConfig, MailjetCredentials};
use crate::lists::NewsletterListCollection;
use crate::{Error, Result};

/// Contacts fetched per request when scanning a whole list.
const CONTACTS_PAGE_SIZE: usize = 1000;

#[derive(Debug)]
pub struct MailjetDriver {
    client: MailjetClient,
    lists: NewsletterListCollection,
}

impl MailjetDriver {
    pub fn new(credentials: &MailjetCredentials, config: &ListsConfig) -> Result<Self> {
        Ok(Self {
            client: MailjetClient::new(credentials)?,
            lists: NewsletterListCollection::create_from_config(config)?,
        })
    }

    pub fn client(&self) -> &MailjetClient {
        &self.client
    }

    pub fn lists(&self) -> &NewsletterListCollection {
        &self.lists
    }

    fn action_body(email: &str, action: &str) -> Options {
        let mut body = Options::new();
        body.insert("Email".into(), Value::String(email.to_string()));
        body.insert("Action".into(), Value::String(action.to_string()));
        body
    }

    async fn manage_contact(&self, list_name: &str, body: Options) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        let response = self
            .client
            .post(
                &resources::contactslist_managecontact(list.id()),
                &Value::Object(body),
            )
            .await?;
        self.client.into_result(response)
    }

    async fn list_contacts(&self, list_id: &str, parameters: &Options) -> Result<Value> {
        let mut query = Options::new();
        query.insert("ContactsList".into(), Value::String(list_id.to_string()));
        let query = merge_options(query, parameters);

        let response = self
            .client
            .get(resources::CONTACT, &query_pairs(&query))
            .await?;
        self.client.into_data(response)
    }
}

#[async_trait]
impl NewsletterDriver for MailjetDriver {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn subscribe(&self, email: &str, options: &Options, list_name: &str) -> Result<Value> {
        let body = merge_options(Self::action_body(email, "addforce"), options);
        self.manage_contact(list_name, body).await
    }

    async fn subscribe_pending(
        &self,
        _email: &str,
        _options: &Options,
        _list_name: &str,
    ) -> Result<Value> {
        Err(Error::unsupported(PROVIDER_ID, "subscribe_pending"))
    }

    // `addforce` already overwrites an existing contact
    async fn subscribe_or_update(
        &self,
        email: &str,
        options: &Options,
        list_name: &str,
    ) -> Result<Value> {
        self.subscribe(email, options, list_name).await
    }

    async fn get_members(&self, list_name: &str, parameters: &Options) -> Result<Value> {
        let list = self.lists.find_by_name(list_name)?;
        self.list_contacts(list.id(), parameters).await
    }

    async fn get_member(&self, email: &str, _list_name: &str) -> Result<Value> {
        let response = self.client.get(&resources::contact(email), &[]).await?;
        self.client.into_data(response)
    }

    async fn get_member_activity(&self, email: &str, _list_name: &str) -> Result<Value> {
        let response = self
            .client
            .get(&resources::contactstatistics(email), &[])
            .await?;
        self.client.into_data(response)
    }

    async fn has_member(&self, email: &str, list_name: &str) -> Result<bool> {
        let list = self.lists.find_by_name(list_name)?;

        let mut offset: usize = 0;
        loop {
            let mut page = Options::new();
            page.insert("Limit".into(), Value::from(CONTACTS_PAGE_SIZE));
            page.insert("Offset".into(), Value::from(offset));

            let contacts = self.list_contacts(list.id(), &page).await?;
            let contacts = contacts.as_array().map(Vec::as_slice).unwrap_or_default();
            if contacts
                .iter()
                .any(|c| c.get("Email").and_then(Value::as_str) == Some(email))
            {
                return Ok(true);
            }
            if contacts.len() < CONTACTS_PAGE_SIZE {
                return Ok(false);
            }
            offset += contacts.len();
        }
    }

    async fn is_subscribed(&self, email: &str, list_name: &str) -> Result<bool> {
        let list_id = self.lists.find_by_name(list_name)?.id().to_string();

        let response = self
            .client
            .get(&resources::contact_getcontactslists(email), &[])
            .await?;
        // unknown contact
        if response.status == 404 {
            return Ok(false);
        }
        let memberships = self.client.into_data(response)?;

        Ok(memberships
            .as_array()
            .map(|memberships| {
                memberships.iter().any(|m| {
                    let matches_list = match m.get("ListID") {
                        Some(Value::String(id)) => *id == list_id,
                        Some(Value::Number(id)) => id.to_string() == list_id,
                        _ => false,
                    };
                    matches_list && m.get("IsUnsub") != Some(&Value::Bool(true))
                })
            })
            .unwrap_or(false))
    }

    async fn unsubscribe(&self, email: &str, list_name: &str) -> Result<Value> {
        self.manage_contact(list_name, Self::action_body(email, "unsub"))
            .await
    }

    // Mailjet contacts are keyed by address; it cannot be changed in place.
    async fn update_email_address(
        &self,
        _current_email: &str,
        _new_email: &str,
        _list_name: &str,
    ) -> Result<Value> {
        Err(Error::unsupported(PROVIDER_ID, "update_email_address"))
    }

    async fn delete(&self, email: &str, list_name: &str) -> Result<Value> {
        self.manage_contact(list_name, Self::action_body(email, "remove"))
            .await
    }

    fn api(&self) -> Option<&dyn RemoteApi> {
        Some(&self.client)
    }
}
