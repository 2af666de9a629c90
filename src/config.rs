//! Newsletter configuration
//!
//! Driver selection, list definitions and per-provider credentials. Loaded
//! from YAML and then overridden from the environment.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::{Error, ErrorContext, Result};

/// Default list name used by [`NewsletterConfig::from_env`].
pub const DEFAULT_LIST_NAME: &str = "subscribers";

/// Which driver backs the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Mailchimp,
    Mailjet,
    /// No-op driver that logs every call.
    Log,
    /// No-op driver (feature disabled).
    #[default]
    Null,
}

impl DriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Mailchimp => "mailchimp",
            DriverKind::Mailjet => "mailjet",
            DriverKind::Log => "log",
            DriverKind::Null => "null",
        }
    }
}

impl FromStr for DriverKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mailchimp" => Ok(DriverKind::Mailchimp),
            "mailjet" => Ok(DriverKind::Mailjet),
            "log" => Ok(DriverKind::Log),
            "" | "null" | "none" => Ok(DriverKind::Null),
            other => Err(Error::configuration_with_context(
                format!("Unknown newsletter driver '{}'", other),
                ErrorContext::new()
                    .with_field_path("driver")
                    .with_details("expected one of: mailchimp, mailjet, log, null"),
            )),
        }
    }
}

// `driver: null` in YAML is a null value, not the string "null".
fn deserialize_driver<'de, D>(deserializer: D) -> std::result::Result<DriverKind, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(name) => name.parse().map_err(serde::de::Error::custom),
        None => Ok(DriverKind::Null),
    }
}

/// Properties of one configured list. Only `id` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListProperties {
    #[serde(deserialize_with = "deserialize_list_id")]
    pub id: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ListProperties {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: BTreeMap::new(),
        }
    }
}

// Provider ids are strings, but integer ids are common in hand-written config.
fn deserialize_list_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Input {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Input::deserialize(deserializer)? {
        Input::Text(s) => s,
        Input::Unsigned(n) => n.to_string(),
        Input::Signed(n) => n.to_string(),
    })
}

/// Ordered `name -> properties` mapping. Keeps the order lists appear in the
/// source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListMap(Vec<(String, ListProperties)>);

impl ListMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace a list, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, properties: ListProperties) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = properties,
            None => self.0.push((name, properties)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ListProperties> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ListProperties> {
        self.0.iter_mut().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ListProperties)> {
        self.0.iter().map(|(n, p)| (n, p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ListProperties)> for ListMap {
    fn from_iter<I: IntoIterator<Item = (String, ListProperties)>>(iter: I) -> Self {
        let mut map = ListMap::new();
        for (name, props) in iter {
            map.insert(name, props);
        }
        map
    }
}

impl<'de> Deserialize<'de> for ListMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ListMapVisitor;

        impl<'de> Visitor<'de> for ListMapVisitor {
            type Value = ListMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of list names to list properties")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<ListMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = ListMap::new();
                while let Some((name, props)) = access.next_entry::<String, ListProperties>()? {
                    map.insert(name, props);
                }
                Ok(map)
            }

            // `lists: ~` is treated as no lists at all
            fn visit_unit<E>(self) -> std::result::Result<ListMap, E>
            where
                E: serde::de::Error,
            {
                Ok(ListMap::new())
            }
        }

        deserializer.deserialize_any(ListMapVisitor)
    }
}

impl Serialize for ListMap {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, props) in &self.0 {
            map.serialize_entry(name, props)?;
        }
        map.end()
    }
}

/// The list section shared by every provider driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListsConfig {
    /// The list to use when no list name is passed to an operation.
    #[serde(rename = "defaultList", alias = "default_list", default)]
    pub default_list: String,
    #[serde(default)]
    pub lists: ListMap,
}

fn default_verify_ssl() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailchimpCredentials {
    #[serde(rename = "apiKey", alias = "api_key", default)]
    pub api_key: String,
    /// Verify TLS certificates.
    #[serde(default = "default_verify_ssl")]
    pub ssl: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Override the datacenter URL derived from the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl MailchimpCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ssl: default_verify_ssl(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailjetCredentials {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl MailjetCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Top-level newsletter configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsletterConfig {
    #[serde(default, deserialize_with = "deserialize_driver")]
    pub driver: DriverKind,
    #[serde(flatten)]
    pub lists: ListsConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailchimp: Option<MailchimpCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailjet: Option<MailjetCredentials>,
}

impl NewsletterConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid newsletter configuration: {}", e),
                ErrorContext::new().with_source("config_loader"),
            )
        })
    }

    /// Load a YAML file and apply environment overrides on top of it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(format!("file: {}", path.display())),
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded newsletter configuration");
        Ok(config.apply_env_overrides())
    }

    /// Built-in defaults: one `subscribers` list, null driver, then the
    /// environment on top.
    pub fn from_env() -> Self {
        let mut lists = ListMap::new();
        lists.insert(DEFAULT_LIST_NAME, ListProperties::new(""));
        Self {
            driver: DriverKind::Null,
            lists: ListsConfig {
                default_list: DEFAULT_LIST_NAME.to_string(),
                lists,
            },
            mailchimp: None,
            mailjet: None,
        }
        .apply_env_overrides()
    }

    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the process environment in
    /// production).
    ///
    /// - `MAIL_NEWSLETTER_DRIVER`: driver selector
    /// - `MAIL_NEWSLETTER_LIST_ID`: id of the default list
    /// - `MAILCHIMP_APIKEY`: Mailchimp API key
    /// - `MJ_APIKEY_PUBLIC` / `MJ_APIKEY_PRIVATE`: Mailjet key pair
    ///
    /// An unparseable driver value is ignored with a warning.
    pub fn apply_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(driver) = lookup("MAIL_NEWSLETTER_DRIVER") {
            match driver.parse::<DriverKind>() {
                Ok(kind) => self.driver = kind,
                Err(e) => tracing::warn!("ignoring MAIL_NEWSLETTER_DRIVER: {}", e),
            }
        }

        if let Some(list_id) = lookup("MAIL_NEWSLETTER_LIST_ID") {
            let default_list = self.lists.default_list.clone();
            match self.lists.lists.get_mut(&default_list) {
                Some(props) => props.id = list_id,
                None => self
                    .lists
                    .lists
                    .insert(default_list, ListProperties::new(list_id)),
            }
        }

        if let Some(api_key) = lookup("MAILCHIMP_APIKEY") {
            match self.mailchimp.as_mut() {
                Some(creds) => creds.api_key = api_key,
                None => self.mailchimp = Some(MailchimpCredentials::new(api_key)),
            }
        }

        let mj_key = lookup("MJ_APIKEY_PUBLIC");
        let mj_secret = lookup("MJ_APIKEY_PRIVATE");
        if mj_key.is_some() || mj_secret.is_some() {
            let creds = self
                .mailjet
                .get_or_insert_with(|| MailjetCredentials::new("", ""));
            if let Some(key) = mj_key {
                creds.key = key;
            }
            if let Some(secret) = mj_secret {
                creds.secret = secret;
            }
        }

        self
    }
}
