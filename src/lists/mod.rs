//! 列表注册表：将人类可读的列表名解析为服务商列表 ID
//!
//! Newsletter list registry. Resolves a configured list name to the
//! provider-assigned list id, falling back to the configured default list
//! when no name is given.

mod error;

pub use error::InvalidNewsletterList;

use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::ListsConfig;

/// One remote mailing list (a Mailchimp audience, a Mailjet contacts list).
#[derive(Debug, Clone, PartialEq)]
pub struct NewsletterList {
    name: String,
    id: String,
    properties: BTreeMap<String, Value>,
}

impl NewsletterList {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Extra keys configured next to `id`.
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }
}

/// Ordered set of configured lists with a designated default. Lookups scan
/// in configuration order.
#[derive(Debug, Clone)]
pub struct NewsletterListCollection {
    lists: Vec<NewsletterList>,
    default_list: String,
}

impl NewsletterListCollection {
    /// Build the registry from the `lists` / `defaultList` configuration.
    ///
    /// The default list name is captured as-is; it is only checked when the
    /// default is actually resolved.
    pub fn create_from_config(config: &ListsConfig) -> Result<Self, InvalidNewsletterList> {
        if config.lists.is_empty() {
            return Err(InvalidNewsletterList::NoListsDefined);
        }

        let lists = config
            .lists
            .iter()
            .map(|(name, props)| {
                NewsletterList::new(name.clone(), props.id.clone())
                    .with_properties(props.extra.clone())
            })
            .collect();

        Ok(Self {
            lists,
            default_list: config.default_list.clone(),
        })
    }

    /// Find a list by exact name. An empty name resolves the default list.
    pub fn find_by_name(&self, name: &str) -> Result<&NewsletterList, InvalidNewsletterList> {
        if name.is_empty() {
            return self.default();
        }

        self.lists
            .iter()
            .find(|list| list.name() == name)
            .ok_or_else(|| InvalidNewsletterList::NoListWithName(name.to_string()))
    }

    pub fn default(&self) -> Result<&NewsletterList, InvalidNewsletterList> {
        self.lists
            .iter()
            .find(|list| list.name() == self.default_list)
            .ok_or_else(|| InvalidNewsletterList::DefaultListDoesNotExist(self.default_list.clone()))
    }

    pub fn default_list_name(&self) -> &str {
        &self.default_list
    }

    pub fn iter(&self) -> impl Iterator<Item = &NewsletterList> {
        self.lists.iter()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
