//! Single entry point over the active driver.

use serde_json::Value;

use crate::api::RemoteApi;
use crate::config::{DriverKind, NewsletterConfig};
use crate::drivers::{MailchimpDriver, MailjetDriver, NewsletterDriver, NullDriver, Options};
use crate::{Error, ErrorContext, Result};

/// Newsletter facade. Holds exactly one driver, chosen once from configuration.
///
/// ```rust,no_run
/// use newsletter::{Newsletter, NewsletterConfig, Options};
///
/// # async fn run() -> newsletter::Result<()> {
/// let config = NewsletterConfig::from_path("newsletter.yaml")?;
/// let newsletter = Newsletter::from_config(&config)?;
///
/// newsletter.subscribe("ada@example.com", &Options::new(), "").await?;
/// assert!(newsletter.is_subscribed("ada@example.com", "").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub enum Newsletter {
    Mailchimp(MailchimpDriver),
    Mailjet(MailjetDriver),
    Null(NullDriver),
}

impl Newsletter {
    pub fn from_config(config: &NewsletterConfig) -> Result<Self> {
        let newsletter = match config.driver {
            DriverKind::Null => Newsletter::Null(NullDriver::new(false)),
            DriverKind::Log => Newsletter::Null(NullDriver::new(true)),
            DriverKind::Mailchimp => {
                let credentials = config
                    .mailchimp
                    .as_ref()
                    .ok_or_else(|| missing_credentials("mailchimp"))?;
                Newsletter::Mailchimp(MailchimpDriver::new(credentials, &config.lists)?)
            }
            DriverKind::Mailjet => {
                let credentials = config
                    .mailjet
                    .as_ref()
                    .ok_or_else(|| missing_credentials("mailjet"))?;
                Newsletter::Mailjet(MailjetDriver::new(credentials, &config.lists)?)
            }
        };
        tracing::debug!(driver = config.driver.as_str(), "newsletter driver selected");
        Ok(newsletter)
    }

    /// Disabled newsletter: every call is a silent no-op.
    pub fn disabled() -> Self {
        Newsletter::Null(NullDriver::new(false))
    }

    pub fn driver(&self) -> &dyn NewsletterDriver {
        match self {
            Newsletter::Mailchimp(d) => d,
            Newsletter::Mailjet(d) => d,
            Newsletter::Null(d) => d,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Newsletter::Null(_))
    }

    pub fn provider_id(&self) -> &str {
        self.driver().provider_id()
    }

    pub async fn subscribe(&self, email: &str, options: &Options, list_name: &str) -> Result<Value> {
        self.driver().subscribe(email, options, list_name).await
    }

    pub async fn subscribe_pending(
        &self,
        email: &str,
        options: &Options,
        list_name: &str,
    ) -> Result<Value> {
        self.driver().subscribe_pending(email, options, list_name).await
    }

    pub async fn subscribe_or_update(
        &self,
        email: &str,
        options: &Options,
        list_name: &str,
    ) -> Result<Value> {
        self.driver()
            .subscribe_or_update(email, options, list_name)
            .await
    }

    pub async fn add_member(&self, email: &str, options: &Options, list_name: &str) -> Result<Value> {
        self.driver().add_member(email, options, list_name).await
    }

    pub async fn get_members(&self, list_name: &str, parameters: &Options) -> Result<Value> {
        self.driver().get_members(list_name, parameters).await
    }

    pub async fn get_member(&self, email: &str, list_name: &str) -> Result<Value> {
        self.driver().get_member(email, list_name).await
    }

    pub async fn get_member_activity(&self, email: &str, list_name: &str) -> Result<Value> {
        self.driver().get_member_activity(email, list_name).await
    }

    pub async fn has_member(&self, email: &str, list_name: &str) -> Result<bool> {
        self.driver().has_member(email, list_name).await
    }

    pub async fn is_subscribed(&self, email: &str, list_name: &str) -> Result<bool> {
        self.driver().is_subscribed(email, list_name).await
    }

    pub async fn unsubscribe(&self, email: &str, list_name: &str) -> Result<Value> {
        self.driver().unsubscribe(email, list_name).await
    }

    pub async fn update_email_address(
        &self,
        current_email: &str,
        new_email: &str,
        list_name: &str,
    ) -> Result<Value> {
        self.driver()
            .update_email_address(current_email, new_email, list_name)
            .await
    }

    pub async fn delete(&self, email: &str, list_name: &str) -> Result<Value> {
        self.driver().delete(email, list_name).await
    }

    /// Underlying provider API; `None` for the no-op driver.
    pub fn api(&self) -> Option<&dyn RemoteApi> {
        self.driver().api()
    }
}

impl From<MailchimpDriver> for Newsletter {
    fn from(driver: MailchimpDriver) -> Self {
        Newsletter::Mailchimp(driver)
    }
}

impl From<MailjetDriver> for Newsletter {
    fn from(driver: MailjetDriver) -> Self {
        Newsletter::Mailjet(driver)
    }
}

impl From<NullDriver> for Newsletter {
    fn from(driver: NullDriver) -> Self {
        Newsletter::Null(driver)
    }
}

fn missing_credentials(provider: &str) -> Error {
    Error::configuration_with_context(
        format!("Driver '{}' selected but no credentials configured", provider),
        ErrorContext::new()
            .with_field_path(provider)
            .with_source("newsletter"),
    )
}
