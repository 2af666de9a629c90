//! # newsletter
//!
//! 统一的邮件订阅列表管理接口，将实际工作委托给 Mailchimp、Mailjet 等服务商。
//!
//! Uniform newsletter subscriber management over third-party email-marketing
//! providers. The library owns no subscriber state: every operation is a
//! pass-through to the provider's REST API.
//!
//! ## Overview
//!
//! - **Drivers**: [`NewsletterDriver`] is implemented once per provider
//!   ([`drivers::MailchimpDriver`], [`drivers::MailjetDriver`]) plus a no-op
//!   [`drivers::NullDriver`] for disabled environments.
//! - **Lists**: [`NewsletterListCollection`] resolves configured list names to
//!   provider list ids; an empty name means the configured default list.
//! - **Facade**: [`Newsletter`] holds the driver selected from configuration
//!   and exposes the whole operation surface.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use newsletter::{Newsletter, NewsletterConfig, Options};
//!
//! #[tokio::main]
//! async fn main() -> newsletter::Result<()> {
//!     let config = NewsletterConfig::from_yaml_str(r#"
//! driver: mailchimp
//! defaultList: subscribers
//! lists:
//!   subscribers:
//!     id: "a1b2c3"
//! mailchimp:
//!   apiKey: "0123456789abcdef-us10"
//! "#)?;
//!
//!     let newsletter = Newsletter::from_config(&config)?;
//!     newsletter.subscribe("ada@example.com", &Options::new(), "").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | YAML configuration and environment overrides |
//! | [`lists`] | List registry and list resolution errors |
//! | [`drivers`] | Driver contract and provider implementations |
//! | [`api`] | Provider REST clients |
//! | [`transport`] | HTTP transport |

pub mod api;
pub mod config;
pub mod drivers;
pub mod lists;
pub mod newsletter;
pub mod transport;

pub use api::RemoteApi;
pub use config::{DriverKind, NewsletterConfig};
pub use drivers::{NewsletterDriver, Options};
pub use lists::{InvalidNewsletterList, NewsletterList, NewsletterListCollection};
pub use newsletter::Newsletter;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{ApiError, Error, ErrorContext};
