//! List resolution error types

/// Raised while resolving a list name, always before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidNewsletterList {
    #[error("There are no lists defined.")]
    NoListsDefined,

    #[error("There is no list named `{0}`.")]
    NoListWithName(String),

    #[error("Could not find a default list named `{0}`.")]
    DefaultListDoesNotExist(String),
}
