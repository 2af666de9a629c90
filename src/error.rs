use crate::lists::InvalidNewsletterList;
use thiserror::Error;

/// Structured error context for configuration and setup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key that caused the error (e.g., "mailchimp.apiKey", "lists.subscribers.id")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected format, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "mailchimp_client")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A failure reported by a remote provider after a call went through.
///
/// Raised only once the provider answered with a failure signal; list
/// resolution problems are reported as [`InvalidNewsletterList`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider} returned an error: {message}")]
pub struct ApiError {
    /// Provider identifier (`mailchimp`, `mailjet`).
    pub provider: String,
    /// Message reported by the provider.
    pub message: String,
    /// HTTP status code of the failed response, when known.
    pub status: Option<u16>,
}

impl ApiError {
    pub fn response_error(
        message: impl Into<String>,
        provider: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
            status,
        }
    }
}

/// Unified error type for the newsletter library
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid newsletter list: {0}")]
    InvalidList(#[from] InvalidNewsletterList),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Operation `{operation}` is not supported by the {provider} driver")]
    Unsupported {
        provider: String,
        operation: String,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error without context
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn unsupported(provider: impl Into<String>, operation: impl Into<String>) -> Self {
        Error::Unsupported {
            provider: provider.into(),
            operation: operation.into(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The provider failure carried by this error, if it is one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}
