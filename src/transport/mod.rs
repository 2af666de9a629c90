//! HTTP transport shared by the provider API clients.

mod http;

pub use http::{HttpTransport, TransportConfig, TransportError};
