//! Client configuration.
//!
//! The core never reads the environment or picks file locations on its own;
//! front ends build a [`ClientConfig`] and pass it in.

use std::time::Duration;

use url::Url;

/// Base URL of the Opal site
pub const DEFAULT_BASE_URL: &str = "https://www.opal.com.au";

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("opal-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host of the target site. Paths are resolved against it.
    pub base_url: Url,
    /// Per-request timeout. `None` leaves the transport default (no timeout).
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
