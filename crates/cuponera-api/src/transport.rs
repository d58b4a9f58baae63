// Shared transport configuration for building reqwest::Client instances.
//
// The table store speaks plain HTTPS with bearer-token auth; this module
// centralizes timeout, user-agent, and default-header handling so the
// client constructor stays focused on URL mechanics.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` carrying the store API token as a
    /// default `Authorization: Bearer` header.
    pub fn build_client(&self, api_token: &SecretString) -> Result<reqwest::Client, crate::Error> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", api_token.expose_secret());
        let mut value = HeaderValue::from_str(&bearer).map_err(|_| crate::Error::Authentication {
            message: "API token contains characters invalid in an HTTP header".into(),
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("cuponera/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(crate::Error::Transport)
    }
}
