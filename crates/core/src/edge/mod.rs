//! Edge network API integration.
//!
//! The certificate workflow only talks to the edge provider through the
//! [`EdgeApi`] trait, so the HTTP transport can be swapped for a mock in tests.

mod cloudflare;
mod types;

pub use cloudflare::CloudflareClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the edge API.
#[derive(Debug, Error)]
pub enum EdgeApiError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Credentials were rejected (401/403).
    #[error("Authentication failed: check the account email and API key")]
    Unauthorized,

    /// Rate limit exceeded (429).
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error status or an unsuccessful envelope.
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing credentials, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Operations the issuance workflow needs from the edge provider.
#[async_trait]
pub trait EdgeApi: Send + Sync {
    /// List every zone visible to the configured account, in listing order.
    async fn list_zones(&self) -> Result<Vec<Zone>, EdgeApiError>;

    /// Submit a custom hostname (and its DV certificate) under a zone.
    ///
    /// An API-level rejection is reported through
    /// [`CreateCustomHostnameResponse::success`], not as an error.
    async fn create_custom_hostname(
        &self,
        zone_id: &str,
        request: &CustomHostnameRequest,
    ) -> Result<CreateCustomHostnameResponse, EdgeApiError>;

    /// Fetch the custom hostname records matching `hostname` under a zone.
    async fn get_custom_hostnames(
        &self,
        zone_id: &str,
        hostname: &str,
    ) -> Result<Vec<CustomHostname>, EdgeApiError>;
}
