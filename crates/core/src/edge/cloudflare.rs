//! Cloudflare custom hostnames API client.
//!
//! Authenticates with the legacy global API key (`X-Auth-Email` +
//! `X-Auth-Key`), which is what SSL for SaaS zones are provisioned with.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::CloudflareConfig;

use super::types::{
    join_messages, CreateCustomHostnameResponse, CustomHostname, CustomHostnameRequest, Envelope,
    Zone,
};
use super::{EdgeApi, EdgeApiError};

/// Page size requested when listing zones.
const ZONES_PER_PAGE: u32 = 50;

/// Statuses the API uses to reject a custom hostname with a regular
/// envelope (e.g. 1406 duplicate hostname on 409).
const REJECTION_STATUSES: [StatusCode; 2] = [StatusCode::BAD_REQUEST, StatusCode::CONFLICT];

/// Cloudflare API client.
pub struct CloudflareClient {
    client: Client,
    base_url: String,
    email: String,
    api_key: String,
}

impl CloudflareClient {
    /// Create a new client from configuration.
    pub fn new(config: &CloudflareConfig) -> Result<Self, EdgeApiError> {
        if config.email.is_empty() || config.api_key.is_empty() {
            return Err(EdgeApiError::NotConfigured(
                "Cloudflare email and API key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build a request carrying the JSON content type and both auth headers.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Content-Type", "application/json")
            .header("X-Auth-Email", &self.email)
            .header("X-Auth-Key", &self.api_key)
    }

    fn custom_hostnames_url(&self, zone_id: &str) -> String {
        format!(
            "{}/zones/{}/custom_hostnames",
            self.base_url,
            urlencoding::encode(zone_id)
        )
    }

    /// Map auth/rate-limit statuses to typed errors.
    fn check_status(status: StatusCode) -> Result<(), EdgeApiError> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EdgeApiError::Unauthorized);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(EdgeApiError::RateLimitExceeded);
        }
        Ok(())
    }

    /// Read a response that must be a 2xx with `success: true`.
    async fn read_envelope<T: DeserializeOwned>(
        response: Response,
        what: &str,
    ) -> Result<Envelope<T>, EdgeApiError> {
        let status = response.status();
        Self::check_status(status)?;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EdgeApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            EdgeApiError::Parse(format!("Failed to parse {} response: {}", what, e))
        })?;

        if !envelope.success {
            return Err(EdgeApiError::Api {
                status: status.as_u16(),
                body: join_messages(&envelope.errors),
            });
        }

        Ok(envelope)
    }
}

#[async_trait]
impl EdgeApi for CloudflareClient {
    async fn list_zones(&self) -> Result<Vec<Zone>, EdgeApiError> {
        let url = format!("{}/zones", self.base_url);
        let mut zones = Vec::new();
        let mut page: u32 = 1;

        loop {
            debug!(page, "Listing Cloudflare zones");

            let response = self
                .request(Method::GET, &url)
                .query(&[("page", page), ("per_page", ZONES_PER_PAGE)])
                .send()
                .await?;

            let envelope: Envelope<Vec<Zone>> = Self::read_envelope(response, "zone list").await?;
            let batch = envelope.result.ok_or_else(|| {
                EdgeApiError::Parse("zone list response has no result".to_string())
            })?;
            let batch_len = batch.len();
            zones.extend(batch);

            let total_pages = envelope
                .result_info
                .and_then(|info| info.total_pages)
                .unwrap_or(1);
            if page >= total_pages || batch_len == 0 {
                break;
            }
            page += 1;
        }

        debug!(count = zones.len(), "Listed Cloudflare zones");
        Ok(zones)
    }

    async fn create_custom_hostname(
        &self,
        zone_id: &str,
        request: &CustomHostnameRequest,
    ) -> Result<CreateCustomHostnameResponse, EdgeApiError> {
        let url = self.custom_hostnames_url(zone_id);

        debug!(zone_id, hostname = %request.hostname, "Creating custom hostname");

        let response = self
            .request(Method::POST, &url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        Self::check_status(status)?;

        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str::<CreateCustomHostnameResponse>(&body).map_err(|e| {
                EdgeApiError::Parse(format!(
                    "Failed to parse custom hostname creation response: {}",
                    e
                ))
            });
        }

        // Rejections such as duplicate hostnames are reported through
        // `success`; every other failure status is an error.
        if REJECTION_STATUSES.contains(&status) {
            if let Ok(parsed) = serde_json::from_str::<CreateCustomHostnameResponse>(&body) {
                if !parsed.success {
                    return Ok(parsed);
                }
            }
        }

        Err(EdgeApiError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_custom_hostnames(
        &self,
        zone_id: &str,
        hostname: &str,
    ) -> Result<Vec<CustomHostname>, EdgeApiError> {
        let url = self.custom_hostnames_url(zone_id);

        debug!(zone_id, hostname, "Fetching custom hostname status");

        let response = self
            .request(Method::GET, &url)
            .query(&[("hostname", hostname)])
            .send()
            .await?;

        let envelope: Envelope<Vec<CustomHostname>> =
            Self::read_envelope(response, "custom hostname").await?;

        envelope.result.ok_or_else(|| {
            EdgeApiError::Parse("custom hostname response has no result".to_string())
        })
    }
}
