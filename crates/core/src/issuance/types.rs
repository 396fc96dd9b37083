//! Types for the certificate issuance workflow.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::edge::ValidationMethod;

/// Longest hostname accepted by DNS, without the trailing dot.
const MAX_HOSTNAME_LEN: usize = 253;

/// Errors raised while constructing an [`IssuanceRequest`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("customer hostname is required")]
    EmptyHostname,

    #[error("customer hostname is {0} characters long (max 253)")]
    HostnameTooLong(usize),

    #[error("invalid label '{label}' in customer hostname '{hostname}'")]
    InvalidLabel { hostname: String, label: String },

    #[error("custom origin server cannot be empty")]
    EmptyOriginServer,
}

fn label_pattern() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("hostname label pattern is valid")
    })
}

/// A single certificate issuance invocation for one customer hostname.
///
/// Fields are private: once built (and validated) the request does not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuanceRequest {
    customer_hostname: String,
    validation_method: ValidationMethod,
    custom_origin_server: Option<String>,
}

impl IssuanceRequest {
    /// Build a request with HTTP validation and no custom origin.
    ///
    /// The hostname is trimmed, lowercased and stripped of a trailing dot.
    pub fn new(customer_hostname: impl AsRef<str>) -> Result<Self, RequestValidationError> {
        let hostname = normalize_hostname(customer_hostname.as_ref())?;
        Ok(Self {
            customer_hostname: hostname,
            validation_method: ValidationMethod::default(),
            custom_origin_server: None,
        })
    }

    pub fn with_validation_method(mut self, method: ValidationMethod) -> Self {
        self.validation_method = method;
        self
    }

    pub fn with_custom_origin_server(
        mut self,
        origin: impl Into<String>,
    ) -> Result<Self, RequestValidationError> {
        let origin = origin.into().trim().to_string();
        if origin.is_empty() {
            return Err(RequestValidationError::EmptyOriginServer);
        }
        self.custom_origin_server = Some(origin);
        Ok(self)
    }

    pub fn customer_hostname(&self) -> &str {
        &self.customer_hostname
    }

    pub fn validation_method(&self) -> ValidationMethod {
        self.validation_method
    }

    pub fn custom_origin_server(&self) -> Option<&str> {
        self.custom_origin_server.as_deref()
    }
}

fn normalize_hostname(raw: &str) -> Result<String, RequestValidationError> {
    let hostname = raw.trim().trim_end_matches('.').to_ascii_lowercase();
    if hostname.is_empty() {
        return Err(RequestValidationError::EmptyHostname);
    }
    if hostname.len() > MAX_HOSTNAME_LEN {
        return Err(RequestValidationError::HostnameTooLong(hostname.len()));
    }
    if let Some(label) = hostname
        .split('.')
        .find(|label| !label_pattern().is_match(label))
    {
        return Err(RequestValidationError::InvalidLabel {
            hostname: hostname.clone(),
            label: label.to_string(),
        });
    }
    Ok(hostname)
}

/// Opaque identifier of the provider's parent zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of looking a zone name up in the zone listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneLookup {
    Found(ZoneId),
    NotFound,
}

impl ZoneLookup {
    pub fn zone_id(&self) -> Option<&ZoneId> {
        match self {
            ZoneLookup::Found(id) => Some(id),
            ZoneLookup::NotFound => None,
        }
    }
}

/// Certificate status of a custom hostname, as reported by the edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    /// Waiting for the customer to prove domain ownership.
    PendingValidation,
    /// The CA has received the certificate request.
    PendingIssuance,
    /// The CA has approved the request; rollout to the edge is pending.
    PendingDeployment,
    /// The edge is serving the certificate.
    Active,
    /// Anything else, kept verbatim.
    Unknown(String),
}

impl CertificateStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "pending_validation" => CertificateStatus::PendingValidation,
            "pending_issuance" => CertificateStatus::PendingIssuance,
            "pending_deployment" => CertificateStatus::PendingDeployment,
            "active" => CertificateStatus::Active,
            other => CertificateStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CertificateStatus::PendingValidation => "pending_validation",
            CertificateStatus::PendingIssuance => "pending_issuance",
            CertificateStatus::PendingDeployment => "pending_deployment",
            CertificateStatus::Active => "active",
            CertificateStatus::Unknown(raw) => raw,
        }
    }

    /// Whether observing this status ends polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CertificateStatus::Active)
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One interpreted status observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub hostname: String,
    pub status: CertificateStatus,
    pub message: String,
    pub terminal: bool,
    pub observed_at: DateTime<Utc>,
}

/// State shared by the steps of one workflow invocation.
#[derive(Debug, Clone)]
pub struct IssuanceSession {
    pub invocation_id: Uuid,
    pub zone_id: ZoneId,
    pub request: IssuanceRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = IssuanceRequest::new("shop.example.com").unwrap();
        assert_eq!(request.customer_hostname(), "shop.example.com");
        assert_eq!(request.validation_method(), ValidationMethod::Http);
        assert!(request.custom_origin_server().is_none());
    }

    #[test]
    fn test_request_normalizes_hostname() {
        let request = IssuanceRequest::new("  Shop.Example.COM. ").unwrap();
        assert_eq!(request.customer_hostname(), "shop.example.com");
    }

    #[test]
    fn test_request_rejects_bad_hostnames() {
        assert_eq!(
            IssuanceRequest::new("   "),
            Err(RequestValidationError::EmptyHostname)
        );
        assert!(matches!(
            IssuanceRequest::new("shop..example.com"),
            Err(RequestValidationError::InvalidLabel { .. })
        ));
        assert!(matches!(
            IssuanceRequest::new("-shop.example.com"),
            Err(RequestValidationError::InvalidLabel { .. })
        ));
        assert!(matches!(
            IssuanceRequest::new("shop_1.example.com"),
            Err(RequestValidationError::InvalidLabel { .. })
        ));
        assert!(matches!(
            IssuanceRequest::new("https://shop.example.com"),
            Err(RequestValidationError::InvalidLabel { .. })
        ));

        let long_label = "a".repeat(64);
        assert!(matches!(
            IssuanceRequest::new(format!("{}.example.com", long_label)),
            Err(RequestValidationError::InvalidLabel { .. })
        ));

        let too_long = vec!["abcdefghi"; 30].join(".");
        assert_eq!(
            IssuanceRequest::new(&too_long),
            Err(RequestValidationError::HostnameTooLong(too_long.len()))
        );
    }

    #[test]
    fn test_request_builders() {
        let request = IssuanceRequest::new("shop.example.com")
            .unwrap()
            .with_validation_method(ValidationMethod::Email)
            .with_custom_origin_server(" origin.saasprovider.com ")
            .unwrap();
        assert_eq!(request.validation_method(), ValidationMethod::Email);
        assert_eq!(
            request.custom_origin_server(),
            Some("origin.saasprovider.com")
        );

        let err = IssuanceRequest::new("shop.example.com")
            .unwrap()
            .with_custom_origin_server("")
            .unwrap_err();
        assert_eq!(err, RequestValidationError::EmptyOriginServer);
    }

    #[test]
    fn test_certificate_status_from_wire() {
        assert_eq!(
            CertificateStatus::from_wire("pending_validation"),
            CertificateStatus::PendingValidation
        );
        assert_eq!(
            CertificateStatus::from_wire("active"),
            CertificateStatus::Active
        );
        assert_eq!(
            CertificateStatus::from_wire("revoked"),
            CertificateStatus::Unknown("revoked".to_string())
        );
        // Matching is exact; the API only emits lowercase.
        assert_eq!(
            CertificateStatus::from_wire("ACTIVE"),
            CertificateStatus::Unknown("ACTIVE".to_string())
        );
        assert_eq!(CertificateStatus::from_wire("revoked").as_str(), "revoked");
    }

    #[test]
    fn test_only_active_is_terminal() {
        assert!(CertificateStatus::Active.is_terminal());
        assert!(!CertificateStatus::PendingDeployment.is_terminal());
        assert!(!CertificateStatus::Unknown("deleted".to_string()).is_terminal());
    }

    #[test]
    fn test_zone_lookup_accessor() {
        let found = ZoneLookup::Found(ZoneId::new("Z123"));
        assert_eq!(found.zone_id().map(ZoneId::as_str), Some("Z123"));
        assert!(ZoneLookup::NotFound.zone_id().is_none());
    }
}
