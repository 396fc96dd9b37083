//! Wire types for the custom hostnames API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A DNS zone as returned by the zone listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// An error or message entry from an API envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Join envelope messages into a single line for logs and errors.
pub fn join_messages(messages: &[ApiMessage]) -> String {
    if messages.is_empty() {
        return "no error details returned".to_string();
    }
    messages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// How domain ownership is proven before the certificate is issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMethod {
    #[default]
    Http,
    Txt,
    Email,
}

impl ValidationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMethod::Http => "http",
            ValidationMethod::Txt => "txt",
            ValidationMethod::Email => "email",
        }
    }
}

impl fmt::Display for ValidationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(ValidationMethod::Http),
            "txt" => Ok(ValidationMethod::Txt),
            "email" => Ok(ValidationMethod::Email),
            other => Err(format!(
                "unsupported validation method '{}' (expected http, txt or email)",
                other
            )),
        }
    }
}

/// Certificate validation level. Custom hostnames only get DV certificates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateType {
    #[default]
    Dv,
}

/// `ssl` block of a custom hostname creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SslRequest {
    pub method: ValidationMethod,
    #[serde(rename = "type")]
    pub certificate_type: CertificateType,
}

/// Body of `POST /zones/{zone_id}/custom_hostnames`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomHostnameRequest {
    pub hostname: String,
    pub ssl: SslRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_origin_server: Option<String>,
}

/// Result of a creation call, carrying the API's own success flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCustomHostnameResponse {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub result: Option<CustomHostname>,
}

/// A custom hostname record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomHostname {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ssl: CustomHostnameSsl,
}

/// Certificate state of a custom hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomHostnameSsl {
    /// Raw status string, e.g. `pending_validation` or `active`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub validation_errors: Vec<SslValidationError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslValidationError {
    #[serde(default)]
    pub message: String,
}

/// Standard response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

/// Pagination block of list responses.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct ResultInfo {
    #[serde(default)]
    pub total_pages: Option<u32>,
}
