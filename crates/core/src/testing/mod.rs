//! Testing utilities and a mock edge API.
//!
//! The mock implements [`EdgeApi`](crate::edge::EdgeApi) entirely in memory,
//! so the issuance workflow can be exercised under a paused tokio clock.
//!
//! # Example
//!
//! ```rust,ignore
//! use edgecert_core::testing::{MockEdgeApi, fixtures};
//!
//! let api = MockEdgeApi::new();
//! api.set_zones(vec![fixtures::zone("Z123", "sb.example.net")]).await;
//! api.set_statuses(vec!["pending_validation", "active"]).await;
//! ```

mod mock_edge_api;

pub use mock_edge_api::{EdgeOperation, MockEdgeApi, RecordedEdgeCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::edge::{CustomHostname, CustomHostnameSsl, Zone};
    use crate::issuance::IssuanceRequest;

    /// Create a zone listing entry.
    pub fn zone(id: &str, name: &str) -> Zone {
        Zone {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// Create a custom hostname record with the given SSL status.
    pub fn custom_hostname(hostname: &str, status: &str) -> CustomHostname {
        CustomHostname {
            id: Some(format!("ch-{}", hostname)),
            hostname: Some(hostname.to_string()),
            ssl: CustomHostnameSsl {
                status: status.to_string(),
                method: Some("http".to_string()),
                validation_errors: Vec::new(),
            },
        }
    }

    /// Create an issuance request with default options.
    ///
    /// Panics if `hostname` is not a valid hostname.
    pub fn issuance_request(hostname: &str) -> IssuanceRequest {
        IssuanceRequest::new(hostname).expect("fixture hostname must be valid")
    }
}
