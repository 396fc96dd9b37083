//! Certificate status interpretation.
//!
//! Status transitions are driven by the certificate authority; this only
//! observes them, reports each stage and stops polling once the certificate
//! is live:
//!
//! - `pending_validation`: the customer still has to prove ownership
//! - `pending_issuance`: the CA has received the request
//! - `pending_deployment`: the CA has issued the certificate
//! - `active`: the edge is serving the certificate (terminal)

use chrono::Utc;
use tracing::{info, warn};

use crate::edge::{CustomHostname, ValidationMethod};

use super::poller::PollCancellation;
use super::types::{CertificateStatus, IssuanceRequest, StatusReport};

/// Maps observed statuses to messages and decides when polling ends.
#[derive(Debug, Clone)]
pub struct StatusInterpreter {
    hostname: String,
    validation_method: ValidationMethod,
}

impl StatusInterpreter {
    pub fn new(request: &IssuanceRequest) -> Self {
        Self {
            hostname: request.customer_hostname().to_string(),
            validation_method: request.validation_method(),
        }
    }

    /// Human-readable stage message for `status`.
    pub fn describe(&self, status: &CertificateStatus) -> String {
        let host = &self.hostname;
        match status {
            CertificateStatus::PendingValidation => format!(
                "{} still awaiting {} validation",
                host, self.validation_method
            ),
            CertificateStatus::PendingIssuance => format!("Issuance pending for {}", host),
            CertificateStatus::PendingDeployment => {
                format!("Certificate issued for {}. Now pending deployment", host)
            }
            CertificateStatus::Active => format!("Certificate provisioned for {}", host),
            CertificateStatus::Unknown(_) => format!("{} status unknown", host),
        }
    }

    /// Log the stage for `status` and cancel polling when it is terminal.
    ///
    /// Safe to call again after cancellation: a repeated `active` is logged
    /// and the cancel is a no-op.
    pub fn apply(&self, status: CertificateStatus, cancellation: &PollCancellation) -> StatusReport {
        let message = self.describe(&status);
        let terminal = status.is_terminal();

        match &status {
            CertificateStatus::Unknown(raw) => {
                warn!(hostname = %self.hostname, status = %raw, "{}", message);
            }
            _ => {
                info!(hostname = %self.hostname, status = %status, "{}", message);
            }
        }

        if terminal && !cancellation.cancel() {
            info!(hostname = %self.hostname, "Status polling already cancelled");
        }

        StatusReport {
            hostname: self.hostname.clone(),
            status,
            message,
            terminal,
            observed_at: Utc::now(),
        }
    }

    /// Interpret a fetched custom hostname record.
    pub fn observe(&self, record: &CustomHostname, cancellation: &PollCancellation) -> StatusReport {
        let status = CertificateStatus::from_wire(&record.ssl.status);

        if status == CertificateStatus::PendingValidation {
            for error in &record.ssl.validation_errors {
                warn!(hostname = %self.hostname, "Validation error: {}", error.message);
            }
        }

        self.apply(status, cancellation)
    }
}
