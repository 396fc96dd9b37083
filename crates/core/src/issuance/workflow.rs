//! One certificate issuance invocation: resolve zone, request, poll.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::edge::{join_messages, EdgeApi, EdgeApiError};

use super::poller::{PollingHandle, StatusUpdateCallback};
use super::requester::request_certificate;
use super::resolver::resolve_zone;
use super::types::{IssuanceRequest, IssuanceSession, ZoneLookup};

/// Errors that abort an issuance invocation before polling starts.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Zone '{0}' was not found in the account's zone listing")]
    ZoneNotFound(String),

    #[error(transparent)]
    Api(#[from] EdgeApiError),
}

/// Runs the issuance steps for a single parent zone.
pub struct IssuanceWorkflow {
    api: Arc<dyn EdgeApi>,
    zone_name: String,
    update_callback: Option<StatusUpdateCallback>,
}

impl IssuanceWorkflow {
    pub fn new(api: Arc<dyn EdgeApi>, zone_name: impl Into<String>) -> Self {
        Self {
            api,
            zone_name: zone_name.into(),
            update_callback: None,
        }
    }

    /// Observe every status report produced while polling.
    pub fn with_update_callback(mut self, callback: StatusUpdateCallback) -> Self {
        self.update_callback = Some(callback);
        self
    }

    pub fn zone_name(&self) -> &str {
        &self.zone_name
    }

    /// Resolve the zone, submit the certificate request and start polling.
    ///
    /// Returns the polling handle once polling is scheduled. An API-level
    /// rejection of the request is logged and polling still starts, since the
    /// hostname may already exist from an earlier invocation.
    pub async fn run(&self, request: IssuanceRequest) -> Result<PollingHandle, WorkflowError> {
        let invocation_id = Uuid::new_v4();
        let span = info_span!(
            "issuance",
            invocation_id = %invocation_id,
            hostname = %request.customer_hostname(),
        );

        async move {
            info!(zone = %self.zone_name, "Resolving parent zone");
            let zone_id = match resolve_zone(self.api.as_ref(), &self.zone_name).await? {
                ZoneLookup::Found(zone_id) => zone_id,
                ZoneLookup::NotFound => {
                    return Err(WorkflowError::ZoneNotFound(self.zone_name.clone()));
                }
            };
            info!(zone_id = %zone_id, "Zone resolved");

            let outcome = request_certificate(self.api.as_ref(), &zone_id, &request).await?;
            if outcome.success {
                info!(
                    success = %outcome,
                    custom_hostname_id = outcome.custom_hostname_id.as_deref().unwrap_or("-"),
                    "Certificate request submitted"
                );
            } else {
                warn!(
                    success = %outcome,
                    "Certificate request rejected: {}",
                    join_messages(&outcome.errors)
                );
            }

            let session = IssuanceSession {
                invocation_id,
                zone_id,
                request,
            };
            Ok(PollingHandle::start(
                Arc::clone(&self.api),
                session,
                self.update_callback.clone(),
            ))
        }
        .instrument(span)
        .await
    }
}
