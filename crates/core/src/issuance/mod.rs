//! Custom hostname certificate issuance.
//!
//! A single invocation runs these steps in strict order:
//!
//! 1. **Resolve** the parent zone name to its identifier ([`resolve_zone`])
//! 2. **Request** a DV certificate for the customer hostname ([`request_certificate`])
//! 3. **Poll** the certificate status every [`POLL_INTERVAL`] ([`PollingHandle`])
//!    until [`StatusInterpreter`] observes `active`
//!
//! [`IssuanceWorkflow`] ties the steps together and hands back the polling
//! handle.

mod interpreter;
mod poller;
mod requester;
mod resolver;
mod types;
mod workflow;

pub use interpreter::StatusInterpreter;
pub use poller::{PollCancellation, PollingHandle, StatusUpdateCallback, POLL_INTERVAL};
pub use requester::{build_payload, request_certificate, RequestOutcome};
pub use resolver::{find_zone, resolve_zone};
pub use types::{
    CertificateStatus, IssuanceRequest, IssuanceSession, RequestValidationError, StatusReport,
    ZoneId, ZoneLookup,
};
pub use workflow::{IssuanceWorkflow, WorkflowError};
