pub mod config;
pub mod edge;
pub mod issuance;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, CloudflareConfig, Config, ConfigError,
    SanitizedConfig,
};
pub use edge::{CloudflareClient, EdgeApi, EdgeApiError, ValidationMethod};
pub use issuance::{
    CertificateStatus, IssuanceRequest, IssuanceWorkflow, PollingHandle, StatusReport,
    WorkflowError,
};
