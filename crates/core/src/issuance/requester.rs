//! Custom hostname certificate request submission.

use std::fmt;

use tracing::debug;

use crate::edge::{
    ApiMessage, CertificateType, CustomHostnameRequest, EdgeApi, EdgeApiError, SslRequest,
};

use super::types::{IssuanceRequest, ZoneId};

/// What the API said about a certificate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    /// The API's own success flag.
    pub success: bool,
    /// Errors reported alongside an unsuccessful response.
    pub errors: Vec<ApiMessage>,
    /// Identifier of the created custom hostname, when returned.
    pub custom_hostname_id: Option<String>,
}

/// Renders the success flag as `true` / `false`.
impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.success)
    }
}

/// Build the creation body. The certificate type is always DV and the
/// origin override is only present when one was given.
pub fn build_payload(request: &IssuanceRequest) -> CustomHostnameRequest {
    CustomHostnameRequest {
        hostname: request.customer_hostname().to_string(),
        ssl: SslRequest {
            method: request.validation_method(),
            certificate_type: CertificateType::Dv,
        },
        custom_origin_server: request.custom_origin_server().map(str::to_string),
    }
}

/// Submit the certificate request for `request` under `zone_id`. Not retried.
pub async fn request_certificate(
    api: &dyn EdgeApi,
    zone_id: &ZoneId,
    request: &IssuanceRequest,
) -> Result<RequestOutcome, EdgeApiError> {
    let payload = build_payload(request);
    debug!(
        payload = %serde_json::to_string(&payload).unwrap_or_default(),
        "Submitting custom hostname request"
    );

    let response = api.create_custom_hostname(zone_id.as_str(), &payload).await?;

    Ok(RequestOutcome {
        success: response.success,
        errors: response.errors,
        custom_hostname_id: response.result.and_then(|r| r.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{CreateCustomHostnameResponse, ValidationMethod};
    use crate::testing::{fixtures, EdgeOperation, MockEdgeApi, RecordedEdgeCall};

    #[test]
    fn test_payload_always_dv_without_origin() {
        let request = IssuanceRequest::new("shop.example.com").unwrap();
        let payload = build_payload(&request);

        assert_eq!(payload.hostname, "shop.example.com");
        assert_eq!(payload.ssl.method, ValidationMethod::Http);
        assert_eq!(payload.ssl.certificate_type, CertificateType::Dv);
        assert!(payload.custom_origin_server.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["ssl"]["type"], "dv");
        assert!(json.get("custom_origin_server").is_none());
    }

    #[test]
    fn test_payload_with_origin_and_method() {
        let request = IssuanceRequest::new("shop.example.com")
            .unwrap()
            .with_validation_method(ValidationMethod::Txt)
            .with_custom_origin_server("origin.saasprovider.com")
            .unwrap();
        let payload = build_payload(&request);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["ssl"]["type"], "dv");
        assert_eq!(json["ssl"]["method"], "txt");
        assert_eq!(json["custom_origin_server"], "origin.saasprovider.com");
    }

    #[test]
    fn test_outcome_display_is_boolean_string() {
        let outcome = RequestOutcome {
            success: false,
            errors: vec![],
            custom_hostname_id: None,
        };
        assert_eq!(outcome.to_string(), "false");
    }

    #[tokio::test]
    async fn test_request_targets_zone() {
        let api = MockEdgeApi::new();
        let request = fixtures::issuance_request("shop.example.com");

        let outcome = request_certificate(&api, &ZoneId::new("Z123"), &request)
            .await
            .unwrap();
        assert!(outcome.success);

        let calls = api.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            RecordedEdgeCall::CreateCustomHostname { zone_id, request } => {
                assert_eq!(zone_id, "Z123");
                assert_eq!(request.hostname, "shop.example.com");
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_reports_api_rejection() {
        let api = MockEdgeApi::new();
        api.set_create_response(CreateCustomHostnameResponse {
            success: false,
            errors: vec![ApiMessage {
                code: 1406,
                message: "Duplicate custom hostname found.".to_string(),
            }],
            result: None,
        })
        .await;

        let outcome = request_certificate(
            &api,
            &ZoneId::new("Z123"),
            &fixtures::issuance_request("shop.example.com"),
        )
        .await
        .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.errors[0].code, 1406);
        assert_eq!(outcome.to_string(), "false");
    }

    #[tokio::test]
    async fn test_request_is_not_retried_on_failure() {
        let api = MockEdgeApi::new();
        api.fail_next(
            EdgeOperation::CreateCustomHostname,
            EdgeApiError::Parse("truncated body".to_string()),
        )
        .await;

        let result = request_certificate(
            &api,
            &ZoneId::new("Z123"),
            &fixtures::issuance_request("shop.example.com"),
        )
        .await;
        assert!(matches!(result, Err(EdgeApiError::Parse(_))));
        assert_eq!(api.call_count().await, 1);
    }
}
