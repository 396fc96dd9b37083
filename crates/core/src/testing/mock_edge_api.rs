//! Mock edge API for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::edge::{
    CreateCustomHostnameResponse, CustomHostname, CustomHostnameRequest, CustomHostnameSsl,
    EdgeApi, EdgeApiError, Zone,
};

/// Edge operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeOperation {
    ListZones,
    CreateCustomHostname,
    GetCustomHostnames,
}

/// A recorded edge call for test assertions.
#[derive(Debug, Clone)]
pub enum RecordedEdgeCall {
    ListZones,
    CreateCustomHostname {
        zone_id: String,
        request: CustomHostnameRequest,
    },
    GetCustomHostnames {
        zone_id: String,
        hostname: String,
    },
}

/// Mock implementation of the EdgeApi trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable zone listing and creation response
/// - Script the status sequence seen by successive status queries
/// - Delay individual status replies to simulate overlapping polls
/// - Track calls for assertions
/// - Simulate failures per operation
///
/// Status replies are consumed in order when the query is made; once the
/// script runs out the last entry is repeated. A `None` entry yields an
/// empty result.
///
/// # Example
///
/// ```rust,ignore
/// use edgecert_core::testing::{MockEdgeApi, fixtures};
///
/// let api = MockEdgeApi::new();
/// api.set_zones(vec![fixtures::zone("Z123", "sb.example.net")]).await;
/// api.set_statuses(vec!["pending_validation", "active"]).await;
/// ```
#[derive(Debug)]
pub struct MockEdgeApi {
    /// Zones returned by the listing.
    zones: Arc<RwLock<Vec<Zone>>>,
    /// Response to custom hostname creation.
    create_response: Arc<RwLock<CreateCustomHostnameResponse>>,
    /// Scripted statuses for successive status queries.
    statuses: Arc<RwLock<VecDeque<Option<String>>>>,
    /// Last status handed out, repeated once the script is exhausted.
    last_status: Arc<RwLock<Option<String>>>,
    /// Per-query reply delays, consumed in order.
    status_latencies: Arc<RwLock<VecDeque<Duration>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedEdgeCall>>>,
    /// One-shot failures keyed by operation.
    next_errors: Arc<RwLock<HashMap<EdgeOperation, EdgeApiError>>>,
}

impl Default for MockEdgeApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEdgeApi {
    /// Create a mock with no zones, a successful creation response and no
    /// scripted statuses.
    pub fn new() -> Self {
        Self {
            zones: Arc::new(RwLock::new(Vec::new())),
            create_response: Arc::new(RwLock::new(CreateCustomHostnameResponse {
                success: true,
                errors: Vec::new(),
                result: None,
            })),
            statuses: Arc::new(RwLock::new(VecDeque::new())),
            last_status: Arc::new(RwLock::new(None)),
            status_latencies: Arc::new(RwLock::new(VecDeque::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_errors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // =========================================================================
    // Zones
    // =========================================================================

    /// Replace the zone listing.
    pub async fn set_zones(&self, zones: Vec<Zone>) {
        *self.zones.write().await = zones;
    }

    // =========================================================================
    // Custom Hostnames
    // =========================================================================

    /// Set the response returned by custom hostname creation.
    pub async fn set_create_response(&self, response: CreateCustomHostnameResponse) {
        *self.create_response.write().await = response;
    }

    /// Replace the scripted status sequence.
    pub async fn set_statuses(&self, statuses: Vec<&str>) {
        let mut queue = self.statuses.write().await;
        queue.clear();
        queue.extend(statuses.into_iter().map(|s| Some(s.to_string())));
    }

    /// Append one status to the script.
    pub async fn push_status(&self, status: &str) {
        self.statuses
            .write()
            .await
            .push_back(Some(status.to_string()));
    }

    /// Append a query that finds no custom hostname record.
    pub async fn push_missing_record(&self) {
        self.statuses.write().await.push_back(None);
    }

    /// Queue a reply delay; delays apply to successive status queries in order.
    pub async fn push_status_latency(&self, latency: Duration) {
        self.status_latencies.write().await.push_back(latency);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedEdgeCall> {
        self.calls.read().await.clone()
    }

    /// Get the number of calls performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Get the number of status queries performed.
    pub async fn status_query_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| matches!(call, RecordedEdgeCall::GetCustomHostnames { .. }))
            .count()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next call of `operation` to fail with the given error.
    pub async fn fail_next(&self, operation: EdgeOperation, error: EdgeApiError) {
        self.next_errors.write().await.insert(operation, error);
    }

    async fn take_error(&self, operation: EdgeOperation) -> Option<EdgeApiError> {
        self.next_errors.write().await.remove(&operation)
    }

    async fn record(&self, call: RecordedEdgeCall) {
        self.calls.write().await.push(call);
    }

    async fn next_status(&self) -> Option<String> {
        let mut last = self.last_status.write().await;
        if let Some(next) = self.statuses.write().await.pop_front() {
            *last = next;
        }
        last.clone()
    }
}

#[async_trait]
impl EdgeApi for MockEdgeApi {
    async fn list_zones(&self) -> Result<Vec<Zone>, EdgeApiError> {
        self.record(RecordedEdgeCall::ListZones).await;

        if let Some(err) = self.take_error(EdgeOperation::ListZones).await {
            return Err(err);
        }

        Ok(self.zones.read().await.clone())
    }

    async fn create_custom_hostname(
        &self,
        zone_id: &str,
        request: &CustomHostnameRequest,
    ) -> Result<CreateCustomHostnameResponse, EdgeApiError> {
        self.record(RecordedEdgeCall::CreateCustomHostname {
            zone_id: zone_id.to_string(),
            request: request.clone(),
        })
        .await;

        if let Some(err) = self.take_error(EdgeOperation::CreateCustomHostname).await {
            return Err(err);
        }

        Ok(self.create_response.read().await.clone())
    }

    async fn get_custom_hostnames(
        &self,
        zone_id: &str,
        hostname: &str,
    ) -> Result<Vec<CustomHostname>, EdgeApiError> {
        self.record(RecordedEdgeCall::GetCustomHostnames {
            zone_id: zone_id.to_string(),
            hostname: hostname.to_string(),
        })
        .await;

        if let Some(err) = self.take_error(EdgeOperation::GetCustomHostnames).await {
            return Err(err);
        }

        let status = self.next_status().await;
        let latency = self.status_latencies.write().await.pop_front();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        Ok(status
            .map(|status| {
                vec![CustomHostname {
                    id: Some(format!("ch-{}", hostname)),
                    hostname: Some(hostname.to_string()),
                    ssl: CustomHostnameSsl {
                        status,
                        ..Default::default()
                    },
                }]
            })
            .unwrap_or_default())
    }
}
