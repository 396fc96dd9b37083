//! Recurring certificate status poller.
//!
//! Ticks every [`POLL_INTERVAL`], starting one full interval after the poller
//! is started. Each tick spawns its own status query, so a slow reply never
//! delays the next tick; responses are interpreted in whatever order they
//! arrive. There is no poll limit: the loop runs until the interpreter sees
//! `active` and cancels it (or the process exits).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::edge::EdgeApi;

use super::interpreter::StatusInterpreter;
use super::types::{IssuanceSession, StatusReport};

/// Fixed delay between status queries.
pub const POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Callback invoked with every interpreted status report, in arrival order.
pub type StatusUpdateCallback = Arc<dyn Fn(&StatusReport) + Send + Sync>;

/// Cancel side of a [`PollingHandle`]. Cheap to clone; every clone cancels
/// the same poller.
#[derive(Debug, Clone)]
pub struct PollCancellation {
    cancelled: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Default for PollCancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl PollCancellation {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Stop the poller. Returns `true` only for the call that actually
    /// cancelled; later calls do nothing and return `false`.
    pub fn cancel(&self) -> bool {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        // No receiver means the loop already exited.
        let _ = self.shutdown_tx.send(());
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }
}

/// Everything a single tick needs to query and interpret one status.
struct PollContext {
    api: Arc<dyn EdgeApi>,
    session: IssuanceSession,
    interpreter: StatusInterpreter,
    cancellation: PollCancellation,
    update_callback: Option<StatusUpdateCallback>,
}

impl PollContext {
    /// One status query. Failures are logged and polling carries on.
    async fn poll_once(&self) {
        let hostname = self.session.request.customer_hostname();
        let zone_id = self.session.zone_id.as_str();

        let records = match self.api.get_custom_hostnames(zone_id, hostname).await {
            Ok(records) => records,
            Err(e) => {
                warn!(hostname, "Status query failed: {}", e);
                return;
            }
        };

        let Some(record) = records.first() else {
            warn!(hostname, "Status query returned no custom hostname record");
            return;
        };

        let report = self.interpreter.observe(record, &self.cancellation);
        if let Some(callback) = &self.update_callback {
            callback(&report);
        }
    }
}

/// Cancellable handle on a running status poller.
pub struct PollingHandle {
    cancellation: PollCancellation,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Start polling the status of `session`'s hostname.
    pub fn start(
        api: Arc<dyn EdgeApi>,
        session: IssuanceSession,
        update_callback: Option<StatusUpdateCallback>,
    ) -> Self {
        let cancellation = PollCancellation::new();
        let mut shutdown_rx = cancellation.subscribe();

        let span = info_span!(
            "status_poller",
            invocation_id = %session.invocation_id,
            hostname = %session.request.customer_hostname(),
        );

        let context = Arc::new(PollContext {
            api,
            interpreter: StatusInterpreter::new(&session.request),
            session,
            cancellation: cancellation.clone(),
            update_callback,
        });

        let mut ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let task = tokio::spawn(
            async move {
                info!(
                    "Status poller started (every {}s)",
                    POLL_INTERVAL.as_secs()
                );
                let mut tick: u64 = 0;
                loop {
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            debug!("Status poller received cancellation");
                            break;
                        }
                        _ = ticker.tick() => {
                            if context.cancellation.is_cancelled() {
                                break;
                            }
                            tick += 1;
                            debug!(tick, "Polling certificate status");
                            let context = Arc::clone(&context);
                            tokio::spawn(
                                async move { context.poll_once().await }
                                    .in_current_span(),
                            );
                        }
                    }
                }
                info!(ticks = tick, "Status poller stopped");
            }
            .instrument(span),
        );

        Self { cancellation, task }
    }

    /// A cancel handle that can be passed around independently.
    pub fn cancellation(&self) -> PollCancellation {
        self.cancellation.clone()
    }

    /// Cancel polling. Returns `false` if it was already cancelled.
    pub fn cancel(&self) -> bool {
        self.cancellation.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Whether the polling loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the polling loop exits.
    ///
    /// Queries already in flight when the loop stops are not awaited.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            error!("Status poller task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuance::types::{CertificateStatus, ZoneId};
    use crate::testing::{fixtures, MockEdgeApi};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn session() -> IssuanceSession {
        IssuanceSession {
            invocation_id: Uuid::new_v4(),
            zone_id: ZoneId::new("Z123"),
            request: fixtures::issuance_request("shop.example.com"),
        }
    }

    fn collecting_callback() -> (StatusUpdateCallback, mpsc::UnboundedReceiver<StatusReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback: StatusUpdateCallback = Arc::new(move |report: &StatusReport| {
            let _ = tx.send(report.clone());
        });
        (callback, rx)
    }

    #[test]
    fn test_cancellation_is_single_shot() {
        let cancellation = PollCancellation::new();
        let clone = cancellation.clone();

        assert!(!cancellation.is_cancelled());
        assert!(clone.cancel());
        assert!(cancellation.is_cancelled());
        assert!(!cancellation.cancel());
        assert!(!clone.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_query_waits_one_interval() {
        let api = Arc::new(MockEdgeApi::new());
        api.set_statuses(vec!["pending_validation"]).await;
        let (callback, mut rx) = collecting_callback();

        let started = Instant::now();
        let handle = PollingHandle::start(api.clone(), session(), Some(callback));

        tokio::time::sleep(POLL_INTERVAL - Duration::from_secs(1)).await;
        assert_eq!(api.status_query_count().await, 0);

        let report = rx.recv().await.unwrap();
        assert!(started.elapsed() >= POLL_INTERVAL);
        assert_eq!(report.status, CertificateStatus::PendingValidation);

        handle.cancel();
        handle.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_keeps_polling_until_active() {
        let api = Arc::new(MockEdgeApi::new());
        api.set_statuses(vec![
            "pending_validation",
            "pending_issuance",
            "pending_deployment",
            "active",
        ])
        .await;
        let (callback, mut rx) = collecting_callback();

        let handle = PollingHandle::start(api.clone(), session(), Some(callback));
        handle.wait().await;

        let mut statuses = Vec::new();
        while let Ok(report) = rx.try_recv() {
            statuses.push(report.status);
        }
        assert_eq!(
            statuses,
            vec![
                CertificateStatus::PendingValidation,
                CertificateStatus::PendingIssuance,
                CertificateStatus::PendingDeployment,
                CertificateStatus::Active,
            ]
        );
        assert_eq!(api.status_query_count().await, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_keeps_polling() {
        let api = Arc::new(MockEdgeApi::new());
        api.set_statuses(vec!["revoked"]).await;
        let (callback, mut rx) = collecting_callback();

        let handle = PollingHandle::start(api.clone(), session(), Some(callback));

        for _ in 0..3 {
            let report = rx.recv().await.unwrap();
            assert!(report.message.contains("status unknown"));
        }
        assert!(!handle.is_cancelled());

        handle.cancel();
        handle.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_and_empty_results_do_not_stop_polling() {
        let api = Arc::new(MockEdgeApi::new());
        api.push_missing_record().await;
        api.push_status("active").await;
        api.fail_next(
            crate::testing::EdgeOperation::GetCustomHostnames,
            crate::edge::EdgeApiError::RateLimitExceeded,
        )
        .await;
        let (callback, mut rx) = collecting_callback();

        let handle = PollingHandle::start(api.clone(), session(), Some(callback));
        handle.wait().await;

        // tick 1 failed, tick 2 had no record, tick 3 saw active
        let report = rx.recv().await.unwrap();
        assert_eq!(report.status, CertificateStatus::Active);
        assert_eq!(api.status_query_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_queries_are_tolerated() {
        let api = Arc::new(MockEdgeApi::new());
        api.set_statuses(vec!["pending_validation", "active"]).await;
        // First reply is slower than two intervals.
        api.push_status_latency(POLL_INTERVAL * 3).await;
        let (callback, mut rx) = collecting_callback();

        let handle = PollingHandle::start(api.clone(), session(), Some(callback));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.status, CertificateStatus::Active);
        handle.wait().await;

        // The slow reply still arrives and is interpreted last.
        let late = rx.recv().await.unwrap();
        assert_eq!(late.status, CertificateStatus::PendingValidation);
        assert_eq!(api.status_query_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancel_stops_loop() {
        let api = Arc::new(MockEdgeApi::new());
        api.set_statuses(vec!["pending_issuance"]).await;

        let handle = PollingHandle::start(api.clone(), session(), None);
        let cancellation = handle.cancellation();
        assert!(cancellation.cancel());
        handle.wait().await;

        tokio::time::sleep(POLL_INTERVAL * 2).await;
        assert_eq!(api.status_query_count().await, 0);
    }
}
