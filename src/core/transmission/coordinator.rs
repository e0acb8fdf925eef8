//! Transmission coordinator - orchestrates delivery of session records
//!
//! Live submissions go validate -> encode -> send. A confirmed delivery
//! schedules disposal of the session; a transport failure puts a snapshot on
//! the offline queue. Queue drains reuse the encode -> send path without
//! re-validating.

use super::outcome::{QueueStatus, QueuedItem, SubmissionOutcome, SubmissionState};
use crate::adapters::dashboard::{
    DeviceIdentity, HttpTransport, TransmissionAck, TransmissionMetadata, Transport,
};
use crate::adapters::storage::{FileStorage, Storage};
use crate::config::QuickScanConfig;
use crate::core::encryption::{encoder_from_config, PayloadEncoder};
use crate::core::queue::{DrainReport, OfflineQueue, RecordSender, QUEUE_KEY};
use crate::core::session::SessionStore;
use crate::core::validation::validate;
use crate::domain::{QuickScanError, Result, SessionRecord, ValidationError};
use crate::log_submission_queued;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Transmission coordinator
///
/// The queue lives behind the coordinator's operation lock, so a submission
/// and a drain never run at the same time.
pub struct TransmissionCoordinator {
    transport: Arc<dyn Transport>,
    encoder: Arc<dyn PayloadEncoder>,
    device: Arc<DeviceIdentity>,
    queue: Mutex<OfflineQueue>,
    state: watch::Sender<SubmissionState>,
    grace_period: Duration,
    app_version: String,
}

impl TransmissionCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        encoder: Arc<dyn PayloadEncoder>,
        device: Arc<DeviceIdentity>,
        queue: OfflineQueue,
        grace_period: Duration,
        app_version: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            transport,
            encoder,
            device,
            queue: Mutex::new(queue),
            state,
            grace_period,
            app_version: app_version.into(),
        }
    }

    /// Wire up the file-backed queue, HTTP transport and encoder from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created, the HTTP
    /// client cannot be built, or the encoder is misconfigured.
    pub async fn from_config(config: &QuickScanConfig) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&config.queue.storage_path).await?);
        let transport = Arc::new(HttpTransport::new(&config.dashboard)?);
        Self::with_storage(config, storage, transport).await
    }

    /// Same as [`TransmissionCoordinator::from_config`] with injected storage and transport
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder is misconfigured.
    pub async fn with_storage(
        config: &QuickScanConfig,
        storage: Arc<dyn Storage>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let encoder = encoder_from_config(&config.encryption)?;
        let device = Arc::new(DeviceIdentity::new(Arc::clone(&storage)));
        let queue = OfflineQueue::open(
            storage,
            QUEUE_KEY,
            config.queue.max_retries,
            config.queue.drain_order,
        )
        .await;

        Ok(Self::new(
            transport,
            encoder,
            device,
            queue,
            Duration::from_millis(config.session.grace_period_ms),
            config.dashboard.app_version.clone(),
        ))
    }

    /// Current submission state
    pub fn state(&self) -> SubmissionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: SubmissionState) {
        self.state.send_replace(state);
    }

    /// Submit the live session
    ///
    /// # Errors
    ///
    /// - [`QuickScanError::Validation`] when the record is not ready; nothing
    ///   is sent and nothing is queued
    /// - Local failures (encoding, device identity) are returned as-is
    ///
    /// A transport failure is not an error: the record is queued and
    /// [`SubmissionOutcome::Queued`] is returned.
    pub async fn submit(&self, session: &SessionStore) -> Result<SubmissionOutcome> {
        let mut queue = self.queue.lock().await;

        self.set_state(SubmissionState::Validating);
        let (generation, record) = session.snapshot();
        if let Err(e) = validate(&record) {
            tracing::warn!(patient_id = %record.patient_label(), error = %e, "Session record failed validation");
            self.set_state(SubmissionState::Idle);
            return Err(e.into());
        }
        let patient_id = record
            .patient_id
            .clone()
            .ok_or(ValidationError::MissingField("patientId"))?;

        session.mark_transmitting(generation);
        match self.attempt_send(&record).await {
            Ok(ack) => {
                if session.mark_transmitted(generation) {
                    session.schedule_disposal_for(generation, self.grace_period);
                } else {
                    tracing::debug!(
                        patient_id = %patient_id,
                        "Session was reset during send, leaving the new session untouched"
                    );
                }
                self.set_state(SubmissionState::Succeeded);
                tracing::info!(
                    patient_id = %patient_id,
                    transmission_id = ack.transmission_id.as_deref().unwrap_or("-"),
                    grace_ms = self.grace_period.as_millis() as u64,
                    "Session record transmitted, disposal scheduled"
                );
                Ok(SubmissionOutcome::Succeeded { patient_id, ack })
            }
            Err(e) if e.is_recoverable() => {
                session.mark_transmission_failed(generation);
                let entry_id = queue.enqueue(record).await;
                let pending = queue.len();
                log_submission_queued!(patient_id, e, pending);
                self.set_state(SubmissionState::Queued);
                Ok(SubmissionOutcome::Queued {
                    patient_id,
                    entry_id,
                    reason: e.to_string(),
                    pending,
                    persisted: queue.is_persisted(),
                })
            }
            Err(e) => {
                session.mark_transmission_failed(generation);
                self.set_state(SubmissionState::Idle);
                Err(e)
            }
        }
    }

    /// Encode and send one record, without validation or queueing
    ///
    /// # Errors
    ///
    /// Transport failures come back as [`QuickScanError::Transport`].
    pub async fn attempt_send(&self, record: &SessionRecord) -> Result<TransmissionAck> {
        self.set_state(SubmissionState::Encoding);
        let payload = self.encoder.encode(record)?;
        let metadata = TransmissionMetadata::now(self.device.get().await?, &self.app_version);

        self.set_state(SubmissionState::Sending);
        let ack = self.transport.send(&payload, &metadata).await?;
        Ok(ack)
    }

    /// Re-send every queued record once
    pub async fn drain_queue(&self) -> DrainReport {
        let mut queue = self.queue.lock().await;
        let report = queue.drain(&Resend(self)).await;
        self.set_state(SubmissionState::Idle);
        report
    }

    /// Whether the dashboard's health endpoint answers
    pub async fn check_connection(&self) -> bool {
        self.transport.check_connection().await
    }

    pub async fn queue_status(&self) -> QueueStatus {
        let queue = self.queue.lock().await;
        QueueStatus {
            items: queue
                .entries()
                .iter()
                .map(|entry| QueuedItem {
                    entry_id: entry.entry_id,
                    patient_id: entry.patient_label().to_string(),
                    enqueued_at: entry.enqueued_at,
                    retry_count: entry.retry_count,
                })
                .collect(),
            max_retries: queue.max_retries(),
            persisted: queue.is_persisted(),
        }
    }

    /// Drain the queue every `interval` until `shutdown` turns true
    ///
    /// The first drain runs immediately.
    pub fn spawn_periodic_drain(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if *shutdown.borrow() {
                            break;
                        }
                        let report = self.drain_queue().await;
                        if report.remaining > 0 || !report.dropped.is_empty() {
                            tracing::warn!(
                                remaining = report.remaining,
                                dropped = report.dropped.len(),
                                "Periodic drain left records behind"
                            );
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Periodic queue drain stopped");
        })
    }
}

struct Resend<'a>(&'a TransmissionCoordinator);

#[async_trait]
impl RecordSender for Resend<'_> {
    async fn send_record(&self, record: &SessionRecord) -> std::result::Result<(), QuickScanError> {
        self.0.attempt_send(record).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use crate::config::DrainOrder;
    use crate::core::encryption::Base64Encoder;
    use crate::core::queue::DEFAULT_MAX_RETRIES;
    use crate::core::session::TransmissionStatus;
    use crate::domain::{
        AgeGroup, BasicInfoUpdate, EncryptedPayload, Gender, Quality, TestKind, TransportError,
    };
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeTransport {
        offline: AtomicBool,
        sends: AtomicUsize,
        // Operator starts the next patient while the send is in flight
        reset_during_send: std::sync::Mutex<Option<SessionStore>>,
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(
            &self,
            payload: &EncryptedPayload,
            metadata: &TransmissionMetadata,
        ) -> std::result::Result<TransmissionAck, TransportError> {
            assert_eq!(payload.algorithm, "simulation-base64");
            assert!(metadata.device_id.as_str().starts_with("DEVICE_"));
            self.sends.fetch_add(1, Ordering::SeqCst);
            if let Some(session) = self.reset_during_send.lock().unwrap().take() {
                session.start_new_patient();
            }
            if self.offline.load(Ordering::SeqCst) {
                return Err(TransportError::Unreachable("connection refused".to_string()));
            }
            Ok(TransmissionAck {
                transmission_id: Some(format!("tx-{}", self.sends.load(Ordering::SeqCst))),
                timestamp: None,
            })
        }

        async fn check_connection(&self) -> bool {
            !self.offline.load(Ordering::SeqCst)
        }

        fn endpoint(&self) -> &str {
            "fake://dashboard"
        }
    }

    async fn coordinator(transport: Arc<FakeTransport>) -> TransmissionCoordinator {
        let storage = Arc::new(MemoryStorage::new());
        let queue = OfflineQueue::open(
            storage.clone(),
            QUEUE_KEY,
            DEFAULT_MAX_RETRIES,
            DrainOrder::NewestFirst,
        )
        .await;
        TransmissionCoordinator::new(
            transport,
            Arc::new(Base64Encoder),
            Arc::new(DeviceIdentity::new(storage)),
            queue,
            Duration::from_millis(3000),
            "1.0.0",
        )
    }

    fn ready_session() -> SessionStore {
        let session = SessionStore::new();
        session.start_new_patient();
        session.update_basic_info(BasicInfoUpdate {
            nickname: Some("KHJ".to_string()),
            gender: Some(Gender::Female),
            age_group: Some(AgeGroup::Forties),
        });
        for kind in TestKind::ALL {
            session.set_test_quality(kind, Quality::Ok);
        }
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_success_disposes_after_grace() {
        let transport = Arc::new(FakeTransport::default());
        let coordinator = coordinator(transport.clone()).await;
        let session = ready_session();

        let outcome = coordinator.submit(&session).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Succeeded { .. }));
        assert_eq!(coordinator.state(), SubmissionState::Succeeded);
        assert_eq!(session.transmission_status(), TransmissionStatus::Complete);
        assert_eq!(transport.sends.load(Ordering::SeqCst), 1);
        assert!(!session.is_cleared());

        tokio::time::sleep(Duration::from_millis(3001)).await;
        tokio::task::yield_now().await;
        assert!(session.is_cleared());
        assert_eq!(coordinator.queue_status().await.pending(), 0);
    }

    #[tokio::test]
    async fn test_submit_incomplete_voice_is_rejected() {
        let transport = Arc::new(FakeTransport::default());
        let coordinator = coordinator(transport.clone()).await;
        let session = ready_session();
        session.set_test_quality(TestKind::Voice, Quality::Retry);

        let err = coordinator.submit(&session).await.unwrap_err();
        assert!(matches!(
            err,
            QuickScanError::Validation(ValidationError::IncompleteTest(TestKind::Voice))
        ));
        assert_eq!(transport.sends.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.queue_status().await.pending(), 0);
        assert!(!session.has_pending_disposal());
        assert_eq!(coordinator.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_submit_offline_queues_then_drains() {
        let transport = Arc::new(FakeTransport::default());
        transport.offline.store(true, Ordering::SeqCst);
        let coordinator = coordinator(transport.clone()).await;
        let session = ready_session();
        let patient_id = session.patient_id().unwrap();

        let outcome = coordinator.submit(&session).await.unwrap();
        match &outcome {
            SubmissionOutcome::Queued { pending, persisted, reason, .. } => {
                assert_eq!(*pending, 1);
                assert!(*persisted);
                assert!(reason.contains("connection refused"));
            }
            other => panic!("expected queued outcome, got {other:?}"),
        }
        assert_eq!(outcome.patient_id(), &patient_id);
        assert_eq!(session.transmission_status(), TransmissionStatus::Idle);
        assert!(!session.has_pending_disposal());

        transport.offline.store(false, Ordering::SeqCst);
        let report = coordinator.drain_queue().await;
        assert_eq!(report.transmitted, 1);
        assert_eq!(report.remaining, 0);
        assert_eq!(transport.sends.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_check_connection_passthrough() {
        let transport = Arc::new(FakeTransport::default());
        let coordinator = coordinator(transport.clone()).await;
        assert!(coordinator.check_connection().await);
        transport.offline.store(true, Ordering::SeqCst);
        assert!(!coordinator.check_connection().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_drain_stops_on_shutdown() {
        let transport = Arc::new(FakeTransport::default());
        transport.offline.store(true, Ordering::SeqCst);
        let coordinator = Arc::new(coordinator(transport.clone()).await);
        coordinator.submit(&ready_session()).await.unwrap();
        transport.offline.store(false, Ordering::SeqCst);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = Arc::clone(&coordinator).spawn_periodic_drain(Duration::from_secs(60), shutdown_rx);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(coordinator.queue_status().await.pending(), 0);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_started_during_send_is_not_disposed() {
        let transport = Arc::new(FakeTransport::default());
        let coordinator = coordinator(transport.clone()).await;
        let session = ready_session();
        let submitted_id = session.patient_id().unwrap();
        *transport.reset_during_send.lock().unwrap() = Some(session.clone());

        let outcome = coordinator.submit(&session).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Succeeded { .. }));
        assert_eq!(outcome.patient_id(), &submitted_id);

        let new_id = session.patient_id().unwrap();
        assert_ne!(new_id, submitted_id);
        assert!(!session.has_pending_disposal());
        assert_eq!(session.transmission_status(), TransmissionStatus::Idle);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        tokio::task::yield_now().await;
        assert_eq!(session.patient_id(), Some(new_id));
        assert!(!session.is_cleared());
    }
}
