//! Integration tests for graceful shutdown of the periodic queue drain
//!
//! These tests verify that:
//! - The periodic drain runs immediately and then stops on the shutdown signal
//! - A shutdown signalled before the first tick prevents any drain
//! - Queued records are kept when the drain stops

use async_trait::async_trait;
use quickscan::adapters::dashboard::{TransmissionAck, TransmissionMetadata, Transport};
use quickscan::adapters::storage::{MemoryStorage, Storage};
use quickscan::config::QuickScanConfig;
use quickscan::core::session::SessionStore;
use quickscan::core::transmission::TransmissionCoordinator;
use quickscan::domain::{
    AgeGroup, BasicInfoUpdate, CaptureHandle, EncryptedPayload, Gender, Quality, TestKind,
    TestResultUpdate, TransportError,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Transport whose connectivity is toggled by the test
#[derive(Default)]
struct SwitchableTransport {
    online: AtomicBool,
    delivered: AtomicUsize,
}

#[async_trait]
impl Transport for SwitchableTransport {
    async fn send(
        &self,
        _payload: &EncryptedPayload,
        _metadata: &TransmissionMetadata,
    ) -> Result<TransmissionAck, TransportError> {
        if self.online.load(Ordering::SeqCst) {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(TransmissionAck::default())
        } else {
            Err(TransportError::Unreachable("network down".to_string()))
        }
    }

    async fn check_connection(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn endpoint(&self) -> &str {
        "switchable://dashboard"
    }
}

async fn coordinator_with_one_queued_record(
    transport: Arc<SwitchableTransport>,
) -> Arc<TransmissionCoordinator> {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let coordinator =
        TransmissionCoordinator::with_storage(&QuickScanConfig::default(), storage, transport)
            .await
            .unwrap();

    let session = SessionStore::new();
    session.start_new_patient();
    session.update_basic_info(BasicInfoUpdate {
        nickname: Some("LMK".to_string()),
        gender: Some(Gender::Female),
        age_group: Some(AgeGroup::Twenties),
    });
    for kind in TestKind::ALL {
        session.update_test_result(
            kind,
            TestResultUpdate {
                raw_capture: Some(CaptureHandle::new(format!("blob:{kind}"))),
                quality: Some(Quality::Ok),
                ai_data: None,
            },
        );
    }

    let outcome = coordinator.submit(&session).await.unwrap();
    assert!(outcome.is_queued());
    Arc::new(coordinator)
}

#[tokio::test]
async fn test_shutdown_signal_channel_creation() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    assert!(!*shutdown_rx.borrow());
    shutdown_tx.send(true).unwrap();
    assert!(*shutdown_rx.borrow());
}

#[tokio::test]
async fn test_periodic_drain_runs_then_stops_on_shutdown() {
    let transport = Arc::new(SwitchableTransport::default());
    let coordinator = coordinator_with_one_queued_record(Arc::clone(&transport)).await;
    transport.online.store(true, Ordering::SeqCst);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = Arc::clone(&coordinator)
        .spawn_periodic_drain(Duration::from_secs(3600), shutdown_rx);

    // First tick fires immediately
    tokio::time::timeout(Duration::from_secs(5), async {
        while coordinator.queue_status().await.pending() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("queue was not drained");
    assert_eq!(transport.delivered.load(Ordering::SeqCst), 1);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("drain task did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_before_first_tick_skips_drain() {
    let transport = Arc::new(SwitchableTransport::default());
    let coordinator = coordinator_with_one_queued_record(Arc::clone(&transport)).await;
    transport.online.store(true, Ordering::SeqCst);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();

    let handle = Arc::clone(&coordinator)
        .spawn_periodic_drain(Duration::from_secs(3600), shutdown_rx);
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("drain task did not stop")
        .unwrap();

    assert_eq!(transport.delivered.load(Ordering::SeqCst), 0);
    assert_eq!(coordinator.queue_status().await.pending(), 1);
}

#[tokio::test]
async fn test_records_stay_queued_while_offline() {
    let transport = Arc::new(SwitchableTransport::default());
    let coordinator = coordinator_with_one_queued_record(Arc::clone(&transport)).await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = Arc::clone(&coordinator)
        .spawn_periodic_drain(Duration::from_secs(3600), shutdown_rx);

    tokio::time::timeout(Duration::from_secs(5), async {
        while coordinator.queue_status().await.items[0].retry_count == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("drain did not run");

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("drain task did not stop")
        .unwrap();

    let status = coordinator.queue_status().await;
    assert_eq!(status.pending(), 1);
    assert_eq!(status.items[0].retry_count, 1);
    assert!(!coordinator.check_connection().await);
}
