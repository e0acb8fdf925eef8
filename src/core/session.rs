//! Live session ownership and disposal
//!
//! [`SessionStore`] owns the "current patient": the record being filled in
//! by the intake and capture steps. After a confirmed transmission the
//! coordinator schedules its disposal; the timer is cancellable and only
//! ever clears the session generation it was scheduled for.

use crate::domain::{
    BasicInfoUpdate, PatientId, Quality, SessionRecord, TestKind, TestResultUpdate,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Transmission progress of the live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransmissionStatus {
    #[default]
    Idle,
    Transmitting,
    /// Delivered; the session is waiting for disposal
    Complete,
}

#[derive(Default)]
struct SessionState {
    record: SessionRecord,
    generation: u64,
    status: TransmissionStatus,
    disposal: Option<JoinHandle<()>>,
}

impl SessionState {
    fn cancel_disposal(&mut self) -> bool {
        match self.disposal.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

/// Shared handle to the live session
///
/// Cloning is cheap; all clones see the same session.
#[derive(Clone, Default)]
pub struct SessionStore {
    state: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    /// An empty store with no active patient
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Generate a de-identified temporary patient code
    pub fn generate_patient_id() -> PatientId {
        PatientId::generate()
    }

    /// Begin a new patient session
    ///
    /// Any pending disposal is cancelled and the previous session's data is
    /// wiped before the new record is created.
    pub fn start_new_patient(&self) -> PatientId {
        let mut state = self.lock();
        if state.cancel_disposal() {
            tracing::debug!("Cancelled pending disposal for previous session");
        }
        state.record.clear();
        state.generation += 1;
        state.status = TransmissionStatus::Idle;
        state.record = SessionRecord::start_new();

        let patient_id = state
            .record
            .patient_id
            .clone()
            .unwrap_or_else(PatientId::generate);
        tracing::info!(patient_id = %patient_id, generation = state.generation, "New patient session started");
        patient_id
    }

    /// Make an existing record the live session, starting a new generation
    pub fn restore(&self, record: SessionRecord) {
        let mut state = self.lock();
        state.cancel_disposal();
        state.record.clear();
        state.generation += 1;
        state.status = TransmissionStatus::Idle;
        state.record = record;
    }

    pub fn update_basic_info(&self, update: BasicInfoUpdate) {
        self.lock().record.update_basic_info(update);
    }

    /// Returns false if the symptom was already present
    pub fn add_symptom(&self, symptom: impl Into<String>) -> bool {
        self.lock().record.add_symptom(symptom)
    }

    /// Returns false if the symptom was not present
    pub fn remove_symptom(&self, symptom: &str) -> bool {
        self.lock().record.remove_symptom(symptom)
    }

    pub fn update_test_result(&self, kind: TestKind, update: TestResultUpdate) {
        self.lock().record.update_test_result(kind, update);
    }

    pub fn set_test_quality(&self, kind: TestKind, quality: Quality) {
        self.lock().record.set_test_quality(kind, quality);
    }

    pub fn is_basic_info_complete(&self) -> bool {
        self.lock().record.is_basic_info_complete()
    }

    pub fn is_all_tests_complete(&self) -> bool {
        self.lock().record.is_all_tests_complete()
    }

    pub fn can_proceed_to_test(&self) -> bool {
        self.lock().record.can_proceed_to_test()
    }

    /// All tests passed and no transmission is in flight
    pub fn can_transmit(&self) -> bool {
        let state = self.lock();
        state.record.is_all_tests_complete() && state.status != TransmissionStatus::Transmitting
    }

    pub fn transmission_status(&self) -> TransmissionStatus {
        self.lock().status
    }

    pub fn patient_id(&self) -> Option<PatientId> {
        self.lock().record.patient_id.clone()
    }

    /// Current generation; bumped by every [`SessionStore::start_new_patient`]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Copy of the current record together with its generation
    pub fn snapshot(&self) -> (u64, SessionRecord) {
        let state = self.lock();
        (state.generation, state.record.clone())
    }

    pub fn is_cleared(&self) -> bool {
        self.lock().record.is_cleared()
    }

    pub fn has_pending_disposal(&self) -> bool {
        self.lock()
            .disposal
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Mark `generation` as transmitting; false if the session moved on
    pub(crate) fn mark_transmitting(&self, generation: u64) -> bool {
        self.set_status_for(generation, TransmissionStatus::Transmitting)
    }

    pub(crate) fn mark_transmitted(&self, generation: u64) -> bool {
        self.set_status_for(generation, TransmissionStatus::Complete)
    }

    pub(crate) fn mark_transmission_failed(&self, generation: u64) -> bool {
        self.set_status_for(generation, TransmissionStatus::Idle)
    }

    fn set_status_for(&self, generation: u64, status: TransmissionStatus) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        state.status = status;
        true
    }

    /// Clear the session immediately and cancel any pending disposal
    pub fn clear_session_data(&self) {
        let mut state = self.lock();
        state.cancel_disposal();
        state.record.clear();
        state.status = TransmissionStatus::Idle;
        tracing::debug!(generation = state.generation, "Session data cleared");
    }

    /// Clear the current session after `grace`
    ///
    /// Replaces any previously scheduled disposal. If the session has moved
    /// to a new generation by the time the timer fires, nothing is cleared.
    /// Must be called from within a tokio runtime.
    pub fn schedule_disposal(&self, grace: Duration) {
        let generation = self.generation();
        self.schedule_disposal_for(generation, grace);
    }

    /// Clear the session of `generation` after `grace`
    ///
    /// Returns false and arms nothing when `generation` is no longer the
    /// live session, so a record reset mid-send is never disposed.
    pub fn schedule_disposal_for(&self, generation: u64, grace: Duration) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(
                scheduled = generation,
                current = state.generation,
                "Not scheduling disposal for superseded session"
            );
            return false;
        }
        state.cancel_disposal();

        let shared = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;

            let mut state = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.generation != generation {
                tracing::debug!(
                    scheduled = generation,
                    current = state.generation,
                    "Skipping disposal for superseded session"
                );
                return;
            }
            state.record.clear();
            state.status = TransmissionStatus::Idle;
            state.disposal = None;
            tracing::info!(generation, "Transmitted session disposed");
        });
        state.disposal = Some(handle);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AgeGroup, CaptureHandle, Gender};

    const GRACE: Duration = Duration::from_millis(3000);

    fn filled_store() -> SessionStore {
        let store = SessionStore::new();
        store.start_new_patient();
        store.update_basic_info(BasicInfoUpdate {
            nickname: Some("KHJ".to_string()),
            gender: Some(Gender::Female),
            age_group: Some(AgeGroup::Forties),
        });
        for kind in TestKind::ALL {
            store.update_test_result(
                kind,
                TestResultUpdate {
                    raw_capture: Some(CaptureHandle::new(format!("blob:{kind}"))),
                    quality: Some(Quality::Ok),
                    ai_data: None,
                },
            );
        }
        store
    }

    #[test]
    fn test_start_new_patient_resets_state() {
        let store = filled_store();
        let first_generation = store.generation();
        let first_id = store.patient_id().unwrap();

        let second_id = store.start_new_patient();
        assert_ne!(first_id, second_id);
        assert_eq!(store.generation(), first_generation + 1);
        assert!(!store.is_basic_info_complete());
        assert!(!store.is_all_tests_complete());
        assert_eq!(store.transmission_status(), TransmissionStatus::Idle);
    }

    #[test]
    fn test_readiness_queries() {
        let store = SessionStore::new();
        assert!(!store.can_proceed_to_test());

        store.start_new_patient();
        assert!(!store.can_proceed_to_test());
        store.update_basic_info(BasicInfoUpdate {
            nickname: Some("PJ".to_string()),
            gender: Some(Gender::Male),
            age_group: Some(AgeGroup::SixtiesPlus),
        });
        assert!(store.can_proceed_to_test());
        assert!(!store.can_transmit());

        for kind in TestKind::ALL {
            store.set_test_quality(kind, Quality::Ok);
        }
        assert!(store.can_transmit());

        let generation = store.generation();
        assert!(store.mark_transmitting(generation));
        assert!(!store.can_transmit());
    }

    #[test]
    fn test_symptoms_are_unique() {
        let store = SessionStore::new();
        store.start_new_patient();
        assert!(store.add_symptom("headache"));
        assert!(!store.add_symptom("headache"));
        assert!(store.remove_symptom("headache"));
        assert!(!store.remove_symptom("headache"));
    }

    #[test]
    fn test_stale_generation_status_ignored() {
        let store = filled_store();
        let old = store.generation();
        store.start_new_patient();
        assert!(!store.mark_transmitted(old));
        assert_eq!(store.transmission_status(), TransmissionStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disposal_after_grace_period() {
        let store = filled_store();
        store.schedule_disposal(GRACE);
        assert!(store.has_pending_disposal());

        tokio::time::sleep(GRACE - Duration::from_millis(1)).await;
        assert!(!store.is_cleared());

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert!(store.is_cleared());
        assert!(!store.has_pending_disposal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_pending_disposal() {
        let store = filled_store();
        store.schedule_disposal(GRACE);
        store.clear_session_data();
        assert!(store.is_cleared());
        assert!(!store.has_pending_disposal());

        let new_id = store.start_new_patient();
        tokio::time::sleep(GRACE * 2).await;
        tokio::task::yield_now().await;
        assert_eq!(store.patient_id(), Some(new_id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_patient_survives_old_timer() {
        let store = filled_store();
        store.schedule_disposal(GRACE);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let new_id = store.start_new_patient();

        tokio::time::sleep(GRACE * 2).await;
        tokio::task::yield_now().await;
        assert_eq!(store.patient_id(), Some(new_id));
        assert!(!store.is_cleared());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disposal_for_stale_generation_is_not_armed() {
        let store = filled_store();
        let submitted = store.generation();
        let new_id = store.start_new_patient();

        assert!(!store.schedule_disposal_for(submitted, GRACE));
        assert!(!store.has_pending_disposal());

        tokio::time::sleep(GRACE * 2).await;
        tokio::task::yield_now().await;
        assert_eq!(store.patient_id(), Some(new_id));
        assert!(!store.is_cleared());
    }
}
