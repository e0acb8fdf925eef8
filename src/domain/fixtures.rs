//! Shared record builders for unit tests

use crate::domain::session::{
    AgeGroup, BasicInfoUpdate, CaptureHandle, Gender, Quality, SessionRecord, TestKind,
    TestResultUpdate,
};

/// A fresh session with complete intake and every capture at `ok`
pub(crate) fn complete_record() -> SessionRecord {
    let mut record = SessionRecord::start_new();
    record.update_basic_info(BasicInfoUpdate {
        nickname: Some("KHJ".to_string()),
        gender: Some(Gender::Female),
        age_group: Some(AgeGroup::Forties),
    });
    record.add_symptom("lower back pain");
    for kind in TestKind::ALL {
        record.update_test_result(
            kind,
            TestResultUpdate {
                raw_capture: Some(CaptureHandle::new(format!("blob:{kind}"))),
                quality: Some(Quality::Ok),
                ai_data: None,
            },
        );
    }
    record
}
