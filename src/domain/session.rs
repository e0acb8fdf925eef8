//! Session record domain model
//!
//! A [`SessionRecord`] holds one patient's de-identified QuickScan session:
//! the temporary patient code, basic non-identifying information, and the
//! results of the three diagnostic captures (tongue, face, voice).
//!
//! Capture payloads and AI analysis results are produced elsewhere and are
//! carried here as opaque values.

use crate::domain::ids::PatientId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use zeroize::Zeroize;

/// Patient gender as collected on the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Patient age bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "20s")]
    Twenties,
    #[serde(rename = "30s")]
    Thirties,
    #[serde(rename = "40s")]
    Forties,
    #[serde(rename = "50s")]
    Fifties,
    #[serde(rename = "60s+")]
    SixtiesPlus,
}

/// Diagnostic capture kinds, in validation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Tongue,
    Face,
    Voice,
}

impl TestKind {
    /// All kinds in the fixed order tongue, face, voice
    pub const ALL: [TestKind; 3] = [TestKind::Tongue, TestKind::Face, TestKind::Voice];

    /// Lowercase name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Tongue => "tongue",
            TestKind::Face => "face",
            TestKind::Voice => "voice",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality gate state of a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Pending,
    Ok,
    Retry,
}

/// Opaque reference to a raw capture (image or audio)
///
/// The capture pipeline decides what this holds (a blob URI, an encoded
/// frame, ...). It is zeroized when the session is disposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(transparent)]
pub struct CaptureHandle(String);

impl CaptureHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of one diagnostic capture
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Raw capture handle, if anything was captured yet
    #[serde(default)]
    pub raw_capture: Option<CaptureHandle>,

    /// Quality gate state
    #[serde(default)]
    pub quality: Quality,

    /// AI analysis output, opaque to this crate
    #[serde(default)]
    pub ai_data: Option<serde_json::Value>,
}

impl TestResult {
    /// Whether this capture passed its quality gate
    pub fn is_ok(&self) -> bool {
        self.quality == Quality::Ok
    }
}

/// Partial update for a [`TestResult`]; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct TestResultUpdate {
    pub raw_capture: Option<CaptureHandle>,
    pub quality: Option<Quality>,
    pub ai_data: Option<serde_json::Value>,
}

/// Non-identifying intake information
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    /// Pseudonym or initials, never the real name
    #[serde(default)]
    pub nickname: String,

    #[serde(default)]
    pub gender: Option<Gender>,

    #[serde(default)]
    pub age_group: Option<AgeGroup>,

    /// Main symptom keywords; unique, order irrelevant
    #[serde(default)]
    pub main_symptoms: BTreeSet<String>,
}

impl BasicInfo {
    /// Nickname, gender and age group are all filled in
    pub fn is_complete(&self) -> bool {
        !self.nickname.trim().is_empty() && self.gender.is_some() && self.age_group.is_some()
    }

    fn wipe(&mut self) {
        self.nickname.zeroize();
        self.gender = None;
        self.age_group = None;
        let symptoms = std::mem::take(&mut self.main_symptoms);
        for mut symptom in symptoms {
            symptom.zeroize();
        }
    }
}

/// Partial update for [`BasicInfo`]; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct BasicInfoUpdate {
    pub nickname: Option<String>,
    pub gender: Option<Gender>,
    pub age_group: Option<AgeGroup>,
}

/// One patient's de-identified scan session
///
/// Field names serialize in camelCase to match the dashboard's record format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub patient_id: Option<PatientId>,

    #[serde(default)]
    pub session_start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub basic_info: Option<BasicInfo>,

    #[serde(default)]
    pub test_results: BTreeMap<TestKind, TestResult>,
}

impl SessionRecord {
    /// Start a fresh session: new patient code, empty intake, all tests pending
    pub fn start_new() -> Self {
        Self {
            patient_id: Some(PatientId::generate()),
            session_start_time: Some(Utc::now()),
            basic_info: Some(BasicInfo::default()),
            test_results: TestKind::ALL
                .iter()
                .map(|kind| (*kind, TestResult::default()))
                .collect(),
        }
    }

    /// Patient code, or an empty string when the record has been cleared
    pub fn patient_label(&self) -> &str {
        self.patient_id.as_ref().map(|id| id.as_str()).unwrap_or("")
    }

    pub fn is_basic_info_complete(&self) -> bool {
        self.basic_info
            .as_ref()
            .map(BasicInfo::is_complete)
            .unwrap_or(false)
    }

    /// Every test kind is present and passed its quality gate
    pub fn is_all_tests_complete(&self) -> bool {
        TestKind::ALL.iter().all(|kind| {
            self.test_results
                .get(kind)
                .map(TestResult::is_ok)
                .unwrap_or(false)
        })
    }

    /// The intake step is done and captures may begin
    pub fn can_proceed_to_test(&self) -> bool {
        self.patient_id.as_ref().is_some_and(|id| !id.is_empty()) && self.is_basic_info_complete()
    }

    /// Merge a partial intake update
    pub fn update_basic_info(&mut self, update: BasicInfoUpdate) {
        let info = self.basic_info.get_or_insert_with(BasicInfo::default);
        if let Some(nickname) = update.nickname {
            info.nickname = nickname;
        }
        if let Some(gender) = update.gender {
            info.gender = Some(gender);
        }
        if let Some(age_group) = update.age_group {
            info.age_group = Some(age_group);
        }
    }

    /// Add a symptom keyword; returns false if it was already present
    pub fn add_symptom(&mut self, symptom: impl Into<String>) -> bool {
        self.basic_info
            .get_or_insert_with(BasicInfo::default)
            .main_symptoms
            .insert(symptom.into())
    }

    /// Remove a symptom keyword; returns false if it was not present
    pub fn remove_symptom(&mut self, symptom: &str) -> bool {
        self.basic_info
            .as_mut()
            .map(|info| info.main_symptoms.remove(symptom))
            .unwrap_or(false)
    }

    /// Merge a partial capture update into one test kind
    pub fn update_test_result(&mut self, kind: TestKind, update: TestResultUpdate) {
        let result = self.test_results.entry(kind).or_default();
        if let Some(capture) = update.raw_capture {
            result.raw_capture = Some(capture);
        }
        if let Some(quality) = update.quality {
            result.quality = quality;
        }
        if let Some(ai_data) = update.ai_data {
            result.ai_data = Some(ai_data);
        }
    }

    pub fn set_test_quality(&mut self, kind: TestKind, quality: Quality) {
        self.test_results.entry(kind).or_default().quality = quality;
    }

    /// Destroy all sensitive fields
    ///
    /// String buffers are zeroized before being released so the session's
    /// content does not linger in memory after disposal.
    pub fn clear(&mut self) {
        if let Some(mut id) = self.patient_id.take() {
            id.zeroize();
        }
        self.session_start_time = None;
        if let Some(mut info) = self.basic_info.take() {
            info.wipe();
        }
        let results = std::mem::take(&mut self.test_results);
        for (_, mut result) in results {
            if let Some(mut capture) = result.raw_capture.take() {
                capture.zeroize();
            }
        }
    }

    /// Whether every sensitive field holds its cleared value
    pub fn is_cleared(&self) -> bool {
        self.patient_id.is_none()
            && self.session_start_time.is_none()
            && self.basic_info.is_none()
            && self.test_results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::complete_record;

    #[test]
    fn test_start_new_has_pending_tests() {
        let record = SessionRecord::start_new();
        assert!(record.patient_id.as_ref().unwrap().is_well_formed());
        assert!(record.session_start_time.is_some());
        assert_eq!(record.test_results.len(), 3);
        assert!(record
            .test_results
            .values()
            .all(|r| r.quality == Quality::Pending));
        assert!(!record.is_all_tests_complete());
        assert!(!record.can_proceed_to_test());
    }

    #[test]
    fn test_basic_info_update_merges() {
        let mut record = SessionRecord::start_new();
        record.update_basic_info(BasicInfoUpdate {
            nickname: Some("Kim".to_string()),
            ..Default::default()
        });
        assert!(!record.is_basic_info_complete());

        record.update_basic_info(BasicInfoUpdate {
            gender: Some(Gender::Male),
            age_group: Some(AgeGroup::SixtiesPlus),
            ..Default::default()
        });
        let info = record.basic_info.as_ref().unwrap();
        assert_eq!(info.nickname, "Kim");
        assert!(record.is_basic_info_complete());
        assert!(record.can_proceed_to_test());
    }

    #[test]
    fn test_symptoms_are_unique() {
        let mut record = SessionRecord::start_new();
        assert!(record.add_symptom("headache"));
        assert!(!record.add_symptom("headache"));
        assert!(record.add_symptom("back pain"));
        assert_eq!(record.basic_info.as_ref().unwrap().main_symptoms.len(), 2);

        assert!(record.remove_symptom("headache"));
        assert!(!record.remove_symptom("headache"));
        assert_eq!(record.basic_info.as_ref().unwrap().main_symptoms.len(), 1);
    }

    #[test]
    fn test_all_tests_complete_requires_every_kind() {
        let mut record = complete_record();
        assert!(record.is_all_tests_complete());

        record.set_test_quality(TestKind::Face, Quality::Retry);
        assert!(!record.is_all_tests_complete());

        record.set_test_quality(TestKind::Face, Quality::Ok);
        record.test_results.remove(&TestKind::Voice);
        assert!(!record.is_all_tests_complete());
    }

    #[test]
    fn test_update_test_result_keeps_unspecified_fields() {
        let mut record = complete_record();
        record.update_test_result(
            TestKind::Tongue,
            TestResultUpdate {
                ai_data: Some(serde_json::json!({"coating": "thin"})),
                ..Default::default()
            },
        );
        let tongue = &record.test_results[&TestKind::Tongue];
        assert_eq!(tongue.quality, Quality::Ok);
        assert_eq!(tongue.raw_capture.as_ref().unwrap().as_str(), "blob:tongue");
        assert!(tongue.ai_data.is_some());
    }

    #[test]
    fn test_clear_wipes_everything() {
        let mut record = complete_record();
        record.add_symptom("fatigue");
        record.clear();
        assert!(record.is_cleared());
        assert_eq!(record.patient_label(), "");
        assert!(!record.can_proceed_to_test());
    }

    #[test]
    fn test_serialized_field_names() {
        let record = complete_record();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("patientId").is_some());
        assert!(json.get("sessionStartTime").is_some());
        assert_eq!(json["basicInfo"]["ageGroup"], "40s");
        assert_eq!(json["basicInfo"]["gender"], "female");
        assert_eq!(json["testResults"]["voice"]["quality"], "ok");
        assert!(json["testResults"]["face"].get("rawCapture").is_some());
    }

    #[test]
    fn test_deserialize_partial_record() {
        let json = r#"{
            "patientId": "TEMP_20250101_120000_AB12CD",
            "basicInfo": {"nickname": "Lee", "gender": "male", "ageGroup": "60s+"},
            "testResults": {"tongue": {"quality": "ok"}}
        }"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert!(record.session_start_time.is_none());
        assert!(record.is_basic_info_complete());
        assert_eq!(record.test_results.len(), 1);
        assert_eq!(
            record.basic_info.unwrap().age_group,
            Some(AgeGroup::SixtiesPlus)
        );
    }
}
