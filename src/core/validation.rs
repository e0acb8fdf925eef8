//! Session record validation
//!
//! Structural and business checks a [`SessionRecord`] must pass before it may
//! leave the device. Validation is a pure function over a snapshot; it never
//! touches the network or the offline queue.

use crate::domain::errors::ValidationError;
use crate::domain::session::{SessionRecord, TestKind};

/// Validate a session record for transmission
///
/// Checks run in a fixed order and the first failure is returned:
///
/// 1. Required fields present: `patientId`, `sessionStartTime`, `basicInfo`, `testResults`
/// 2. `patientId` carries the `TEMP_` de-identification prefix
/// 3. Nickname, gender and age group are filled in
/// 4. Each test kind (tongue, face, voice) passed its quality gate
///
/// # Errors
///
/// Returns the specific [`ValidationError`] for the first failed check.
///
/// # Examples
///
/// ```
/// use quickscan::core::validation::validate;
/// use quickscan::domain::{SessionRecord, ValidationError};
///
/// let record = SessionRecord::start_new();
/// assert_eq!(validate(&record), Err(ValidationError::IncompleteBasicInfo));
/// ```
pub fn validate(record: &SessionRecord) -> Result<(), ValidationError> {
    let patient_id = match &record.patient_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ValidationError::MissingField("patientId")),
    };

    if record.session_start_time.is_none() {
        return Err(ValidationError::MissingField("sessionStartTime"));
    }

    let basic_info = record
        .basic_info
        .as_ref()
        .ok_or(ValidationError::MissingField("basicInfo"))?;

    if record.test_results.is_empty() {
        return Err(ValidationError::MissingField("testResults"));
    }

    if !patient_id.has_deidentified_prefix() {
        return Err(ValidationError::InvalidIdentifier(
            patient_id.as_str().to_string(),
        ));
    }

    if !basic_info.is_complete() {
        return Err(ValidationError::IncompleteBasicInfo);
    }

    for kind in TestKind::ALL {
        let passed = record
            .test_results
            .get(&kind)
            .map(|result| result.is_ok())
            .unwrap_or(false);
        if !passed {
            return Err(ValidationError::IncompleteTest(kind));
        }
    }

    Ok(())
}
