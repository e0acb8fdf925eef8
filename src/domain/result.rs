//! Result type alias for QuickScan

use super::errors::QuickScanError;

/// Result type alias for QuickScan operations
///
/// # Examples
///
/// ```
/// use quickscan::domain::result::Result;
/// use quickscan::domain::errors::QuickScanError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(QuickScanError::Storage("disk unavailable".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, QuickScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ValidationError;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_validation_error_propagates() {
        fn inner() -> Result<()> {
            Err(ValidationError::IncompleteBasicInfo.into())
        }

        assert!(matches!(
            inner(),
            Err(QuickScanError::Validation(ValidationError::IncompleteBasicInfo))
        ));
    }
}
