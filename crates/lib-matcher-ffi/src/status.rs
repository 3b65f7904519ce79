//! The error channel written by every dispatcher entry.

use crate::error::{MatcherError, MatcherResult};
use lib_types::{StatusCode, STATUS_OK};

/// Sink for the status code of one operation.
///
/// Starts unset. Every dispatcher entry overwrites it exactly once with the
/// code of its terminal outcome, whichever path it took.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ErrorStatus {
    code: Option<i32>,
}

impl ErrorStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a status code.
    pub fn report(&mut self, code: i32) {
        self.code = Some(code);
    }

    /// Last reported code, `None` if nothing was reported yet.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Named status for the last reported code.
    pub fn status(&self) -> Option<StatusCode> {
        self.code.and_then(StatusCode::from_code)
    }

    /// Whether the last reported code is success or a warning.
    pub fn is_ok(&self) -> bool {
        self.code.is_some_and(|code| !StatusCode::is_error(code))
    }

    /// Report the outcome of an operation and hand back its value.
    pub(crate) fn settle<T>(&mut self, operation: &'static str, result: MatcherResult<T>) -> Option<T> {
        self.settle_coded(operation, result.map(|value| (value, STATUS_OK)))
    }

    /// Like [`ErrorStatus::settle`], for operations whose success carries an
    /// engine code of its own.
    pub(crate) fn settle_coded<T>(
        &mut self,
        operation: &'static str,
        result: MatcherResult<(T, i32)>,
    ) -> Option<T> {
        match result {
            Ok((value, code)) => {
                self.report(code);
                tracing::debug!(operation, code, "matcher operation complete");
                Some(value)
            }
            Err(error) => {
                let code = error.status_code();
                self.report(code);
                tracing::warn!(operation, code, error = %error, "matcher operation failed");
                None
            }
        }
    }
}

/// Turn an engine return value into a result. Anything but OK fails.
pub(crate) fn check(code: i32) -> MatcherResult<()> {
    if code == STATUS_OK {
        Ok(())
    } else {
        Err(MatcherError::Native { code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unset() {
        let status = ErrorStatus::new();
        assert_eq!(status.code(), None);
        assert!(!status.is_ok());
    }

    #[test]
    fn test_settle_reports_once() {
        let mut status = ErrorStatus::new();
        assert_eq!(status.settle("level", Ok(3)), Some(3));
        assert_eq!(status.code(), Some(STATUS_OK));

        let failed: MatcherResult<i32> = Err(MatcherError::Native { code: -603 });
        assert_eq!(status.settle("level", failed), None);
        assert_eq!(status.status(), Some(StatusCode::InvalidHandle));
    }

    #[test]
    fn test_warning_passes_through() {
        let mut status = ErrorStatus::new();
        assert_eq!(status.settle_coded("version", Ok(("v", 12))), Some("v"));
        assert_eq!(status.code(), Some(12));
        assert!(status.is_ok());
    }

    #[test]
    fn test_check_rejects_warning() {
        assert!(check(STATUS_OK).is_ok());
        assert!(matches!(check(5), Err(MatcherError::Native { code: 5 })));
        assert!(matches!(check(-604), Err(MatcherError::Native { code: -604 })));
    }
}
