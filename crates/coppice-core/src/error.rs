//! Error types for coppice-core.

use thiserror::Error;

/// Result type alias using the coppice-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Reason the validation gate refused a structural mutation.
///
/// Returned as typed data so callers can surface exactly which rule fired.
/// The Display strings are stable; downstream output and tests rely on them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("Role not recognized: {0}")]
    UnknownRole(String),

    #[error("Cycle out of range: {0}")]
    CycleOutOfRange(i64),

    #[error("Depth limit exceeded")]
    DepthLimitExceeded,

    #[error("Child limit exceeded")]
    ChildLimitExceeded,

    #[error("Text rejected by gate policy")]
    TextRejected,
}

/// Core error type for tree-engine operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation rejected: {0}")]
    Rejected(#[from] RejectionReason),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reason_display() {
        assert_eq!(
            RejectionReason::DepthLimitExceeded.to_string(),
            "Depth limit exceeded"
        );
        assert_eq!(
            RejectionReason::ChildLimitExceeded.to_string(),
            "Child limit exceeded"
        );
        assert!(
            RejectionReason::UnknownRole("oracle".into())
                .to_string()
                .contains("oracle")
        );
    }

    #[test]
    fn test_error_wraps_rejection() {
        let err: Error = RejectionReason::CycleOutOfRange(1200).into();
        assert!(err.to_string().contains("1200"));
    }
}
