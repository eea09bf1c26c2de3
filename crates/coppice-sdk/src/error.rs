//! SDK error types.

use coppice_core::{ConfigValidationError, RejectionReason};
use thiserror::Error;

/// SDK Result type alias
pub type SdkResult<T> = Result<T, SdkError>;

/// SDK errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// The validation gate refused the mutation
    #[error("validation rejected: {0}")]
    Rejected(#[from] RejectionReason),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigValidationError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SdkError {
    /// Check if this error is a gate rejection
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The rejection reason, if this error is one
    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<coppice_core::Error> for SdkError {
    fn from(err: coppice_core::Error) -> Self {
        match err {
            coppice_core::Error::Rejected(reason) => Self::Rejected(reason),
            coppice_core::Error::Serialization(e) => Self::Serialization(e),
            coppice_core::Error::Config(e) => Self::Config(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_helpers() {
        let err: SdkError = RejectionReason::DepthLimitExceeded.into();
        assert!(err.is_rejected());
        assert_eq!(err.rejection(), Some(&RejectionReason::DepthLimitExceeded));
        assert!(err.to_string().contains("Depth limit exceeded"));

        let err: SdkError = std::io::Error::other("disk gone").into();
        assert!(!err.is_rejected());
        assert!(err.rejection().is_none());
    }

    #[test]
    fn test_core_error_maps_across() {
        let core: coppice_core::Error = RejectionReason::ChildLimitExceeded.into();
        let sdk: SdkError = core.into();
        assert!(sdk.is_rejected());
    }
}
