//! Error types for the catalog.

use sciconnect_core::error::SciConnectError;

/// Errors from catalog loading and lookup.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("cause not found: {0}")]
    CauseNotFound(String),
    #[error("expert not found: {0}")]
    ExpertNotFound(String),
    #[error("duplicate catalog id: {0}")]
    DuplicateId(String),
    #[error("catalog load failed: {0}")]
    Load(String),
}

impl From<SciConnectError> for DirectoryError {
    fn from(err: SciConnectError) -> Self {
        DirectoryError::Load(err.to_string())
    }
}

impl From<DirectoryError> for SciConnectError {
    fn from(err: DirectoryError) -> Self {
        SciConnectError::Directory(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_error_display() {
        assert_eq!(
            DirectoryError::CauseNotFound("c99".to_string()).to_string(),
            "cause not found: c99"
        );
        assert_eq!(
            DirectoryError::ExpertNotFound("s9".to_string()).to_string(),
            "expert not found: s9"
        );
        assert_eq!(
            DirectoryError::DuplicateId("s1".to_string()).to_string(),
            "duplicate catalog id: s1"
        );
    }

    #[test]
    fn test_round_trip_through_core_error() {
        let core: SciConnectError = DirectoryError::CauseNotFound("c0".to_string()).into();
        assert!(matches!(core, SciConnectError::Directory(_)));

        let back: DirectoryError = core.into();
        assert!(matches!(back, DirectoryError::Load(_)));
        assert!(back.to_string().contains("c0"));
    }
}
