//! Error types for device capture.

use sciconnect_core::error::SciConnectError;

/// Why a capture request produced no stream.
///
/// None of these end the call screen; the session goes degraded and the
/// caller shows `user_notice`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("permission to use capture devices was denied")]
    PermissionDenied,
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("capture request timed out after {0} ms")]
    Timeout(u64),
    #[error("platform media error: {0}")]
    Platform(String),
}

impl MediaError {
    /// Short, non-technical text for the call screen.
    pub fn user_notice(&self) -> String {
        match self {
            MediaError::PermissionDenied => {
                "Camera/microphone access was blocked. Allow access to preview your call.".to_string()
            }
            MediaError::DeviceUnavailable(_) => {
                "No usable camera or microphone was found.".to_string()
            }
            MediaError::Timeout(_) => {
                "Your devices did not respond in time. Try again.".to_string()
            }
            MediaError::Platform(_) => "Media preview is unavailable right now.".to_string(),
        }
    }
}

impl From<SciConnectError> for MediaError {
    fn from(err: SciConnectError) -> Self {
        MediaError::Platform(err.to_string())
    }
}

impl From<MediaError> for SciConnectError {
    fn from(err: MediaError) -> Self {
        SciConnectError::Media(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_error_display() {
        assert_eq!(
            MediaError::PermissionDenied.to_string(),
            "permission to use capture devices was denied"
        );
        assert_eq!(
            MediaError::DeviceUnavailable("no camera".to_string()).to_string(),
            "capture device unavailable: no camera"
        );
        assert_eq!(
            MediaError::Timeout(1500).to_string(),
            "capture request timed out after 1500 ms"
        );
    }

    #[test]
    fn test_user_notice_is_never_empty() {
        let errors = [
            MediaError::PermissionDenied,
            MediaError::DeviceUnavailable(String::new()),
            MediaError::Timeout(0),
            MediaError::Platform(String::new()),
        ];
        for err in errors {
            assert!(!err.user_notice().is_empty(), "{err:?}");
        }
    }

    #[test]
    fn test_core_conversions() {
        let media: MediaError = SciConnectError::Config("x".to_string()).into();
        assert!(matches!(media, MediaError::Platform(_)));

        let core: SciConnectError = MediaError::PermissionDenied.into();
        assert!(matches!(core, SciConnectError::Media(_)));
    }
}
