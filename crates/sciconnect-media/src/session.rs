//! Media session: a handle to one call's captured tracks and their flags.
//!
//! Session lifecycle:
//! - Acquiring -> Live (capture granted)
//! - Acquiring -> Degraded (denied, no device, timed out)
//! - any -> Closed (end call, navigation, teardown)
//!
//! A stream that arrives after the session was closed is stopped on arrival.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use sciconnect_core::types::CaptureKind;

use crate::device::{MediaStream, TrackKind};
use crate::error::MediaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the platform to grant or deny capture.
    Acquiring,
    /// Holding a granted stream.
    Live,
    /// Capture failed; toggles are no-ops.
    Degraded,
    /// Released. Terminal.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Acquiring => write!(f, "Acquiring"),
            SessionState::Live => write!(f, "Live"),
            SessionState::Degraded => write!(f, "Degraded"),
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    stream: Option<MediaStream>,
    mic_enabled: bool,
    camera_enabled: bool,
    notice: Option<String>,
}

/// Shared handle to one call's capture session.
///
/// Clones refer to the same session. Flags only read `true` while the
/// session is `Live`, so no enabled flag ever exists without a granted track.
#[derive(Debug, Clone)]
pub struct MediaSession {
    id: Uuid,
    kind: CaptureKind,
    inner: Arc<Mutex<SessionInner>>,
}

impl MediaSession {
    pub(crate) fn acquiring(kind: CaptureKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Acquiring,
                stream: None,
                mic_enabled: false,
                camera_enabled: false,
                notice: None,
            })),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn is_live(&self) -> bool {
        self.state() == SessionState::Live
    }

    pub fn mic_enabled(&self) -> bool {
        self.lock().mic_enabled
    }

    pub fn camera_enabled(&self) -> bool {
        self.lock().camera_enabled
    }

    /// User-facing explanation when the session is degraded.
    pub fn notice(&self) -> Option<String> {
        self.lock().notice.clone()
    }

    pub fn enabled_track_count(&self) -> usize {
        self.lock()
            .stream
            .as_ref()
            .map(MediaStream::enabled_track_count)
            .unwrap_or(0)
    }

    pub fn live_track_count(&self) -> usize {
        self.lock()
            .stream
            .as_ref()
            .map(MediaStream::live_track_count)
            .unwrap_or(0)
    }

    /// Mute or unmute the microphone track. Returns whether the toggle was
    /// applied; outside `Live` this is a no-op.
    pub fn set_mic(&self, enabled: bool) -> bool {
        let mut inner = self.lock();
        if inner.state != SessionState::Live {
            tracing::debug!(session = %self.id, state = %inner.state, "Mic toggle ignored");
            return false;
        }
        inner.mic_enabled = enabled;
        if let Some(stream) = &inner.stream {
            for track in stream.tracks_of(TrackKind::Audio) {
                track.set_enabled(enabled);
            }
        }
        tracing::debug!(session = %self.id, enabled, "Mic toggled");
        true
    }

    /// Show or hide the camera track. No-op for audio-only sessions and
    /// outside `Live`.
    pub fn set_camera(&self, enabled: bool) -> bool {
        if !self.kind.includes_video() {
            return false;
        }
        let mut inner = self.lock();
        if inner.state != SessionState::Live {
            tracing::debug!(session = %self.id, state = %inner.state, "Camera toggle ignored");
            return false;
        }
        inner.camera_enabled = enabled;
        if let Some(stream) = &inner.stream {
            for track in stream.tracks_of(TrackKind::Video) {
                track.set_enabled(enabled);
            }
        }
        tracing::debug!(session = %self.id, enabled, "Camera toggled");
        true
    }

    /// Stop every track and mark the session closed.
    ///
    /// Safe to call any number of times, in any state. Returns `true` only for
    /// the call that actually closed the session.
    pub fn close(&self) -> bool {
        let mut inner = self.lock();
        if inner.state == SessionState::Closed {
            return false;
        }
        if let Some(stream) = inner.stream.take() {
            stream.stop();
        }
        let from = inner.state;
        inner.state = SessionState::Closed;
        inner.mic_enabled = false;
        inner.camera_enabled = false;
        tracing::info!(session = %self.id, kind = %self.kind, from = %from, "Media session closed");
        true
    }

    /// Bind the outcome of the capture request to this session.
    pub(crate) fn install(
        &self,
        result: Result<MediaStream, MediaError>,
        mic_default: bool,
        camera_default: bool,
    ) {
        let mut inner = self.lock();
        if inner.state != SessionState::Acquiring {
            // Closed while the request was in flight: give the devices back.
            if let Ok(stream) = result {
                stream.stop();
                tracing::info!(
                    session = %self.id,
                    state = %inner.state,
                    "Capture resolved after teardown, stream released"
                );
            }
            return;
        }

        match result {
            Ok(stream) => {
                let camera_on = self.kind.includes_video() && camera_default;
                for track in stream.tracks_of(TrackKind::Audio) {
                    track.set_enabled(mic_default);
                }
                for track in stream.tracks_of(TrackKind::Video) {
                    track.set_enabled(camera_on);
                }
                inner.mic_enabled = mic_default;
                inner.camera_enabled = camera_on;
                inner.stream = Some(stream);
                inner.state = SessionState::Live;
                tracing::info!(session = %self.id, kind = %self.kind, "Media session live");
            }
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "Media capture failed, session degraded");
                inner.notice = Some(e.user_notice());
                inner.state = SessionState::Degraded;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().expect("session mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MediaTrack;

    fn stream_for(kind: CaptureKind) -> MediaStream {
        let mut tracks = vec![MediaTrack::new(TrackKind::Audio)];
        if kind.includes_video() {
            tracks.push(MediaTrack::new(TrackKind::Video));
        }
        MediaStream::new(tracks)
    }

    fn live(kind: CaptureKind) -> (MediaSession, MediaStream) {
        let session = MediaSession::acquiring(kind);
        let stream = stream_for(kind);
        session.install(Ok(stream.clone()), true, true);
        (session, stream)
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Acquiring.to_string(), "Acquiring");
        assert_eq!(SessionState::Live.to_string(), "Live");
        assert_eq!(SessionState::Degraded.to_string(), "Degraded");
        assert_eq!(SessionState::Closed.to_string(), "Closed");
    }

    #[test]
    fn test_acquiring_session_has_no_flags() {
        let session = MediaSession::acquiring(CaptureKind::Video);
        assert_eq!(session.state(), SessionState::Acquiring);
        assert!(!session.mic_enabled());
        assert!(!session.camera_enabled());
        assert!(!session.set_mic(true));
        assert_eq!(session.enabled_track_count(), 0);
    }

    #[test]
    fn test_install_grant_applies_defaults() {
        let (session, stream) = live(CaptureKind::Video);
        assert!(session.is_live());
        assert!(session.mic_enabled());
        assert!(session.camera_enabled());
        assert_eq!(stream.enabled_track_count(), 2);
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_install_grant_with_camera_off_default() {
        let session = MediaSession::acquiring(CaptureKind::Video);
        let stream = stream_for(CaptureKind::Video);
        session.install(Ok(stream.clone()), true, false);
        assert!(!session.camera_enabled());
        assert_eq!(stream.tracks_of(TrackKind::Video).filter(|t| t.is_enabled()).count(), 0);
        assert_eq!(stream.live_track_count(), 2);
    }

    #[test]
    fn test_audio_session_camera_flag_stays_off() {
        let (session, _) = live(CaptureKind::Audio);
        assert!(session.mic_enabled());
        assert!(!session.camera_enabled());
    }

    #[test]
    fn test_install_failure_degrades() {
        let session = MediaSession::acquiring(CaptureKind::Video);
        session.install(Err(MediaError::PermissionDenied), true, true);
        assert_eq!(session.state(), SessionState::Degraded);
        assert!(!session.mic_enabled());
        assert!(!session.camera_enabled());
        assert_eq!(
            session.notice(),
            Some(MediaError::PermissionDenied.user_notice())
        );
        assert!(!session.set_mic(true));
        assert!(!session.set_camera(true));
        assert!(!session.mic_enabled());
    }

    #[test]
    fn test_mic_toggle_reuses_track() {
        let (session, stream) = live(CaptureKind::Audio);
        let track = stream.tracks()[0].clone();

        assert!(session.set_mic(false));
        assert!(!session.mic_enabled());
        assert!(!track.is_enabled());

        assert!(session.set_mic(true));
        assert!(session.mic_enabled());
        assert!(track.is_enabled());
        assert_eq!(stream.tracks().len(), 1);
    }

    #[test]
    fn test_camera_toggle_only_touches_video() {
        let (session, stream) = live(CaptureKind::Video);
        assert!(session.set_camera(false));
        assert!(!session.camera_enabled());
        assert!(session.mic_enabled());
        assert_eq!(stream.enabled_track_count(), 1);
        assert!(stream.tracks_of(TrackKind::Audio).all(|t| t.is_enabled()));
    }

    #[test]
    fn test_set_camera_on_audio_session_mutates_nothing() {
        let (session, stream) = live(CaptureKind::Audio);
        session.set_mic(false);

        assert!(!session.set_camera(true));
        assert!(!session.camera_enabled());
        assert!(!session.mic_enabled());
        assert_eq!(stream.enabled_track_count(), 0);

        assert!(!session.set_camera(false));
        assert!(!session.mic_enabled());
    }

    #[test]
    fn test_close_stops_every_track() {
        let (session, stream) = live(CaptureKind::Video);
        assert!(session.close());
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(stream.live_track_count(), 0);
        assert_eq!(stream.enabled_track_count(), 0);
        assert_eq!(session.enabled_track_count(), 0);
        assert!(!session.mic_enabled());
    }

    #[test]
    fn test_close_is_idempotent() {
        let (session, _) = live(CaptureKind::Audio);
        assert!(session.close());
        assert!(!session.close());
        assert!(!session.close());
    }

    #[test]
    fn test_close_never_acquired_session() {
        let session = MediaSession::acquiring(CaptureKind::Audio);
        assert!(session.close());
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_close_degraded_session() {
        let session = MediaSession::acquiring(CaptureKind::Audio);
        session.install(Err(MediaError::Timeout(10)), true, true);
        assert!(session.close());
        assert!(!session.close());
    }

    #[test]
    fn test_stream_arriving_after_close_is_released() {
        let session = MediaSession::acquiring(CaptureKind::Video);
        session.close();

        let late = stream_for(CaptureKind::Video);
        session.install(Ok(late.clone()), true, true);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(late.live_track_count(), 0);
        assert!(!session.mic_enabled());
    }

    #[test]
    fn test_toggles_after_close_are_noops() {
        let (session, stream) = live(CaptureKind::Video);
        session.close();
        assert!(!session.set_mic(true));
        assert!(!session.set_camera(true));
        assert_eq!(stream.enabled_track_count(), 0);
    }

    #[test]
    fn test_clones_share_session() {
        let (session, _) = live(CaptureKind::Audio);
        let other = session.clone();
        other.set_mic(false);
        assert!(!session.mic_enabled());
        assert_eq!(session.id(), other.id());
    }
}
