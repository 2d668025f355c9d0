//! Device capture seam: tracks, streams, and the platform trait.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use sciconnect_core::types::CaptureKind;

use crate::error::MediaError;

// =============================================================================
// Tracks and streams
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// One captured device track.
///
/// `enabled` mutes or unmutes without giving the device back; `stop`
/// releases the device for good.
#[derive(Debug)]
pub struct MediaTrack {
    id: Uuid,
    kind: TrackKind,
    enabled: AtomicBool,
    live: AtomicBool,
}

impl MediaTrack {
    /// A live track, enabled as platforms hand them out.
    pub fn new(kind: TrackKind) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            kind,
            enabled: AtomicBool::new(true),
            live: AtomicBool::new(true),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Enabled and still holding the device.
    pub fn is_enabled(&self) -> bool {
        self.is_live() && self.enabled.load(Ordering::SeqCst)
    }

    /// Toggle the track. Stopped tracks cannot be re-enabled.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        if !self.is_live() {
            return false;
        }
        self.enabled.store(enabled, Ordering::SeqCst);
        true
    }

    /// Release the device. Idempotent.
    pub fn stop(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
    }
}

/// The set of tracks returned by one capture request.
#[derive(Debug, Clone)]
pub struct MediaStream {
    id: Uuid,
    tracks: Vec<Arc<MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Arc<MediaTrack>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tracks(&self) -> &[Arc<MediaTrack>] {
        &self.tracks
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &Arc<MediaTrack>> {
        self.tracks.iter().filter(move |t| t.kind() == kind)
    }

    pub fn enabled_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_enabled()).count()
    }

    pub fn live_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }

    /// Stop every track.
    pub fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

// =============================================================================
// Platform seam
// =============================================================================

/// What to capture. Audio is always requested for calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub audio: bool,
    pub video: bool,
}

impl From<CaptureKind> for CaptureRequest {
    fn from(kind: CaptureKind) -> Self {
        Self {
            audio: true,
            video: kind.includes_video(),
        }
    }
}

/// Platform media acquisition (the browser's `getUserMedia`, a native
/// capture API, or a mock).
///
/// `acquire` resolves once the user or platform grants or denies access.
pub trait MediaDevices: Send + Sync {
    fn acquire(
        &self,
        request: CaptureRequest,
    ) -> impl Future<Output = Result<MediaStream, MediaError>> + Send;
}

// =============================================================================
// Mock implementation
// =============================================================================

/// How the mock answers capture requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevicePolicy {
    Grant,
    Deny,
    Unavailable,
}

#[derive(Debug)]
struct MockState {
    policy: Mutex<DevicePolicy>,
    latency: Duration,
    acquisitions: AtomicUsize,
    issued: Mutex<Vec<Arc<MediaTrack>>>,
}

/// Mock capture devices for tests and the headless binary.
///
/// Clones share state, so a test can keep one clone to inspect the tracks a
/// manager has been handed.
#[derive(Debug, Clone)]
pub struct MockMediaDevices {
    state: Arc<MockState>,
}

impl Default for MockMediaDevices {
    fn default() -> Self {
        Self::new(DevicePolicy::Grant)
    }
}

impl MockMediaDevices {
    pub fn new(policy: DevicePolicy) -> Self {
        Self::with_latency(policy, Duration::ZERO)
    }

    /// Mock that takes `latency` to answer each request.
    pub fn with_latency(policy: DevicePolicy, latency: Duration) -> Self {
        Self {
            state: Arc::new(MockState {
                policy: Mutex::new(policy),
                latency,
                acquisitions: AtomicUsize::new(0),
                issued: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn set_policy(&self, policy: DevicePolicy) {
        *self.state.policy.lock().expect("policy mutex poisoned") = policy;
    }

    /// Number of capture requests received.
    pub fn acquisitions(&self) -> usize {
        self.state.acquisitions.load(Ordering::SeqCst)
    }

    /// Every track ever handed out.
    pub fn issued_tracks(&self) -> Vec<Arc<MediaTrack>> {
        self.state
            .issued
            .lock()
            .expect("issued mutex poisoned")
            .clone()
    }

    /// Handed-out tracks that still hold a device.
    pub fn live_tracks(&self) -> usize {
        self.issued_tracks().iter().filter(|t| t.is_live()).count()
    }
}

impl MediaDevices for MockMediaDevices {
    async fn acquire(&self, request: CaptureRequest) -> Result<MediaStream, MediaError> {
        self.state.acquisitions.fetch_add(1, Ordering::SeqCst);
        if !self.state.latency.is_zero() {
            tokio::time::sleep(self.state.latency).await;
        }

        let policy = self
            .state
            .policy
            .lock()
            .expect("policy mutex poisoned")
            .clone();
        match policy {
            DevicePolicy::Grant => {
                let mut tracks = Vec::new();
                if request.audio {
                    tracks.push(MediaTrack::new(TrackKind::Audio));
                }
                if request.video {
                    tracks.push(MediaTrack::new(TrackKind::Video));
                }
                self.state
                    .issued
                    .lock()
                    .expect("issued mutex poisoned")
                    .extend(tracks.iter().cloned());
                tracing::debug!(tracks = tracks.len(), "Mock capture granted");
                Ok(MediaStream::new(tracks))
            }
            DevicePolicy::Deny => {
                tracing::debug!("Mock capture denied");
                Err(MediaError::PermissionDenied)
            }
            DevicePolicy::Unavailable => Err(MediaError::DeviceUnavailable(
                "mock device has no capture hardware".to_string(),
            )),
        }
    }
}
