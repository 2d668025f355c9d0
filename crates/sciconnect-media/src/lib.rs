//! Local audio/video capture for call previews.
//!
//! Provides the device-capture seam (`MediaDevices`), the session handle that
//! owns acquired tracks, and the manager that guarantees only one session
//! holds devices at a time. Includes a mock device for running without real
//! hardware.

pub mod device;
pub mod error;
pub mod manager;
pub mod session;

pub use device::{
    CaptureRequest, DevicePolicy, MediaDevices, MediaStream, MediaTrack, MockMediaDevices,
    TrackKind,
};
pub use error::MediaError;
pub use manager::{CallGuard, MediaSessionManager, PendingAcquisition};
pub use session::{MediaSession, SessionState};
