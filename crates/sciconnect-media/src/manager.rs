//! Media session manager: one capture session at a time, always released.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use sciconnect_core::config::MediaConfig;
use sciconnect_core::types::CaptureKind;

use crate::device::{CaptureRequest, MediaDevices};
use crate::error::MediaError;
use crate::session::{MediaSession, SessionState};

/// An in-flight capture request for a session returned by `begin`.
///
/// Dropping this does not cancel anything: the request still resolves, and
/// the result is bound to, or released by, its session.
#[derive(Debug)]
pub struct PendingAcquisition {
    session: MediaSession,
    task: Option<JoinHandle<()>>,
}

impl PendingAcquisition {
    pub fn session(&self) -> &MediaSession {
        &self.session
    }

    /// True once the capture request has resolved.
    pub fn is_settled(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait until the capture request resolves; returns the session's state.
    ///
    /// Cancel-safe: dropping the future before it completes leaves the
    /// request pending, and a later call picks up where it left off.
    pub async fn settled(&mut self) -> SessionState {
        if let Some(task) = self.task.as_mut() {
            let joined = task.await;
            self.task = None;
            if let Err(e) = joined {
                tracing::warn!(session = %self.session.id(), error = %e, "Capture task failed");
                self.session
                    .install(Err(MediaError::Platform(e.to_string())), false, false);
            }
        }
        self.session.state()
    }

    /// Consuming form of `settled`.
    pub async fn wait(mut self) -> SessionState {
        self.settled().await
    }
}

/// Owns device access for call views.
///
/// Opening a session first closes the previous one, so at most one session
/// ever holds device tracks.
pub struct MediaSessionManager<D> {
    devices: Arc<D>,
    config: MediaConfig,
    active: Mutex<Option<MediaSession>>,
}

impl<D> std::fmt::Debug for MediaSessionManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSessionManager")
            .field("config", &self.config)
            .field("active", &self.active)
            .finish()
    }
}

impl<D: MediaDevices + 'static> MediaSessionManager<D> {
    pub fn new(devices: D, config: MediaConfig) -> Self {
        Self {
            devices: Arc::new(devices),
            config,
            active: Mutex::new(None),
        }
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    /// Start a capture session without waiting for the platform.
    ///
    /// The session is `Acquiring` until the returned `PendingAcquisition`
    /// resolves. Closing it before then is allowed; a late grant is released
    /// immediately.
    pub fn begin(&self, kind: CaptureKind) -> (MediaSession, PendingAcquisition) {
        self.close_active();

        let session = MediaSession::acquiring(kind);
        *self.active.lock().expect("active mutex poisoned") = Some(session.clone());

        let request = CaptureRequest::from(kind);
        let mic_default = self.config.mic_on_by_default;
        let camera_default = self.config.camera_on_by_default;
        let timeout_ms = self.config.acquire_timeout_ms;

        tracing::info!(session = %session.id(), %kind, "Requesting capture devices");

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                session.install(
                    Err(MediaError::Platform(e.to_string())),
                    mic_default,
                    camera_default,
                );
                let pending = PendingAcquisition {
                    session: session.clone(),
                    task: None,
                };
                return (session, pending);
            }
        };

        let devices = Arc::clone(&self.devices);
        let target = session.clone();
        let task = runtime.spawn(async move {
            let result = match tokio::time::timeout(
                Duration::from_millis(timeout_ms),
                devices.acquire(request),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(MediaError::Timeout(timeout_ms)),
            };
            target.install(result, mic_default, camera_default);
        });

        let pending = PendingAcquisition {
            session: session.clone(),
            task: Some(task),
        };
        (session, pending)
    }

    /// Start a capture session and wait for the platform's answer.
    ///
    /// Always returns a session: `Live` on grant, `Degraded` with a notice on
    /// denial, missing hardware or timeout.
    pub async fn open(&self, kind: CaptureKind) -> MediaSession {
        let (session, pending) = self.begin(kind);
        pending.wait().await;
        session
    }

    /// The session currently holding (or waiting for) the devices.
    pub fn active(&self) -> Option<MediaSession> {
        self.active.lock().expect("active mutex poisoned").clone()
    }

    /// Close `session`, clearing it as the active one if it is.
    pub fn close(&self, session: &MediaSession) -> bool {
        let mut active = self.active.lock().expect("active mutex poisoned");
        if active.as_ref().map(MediaSession::id) == Some(session.id()) {
            *active = None;
        }
        drop(active);
        session.close()
    }

    /// Close whatever session is active. Returns `true` if one was closed.
    pub fn close_active(&self) -> bool {
        let previous = self.active.lock().expect("active mutex poisoned").take();
        match previous {
            Some(session) => session.close(),
            None => false,
        }
    }
}

impl<D> Drop for MediaSessionManager<D> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(session) = active.take() {
                session.close();
            }
        }
    }
}

/// Scoped ownership of a call's media session.
///
/// The session is closed when the guard is ended or dropped, whichever comes
/// first, so every way out of a call view releases the devices.
#[derive(Debug)]
pub struct CallGuard {
    session: MediaSession,
}

impl CallGuard {
    pub fn new(session: MediaSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &MediaSession {
        &self.session
    }

    /// End the call explicitly.
    pub fn end(self) {
        // Drop closes the session.
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.session.close();
    }
}
