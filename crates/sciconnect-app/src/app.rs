//! The application shell: composes the catalog, conversations, media and
//! donations behind a single command dispatcher.

use std::fmt::Write as _;
use std::sync::Arc;

use sciconnect_chat::{ConversationManager, Message, Sender, ThreadKey};
use sciconnect_core::config::SciConnectConfig;
use sciconnect_core::error::Result;
use sciconnect_core::types::{Expert, UserProfile};
use sciconnect_directory::{DirectoryStore, FilterEngine, FilterState};
use sciconnect_donation::{DonationOutcome, DonationService, PaymentProvider};
use sciconnect_media::{
    CallGuard, MediaDevices, MediaSession, MediaSessionManager, PendingAcquisition, SessionState,
};

use crate::command::{Command, HELP};
use crate::nav::{AppState, View};

/// What the shell loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

pub struct App<D> {
    config: SciConnectConfig,
    store: Arc<DirectoryStore>,
    filter: FilterState,
    state: AppState,
    profile: UserProfile,
    chat: ConversationManager,
    media: MediaSessionManager<D>,
    /// Present while a call view is shown. Dropping it releases the devices.
    call: Option<CallGuard>,
    /// Acquisition for `call` that has not settled yet.
    acquiring: Option<PendingAcquisition>,
    donations: DonationService,
}

impl<D: MediaDevices + 'static> App<D> {
    pub fn new(
        config: SciConnectConfig,
        store: DirectoryStore,
        devices: D,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        let store = Arc::new(store);
        let donations = DonationService::new(payments, Arc::clone(&store), &config.donation);
        Self {
            chat: ConversationManager::new(config.chat.clone()),
            media: MediaSessionManager::new(devices, config.media.clone()),
            call: None,
            acquiring: None,
            donations,
            store,
            filter: FilterState::default(),
            state: AppState::default(),
            profile: UserProfile::default(),
            config,
        }
    }

    /// Build the app with the catalog named by the config.
    pub fn from_config(
        config: SciConnectConfig,
        devices: D,
        payments: Arc<dyn PaymentProvider>,
    ) -> Result<Self> {
        let store = DirectoryStore::from_config(&config.directory)?;
        tracing::info!(
            experts = store.list_experts().len(),
            causes = store.list_causes().len(),
            "Catalog loaded"
        );
        Ok(Self::new(config, store, devices, payments))
    }

    // ---- accessors ----

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn store(&self) -> &DirectoryStore {
        &self.store
    }

    pub fn chat(&self) -> &ConversationManager {
        &self.chat
    }

    pub fn media(&self) -> &MediaSessionManager<D> {
        &self.media
    }

    /// Session of the call view currently shown.
    pub fn call_session(&self) -> Option<&MediaSession> {
        self.call.as_ref().map(CallGuard::session)
    }

    pub fn visible_experts(&self) -> Vec<&Expert> {
        FilterEngine::new(&self.store).apply(&self.filter)
    }

    pub fn current_thread_key(&self) -> ThreadKey {
        ThreadKey::for_expert(self.state.selected_expert_id.as_deref())
    }

    /// Messages of the thread for the current selection, if it was opened.
    pub fn current_messages(&self) -> Option<Vec<Message>> {
        self.chat
            .thread(&self.current_thread_key())
            .map(|thread| thread.snapshot())
    }

    // ---- transitions ----

    pub fn navigate(&mut self, view: View) {
        let next = self.state.clone().navigate(view);
        self.transition(next);
    }

    /// Select an expert and open their chat. Unknown ids leave the state alone.
    pub fn start_chat(&mut self, expert_id: &str) -> Result<()> {
        self.store.find_expert(expert_id)?;
        let next = self.state.clone().start_chat(expert_id);
        self.transition(next);
        Ok(())
    }

    /// Entering a call view starts acquisition and returns at once; the
    /// session stays Acquiring until `call_settled` observes the outcome.
    fn transition(&mut self, next: AppState) {
        let from = self.state.active_view;
        if from != next.active_view && self.call.is_some() {
            tracing::debug!(from = %from, to = %next.active_view, "Leaving call view");
            self.end_call();
        }
        self.state = next;

        match self.state.active_view {
            View::Chat => {
                self.chat.open_thread(self.current_thread_key());
            }
            view => {
                if let Some(kind) = view.call_kind() {
                    if self.call.is_none() {
                        let (session, pending) = self.media.begin(kind);
                        self.call = Some(CallGuard::new(session));
                        self.acquiring = Some(pending);
                    }
                }
            }
        }
        tracing::debug!(view = %self.state.active_view, "View changed");
    }

    /// Release the call session through the manager so it no longer counts
    /// as active.
    fn end_call(&mut self) {
        self.acquiring = None;
        if let Some(guard) = self.call.take() {
            self.media.close(guard.session());
            guard.end();
        }
    }

    /// Whether the shown call is still waiting on the platform.
    pub fn call_pending(&self) -> bool {
        self.acquiring.is_some()
    }

    /// Wait for the shown call's acquisition to settle.
    ///
    /// Returns `None` when nothing is pending. Cancel-safe: dropping the
    /// future leaves the acquisition in place for the next call.
    pub async fn call_settled(&mut self) -> Option<SessionState> {
        let pending = self.acquiring.as_mut()?;
        let state = pending.settled().await;
        self.acquiring = None;
        tracing::debug!(state = %state, "Call acquisition settled");
        Some(state)
    }

    /// Send a message in the current chat.
    pub fn say(&self, text: &str) -> Vec<Message> {
        let thread = self.chat.open_thread(self.current_thread_key());
        self.chat.send(&thread, text)
    }

    pub async fn donate(&self, cause_id: Option<&str>, amount: Option<&str>) -> DonationOutcome {
        let cause_id = cause_id.unwrap_or(&self.config.donation.default_cause);
        let amount = amount.unwrap_or(&self.config.donation.default_amount);
        self.donations.donate(cause_id, amount).await
    }

    /// Release anything still held. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.end_call();
        self.media.close_active();
    }

    // ---- dispatch ----

    pub async fn dispatch(&mut self, command: Command) -> Flow {
        let reply = match command {
            Command::Go(view) => {
                self.navigate(view);
                self.render()
            }
            Command::Search(query) => {
                self.filter.set_query(query);
                if self.state.active_view != View::Experts {
                    self.navigate(View::Experts);
                }
                self.render()
            }
            Command::Tag(tag) => {
                self.filter.set_tag(tag);
                if self.state.active_view != View::Experts {
                    self.navigate(View::Experts);
                }
                self.render()
            }
            Command::Chat(Some(id)) => match self.start_chat(&id) {
                Ok(()) => self.render(),
                Err(e) => e.to_string(),
            },
            Command::Chat(None) => {
                self.navigate(View::Chat);
                self.render()
            }
            Command::Say(text) => {
                if self.state.active_view != View::Chat {
                    "Open a chat first (chat [expert-id]).".to_string()
                } else {
                    self.say(&text);
                    self.render()
                }
            }
            Command::Mic(wanted) => self.toggle(wanted, false),
            Command::Camera(wanted) => self.toggle(wanted, true),
            Command::End => {
                if self.call.is_some() {
                    self.navigate(View::Chat);
                    "Call ended.".to_string()
                } else {
                    "No active call.".to_string()
                }
            }
            Command::Donate { cause_id, amount } => {
                self.donate(cause_id.as_deref(), amount.as_deref())
                    .await
                    .message()
            }
            Command::Name(name) => {
                self.profile.display_name = name;
                self.render_profile()
            }
            Command::Personality(personality) => {
                self.profile.personality = personality;
                self.render_profile()
            }
            Command::Interests(raw) => {
                self.profile.set_interests(&raw);
                self.render_profile()
            }
            Command::Show => self.render(),
            Command::Help => HELP.to_string(),
            Command::Quit => return Flow::Quit,
        };
        Flow::Continue(reply)
    }

    fn toggle(&self, wanted: Option<bool>, camera: bool) -> String {
        let Some(session) = self.call_session() else {
            return "No active call.".to_string();
        };
        let (label, current) = if camera {
            ("Camera", session.camera_enabled())
        } else {
            ("Mic", session.mic_enabled())
        };
        let enabled = wanted.unwrap_or(!current);
        let applied = if camera {
            session.set_camera(enabled)
        } else {
            session.set_mic(enabled)
        };
        if applied {
            format!("{label} {}", on_off(enabled))
        } else {
            format!("{label} unavailable ({})", session.state())
        }
    }

    // ---- rendering ----

    /// Text rendering of the current view.
    pub fn render(&self) -> String {
        match self.state.active_view {
            View::Experts => self.render_experts(),
            View::Chat => self.render_chat(),
            View::AudioCall | View::VideoCall => self.render_call(),
            View::Donate => self.render_donate(),
            View::Profile => self.render_profile(),
        }
    }

    fn render_experts(&self) -> String {
        let mut out = format!(
            "Scientists (search: {:?}, type: {})\n",
            self.filter.query, self.filter.tag
        );
        let experts = self.visible_experts();
        if experts.is_empty() {
            out.push_str("  no matches\n");
        }
        for expert in experts {
            let _ = writeln!(
                out,
                "  [{}] {} ({}) | {} | {}",
                expert.id,
                expert.name,
                expert.initials(),
                expert.field,
                expert.personality
            );
            let _ = writeln!(out, "      {}", expert.bio);
            let causes: Vec<&str> = self
                .store
                .causes_for(expert)
                .into_iter()
                .map(|c| c.name.as_str())
                .collect();
            if !causes.is_empty() {
                let _ = writeln!(out, "      supports: {}", causes.join(", "));
            }
        }
        out
    }

    fn render_chat(&self) -> String {
        let expert = self
            .state
            .selected_expert_id
            .as_deref()
            .and_then(|id| self.store.find_expert(id).ok());
        let (title, counterpart) = match expert {
            Some(e) => (
                format!("{} | {} | {}", e.name, e.field, e.personality),
                e.name.as_str(),
            ),
            None => ("General Chat".to_string(), "SciConnect"),
        };

        let mut out = format!("{title}\n");
        for message in self.current_messages().unwrap_or_default() {
            let who = match message.sender {
                Sender::Me => "me",
                Sender::Other => counterpart,
            };
            let _ = writeln!(
                out,
                "  [{}] {}: {}",
                message.sent_at.format("%H:%M"),
                who,
                message.text
            );
        }
        out
    }

    fn render_call(&self) -> String {
        let Some(session) = self.call_session() else {
            return "No active call.".to_string();
        };
        let title = if session.kind().includes_video() {
            "Video Call (preview)"
        } else {
            "Audio Call (preview)"
        };
        let mut out = format!("{title} [{}]\n", session.state());
        if session.state() == SessionState::Acquiring {
            out.push_str("  waiting for camera/microphone permission...\n");
            return out;
        }
        let _ = write!(out, "  mic: {}", on_off(session.mic_enabled()));
        if session.kind().includes_video() {
            let _ = write!(out, "  camera: {}", on_off(session.camera_enabled()));
        }
        out.push('\n');
        if let Some(notice) = session.notice() {
            let _ = writeln!(out, "  {notice}");
        }
        out
    }

    fn render_donate(&self) -> String {
        let mut out = format!(
            "Donate ({}, default {} to {})\n",
            self.donations.currency(),
            self.config.donation.default_amount,
            self.config.donation.default_cause
        );
        for cause in self.store.list_causes() {
            let _ = writeln!(
                out,
                "  [{}] {}: {} ({})",
                cause.id, cause.name, cause.description, cause.impact
            );
        }
        out
    }

    fn render_profile(&self) -> String {
        format!(
            "Profile\n  name: {}\n  type: {}\n  interests: {}\n",
            self.profile.display_name,
            self.profile.personality,
            self.profile.interests.join(", ")
        )
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use sciconnect_donation::MockPaymentProvider;
    use sciconnect_media::{DevicePolicy, MockMediaDevices};

    fn app(devices: &MockMediaDevices) -> App<MockMediaDevices> {
        App::new(
            SciConnectConfig::default(),
            DirectoryStore::seeded(),
            devices.clone(),
            Arc::new(MockPaymentProvider::new()),
        )
    }

    async fn run(app: &mut App<MockMediaDevices>, line: &str) -> String {
        match app.dispatch(line.parse().unwrap()).await {
            Flow::Continue(out) => out,
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_starts_on_experts_with_full_catalog() {
        let devices = MockMediaDevices::default();
        let app = app(&devices);
        assert_eq!(app.state().active_view, View::Experts);
        assert_eq!(app.visible_experts().len(), 4);
        assert!(app.render().contains("[s1]"));
    }

    #[tokio::test]
    async fn test_search_from_other_view_returns_to_experts() {
        let devices = MockMediaDevices::default();
        let mut app = app(&devices);
        run(&mut app, "go profile").await;
        let out = run(&mut app, "search climate").await;
        assert_eq!(app.state().active_view, View::Experts);
        assert!(out.contains("[s3]"));
        assert!(!out.contains("[s1]"));
    }

    #[tokio::test]
    async fn test_start_chat_unknown_expert_keeps_state() {
        let devices = MockMediaDevices::default();
        let mut app = app(&devices);
        let out = run(&mut app, "chat s42").await;
        assert!(out.contains("s42"));
        assert_eq!(app.state(), &AppState::default());
        assert_eq!(app.chat().thread_count(), 0);
    }

    #[tokio::test]
    async fn test_say_outside_chat_is_refused() {
        let devices = MockMediaDevices::default();
        let mut app = app(&devices);
        let out = run(&mut app, "say hello").await;
        assert!(out.starts_with("Open a chat"));
        assert_eq!(app.chat().thread_count(), 0);
    }

    #[tokio::test]
    async fn test_general_chat_without_selection() {
        let devices = MockMediaDevices::default();
        let mut app = app(&devices);
        let out = run(&mut app, "chat").await;
        assert!(out.starts_with("General Chat"));
        assert_eq!(app.chat().active_key(), Some(ThreadKey::General));
    }

    #[tokio::test]
    async fn test_entering_and_leaving_call_view() {
        let devices = MockMediaDevices::new(DevicePolicy::Grant);
        let mut app = app(&devices);

        run(&mut app, "go video").await;
        assert!(app.call_pending());
        assert_eq!(app.call_settled().await, Some(SessionState::Live));
        assert!(!app.call_pending());
        let session = app.call_session().cloned().unwrap();
        assert!(session.is_live());
        assert_eq!(devices.live_tracks(), 2);

        run(&mut app, "go donate").await;
        assert!(app.call_session().is_none());
        assert!(app.media().active().is_none());
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(devices.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_call_view_renders_while_acquiring() {
        let devices = MockMediaDevices::new(DevicePolicy::Grant);
        let mut app = app(&devices);

        let out = run(&mut app, "go call").await;
        assert!(out.contains("Audio Call (preview) [Acquiring]"));
        assert!(out.contains("waiting for camera/microphone permission"));
        assert_eq!(run(&mut app, "mic off").await, "Mic unavailable (Acquiring)");

        app.call_settled().await;
        assert!(run(&mut app, "show").await.contains("[Live]"));
        assert_eq!(app.call_settled().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_before_grant_releases_devices() {
        let devices = MockMediaDevices::with_latency(DevicePolicy::Grant, Duration::from_secs(5));
        let mut app = app(&devices);

        let out = tokio::time::timeout(Duration::from_millis(100), run(&mut app, "go video"))
            .await
            .unwrap();
        assert!(out.contains("[Acquiring]"));
        let session = app.call_session().cloned().unwrap();

        run(&mut app, "go donate").await;
        assert!(!app.call_pending());
        assert!(app.media().active().is_none());
        assert_eq!(session.state(), SessionState::Closed);

        tokio::time::sleep(Duration::from_secs(10)).await;
        // The grant still arrived, and was released on arrival.
        assert_eq!(devices.issued_tracks().len(), 2);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(devices.live_tracks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_settle_keeps_acquisition() {
        let devices = MockMediaDevices::with_latency(DevicePolicy::Grant, Duration::from_secs(1));
        let mut app = app(&devices);
        run(&mut app, "go call").await;

        let early = tokio::time::timeout(Duration::from_millis(100), app.call_settled()).await;
        assert!(early.is_err());
        assert!(app.call_pending());

        assert_eq!(app.call_settled().await, Some(SessionState::Live));
        assert_eq!(devices.live_tracks(), 1);
    }

    #[tokio::test]
    async fn test_same_call_view_keeps_session() {
        let devices = MockMediaDevices::new(DevicePolicy::Grant);
        let mut app = app(&devices);
        run(&mut app, "go call").await;
        app.call_settled().await;
        run(&mut app, "go call").await;
        assert!(!app.call_pending());
        assert_eq!(devices.acquisitions(), 1);
        assert!(app.call_session().unwrap().is_live());
    }

    #[tokio::test]
    async fn test_switching_audio_to_video_reacquires() {
        let devices = MockMediaDevices::new(DevicePolicy::Grant);
        let mut app = app(&devices);
        run(&mut app, "go call").await;
        app.call_settled().await;
        run(&mut app, "go video").await;
        app.call_settled().await;
        assert_eq!(devices.acquisitions(), 2);
        assert_eq!(devices.live_tracks(), 2);
        assert!(app.call_session().unwrap().kind().includes_video());
    }

    #[tokio::test]
    async fn test_mic_and_camera_commands() {
        let devices = MockMediaDevices::new(DevicePolicy::Grant);
        let mut app = app(&devices);
        run(&mut app, "go video").await;
        app.call_settled().await;

        assert_eq!(run(&mut app, "mic").await, "Mic off");
        assert_eq!(run(&mut app, "mic on").await, "Mic on");
        assert_eq!(run(&mut app, "camera off").await, "Camera off");
        assert_eq!(devices.acquisitions(), 1);

        run(&mut app, "go call").await;
        app.call_settled().await;
        assert_eq!(run(&mut app, "camera on").await, "Camera unavailable (Live)");
    }

    #[tokio::test]
    async fn test_denied_call_renders_notice() {
        let devices = MockMediaDevices::new(DevicePolicy::Deny);
        let mut app = app(&devices);
        run(&mut app, "go video").await;
        assert_eq!(app.call_settled().await, Some(SessionState::Degraded));
        let out = run(&mut app, "show").await;
        assert!(out.contains("[Degraded]"));
        assert!(out.contains("blocked"));
        assert_eq!(run(&mut app, "mic off").await, "Mic unavailable (Degraded)");
    }

    #[tokio::test]
    async fn test_end_call() {
        let devices = MockMediaDevices::new(DevicePolicy::Grant);
        let mut app = app(&devices);
        assert_eq!(run(&mut app, "end").await, "No active call.");

        run(&mut app, "go call").await;
        app.call_settled().await;
        assert_eq!(run(&mut app, "end").await, "Call ended.");
        assert_eq!(app.state().active_view, View::Chat);
        assert!(app.media().active().is_none());
        assert_eq!(devices.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_releases_call() {
        let devices = MockMediaDevices::new(DevicePolicy::Grant);
        let mut app = app(&devices);
        run(&mut app, "go video").await;
        app.call_settled().await;
        app.shutdown();
        app.shutdown();
        assert!(app.media().active().is_none());
        assert_eq!(devices.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_profile_commands() {
        let devices = MockMediaDevices::default();
        let mut app = app(&devices);
        run(&mut app, "name Sam").await;
        run(&mut app, "type intp").await;
        let out = run(&mut app, "interests oceans, , robotics").await;
        assert_eq!(app.profile().display_name, "Sam");
        assert_eq!(app.profile().interests, vec!["oceans", "robotics"]);
        assert!(out.contains("type: INTP"));
    }

    #[tokio::test]
    async fn test_donate_uses_defaults() {
        let devices = MockMediaDevices::default();
        let mut app = app(&devices);
        let out = run(&mut app, "donate").await;
        assert!(out.starts_with("Thank you! Donation complete: "));
    }

    #[tokio::test]
    async fn test_quit() {
        let devices = MockMediaDevices::default();
        let mut app = app(&devices);
        assert_eq!(app.dispatch(Command::Quit).await, Flow::Quit);
    }
}
