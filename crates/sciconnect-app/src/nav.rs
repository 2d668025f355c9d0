//! Navigation state: which view is shown and which expert is selected.
//!
//! Transitions are pure; they take a state and return the next one. Side
//! effects of entering or leaving a view belong to `App`.

use std::fmt;
use std::str::FromStr;

use sciconnect_core::error::SciConnectError;
use sciconnect_core::types::CaptureKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Experts,
    Chat,
    AudioCall,
    VideoCall,
    Donate,
    Profile,
}

impl View {
    /// Views in navigation-bar order.
    pub const ALL: [View; 6] = [
        View::Experts,
        View::Chat,
        View::AudioCall,
        View::VideoCall,
        View::Donate,
        View::Profile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Experts => "scientists",
            View::Chat => "chat",
            View::AudioCall => "call",
            View::VideoCall => "video",
            View::Donate => "donate",
            View::Profile => "profile",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Experts => "Scientists",
            View::Chat => "Chat",
            View::AudioCall => "Call",
            View::VideoCall => "Video",
            View::Donate => "Donate",
            View::Profile => "Profile",
        }
    }

    /// The capture a view needs while it is shown, if any.
    pub fn call_kind(&self) -> Option<CaptureKind> {
        match self {
            View::AudioCall => Some(CaptureKind::Audio),
            View::VideoCall => Some(CaptureKind::Video),
            _ => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = SciConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scientists" | "experts" => Ok(View::Experts),
            "chat" => Ok(View::Chat),
            "call" | "audio" => Ok(View::AudioCall),
            "video" => Ok(View::VideoCall),
            "donate" => Ok(View::Donate),
            "profile" => Ok(View::Profile),
            other => Err(SciConnectError::InvalidInput(format!("unknown view: {other}"))),
        }
    }
}

/// What the shell is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub active_view: View,
    pub selected_expert_id: Option<String>,
}

impl AppState {
    /// Switch views, keeping the selected expert.
    pub fn navigate(self, view: View) -> Self {
        Self {
            active_view: view,
            ..self
        }
    }

    /// Select an expert and open their chat.
    pub fn start_chat(self, expert_id: impl Into<String>) -> Self {
        Self {
            active_view: View::Chat,
            selected_expert_id: Some(expert_id.into()),
        }
    }

    pub fn in_call(&self) -> bool {
        self.active_view.call_kind().is_some()
    }
}
