use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SciConnectError};

/// Top-level configuration for the SciConnect client.
///
/// Loaded from `~/.sciconnect/config.toml` by default. Every section is
/// optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SciConnectConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub donation: DonationConfig,
}

impl SciConnectConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SciConnectConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SciConnectError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Where the expert and cause catalog comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// JSON catalog file. The built-in seed catalog is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
}

/// What happens to a pending mock reply once its thread is no longer shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundReplyPolicy {
    /// The reply still lands in the thread it was issued for.
    #[default]
    Deliver,
    /// Switching threads cancels the previous thread's pending replies.
    Suppress,
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Delay before the mock responder acknowledges a message.
    pub reply_delay_ms: u64,
    /// First message of every new thread.
    pub greeting: String,
    /// Text of the mock acknowledgement.
    pub acknowledgement: String,
    /// Upper bound on a single outgoing message, in characters.
    pub max_message_chars: usize,
    pub background_replies: BackgroundReplyPolicy,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 600,
            greeting: "Hi! I'm here to answer your questions about science.".to_string(),
            acknowledgement: "Thanks! I'll get back to you shortly.".to_string(),
            max_message_chars: 4000,
            background_replies: BackgroundReplyPolicy::Deliver,
        }
    }
}

/// Call preview settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// How long to wait for the platform to grant or deny capture.
    pub acquire_timeout_ms: u64,
    /// Microphone state right after a successful acquisition.
    pub mic_on_by_default: bool,
    /// Camera state right after a successful video acquisition.
    pub camera_on_by_default: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: 10_000,
            mic_on_by_default: true,
            camera_on_by_default: true,
        }
    }
}

/// Donation checkout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DonationConfig {
    /// Payment provider client id ("test" targets the sandbox).
    pub client_id: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Cause preselected on the donate view.
    pub default_cause: String,
    /// Amount prefilled on the donate view.
    pub default_amount: String,
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            client_id: "test".to_string(),
            currency: "USD".to_string(),
            default_cause: "c1".to_string(),
            default_amount: "25".to_string(),
        }
    }
}
