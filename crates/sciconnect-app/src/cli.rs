//! CLI argument definitions for the SciConnect shell.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;

use sciconnect_core::config::SciConnectConfig;

/// SciConnect: find scientists, chat, preview calls and donate to causes.
#[derive(Parser, Debug)]
#[command(name = "sciconnect", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Delay before the mock reply, in milliseconds.
    #[arg(long = "reply-delay-ms")]
    pub reply_delay_ms: Option<u64>,

    /// JSON catalog to load instead of the built-in one.
    #[arg(long = "catalog")]
    pub catalog: Option<PathBuf>,

    /// Deny every camera/microphone request.
    #[arg(long = "deny-media")]
    pub deny_media: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SCICONNECT_CONFIG env var > ~/.sciconnect/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SCICONNECT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > SCICONNECT_LOG env var > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(level) = std::env::var("SCICONNECT_LOG") {
            if !level.trim().is_empty() {
                return level;
            }
        }
        config_level.to_string()
    }

    /// Fold flag overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut SciConnectConfig) {
        if let Some(ms) = self.reply_delay_ms {
            config.chat.reply_delay_ms = ms;
        }
        if let Some(ref path) = self.catalog {
            config.directory.catalog_path = Some(path.to_string_lossy().to_string());
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".sciconnect").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".sciconnect").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("sciconnect").chain(argv.iter().copied()))
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let cli = args(&["--config", "/tmp/sc.toml"]);
        assert_eq!(cli.resolve_config_path(), PathBuf::from("/tmp/sc.toml"));
    }

    #[test]
    fn test_log_level_flag_wins_over_config() {
        let cli = args(&["-l", "trace"]);
        assert_eq!(cli.resolve_log_level("warn"), "trace");
    }

    #[test]
    fn test_overrides_applied() {
        let cli = args(&["--reply-delay-ms", "50", "--catalog", "/data/catalog.json"]);
        let mut config = SciConnectConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.chat.reply_delay_ms, 50);
        assert_eq!(
            config.directory.catalog_path.as_deref(),
            Some("/data/catalog.json")
        );
    }

    #[test]
    fn test_no_overrides_leave_config_alone() {
        let cli = args(&[]);
        assert!(!cli.deny_media);
        let mut config = SciConnectConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.chat.reply_delay_ms, 600);
        assert!(config.directory.catalog_path.is_none());
    }
}
