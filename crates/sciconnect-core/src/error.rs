use thiserror::Error;

/// Top-level error type for SciConnect.
///
/// Component crates define their own error enums and convert to and from this
/// type so `?` composes across crate boundaries. Nothing in this taxonomy is
/// fatal to the process; every failure stays with the action that caused it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SciConnectError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Payment error: {0}")]
    Payment(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SciConnectError {
    fn from(err: toml::de::Error) -> Self {
        SciConnectError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SciConnectError {
    fn from(err: toml::ser::Error) -> Self {
        SciConnectError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SciConnectError {
    fn from(err: serde_json::Error) -> Self {
        SciConnectError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for SciConnect operations.
pub type Result<T> = std::result::Result<T, SciConnectError>;
