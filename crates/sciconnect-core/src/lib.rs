pub mod config;
pub mod error;
pub mod types;

pub use config::SciConnectConfig;
pub use error::{Result, SciConnectError};
pub use types::*;
