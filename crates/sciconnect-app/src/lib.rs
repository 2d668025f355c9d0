//! Application shell for SciConnect.
//!
//! `nav` holds the pure navigation state, `command` the shell grammar and
//! `app` the composition of catalog, chat, media and donations.

pub mod app;
pub mod cli;
pub mod command;
pub mod nav;

pub use app::{App, Flow};
pub use command::Command;
pub use nav::{AppState, View};
