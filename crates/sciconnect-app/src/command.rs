//! Line-oriented commands for the interactive shell.

use std::str::FromStr;

use sciconnect_core::error::{Result, SciConnectError};
use sciconnect_core::types::{PersonalityType, TagFilter};

use crate::nav::View;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch to a view.
    Go(View),
    /// Set the directory search text; empty clears it.
    Search(String),
    Tag(TagFilter),
    /// Open the chat for an expert, or the current chat when `None`.
    Chat(Option<String>),
    Say(String),
    /// Set the mic, or flip it when `None`.
    Mic(Option<bool>),
    Camera(Option<bool>),
    /// End the current call.
    End,
    /// Donate to a cause; missing parts fall back to the configured defaults.
    Donate {
        cause_id: Option<String>,
        amount: Option<String>,
    },
    Name(String),
    Personality(PersonalityType),
    Interests(String),
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  go <scientists|chat|call|video|donate|profile>
  search [text]            filter scientists by name, field or bio
  tag <TYPE|all>           filter scientists by personality type
  chat [expert-id]         open a chat
  say <text>               send a message in the open chat
  mic [on|off]             toggle or set the microphone
  camera [on|off]          toggle or set the camera
  end                      end the current call
  donate [cause-id] [amount]
  name <text> | type <TYPE> | interests <a, b, c>
  show | help | quit";

fn switch(arg: &str) -> Result<Option<bool>> {
    match arg.to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "on" => Ok(Some(true)),
        "off" => Ok(Some(false)),
        other => Err(SciConnectError::InvalidInput(format!(
            "expected on or off, got: {other}"
        ))),
    }
}

fn required<'a>(verb: &str, arg: &'a str) -> Result<&'a str> {
    if arg.is_empty() {
        Err(SciConnectError::InvalidInput(format!("{verb} needs an argument")))
    } else {
        Ok(arg)
    }
}

impl FromStr for Command {
    type Err = SciConnectError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "go" => Command::Go(required(verb, rest)?.parse()?),
            "search" => Command::Search(rest.to_string()),
            "tag" => Command::Tag(rest.parse()?),
            "chat" => Command::Chat((!rest.is_empty()).then(|| rest.to_string())),
            "say" => Command::Say(rest.to_string()),
            "mic" => Command::Mic(switch(rest)?),
            "camera" | "cam" => Command::Camera(switch(rest)?),
            "end" | "hangup" => Command::End,
            "donate" => {
                let mut parts = rest.split_whitespace();
                Command::Donate {
                    cause_id: parts.next().map(str::to_string),
                    amount: parts.next().map(str::to_string),
                }
            }
            "name" => Command::Name(required(verb, rest)?.to_string()),
            "type" => Command::Personality(required(verb, rest)?.parse()?),
            "interests" => Command::Interests(rest.to_string()),
            "show" | "ls" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => return Err(SciConnectError::InvalidInput("empty command".to_string())),
            other => {
                return Err(SciConnectError::InvalidInput(format!(
                    "unknown command: {other} (try help)"
                )))
            }
        };
        Ok(command)
    }
}
