//! The command shell: parsing, navigation and command handlers

mod address;
mod command;
mod custom;
mod interpreter;
mod navigation;

pub use interpreter::Interpreter;

use crate::settings::Settings;

/// A request to open a playable URL
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub url: String,
    /// e.g. "The Matrix" or "Breaking Bad S2E5"
    pub title: String,
    pub provider: &'static str,
}

/// Side effect a command asks the presentation layer to perform
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Play(PlayRequest),
    Clear,
    TogglePlayer,
    /// Appearance settings changed
    ApplySettings(Settings),
}

/// Output of one command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub lines: Vec<String>,
    pub effect: Option<Effect>,
}

impl Response {
    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.effect.is_none()
    }

    pub fn play_request(&self) -> Option<&PlayRequest> {
        match &self.effect {
            Some(Effect::Play(request)) => Some(request),
            _ => None,
        }
    }
}
