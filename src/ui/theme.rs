use ratatui::style::{Color, Modifier, Style};

use crate::settings::{
    hex_to_rgb, Settings, ARGS_COLOR, BACKGROUND_COLOR, COMMAND_COLOR, OUTPUT_COLOR, PATH_COLOR,
    PROMPT_COLOR, TITLE_COLOR,
};

/// Console colors, built from the appearance settings
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub path: Color,
    pub prompt: Color,
    pub command: Color,
    pub args: Color,
    pub title: Color,
    pub background: Color,
    pub output: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn color(settings: &Settings, key: &str, fallback: Color) -> Color {
    hex_to_rgb(settings.get(key))
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(fallback)
}

impl Theme {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            path: color(settings, PATH_COLOR, Color::Gray),
            prompt: color(settings, PROMPT_COLOR, Color::White),
            command: color(settings, COMMAND_COLOR, Color::Red),
            args: color(settings, ARGS_COLOR, Color::Gray),
            title: color(settings, TITLE_COLOR, Color::Red),
            background: color(settings, BACKGROUND_COLOR, Color::Reset),
            output: color(settings, OUTPUT_COLOR, Color::White),
            muted: Color::Rgb(108, 112, 134), // overlay #6c7086
        }
    }

    /// Base style of the whole console
    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.output)
    }

    pub fn normal(&self) -> Style {
        Style::default().fg(self.output)
    }

    pub fn path(&self) -> Style {
        Style::default().fg(self.path)
    }

    pub fn prompt(&self) -> Style {
        Style::default().fg(self.prompt)
    }

    pub fn command(&self) -> Style {
        Style::default().fg(self.command)
    }

    pub fn args(&self) -> Style {
        Style::default().fg(self.args)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.path)
    }

    /// Lines starting with `Error:`
    pub fn error(&self) -> Style {
        Style::default().fg(self.command).add_modifier(Modifier::BOLD)
    }
}

/// Spinner frames for loading animation
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Marker in front of the now playing title
pub const PLAY: &str = "▶";
