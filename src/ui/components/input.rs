use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::ui::theme::Theme;

/// Command line editor with recall of submitted lines
pub struct Input {
    value: String,
    /// Cursor position, in chars
    cursor: usize,
    /// Submitted lines, oldest first
    recall: Vec<String>,
    /// Position while browsing `recall`
    recall_index: Option<usize>,
}

impl Input {
    pub fn new() -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            recall: Vec::new(),
            recall_index: None,
        }
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
        self.recall_index = None;
    }

    fn set(&mut self, value: String) {
        self.cursor = value.chars().count();
        self.value = value;
    }

    fn recall_previous(&mut self) {
        if self.recall.is_empty() {
            return;
        }
        let index = match self.recall_index {
            Some(0) => 0,
            Some(i) => i - 1,
            None => self.recall.len() - 1,
        };
        self.recall_index = Some(index);
        self.set(self.recall[index].clone());
    }

    fn recall_next(&mut self) {
        match self.recall_index {
            Some(i) if i + 1 < self.recall.len() => {
                self.recall_index = Some(i + 1);
                self.set(self.recall[i + 1].clone());
            }
            Some(_) => self.clear(),
            None => {}
        }
    }

    /// Handle an editing key. Returns the line when Enter is pressed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        match key.code {
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.value);
                self.cursor = 0;
                self.recall_index = None;
                if !line.trim().is_empty() && self.recall.last() != Some(&line) {
                    self.recall.push(line.clone());
                }
                return Some(line);
            }
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Up => self.recall_previous(),
            KeyCode::Down => self.recall_next(),
            KeyCode::Esc => self.clear(),
            _ => {}
        }
        None
    }

    /// The input as spans with a block cursor, command word and arguments colored apart
    pub fn spans(&self, theme: &Theme) -> Vec<Span<'static>> {
        let split = self.value.find(char::is_whitespace).unwrap_or(self.value.len());
        let cursor_at = self.byte_index(self.cursor);

        let mut spans = Vec::new();
        let mut push = |text: &str, style: Style| {
            if !text.is_empty() {
                spans.push(Span::styled(text.to_string(), style));
            }
        };

        let (before, after) = self.value.split_at(cursor_at);
        let cursor_char = after.chars().next().unwrap_or(' ');
        let rest = if after.is_empty() {
            ""
        } else {
            &after[cursor_char.len_utf8()..]
        };

        let style_at = |offset: usize| {
            if offset < split {
                theme.command()
            } else {
                theme.args()
            }
        };

        // Before the cursor, split at the end of the command word
        let cut = split.min(before.len());
        push(&before[..cut], theme.command());
        push(&before[cut..], theme.args());
        push(
            &cursor_char.to_string(),
            style_at(cursor_at).add_modifier(Modifier::REVERSED),
        );
        let rest_start = cursor_at + if after.is_empty() { 0 } else { cursor_char.len_utf8() };
        let cut = split.saturating_sub(rest_start).min(rest.len());
        push(&rest[..cut], theme.command());
        push(&rest[cut..], theme.args());

        spans
    }

    pub fn line(&self, prompt: Vec<Span<'static>>, theme: &Theme) -> Line<'static> {
        let mut spans = prompt;
        spans.extend(self.spans(theme));
        Line::from(spans)
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
