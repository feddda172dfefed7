use std::time::{Duration, Instant};

use ratatui::text::{Line, Span};

use crate::ui::theme::{Theme, SPINNER_FRAMES};

/// Shown in place of the prompt while a command runs
pub struct Spinner {
    start_time: Instant,
    /// The command being run
    message: String,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            message: message.into(),
        }
    }

    fn current_frame(&self) -> &'static str {
        let elapsed = self.start_time.elapsed().as_millis();
        let frame_index = (elapsed / 80) as usize % SPINNER_FRAMES.len();
        SPINNER_FRAMES[frame_index]
    }

    /// Elapsed seconds, once the wait gets noticeable
    fn elapsed_string(&self) -> Option<String> {
        let elapsed = self.start_time.elapsed();
        (elapsed >= Duration::from_secs(2)).then(|| format!("{}s", elapsed.as_secs()))
    }

    pub fn line(&self, theme: &Theme) -> Line<'static> {
        let mut spans = vec![
            Span::styled(format!("{} ", self.current_frame()), theme.title()),
            Span::styled(self.message.clone(), theme.muted()),
        ];

        if let Some(elapsed) = self.elapsed_string() {
            spans.push(Span::styled(format!(" ({})", elapsed), theme.muted()));
        }

        Line::from(spans)
    }
}
