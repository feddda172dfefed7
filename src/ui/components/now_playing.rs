use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::shell::PlayRequest;
use crate::ui::theme::{Theme, PLAY};

/// Panel describing the last play request
pub struct NowPlaying;

impl NowPlaying {
    /// Rows the panel needs, borders included
    pub const HEIGHT: u16 = 5;

    pub fn render(frame: &mut Frame, area: Rect, request: &PlayRequest, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border())
            .style(theme.base())
            .title(Span::styled(" Now playing ", theme.title()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width < 10 || inner.height == 0 {
            return;
        }
        let width = inner.width as usize;

        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{} ", PLAY), theme.title()),
                Span::styled(truncate_str(&request.title, width - 2), theme.normal()),
                Span::styled(format!("  via {}", request.provider), theme.muted()),
            ]),
            Line::from(Span::styled(truncate_str(&request.url, width), theme.path())),
            Line::from(Span::styled(
                truncate_str("Ctrl-N next episode  |  tgl hides this panel", width),
                theme.muted(),
            )),
        ];

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Truncate to `max` chars, marking the cut with an ellipsis
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max == 0 {
        String::new()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Breaking Bad", 20), "Breaking Bad");
        assert_eq!(truncate_str("Breaking Bad", 6), "Break…");
        assert_eq!(truncate_str("Amélie", 3), "Am…");
        assert_eq!(truncate_str("x", 0), "");
    }
}
