//! Status bar widget.
//!
//! Format: ` MODE  key label  key label ...          right text `

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::Theme;

/// A key hint for the status bar.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Status bar widget displayed at the bottom of the screen.
#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: Vec<KeyHint>,
    right_text: Option<Span<'a>>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new(mode: &'a str, theme: &'a Theme) -> Self {
        Self {
            mode,
            hints: Vec::new(),
            right_text: None,
            theme,
        }
    }

    /// Add key hints.
    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    /// Set right-aligned text.
    #[must_use]
    pub fn right(mut self, text: impl Into<Span<'a>>) -> Self {
        self.right_text = Some(text.into());
        self
    }
}

impl Widget for StatusBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let bar = Style::default().fg(self.theme.text).bg(self.theme.surface);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), bar);

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.mode),
                Style::default()
                    .fg(self.theme.base)
                    .bg(self.theme.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ", bar),
        ];

        let key_style = Style::default()
            .fg(self.theme.text)
            .bg(self.theme.overlay)
            .add_modifier(Modifier::BOLD);
        for hint in &self.hints {
            spans.push(Span::styled(format!(" {} ", hint.key), key_style));
            spans.push(Span::styled(format!(" {} ", hint.label), bar));
        }

        let left_line = Line::from(spans);
        buf.set_line(area.x, area.y, &left_line, area.width);

        // Right-aligned text drawn over the hints if the bar is narrow
        if let Some(text) = self.right_text {
            let text_len = text.width() as u16;
            if text_len < area.width {
                let x = area.x + area.width - text_len - 1;
                let style = bar.patch(text.style);
                buf.set_string(x, area.y, text.content.as_ref(), style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_status_bar_renders_mode_hints_and_right_text() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        StatusBar::new("IDLE", &theme)
            .hints(vec![KeyHint::new("Enter", "send")])
            .right("12/40")
            .render(area, &mut buf);

        let text = buffer_to_string(&buf);
        assert!(text.starts_with(" IDLE "));
        assert!(text.contains("Enter"));
        assert!(text.contains("send"));
        assert!(text.ends_with("12/40"));
    }

    #[test]
    fn test_status_bar_zero_height() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 10, 0);
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        StatusBar::new("X", &theme).render(area, &mut buf);
        assert_eq!(buffer_to_string(&buf), "");
    }
}
