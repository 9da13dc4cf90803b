//! Scrollable message list.
//!
//! User messages are right-aligned plain text bubbles. Assistant messages
//! are left-aligned behind a gutter and rendered as markdown, re-rendered
//! from scratch on every frame so a growing prefix always shows its
//! current best-effort formatting.

use mdchat_engine::{Message, MessageStatus};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};

use crate::text::{display_width, render_markdown, wrap_lines, wrap_text};
use crate::theme::Theme;

/// Lines scrolled per mouse wheel tick.
pub const SCROLL_STEP: usize = 3;

/// Glyph appended to a reply that is still being revealed.
const REVEAL_CURSOR: &str = "▌";

const GUTTER: &str = "▎ ";

/// Scroll position of the message list.
///
/// While following, the view stays pinned to the newest line. The app
/// calls [`ScrollState::follow`] whenever the messages change.
#[derive(Debug, Clone)]
pub struct ScrollState {
    offset: usize,
    follow: bool,
    /// Largest valid offset, as of the last render.
    max_offset: usize,
    /// Visible rows, as of the last render.
    viewport: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollState {
    /// Create a scroll state in follow mode.
    pub fn new() -> Self {
        Self {
            offset: 0,
            follow: true,
            max_offset: 0,
            viewport: 0,
        }
    }

    /// Index of the first visible line.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Check if follow mode is enabled.
    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Pin the view to the newest content.
    pub fn follow(&mut self) {
        self.follow = true;
        self.offset = self.max_offset;
    }

    /// Scroll towards older content. Leaves follow mode.
    pub fn scroll_up(&mut self, lines: usize) {
        self.follow = false;
        self.offset = self.offset.saturating_sub(lines);
    }

    /// Scroll towards newer content. Re-enters follow mode at the bottom.
    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = (self.offset + lines).min(self.max_offset);
        if self.offset == self.max_offset {
            self.follow = true;
        }
    }

    /// Rows moved by one page.
    pub fn page(&self) -> usize {
        self.viewport.saturating_sub(1).max(1)
    }

    fn update(&mut self, total: usize, viewport: usize) {
        self.viewport = viewport;
        self.max_offset = total.saturating_sub(viewport);
        if self.follow {
            self.offset = self.max_offset;
        } else {
            self.offset = self.offset.min(self.max_offset);
        }
    }
}

/// Message list widget.
pub struct MessageList<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    /// Create a list over `messages`.
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self { messages, theme }
    }

    /// Lay out every message for the given width.
    pub fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            if message.is_user() {
                self.user_lines(message, width, &mut lines);
            } else {
                self.assistant_lines(message, width, &mut lines);
            }
        }
        lines
    }

    fn header(&self, message: &Message) -> Line<'static> {
        let muted = Style::default().fg(self.theme.muted);
        let time = message.sent_at.format("%H:%M").to_string();
        if message.is_user() {
            return Line::from(vec![
                Span::styled("You", Style::default().fg(self.theme.user_bubble)),
                Span::styled(format!(" · {time}"), muted),
            ])
            .alignment(Alignment::Right);
        }

        let mut spans = vec![
            Span::styled(
                "Assistant",
                Style::default()
                    .fg(self.theme.assistant_gutter)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" · {time}"), muted),
        ];
        match message.status {
            MessageStatus::Revealing => spans.push(Span::styled(" · typing", muted)),
            MessageStatus::Interrupted => spans.push(Span::styled(
                " · stopped",
                Style::default().fg(self.theme.warning),
            )),
            MessageStatus::Failed => spans.push(Span::styled(
                " · error",
                Style::default().fg(self.theme.error),
            )),
            MessageStatus::Complete => {}
        }
        Line::from(spans)
    }

    fn user_lines(&self, message: &Message, width: usize, out: &mut Vec<Line<'static>>) {
        out.push(self.header(message));
        let bubble_width = (width * 3 / 4).max(12).min(width).saturating_sub(2);
        let style = Style::default()
            .fg(self.theme.user_text)
            .bg(self.theme.user_bubble);
        for text in wrap_text(&message.text, bubble_width) {
            out.push(Line::from(Span::styled(format!(" {text} "), style)).alignment(Alignment::Right));
        }
    }

    fn assistant_lines(&self, message: &Message, width: usize, out: &mut Vec<Line<'static>>) {
        out.push(self.header(message));
        let inner = width.saturating_sub(display_width(GUTTER)).max(1);

        let mut body = if message.status == MessageStatus::Failed {
            let style = Style::default().fg(self.theme.error);
            wrap_text(&format!("⚠ {}", message.text), inner)
                .into_iter()
                .map(|t| Line::from(Span::styled(t, style)))
                .collect()
        } else {
            wrap_lines(render_markdown(&message.text, inner, self.theme), inner)
        };

        if message.is_revealing() {
            let cursor = Span::styled(REVEAL_CURSOR, Style::default().fg(self.theme.primary));
            match body.last_mut() {
                Some(last) if last.width() < inner => last.spans.push(cursor),
                _ => body.push(Line::from(cursor)),
            }
        }

        let gutter = Style::default().fg(self.theme.assistant_gutter);
        for line in body {
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            spans.push(Span::styled(GUTTER, gutter));
            spans.extend(line.spans);
            out.push(Line::from(spans).style(line.style));
        }
    }
}

impl StatefulWidget for MessageList<'_> {
    type State = ScrollState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut ScrollState) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let base = Style::default().bg(self.theme.base);

        if self.messages.is_empty() {
            state.update(0, area.height as usize);
            let hint = Line::from(Span::styled(
                "No messages yet. Type below and press Enter.",
                Style::default().fg(self.theme.muted),
            ))
            .alignment(Alignment::Center);
            let y = area.y + area.height / 2;
            Paragraph::new(hint)
                .style(base)
                .render(Rect::new(area.x, y, area.width, 1), buf);
            return;
        }

        let lines = self.build_lines(area.width as usize);
        state.update(lines.len(), area.height as usize);

        let visible: Vec<Line<'static>> = lines
            .into_iter()
            .skip(state.offset())
            .take(area.height as usize)
            .collect();
        Paragraph::new(visible).style(base).render(area, buf);
    }
}
