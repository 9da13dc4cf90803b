//! Message entry field and send control.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use unicode_width::UnicodeWidthChar;

use crate::text::display_width;
use crate::theme::Theme;

/// Placeholder shown in an empty, enabled field.
pub const PLACEHOLDER: &str = "Type your message...";

/// Placeholder shown while a reply is streaming.
pub const WAITING_PLACEHOLDER: &str = "Waiting for reply...";

const PROMPT: &str = "> ";
const SEND_LABEL: &str = " Send ⏎ ";

/// State for the input field: content, cursor and submission history.
///
/// The cursor is a character index, never a byte offset.
#[derive(Debug, Clone)]
pub struct TextInputState {
    content: String,
    cursor: usize,
    history: Vec<String>,
    /// Position in history while browsing; `None` means editing fresh input.
    history_index: Option<usize>,
    /// Fresh input saved while browsing history.
    saved_input: String,
    history_limit: usize,
}

impl Default for TextInputState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self::with_history_limit(100)
    }

    /// Create an empty state keeping at most `limit` history entries.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            history: Vec::new(),
            history_index: None,
            saved_input: String::new(),
            history_limit: limit,
        }
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Submitted entries, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Check if a history entry is currently recalled.
    pub fn is_browsing_history(&self) -> bool {
        self.history_index.is_some()
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.history_index = None;
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor position. Newlines become spaces.
    pub fn insert_str(&mut self, s: &str) {
        let cleaned: String = s
            .chars()
            .filter(|c| *c != '\r')
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, &cleaned);
        self.cursor += cleaned.chars().count();
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Take the content, recording it in history, and clear the field.
    pub fn submit(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !content.trim().is_empty() && self.history_limit > 0 {
            self.history.push(content.clone());
            if self.history.len() > self.history_limit {
                let excess = self.history.len() - self.history_limit;
                self.history.drain(..excess);
            }
        }
        self.history_index = None;
        self.saved_input.clear();
        content
    }

    /// Navigate to previous history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let next = match self.history_index {
            None => {
                self.saved_input = self.content.clone();
                0
            }
            Some(i) if i + 1 < self.history.len() => i + 1,
            Some(_) => return,
        };
        self.history_index = Some(next);
        self.content = self.history[self.history.len() - 1 - next].clone();
        self.move_end();
    }

    /// Navigate to next history entry, or back to the saved fresh input.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.history_index = None;
                self.content = std::mem::take(&mut self.saved_input);
                self.move_end();
            }
            Some(i) => {
                self.history_index = Some(i - 1);
                self.content = self.history[self.history.len() - i].clone();
                self.move_end();
            }
        }
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map_or(self.content.len(), |(i, _)| i)
    }
}

/// Input bar widget: bordered field with a send control on the right.
///
/// ```text
/// ╭ Message ─────────────────────────────╮
/// │> Type your message...       Send ⏎  │
/// ╰──────────────────────────────────────╯
/// ```
pub struct InputBar<'a> {
    state: &'a TextInputState,
    theme: &'a Theme,
    enabled: bool,
}

impl<'a> InputBar<'a> {
    /// Create an input bar for `state`.
    pub fn new(state: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            enabled: true,
        }
    }

    /// Set whether submission is currently allowed.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn content_line(&self, width: usize) -> Line<'static> {
        let text_style = Style::default().fg(self.theme.text);
        let cursor_style = text_style.add_modifier(Modifier::REVERSED);
        let mut spans = vec![Span::styled(
            PROMPT,
            Style::default().fg(if self.enabled {
                self.theme.primary
            } else {
                self.theme.muted
            }),
        )];

        if self.state.is_empty() {
            if self.enabled {
                spans.push(Span::styled(" ", cursor_style));
            }
            let placeholder = if self.enabled {
                PLACEHOLDER
            } else {
                WAITING_PLACEHOLDER
            };
            spans.push(Span::styled(placeholder, Style::default().fg(self.theme.muted)));
            return Line::from(spans);
        }

        // Keep the cursor in view by dropping characters from the left,
        // measured in terminal cells
        let chars: Vec<char> = self.state.content().chars().collect();
        let cursor = self.state.cursor();
        let room = width.saturating_sub(display_width(PROMPT)).max(1);
        let mut used = chars.get(cursor).map_or(1, |c| cell_width(*c));
        let mut start = cursor;
        while start > 0 {
            let w = cell_width(chars[start - 1]);
            if used + w > room {
                break;
            }
            used += w;
            start -= 1;
        }
        let before: String = chars[start..cursor].iter().collect();
        spans.push(Span::styled(before, text_style));

        match chars.get(cursor) {
            Some(ch) => {
                spans.push(Span::styled(ch.to_string(), cursor_style));
                let after: String = chars[cursor + 1..].iter().collect();
                spans.push(Span::styled(after, text_style));
            }
            None => spans.push(Span::styled(" ", cursor_style)),
        }
        Line::from(spans)
    }
}

fn cell_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

impl Widget for InputBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = Style::default().fg(if self.enabled {
            self.theme.border_focused
        } else {
            self.theme.border
        });
        let block = Block::default()
            .title(" Message ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_set(self.theme.border_set)
            .border_style(border_style)
            .style(Style::default().bg(self.theme.base));

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 1 || inner.width < 1 {
            return;
        }

        let send_width = SEND_LABEL.chars().count() as u16;
        let (field, button) = if inner.width > send_width + 8 {
            (
                Rect::new(inner.x, inner.y, inner.width - send_width, 1),
                Some(Rect::new(inner.x + inner.width - send_width, inner.y, send_width, 1)),
            )
        } else {
            (Rect::new(inner.x, inner.y, inner.width, 1), None)
        };

        Paragraph::new(self.content_line(field.width as usize)).render(field, buf);

        if let Some(button) = button {
            let style = if self.enabled {
                Style::default()
                    .fg(self.theme.base)
                    .bg(self.theme.primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted).bg(self.theme.surface)
            };
            buf.set_string(button.x, button.y, SEND_LABEL, style);
        }
    }
}
