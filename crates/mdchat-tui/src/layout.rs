//! Layout helpers for the chat window.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Height of the input bar including its border.
pub const INPUT_HEIGHT: u16 = 3;

/// Areas of the chat window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub messages: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Split the window into message list, input bar and status bar.
pub fn chat_layout(area: Rect) -> ChatLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);
    ChatLayout {
        messages: chunks[0],
        input: chunks[1],
        status: chunks[2],
    }
}

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
