//! Top-level rendering of the chat window.
//!
//! ```text
//! ╭ Markdown Chatbot ──────────────────────────╮
//! │ messages (scrolls, follows newest)         │
//! │╭ Message ─────────────────────────────────╮│
//! ││> Type your message...            Send ⏎ ││
//! │╰──────────────────────────────────────────╯│
//! │ IDLE  Enter send  ...                 0/0 │
//! ╰────────────────────────────────────────────╯
//! ```

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph, StatefulWidget, Widget},
};

use crate::app::App;
use crate::layout::{centered_fixed, chat_layout};
use crate::theme::Theme;
use crate::widgets::{InputBar, KeyHint, MessageList, StatusBar};

/// Window title.
pub const TITLE: &str = "Markdown Chatbot";

const IDLE_HINTS: [KeyHint; 4] = [
    KeyHint::new("Enter", "send"),
    KeyHint::new("^Y", "copy"),
    KeyHint::new("F1", "help"),
    KeyHint::new("^C", "quit"),
];

const STREAMING_HINTS: [KeyHint; 2] = [KeyHint::new("Esc", "stop"), KeyHint::new("^C", "quit")];

const HELP_TEXT: &str = "
  Chat
    Enter             Send message
    Esc               Stop reply / clear input / quit
    Up/Down           Input history
    Ctrl+Y            Copy last reply

  Scrolling
    PgUp/PgDn         Page through messages
    Mouse wheel       Scroll
    End               Follow newest message

  F1 toggles this help, Ctrl+C quits
";

/// Render the whole chat window.
pub fn render(app: &mut App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title(format!(" {TITLE} "))
        .title_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_set(app.theme.border_set)
        .border_style(Style::default().fg(app.theme.border))
        .style(Style::default().bg(app.theme.base));

    let inner = block.inner(area);
    block.render(area, buf);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let layout = chat_layout(inner);
    let streaming = app.is_streaming();

    MessageList::new(app.conversation.messages(), &app.theme).render(
        layout.messages,
        buf,
        &mut app.scroll,
    );

    InputBar::new(&app.input, &app.theme)
        .enabled(!streaming)
        .render(layout.input, buf);

    render_status(app, streaming, layout.status, buf);

    if app.show_help {
        render_help_overlay(&app.theme, area, buf);
    }
}

fn render_status(app: &App, streaming: bool, area: Rect, buf: &mut Buffer) {
    let (mode, hints) = if streaming {
        ("STREAMING", STREAMING_HINTS.to_vec())
    } else {
        ("IDLE", IDLE_HINTS.to_vec())
    };

    let right = if let Some(notice) = &app.notice {
        Span::styled(notice.clone(), Style::default().fg(app.theme.warning))
    } else if let Some((revealed, total)) = app.conversation.reveal_progress() {
        Span::styled(
            format!("{revealed}/{total}"),
            Style::default().fg(app.theme.info),
        )
    } else {
        let count = app.conversation.messages().len();
        Span::styled(
            format!("{count} messages"),
            Style::default().fg(app.theme.subtext),
        )
    };

    StatusBar::new(mode, &app.theme)
        .hints(hints)
        .right(right)
        .render(area, buf);
}

/// Render the key binding overlay centered in `area`.
#[allow(clippy::cast_possible_truncation)]
pub fn render_help_overlay(theme: &Theme, area: Rect, buf: &mut Buffer) {
    let width = 52.min(area.width.saturating_sub(4));
    let height = (HELP_TEXT.lines().count() as u16 + 2).min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_set(theme.border_set)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().fg(theme.text).bg(theme.surface));

    Paragraph::new(HELP_TEXT).block(block).render(overlay_area, buf);
}
