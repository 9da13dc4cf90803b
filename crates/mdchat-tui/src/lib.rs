//! mdchat-tui: Terminal UI for the mdchat markdown chat window
//!
//! This crate provides the interactive layer on top of `mdchat-engine`:
//! - A scrollable message list rendering replies as markdown
//! - An input bar with history
//! - A status bar showing reveal progress
//! - The event loop that drives reveals from a fixed-interval ticker

mod app;
mod event;
mod layout;
#[cfg(test)]
pub mod test_utils;
pub mod text;
pub mod theme;
mod view;
pub mod widgets;

pub use app::App;
pub use event::{key_to_action, Action, Event, EventHandler};
pub use mdchat_engine;
pub use theme::Theme;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mdchat_engine::{ChatConfig, RevealTicker};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use tracing::info;

/// Terminal poll interval for the event thread, in milliseconds.
const EVENT_POLL_MS: u64 = 100;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the chat window.
///
/// Sets up the terminal, runs the event loop until the user quits, and
/// restores the terminal on exit, including on error.
pub async fn run_tui(config: &ChatConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let mut events = EventHandler::new(EVENT_POLL_MS);
    let mut ticker = RevealTicker::new(config.reveal_interval());

    info!(
        interval_ms = config.reveal_interval_ms,
        theme = ?config.theme,
        "chat window opened"
    );

    let result = run_loop(&mut terminal, &mut app, &mut events, &mut ticker).await;

    info!(
        messages = app.conversation.messages().len(),
        "chat window closed"
    );

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

/// Draw, then wait for whichever comes first: a terminal event or, while
/// a reply is streaming, the next reveal tick.
async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    ticker: &mut RevealTicker,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            view::render(app, area, frame.buffer_mut());
        })?;

        if app.should_quit {
            app.conversation.cancel();
            break;
        }

        tokio::select! {
            event = events.next() => {
                let Some(event) = event else {
                    break;
                };
                app.handle_event(event);
                if app.take_reveal_started() {
                    ticker.reset();
                }
            }
            () = ticker.tick(), if app.is_streaming() => {
                app.on_reveal_tick();
            }
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
