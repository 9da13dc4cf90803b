//! Event handling for the mdchat TUI.

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// Text was pasted (bracketed paste).
    Paste(String),
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Event handler that polls the terminal on a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a new event handler polling every `poll_ms` milliseconds.
    pub fn new(poll_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        // Crossterm polling is blocking, so it gets its own thread
        std::thread::spawn(move || {
            let poll_rate = Duration::from_millis(poll_ms);
            while !tx.is_closed() {
                if !event::poll(poll_rate).unwrap_or(false) {
                    continue;
                }
                let Ok(evt) = event::read() else {
                    continue;
                };
                let event = match evt {
                    CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                        Some(Event::Key(key))
                    }
                    CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                    CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
                    CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                    _ => None,
                };
                if let Some(e) = event {
                    if tx.send(e).is_err() {
                        break;
                    }
                }
            }
        });

        Self { rx }
    }

    /// Get the next event, waiting until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Action produced by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Toggle the help overlay.
    Help,
    /// Submit the input field.
    Submit,
    /// Close help, stop the reveal, clear the input, or quit.
    Cancel,
    /// Copy the newest reply to the clipboard.
    Copy,
    /// Type a character.
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    HistoryPrev,
    HistoryNext,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    /// Jump to the newest message and follow.
    ScrollBottom,
    None,
}

/// Convert a key event to an action.
pub fn key_to_action(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'q') => Action::Quit,
            KeyCode::Char('y') => Action::Copy,
            KeyCode::End => Action::ScrollBottom,
            KeyCode::Up => Action::ScrollUp,
            KeyCode::Down => Action::ScrollDown,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Cancel,
        KeyCode::F(1) => Action::Help,
        KeyCode::Char(c) => Action::Insert(c),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::Up => Action::HistoryPrev,
        KeyCode::Down => Action::HistoryNext,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_plain_chars_are_typed() {
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::Insert('q'));
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Action::Insert('A')
        );
    }

    #[test]
    fn test_control_shortcuts() {
        assert_eq!(key_to_action(ctrl('c')), Action::Quit);
        assert_eq!(key_to_action(ctrl('q')), Action::Quit);
        assert_eq!(key_to_action(ctrl('y')), Action::Copy);
        assert_eq!(key_to_action(ctrl('l')), Action::None);
        assert_eq!(key_to_action(ctrl('x')), Action::None);
    }

    #[test]
    fn test_submit_and_cancel() {
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Submit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Cancel);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::HistoryPrev);
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::PageUp);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Up, KeyModifiers::CONTROL)),
            Action::ScrollUp
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::End, KeyModifiers::CONTROL)),
            Action::ScrollBottom
        );
    }
}
