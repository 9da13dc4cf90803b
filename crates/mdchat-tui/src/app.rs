//! Application state for the chat window.

use crossterm::event::MouseEventKind;
use mdchat_engine::{ChatConfig, ChatError, Conversation, IgnoreReason, SubmitOutcome, Tick};
use tracing::{debug, warn};

use crate::event::{key_to_action, Action, Event};
use crate::theme::Theme;
use crate::widgets::{ScrollState, TextInputState, SCROLL_STEP};

/// Application state.
#[derive(Debug)]
pub struct App {
    /// The conversation being shown.
    pub conversation: Conversation,

    /// Input field state.
    pub input: TextInputState,

    /// Message list scroll position.
    pub scroll: ScrollState,

    /// Active color theme.
    pub theme: Theme,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Whether the app should quit.
    pub should_quit: bool,

    /// Transient status message, cleared by the next key press.
    pub notice: Option<String>,

    /// Set when a reveal starts; consumed by the event loop.
    reveal_started: bool,

    /// Conversation revision the scroll position was last pinned to.
    seen_revision: u64,
}

impl App {
    /// Create a new app from `config`.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            conversation: Conversation::new(),
            input: TextInputState::with_history_limit(config.history_limit),
            scroll: ScrollState::new(),
            theme: Theme::from_name(config.theme),
            show_help: false,
            should_quit: false,
            notice: None,
            reveal_started: false,
            seen_revision: 0,
        }
    }

    /// Create an app with default settings, for tests.
    pub fn new_for_test() -> Self {
        Self::new(&ChatConfig::default())
    }

    /// Check if a reply is being revealed.
    pub fn is_streaming(&self) -> bool {
        self.conversation.is_streaming()
    }

    /// Returns `true` once after each submission that started a reveal.
    pub fn take_reveal_started(&mut self) -> bool {
        std::mem::take(&mut self.reveal_started)
    }

    /// Handle a terminal event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_action(key_to_action(key)),
            Event::Paste(text) => {
                if self.show_help {
                    self.show_help = false;
                    return;
                }
                self.input.insert_str(&text);
                self.sync_input();
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.scroll.scroll_up(SCROLL_STEP),
                MouseEventKind::ScrollDown => self.scroll.scroll_down(SCROLL_STEP),
                _ => {}
            },
            // The next draw picks up the new size
            Event::Resize(..) => {}
        }
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        // Global actions
        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            Action::None => return,
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        self.notice = None;

        match action {
            Action::Submit => self.submit(),
            Action::Cancel => self.cancel(),
            Action::Copy => self.copy_last_reply(),
            Action::Insert(c) => {
                self.input.insert(c);
                self.sync_input();
            }
            Action::Backspace => {
                self.input.backspace();
                self.sync_input();
            }
            Action::Delete => {
                self.input.delete();
                self.sync_input();
            }
            Action::Left => self.input.move_left(),
            Action::Right => self.input.move_right(),
            Action::Home => self.input.move_home(),
            Action::End => {
                if self.input.is_empty() {
                    self.scroll.follow();
                } else {
                    self.input.move_end();
                }
            }
            Action::HistoryPrev => {
                if self.input.is_empty() || self.input.is_browsing_history() {
                    self.input.history_prev();
                    self.sync_input();
                } else {
                    self.scroll.scroll_up(1);
                }
            }
            Action::HistoryNext => {
                if self.input.is_browsing_history() {
                    self.input.history_next();
                    self.sync_input();
                } else {
                    self.scroll.scroll_down(1);
                }
            }
            Action::ScrollUp => self.scroll.scroll_up(1),
            Action::ScrollDown => self.scroll.scroll_down(1),
            Action::PageUp => self.scroll.scroll_up(self.scroll.page()),
            Action::PageDown => self.scroll.scroll_down(self.scroll.page()),
            Action::ScrollBottom => self.scroll.follow(),
            Action::Quit | Action::Help | Action::None => {}
        }

        self.follow_changes();
    }

    /// Apply one reveal tick from the scheduler.
    pub fn on_reveal_tick(&mut self) {
        let result = self.conversation.tick();
        self.follow_changes();
        match result {
            Ok(Tick::Completed { total }) => debug!(total, "reply revealed"),
            Ok(Tick::Advanced { .. } | Tick::Idle) => {}
            Err(ChatError::Cancelled) => {
                self.notice = Some("Reply stopped".to_string());
            }
            Err(e) => {
                warn!(error = %e, "reveal failed");
                self.notice = Some(e.to_string());
            }
        }
    }

    /// Copy the newest assistant reply to the system clipboard.
    pub fn copy_last_reply(&mut self) {
        let Some(text) = self
            .conversation
            .last_reply()
            .map(|m| m.text.clone())
            .filter(|t| !t.is_empty())
        else {
            self.notice = Some("Nothing to copy".to_string());
            return;
        };

        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self.notice = Some("Copied reply to clipboard".to_string()),
            Err(e) => {
                warn!(error = %e, "clipboard unavailable");
                self.notice = Some(format!("Copy failed: {e}"));
            }
        }
    }

    fn submit(&mut self) {
        self.sync_input();
        match self.conversation.submit_pending() {
            Ok(SubmitOutcome::Accepted) => {
                self.input.submit();
                self.scroll.follow();
                self.reveal_started = self.is_streaming();
            }
            Ok(SubmitOutcome::Ignored(IgnoreReason::Streaming)) => {
                self.notice = Some("Reply in progress, press Esc to stop it".to_string());
            }
            Ok(SubmitOutcome::Ignored(IgnoreReason::Blank)) => {}
            Err(e) => {
                // The failure is already shown inline as a failed reply
                warn!(error = %e, "response generation failed");
                self.input.submit();
                self.scroll.follow();
            }
        }
    }

    fn cancel(&mut self) {
        if self.conversation.cancel() {
            debug!("reveal cancel requested");
            self.notice = Some("Stopping reply...".to_string());
        } else if !self.input.is_empty() {
            self.input.clear();
            self.sync_input();
        } else {
            self.should_quit = true;
        }
    }

    /// Any change to the messages pins the view back to the newest line.
    fn follow_changes(&mut self) {
        let revision = self.conversation.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.scroll.follow();
        }
    }

    fn sync_input(&mut self) {
        if self.conversation.pending_input() != self.input.content() {
            self.conversation.set_pending_input(self.input.content());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use crate::test_utils::render_app_to_string;
    use mdchat_engine::{MessageStatus, ResponseError, ResponseSource, Role};

    struct BrokenResponder;

    impl ResponseSource for BrokenResponder {
        fn respond(&mut self, _input: &str) -> Result<String, ResponseError> {
            Err(ResponseError::Generation("offline".to_string()))
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_action(Action::Insert(c));
        }
    }

    fn finish_reveal(app: &mut App) {
        while app.is_streaming() {
            app.on_reveal_tick();
        }
    }

    #[test]
    fn test_typing_updates_pending_input() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hi");
        assert_eq!(app.input.content(), "hi");
        assert_eq!(app.conversation.pending_input(), "hi");

        app.handle_action(Action::Backspace);
        assert_eq!(app.conversation.pending_input(), "h");
    }

    #[test]
    fn test_submit_starts_reveal() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hello");
        app.handle_action(Action::Submit);

        assert!(app.is_streaming());
        assert!(app.input.is_empty());
        assert_eq!(app.conversation.pending_input(), "");
        assert_eq!(app.input.history(), ["hello"]);
        assert!(app.take_reveal_started());
        assert!(!app.take_reveal_started());

        let messages = app.conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].text, "");
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut app = App::new_for_test();
        type_text(&mut app, "   ");
        app.handle_action(Action::Submit);
        assert!(app.conversation.messages().is_empty());
        assert_eq!(app.input.content(), "   ");
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_submit_while_streaming_is_dropped() {
        let mut app = App::new_for_test();
        type_text(&mut app, "first");
        app.handle_action(Action::Submit);

        type_text(&mut app, "second");
        app.handle_action(Action::Submit);

        assert_eq!(app.conversation.messages().len(), 2);
        assert_eq!(app.input.content(), "second");
        assert!(app.notice.as_deref().unwrap().contains("Esc"));
    }

    #[test]
    fn test_reveal_completes_through_ticks() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hi");
        app.handle_action(Action::Submit);
        finish_reveal(&mut app);

        let reply = app.conversation.last_reply().unwrap();
        assert_eq!(reply.status, MessageStatus::Complete);
        assert_eq!(reply.text, mdchat_engine::generate_response("hi"));
    }

    #[test]
    fn test_escape_cancels_reveal() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hi");
        app.handle_action(Action::Submit);
        app.on_reveal_tick();
        app.on_reveal_tick();

        app.handle_action(Action::Cancel);
        assert!(app.is_streaming());
        app.on_reveal_tick();

        assert!(!app.is_streaming());
        assert!(!app.should_quit);
        assert_eq!(app.notice.as_deref(), Some("Reply stopped"));
        let reply = app.conversation.last_reply().unwrap();
        assert_eq!(reply.status, MessageStatus::Interrupted);
        assert_eq!(reply.text.chars().count(), 2);
    }

    #[test]
    fn test_escape_clears_input_then_quits() {
        let mut app = App::new_for_test();
        type_text(&mut app, "draft");
        app.handle_action(Action::Cancel);
        assert!(app.input.is_empty());
        assert!(!app.should_quit);

        app.handle_action(Action::Cancel);
        assert!(app.should_quit);
    }

    #[test]
    fn test_generation_failure_shows_failed_reply() {
        let mut app = App::new_for_test();
        app.conversation = Conversation::with_source(Box::new(BrokenResponder));
        type_text(&mut app, "hi");
        app.handle_action(Action::Submit);

        assert!(!app.is_streaming());
        assert!(app.input.is_empty());
        let reply = app.conversation.last_reply().unwrap();
        assert_eq!(reply.status, MessageStatus::Failed);
        assert!(reply.text.contains("offline"));
    }

    #[test]
    fn test_no_action_shrinks_messages() {
        let mut app = App::new_for_test();
        let actions = [
            Action::Insert('a'),
            Action::Submit,
            Action::Cancel,
            Action::Cancel,
            Action::PageUp,
            Action::Insert('b'),
            Action::Submit,
            Action::Submit,
            Action::Backspace,
            Action::HistoryPrev,
            Action::Submit,
            Action::ScrollBottom,
            Action::Help,
            Action::Submit,
        ];

        let mut len = 0;
        for action in actions {
            app.handle_action(action);
            app.on_reveal_tick();
            let now = app.conversation.messages().len();
            assert!(now >= len, "{action:?} removed messages");
            len = now;
        }
        assert!(len >= 2);
    }

    #[test]
    fn test_new_reply_repins_scrolled_view() {
        let mut app = App::new_for_test();
        for turn in ["one", "two", "three", "four"] {
            type_text(&mut app, turn);
            app.handle_action(Action::Submit);
            finish_reveal(&mut app);
        }
        render_app_to_string(&mut app);

        type_text(&mut app, "NEWEST");
        app.handle_action(Action::Submit);
        render_app_to_string(&mut app);
        app.handle_action(Action::PageUp);
        app.handle_action(Action::PageUp);
        assert!(!app.scroll.is_following());

        finish_reveal(&mut app);
        let text = render_app_to_string(&mut app);
        assert!(app.scroll.is_following());
        assert!(text.contains("List item 2"));

        let pinned = app.scroll.offset();
        app.scroll.follow();
        render_app_to_string(&mut app);
        assert_eq!(app.scroll.offset(), pinned);
    }

    #[test]
    fn test_scrolled_view_holds_while_idle() {
        let mut app = App::new_for_test();
        for turn in ["one", "two", "three"] {
            type_text(&mut app, turn);
            app.handle_action(Action::Submit);
            finish_reveal(&mut app);
        }
        render_app_to_string(&mut app);

        app.handle_action(Action::PageUp);
        let offset = app.scroll.offset();
        app.on_reveal_tick();
        render_app_to_string(&mut app);
        assert!(!app.scroll.is_following());
        assert_eq!(app.scroll.offset(), offset);
    }

    #[test]
    fn test_copy_without_reply() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Copy);
        assert_eq!(app.notice.as_deref(), Some("Nothing to copy"));
    }

    #[test]
    fn test_help_toggle_and_any_key_closes() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Help);
        assert!(app.show_help);

        app.handle_action(Action::Insert('x'));
        assert!(!app.show_help);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_quit_from_key_event() {
        let mut app = App::new_for_test();
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit);
    }

    #[test]
    fn test_paste_inserts_text() {
        let mut app = App::new_for_test();
        app.handle_event(Event::Paste("line one\nline two".to_string()));
        assert_eq!(app.input.content(), "line one line two");
        assert_eq!(app.conversation.pending_input(), "line one line two");
    }

    #[test]
    fn test_history_recall_with_up() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hello");
        app.handle_action(Action::Submit);
        finish_reveal(&mut app);

        app.handle_action(Action::HistoryPrev);
        assert_eq!(app.input.content(), "hello");
        assert_eq!(app.conversation.pending_input(), "hello");

        app.handle_action(Action::HistoryNext);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_scroll_up_leaves_follow() {
        let mut app = App::new_for_test();
        app.handle_action(Action::PageUp);
        assert!(!app.scroll.is_following());
        app.handle_action(Action::ScrollBottom);
        assert!(app.scroll.is_following());
    }
}
