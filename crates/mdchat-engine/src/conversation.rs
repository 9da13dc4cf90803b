//! Conversation reveal engine.
//!
//! [`Conversation`] owns the ordered message list, the pending input and
//! the reveal state machine. It is driven from outside: `submit` starts a
//! turn, and every scheduler tick calls [`Conversation::tick`] to extend the
//! assistant reply by one character.
//!
//! While a reveal is running, further submissions are dropped and reported
//! as [`SubmitOutcome::Ignored`]. There is no queue.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::message::{Message, MessageStatus};
use crate::responder::{ResponseError, ResponseSource, TemplateResponder};
use crate::reveal::{Reveal, RevealState};

/// Result of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The input was appended and a reveal started.
    Accepted,
    /// The input was dropped without touching the conversation.
    Ignored(IgnoreReason),
}

/// Why a submission was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Empty or whitespace-only input.
    Blank,
    /// A reply is still being revealed.
    Streaming,
}

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing is being revealed.
    Idle,
    /// The prefix grew by one character.
    Advanced { revealed: usize, total: usize },
    /// The last character was revealed; the gate is open again.
    Completed { total: usize },
}

/// Conversation state for one session.
pub struct Conversation {
    messages: Vec<Message>,
    pending_input: String,
    reveal: RevealState,
    source: Box<dyn ResponseSource>,
    revision: u64,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("messages", &self.messages)
            .field("pending_input", &self.pending_input)
            .field("reveal", &self.reveal)
            .field("source", &self.source.name())
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Create an empty conversation backed by the markdown template.
    pub fn new() -> Self {
        Self::with_source(Box::new(TemplateResponder))
    }

    /// Create an empty conversation backed by `source`.
    pub fn with_source(source: Box<dyn ResponseSource>) -> Self {
        Self {
            messages: Vec::new(),
            pending_input: String::new(),
            reveal: RevealState::Idle,
            source,
            revision: 0,
        }
    }

    /// All messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The newest message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The newest assistant message with text, if any.
    pub fn last_reply(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| !m.is_user() && !m.text.is_empty())
    }

    /// Text typed but not yet submitted.
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    /// Replace the pending input.
    pub fn set_pending_input(&mut self, input: impl Into<String>) {
        self.pending_input = input.into();
    }

    /// True while an assistant reply is being revealed.
    pub fn is_streaming(&self) -> bool {
        self.reveal.is_revealing()
    }

    /// Counter bumped on every change to `messages`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// `(revealed, total)` characters of the active reveal.
    pub fn reveal_progress(&self) -> Option<(usize, usize)> {
        match &self.reveal {
            RevealState::Revealing(reveal) => Some(reveal.progress()),
            RevealState::Idle => None,
        }
    }

    /// Token that cancels the active reveal, if any.
    pub fn cancel_token(&self) -> Option<CancellationToken> {
        match &self.reveal {
            RevealState::Revealing(reveal) => Some(reveal.cancel_token()),
            RevealState::Idle => None,
        }
    }

    /// Submit the pending input.
    pub fn submit_pending(&mut self) -> Result<SubmitOutcome, ChatError> {
        let input = self.pending_input.clone();
        self.submit(&input)
    }

    /// Submit `input` as a new user turn.
    ///
    /// On acceptance the user message is appended, the pending input is
    /// cleared and the reply reveal starts with an empty assistant message.
    /// If the response source fails, the user message stays and a failed
    /// assistant bubble carrying the error text follows it.
    pub fn submit(&mut self, input: &str) -> Result<SubmitOutcome, ChatError> {
        if self.is_streaming() {
            debug!("submission dropped: reply in progress");
            return Ok(SubmitOutcome::Ignored(IgnoreReason::Streaming));
        }
        if input.trim().is_empty() {
            debug!("submission dropped: blank input");
            return Ok(SubmitOutcome::Ignored(IgnoreReason::Blank));
        }

        self.push(Message::user(input));
        self.pending_input.clear();
        debug!(chars = input.chars().count(), source = self.source.name(), "submitted");

        match self.source.respond(input) {
            Ok(reply) => {
                self.reveal(reply);
                Ok(SubmitOutcome::Accepted)
            }
            Err(e) => {
                self.push(Message::assistant_failure(e.to_string()));
                Err(ChatError::Generation(e))
            }
        }
    }

    /// Start revealing `full_text` as a new assistant message.
    ///
    /// Does nothing if a reveal is already running. An empty reply
    /// completes immediately.
    pub fn reveal(&mut self, full_text: impl Into<String>) {
        if self.is_streaming() {
            return;
        }
        let reveal = Reveal::new(full_text);
        let finished = reveal.is_finished();
        self.push(Message::assistant_placeholder());
        self.reveal = RevealState::Revealing(reveal);
        if finished {
            self.finish(MessageStatus::Complete);
        }
    }

    /// Apply one scheduler tick.
    ///
    /// Cancellation is honored here, before the prefix grows.
    pub fn tick(&mut self) -> Result<Tick, ChatError> {
        let RevealState::Revealing(reveal) = &mut self.reveal else {
            return Ok(Tick::Idle);
        };

        if reveal.is_cancelled() {
            let (revealed, total) = reveal.progress();
            debug!(revealed, total, "reveal cancelled");
            self.finish(MessageStatus::Interrupted);
            return Err(ChatError::Cancelled);
        }

        if let Some(prefix) = reveal.advance() {
            if let Some(last) = self.messages.last_mut().filter(|m| !m.is_user()) {
                last.text.clear();
                last.text.push_str(prefix);
            }
            self.revision += 1;
        }

        let (revealed, total) = reveal.progress();
        if reveal.is_finished() {
            self.finish(MessageStatus::Complete);
            Ok(Tick::Completed { total })
        } else {
            Ok(Tick::Advanced { revealed, total })
        }
    }

    /// Ask the active reveal to stop at the next tick.
    ///
    /// Returns `false` if nothing is being revealed.
    pub fn cancel(&self) -> bool {
        match &self.reveal {
            RevealState::Revealing(reveal) => {
                reveal.cancel_token().cancel();
                true
            }
            RevealState::Idle => false,
        }
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.revision += 1;
    }

    fn finish(&mut self, status: MessageStatus) {
        if let Some(last) = self.messages.last_mut().filter(|m| !m.is_user()) {
            last.status = status;
        }
        self.reveal = RevealState::Idle;
        self.revision += 1;
    }
}

/// Errors from the conversation engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// The response source failed; shown inline as a failed bubble.
    #[error(transparent)]
    Generation(#[from] ResponseError),

    /// The reveal was cancelled before it finished.
    #[error("reveal cancelled")]
    Cancelled,
}
