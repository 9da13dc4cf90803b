//! Incremental text reveal.
//!
//! A [`Reveal`] walks a full reply one character at a time, producing a
//! strictly growing prefix. [`RevealState`] is the two-state machine the
//! conversation keeps: either idle or revealing exactly one reply.

use tokio_util::sync::CancellationToken;

/// Reveal state of a conversation.
#[derive(Debug, Default)]
pub enum RevealState {
    /// No assistant message is being revealed.
    #[default]
    Idle,
    /// The last assistant message is being revealed.
    Revealing(Reveal),
}

impl RevealState {
    /// True while a reveal is active.
    pub fn is_revealing(&self) -> bool {
        matches!(self, Self::Revealing(_))
    }
}

/// Progress through one reply.
///
/// Positions are counted in Unicode scalar values so a prefix is always a
/// valid `&str`.
#[derive(Debug)]
pub struct Reveal {
    full: String,
    /// Byte offset of the end of the current prefix.
    end: usize,
    /// Characters revealed so far.
    revealed: usize,
    /// Total characters in `full`.
    total: usize,
    cancel: CancellationToken,
}

impl Reveal {
    /// Start revealing `full` from the empty prefix.
    pub fn new(full: impl Into<String>) -> Self {
        let full = full.into();
        let total = full.chars().count();
        Self {
            full,
            end: 0,
            revealed: 0,
            total,
            cancel: CancellationToken::new(),
        }
    }

    /// The currently revealed prefix.
    pub fn prefix(&self) -> &str {
        &self.full[..self.end]
    }

    /// Extend the prefix by one character.
    ///
    /// Returns the new prefix, or `None` once the whole reply is shown.
    pub fn advance(&mut self) -> Option<&str> {
        let ch = self.full[self.end..].chars().next()?;
        self.end += ch.len_utf8();
        self.revealed += 1;
        Some(self.prefix())
    }

    /// True once every character has been revealed.
    pub fn is_finished(&self) -> bool {
        self.revealed == self.total
    }

    /// `(revealed, total)` character counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.revealed, self.total)
    }

    /// Token that aborts this reveal at the next tick boundary.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// True if the reveal was asked to stop.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
