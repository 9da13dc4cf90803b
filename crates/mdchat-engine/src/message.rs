//! Chat message types.
//!
//! A [`Message`] is one bubble in the conversation. User messages are
//! always complete; assistant messages may be partially revealed.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person at the keyboard.
    User,
    /// Produced by a response source and revealed over time.
    Assistant,
}

/// Display state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Text is final.
    #[default]
    Complete,
    /// Text is a prefix that is still growing.
    Revealing,
    /// The reveal was cancelled; text is the prefix shown at that point.
    Interrupted,
    /// The response source failed; text holds the error description.
    Failed,
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Revealing => write!(f, "revealing"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub role: Role,
    /// Full or partially revealed content.
    pub text: String,
    /// Display state.
    pub status: MessageStatus,
    /// When the message was appended.
    pub sent_at: DateTime<Local>,
}

impl Message {
    /// Create a complete user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            status: MessageStatus::Complete,
            sent_at: Local::now(),
        }
    }

    /// Create the empty assistant placeholder that a reveal fills in.
    pub fn assistant_placeholder() -> Self {
        Self {
            role: Role::Assistant,
            text: String::new(),
            status: MessageStatus::Revealing,
            sent_at: Local::now(),
        }
    }

    /// Create an inline failure bubble.
    pub fn assistant_failure(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            status: MessageStatus::Failed,
            sent_at: Local::now(),
        }
    }

    /// True for user-authored messages.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// True while the text is still being revealed.
    pub fn is_revealing(&self) -> bool {
        self.status == MessageStatus::Revealing
    }
}
