//! mdchat-engine: Headless conversation engine for mdchat
//!
//! This crate provides the logic behind the chat window, including:
//! - Message and conversation state
//! - The incremental reveal state machine and its ticker
//! - Pluggable response sources
//! - Configuration

pub mod config;
pub mod conversation;
pub mod message;
pub mod responder;
pub mod reveal;
pub mod ticker;

// Re-export commonly used types
pub use config::{ChatConfig, ConfigError, ThemeName};
pub use conversation::{ChatError, Conversation, IgnoreReason, SubmitOutcome, Tick};
pub use message::{Message, MessageStatus, Role};
pub use responder::{generate_response, ResponseError, ResponseSource, TemplateResponder};
pub use reveal::{Reveal, RevealState};
pub use ticker::{run_reveal, RevealTicker, DEFAULT_REVEAL_INTERVAL};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
