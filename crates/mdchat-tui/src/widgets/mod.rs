//! Widgets for the chat window.

pub mod input_bar;
pub mod message_list;
pub mod status_bar;

pub use input_bar::{InputBar, TextInputState};
pub use message_list::{MessageList, ScrollState, SCROLL_STEP};
pub use status_bar::{KeyHint, StatusBar};
