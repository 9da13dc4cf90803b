//! Theme components for the TUI.
//!
//! This module provides [`Theme`], the color palette (Catppuccin
//! Mocha/Latte/High Contrast) selected by [`ThemeName`].
//!
//! [`ThemeName`]: mdchat_engine::ThemeName

mod colors;

pub use colors::Theme;
