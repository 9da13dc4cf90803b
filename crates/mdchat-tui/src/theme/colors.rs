//! Catppuccin color palettes for the TUI.

use mdchat_engine::ThemeName;
use ratatui::{style::Color, symbols::border};

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,
    pub overlay: Color,

    // Foregrounds
    pub text: Color,
    pub subtext: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,
    pub secondary: Color,

    // Semantic
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Message bubbles
    pub user_bubble: Color,
    pub user_text: Color,
    pub assistant_gutter: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
    pub border_set: border::Set,
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

impl Theme {
    /// Palette for a configured theme name.
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Mocha => Self::mocha(),
            ThemeName::Latte => Self::latte(),
            ThemeName::HighContrast => Self::high_contrast(),
        }
    }

    /// Catppuccin Mocha theme (default dark theme).
    pub fn mocha() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),       // #1e1e2e
            surface: Color::Rgb(49, 50, 68),    // #313244
            overlay: Color::Rgb(69, 71, 90),    // #45475a

            text: Color::Rgb(205, 214, 244),    // #cdd6f4
            subtext: Color::Rgb(166, 173, 200), // #a6adc8
            muted: Color::Rgb(108, 112, 134),   // #6c7086

            primary: Color::Rgb(180, 190, 254),   // #b4befe (lavender)
            secondary: Color::Rgb(148, 226, 213), // #94e2d5 (teal)

            success: Color::Rgb(166, 227, 161), // #a6e3a1 (green)
            warning: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
            error: Color::Rgb(243, 139, 168),   // #f38ba8 (red)
            info: Color::Rgb(137, 180, 250),    // #89b4fa (blue)

            user_bubble: Color::Rgb(180, 190, 254), // #b4befe (lavender)
            user_text: Color::Rgb(30, 30, 46),      // #1e1e2e
            assistant_gutter: Color::Rgb(148, 226, 213), // #94e2d5 (teal)

            border: Color::Rgb(69, 71, 90),            // #45475a
            border_focused: Color::Rgb(180, 190, 254), // #b4befe (lavender)
            border_set: border::ROUNDED,
        }
    }

    /// Catppuccin Latte theme (light theme).
    pub fn latte() -> Self {
        Self {
            base: Color::Rgb(239, 241, 245),    // #eff1f5
            surface: Color::Rgb(230, 233, 239), // #e6e9ef
            overlay: Color::Rgb(220, 224, 232), // #dce0e8

            text: Color::Rgb(76, 79, 105),      // #4c4f69
            subtext: Color::Rgb(92, 95, 119),   // #5c5f77
            muted: Color::Rgb(140, 143, 161),   // #8c8fa1

            primary: Color::Rgb(114, 135, 253),  // #7287fd (lavender)
            secondary: Color::Rgb(23, 146, 153), // #179299 (teal)

            success: Color::Rgb(64, 160, 43),  // #40a02b (green)
            warning: Color::Rgb(223, 142, 29), // #df8e1d (yellow)
            error: Color::Rgb(210, 15, 57),    // #d20f39 (red)
            info: Color::Rgb(30, 102, 245),    // #1e66f5 (blue)

            user_bubble: Color::Rgb(114, 135, 253), // #7287fd (lavender)
            user_text: Color::Rgb(239, 241, 245),   // #eff1f5
            assistant_gutter: Color::Rgb(23, 146, 153), // #179299 (teal)

            border: Color::Rgb(188, 192, 204),         // #bcc0cc
            border_focused: Color::Rgb(114, 135, 253), // #7287fd (lavender)
            border_set: border::ROUNDED,
        }
    }

    /// High contrast theme for accessibility.
    pub fn high_contrast() -> Self {
        Self {
            base: Color::Black,
            surface: Color::Rgb(20, 20, 20),
            overlay: Color::Rgb(40, 40, 40),

            text: Color::White,
            subtext: Color::Rgb(200, 200, 200),
            muted: Color::Rgb(150, 150, 150),

            primary: Color::Cyan,
            secondary: Color::Magenta,

            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Blue,

            user_bubble: Color::White,
            user_text: Color::Black,
            assistant_gutter: Color::Cyan,

            border: Color::White,
            border_focused: Color::Cyan,
            border_set: border::PLAIN,
        }
    }
}
