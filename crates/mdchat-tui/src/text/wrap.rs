//! Text wrapping utilities for ratatui Lines.
//!
//! Provides functions to wrap styled text to fit within a given width.

use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

/// Wrap a plain text string to the specified width.
///
/// Explicit newlines are kept; empty input yields one empty line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(
            textwrap::wrap(paragraph, width)
                .into_iter()
                .map(std::borrow::Cow::into_owned),
        );
    }
    lines
}

/// Wrap a vector of Lines to fit within the specified width.
/// Each line that exceeds the width will be split into multiple lines.
/// Styling is preserved across wrapped lines.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }

    let mut result = Vec::new();
    for line in lines {
        result.extend(wrap_line(line, width));
    }
    result
}

/// Wrap a single Line to fit within the specified width.
/// Returns one or more Lines with preserved styling.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if line.width() <= width {
        return vec![line];
    }

    // Need to wrap - collect all characters with their styles
    let mut chars_with_styles: Vec<(char, Style)> = Vec::new();
    for span in &line.spans {
        for ch in span.content.chars() {
            chars_with_styles.push((ch, span.style));
        }
    }

    let plain_text: String = chars_with_styles.iter().map(|(ch, _)| ch).collect();

    // Use textwrap to determine wrap points
    let wrapped_strings: Vec<String> = textwrap::wrap(&plain_text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect();

    // Rebuild Lines, walking the styled characters in step with the wrapped text
    let mut result = Vec::new();
    let mut char_idx = 0;

    for wrapped_str in wrapped_strings {
        let mut spans = Vec::new();
        let mut current_style = None;
        let mut current_text = String::new();

        // Skip whitespace that textwrap dropped at the break
        while char_idx < chars_with_styles.len() {
            let (ch, _) = chars_with_styles[char_idx];
            if !wrapped_str.starts_with(ch) && ch.is_whitespace() {
                char_idx += 1;
            } else {
                break;
            }
        }

        for expected_char in wrapped_str.chars() {
            let Some(&(ch, style)) = chars_with_styles.get(char_idx) else {
                current_text.push(expected_char);
                continue;
            };
            char_idx += 1;

            match current_style {
                Some(s) if s == style => current_text.push(ch),
                Some(s) => {
                    if !current_text.is_empty() {
                        spans.push(Span::styled(std::mem::take(&mut current_text), s));
                    }
                    current_style = Some(style);
                    current_text.push(ch);
                }
                None => {
                    current_style = Some(style);
                    current_text.push(ch);
                }
            }
        }

        if !current_text.is_empty() {
            spans.push(Span::styled(current_text, current_style.unwrap_or_default()));
        }

        if !spans.is_empty() {
            result.push(Line::from(spans).style(line.style));
        }
    }

    if result.is_empty() {
        result.push(Line::default());
    }

    result
}

/// Display width of a string in terminal cells.
pub(crate) fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}
