//! Markdown rendering using pulldown-cmark.
//!
//! Provides [`render_markdown`] to convert markdown text to styled ratatui
//! Lines. Input is often an incomplete prefix of a reply that is still being
//! revealed, so every construct degrades to plain text instead of failing:
//! an unclosed `**` stays literal and an unterminated fence runs to the end.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::theme::Theme;

use super::styles::MarkdownStyles;

/// Longest horizontal rule drawn, in cells.
const MAX_RULE_WIDTH: usize = 40;

/// Drawn between table cells on a row.
const TABLE_SEPARATOR: &str = " │ ";

/// Render markdown text to styled ratatui Lines.
///
/// # Arguments
/// * `input` - The markdown text to render
/// * `width` - Available width, used for horizontal rules
/// * `theme` - Theme for styling
///
/// # Returns
/// A vector of styled Lines ready for wrapping and rendering. Trailing blank
/// lines are dropped.
pub fn render_markdown(input: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(input, options);
    let styles = MarkdownStyles::from_theme(theme);

    let mut renderer = MarkdownRenderer::new(styles, width);
    renderer.run(parser);
    renderer.lines
}

/// Internal renderer that processes pulldown-cmark events.
struct MarkdownRenderer {
    /// Accumulated output lines.
    lines: Vec<Line<'static>>,
    /// Style configuration.
    styles: MarkdownStyles,
    /// Available width.
    width: usize,
    /// Stack of active styles for nested formatting.
    style_stack: Vec<Style>,
    /// Current line being built.
    current_spans: Vec<Span<'static>>,
    /// One entry per open list: next number for ordered lists.
    list_stack: Vec<Option<u64>>,
    /// Whether we're inside a code block.
    in_code_block: bool,
    /// Nesting depth of blockquotes.
    blockquote_depth: usize,
    /// Pending list marker to prepend to next text.
    pending_list_marker: Option<String>,
    /// Task list checkbox state (Some(checked) if in task item).
    task_checkbox: Option<bool>,
    /// Open links: target URL and index of the first text span.
    link_stack: Vec<(String, usize)>,
    /// Cells emitted so far in the current table row.
    table_cells: Option<usize>,
}

impl MarkdownRenderer {
    fn new(styles: MarkdownStyles, width: usize) -> Self {
        Self {
            lines: Vec::new(),
            styles,
            width,
            style_stack: Vec::new(),
            current_spans: Vec::new(),
            list_stack: Vec::new(),
            in_code_block: false,
            blockquote_depth: 0,
            pending_list_marker: None,
            task_checkbox: None,
            link_stack: Vec::new(),
            table_cells: None,
        }
    }

    fn run<'a>(&mut self, parser: impl Iterator<Item = Event<'a>>) {
        for event in parser {
            self.handle_event(event);
        }
        self.flush_line();
        while self.lines.last().is_some_and(is_blank) {
            self.lines.pop();
        }
    }

    #[allow(clippy::too_many_lines)]
    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            // Headings
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_line();
                let style = self.heading_style(level);
                self.style_stack.push(style);
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush_line();
                self.style_stack.pop();
            }

            // Inline formatting
            Event::Start(Tag::Emphasis) => {
                self.style_stack.push(self.styles.emphasis);
            }
            Event::Start(Tag::Strong) => {
                self.style_stack.push(self.styles.strong);
            }
            Event::Start(Tag::Strikethrough) => {
                self.style_stack.push(self.styles.strikethrough);
            }
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough) => {
                self.style_stack.pop();
            }

            // Links
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.style_stack.push(self.styles.link);
                self.link_stack
                    .push((dest_url.into_string(), self.current_spans.len()));
            }
            Event::End(TagEnd::Link) => {
                self.style_stack.pop();
                self.close_link();
            }

            // Code blocks
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush_line();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    let lang = lang.trim();
                    if !lang.is_empty() {
                        self.current_spans
                            .push(Span::styled(format!("  {lang}"), self.styles.code_lang));
                        self.flush_line();
                    }
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                self.flush_line();
                self.in_code_block = false;
                self.blank_line();
            }

            // Lists
            Event::Start(Tag::List(start)) => {
                self.flush_line();
                self.list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }

            // List items
            Event::Start(Tag::Item) => {
                self.flush_line();
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                let marker = match self.list_stack.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.pending_list_marker = Some(marker);
            }
            Event::End(TagEnd::Item) => {
                self.flush_line();
                self.task_checkbox = None;
                self.pending_list_marker = None;
            }

            // Task list markers
            Event::TaskListMarker(checked) => {
                self.task_checkbox = Some(checked);
            }

            // Blockquotes
            Event::Start(Tag::BlockQuote) => {
                self.flush_line();
                self.blockquote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote) => {
                self.flush_line();
                self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
            }

            // Paragraphs
            Event::End(TagEnd::Paragraph) => {
                self.flush_line();
                self.blank_line();
            }

            // Horizontal rule
            Event::Rule => {
                self.flush_line();
                let width = self.width.clamp(1, MAX_RULE_WIDTH);
                self.lines
                    .push(Line::from(Span::styled("─".repeat(width), self.styles.rule)));
                self.blank_line();
            }

            // Text content
            Event::Text(text) => {
                self.add_text(&text);
            }

            // Inline code
            Event::Code(code) => {
                self.start_line_prefix();
                self.current_spans
                    .push(Span::styled(format!("`{code}`"), self.styles.code));
            }

            // Line breaks
            Event::SoftBreak => {
                self.add_text(" ");
            }
            Event::HardBreak => {
                self.flush_line();
            }

            // Tables: one line per row, cells joined by a separator
            Event::Start(Tag::Table(_)) => {
                self.flush_line();
            }
            Event::Start(Tag::TableHead) => {
                self.table_cells = Some(0);
                self.style_stack.push(self.styles.strong);
            }
            Event::End(TagEnd::TableHead) => {
                self.style_stack.pop();
                self.flush_line();
                self.table_cells = None;
                let width = self
                    .lines
                    .last()
                    .map_or(0, Line::width)
                    .clamp(1, self.width.max(1));
                self.lines
                    .push(Line::from(Span::styled("─".repeat(width), self.styles.rule)));
            }
            Event::Start(Tag::TableRow) => {
                self.table_cells = Some(0);
            }
            Event::End(TagEnd::TableRow) => {
                self.flush_line();
                self.table_cells = None;
            }
            Event::Start(Tag::TableCell) => {
                if let Some(cells) = self.table_cells.as_mut() {
                    if *cells > 0 {
                        self.current_spans
                            .push(Span::styled(TABLE_SEPARATOR, self.styles.rule));
                    }
                    *cells += 1;
                }
            }
            Event::End(TagEnd::Table) => {
                self.flush_line();
                self.table_cells = None;
                self.blank_line();
            }

            // Raw HTML is shown as written
            Event::Html(html) | Event::InlineHtml(html) => {
                self.add_text(&html);
            }

            // Events we don't handle specially (ignore)
            Event::Start(
                Tag::Paragraph
                | Tag::Image { .. }
                | Tag::FootnoteDefinition(_)
                | Tag::MetadataBlock(_)
                | Tag::HtmlBlock,
            )
            | Event::End(
                TagEnd::Image
                | TagEnd::TableCell
                | TagEnd::FootnoteDefinition
                | TagEnd::MetadataBlock(_)
                | TagEnd::HtmlBlock,
            )
            | Event::FootnoteReference(_) => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            // One output line per source line, keeping blank lines
            for line in text.split_terminator('\n') {
                let indent = "  ".repeat(self.list_stack.len());
                self.current_spans.push(Span::styled(
                    format!("{indent}  {line}"),
                    self.styles.code_block,
                ));
                self.flush_line();
            }
            return;
        }

        self.start_line_prefix();
        let style = self.current_style();
        self.current_spans.push(Span::styled(text.to_string(), style));
    }

    /// Emit list marker, checkbox and quote bar before the first text on a line.
    fn start_line_prefix(&mut self) {
        if self.blockquote_depth > 0 && self.current_spans.is_empty() {
            self.current_spans.push(Span::styled(
                "> ".repeat(self.blockquote_depth),
                self.styles.blockquote,
            ));
        }

        if let Some(marker) = self.pending_list_marker.take() {
            self.current_spans
                .push(Span::styled(marker, self.styles.list_marker));
            if let Some(checked) = self.task_checkbox.take() {
                let checkbox = if checked { "[x] " } else { "[ ] " };
                self.current_spans
                    .push(Span::styled(checkbox, self.styles.list_marker));
            }
        }
    }

    /// Append the link target unless the text already shows it.
    fn close_link(&mut self) {
        let Some((url, start)) = self.link_stack.pop() else {
            return;
        };
        if url.is_empty() {
            return;
        }
        let text: String = self
            .current_spans
            .get(start..)
            .unwrap_or_default()
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        if text != url {
            self.current_spans
                .push(Span::styled(format!(" ({url})"), self.styles.link_url));
        }
    }

    fn current_style(&self) -> Style {
        let mut style = if self.blockquote_depth > 0 {
            self.styles.text.patch(self.styles.blockquote)
        } else {
            self.styles.text
        };
        for s in &self.style_stack {
            style = style.patch(*s);
        }
        style
    }

    fn heading_style(&self, level: HeadingLevel) -> Style {
        match level {
            HeadingLevel::H1 => self.styles.h1,
            HeadingLevel::H2 => self.styles.h2,
            _ => self.styles.h3,
        }
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }

    /// Push a separator line, never two in a row and never first.
    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| !is_blank(l)) {
            self.lines.push(Line::default());
        }
    }
}

fn is_blank(line: &Line<'_>) -> bool {
    line.spans.iter().all(|s| s.content.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdchat_engine::generate_response;
    use ratatui::style::Modifier;

    fn test_theme() -> Theme {
        Theme::default()
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn all_text(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(line_text).collect()
    }

    #[test]
    fn test_render_simple_text() {
        let lines = render_markdown("Hello, world!", 80, &test_theme());
        assert_eq!(all_text(&lines), vec!["Hello, world!"]);
    }

    #[test]
    fn test_render_heading() {
        let lines = render_markdown("# Title", 80, &test_theme());
        assert_eq!(line_text(&lines[0]), "Title");
        let styles = MarkdownStyles::default();
        assert_eq!(lines[0].spans[0].style, styles.text.patch(styles.h1));
    }

    #[test]
    fn test_render_bold_and_italic() {
        let lines = render_markdown("**bold** and *it*", 80, &test_theme());
        let spans = &lines[0].spans;
        assert_eq!(spans[0].content, "bold");
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[2].content, "it");
        assert!(spans[2].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_render_inline_code() {
        let lines = render_markdown("Use `code` here", 80, &test_theme());
        assert!(line_text(&lines[0]).contains("`code`"));
    }

    #[test]
    fn test_render_code_block_with_language() {
        let md = "```rust\nfn main() {}\n```";
        let lines = render_markdown(md, 80, &test_theme());
        assert_eq!(all_text(&lines), vec!["  rust", "  fn main() {}"]);
    }

    #[test]
    fn test_render_unordered_list() {
        let md = "- Item 1\n- Item 2";
        let lines = render_markdown(md, 80, &test_theme());
        assert_eq!(all_text(&lines), vec!["• Item 1", "• Item 2"]);
    }

    #[test]
    fn test_render_ordered_list() {
        let md = "3. three\n4. four";
        let lines = render_markdown(md, 80, &test_theme());
        assert_eq!(all_text(&lines), vec!["3. three", "4. four"]);
    }

    #[test]
    fn test_render_nested_list_indents() {
        let md = "- outer\n  - inner";
        let lines = render_markdown(md, 80, &test_theme());
        assert_eq!(all_text(&lines), vec!["• outer", "  • inner"]);
    }

    #[test]
    fn test_render_checkbox() {
        let md = "- [ ] Unchecked\n- [x] Checked";
        let lines = render_markdown(md, 80, &test_theme());
        assert_eq!(all_text(&lines), vec!["• [ ] Unchecked", "• [x] Checked"]);
    }

    #[test]
    fn test_render_link_shows_target() {
        let lines = render_markdown("[A link](https://example.com)", 80, &test_theme());
        assert_eq!(line_text(&lines[0]), "A link (https://example.com)");
        let styles = MarkdownStyles::default();
        assert_eq!(lines[0].spans[1].style, styles.link_url);
    }

    #[test]
    fn test_render_autolink_not_duplicated() {
        let lines = render_markdown("<https://example.com>", 80, &test_theme());
        assert_eq!(line_text(&lines[0]), "https://example.com");
    }

    #[test]
    fn test_render_blockquote() {
        let lines = render_markdown("> This is a quote", 80, &test_theme());
        assert_eq!(line_text(&lines[0]), "> This is a quote");
    }

    #[test]
    fn test_render_rule_respects_width() {
        let lines = render_markdown("a\n\n---\n\nb", 10, &test_theme());
        assert!(all_text(&lines).contains(&"─".repeat(10)));
    }

    #[test]
    fn test_render_table() {
        let md = "| Name | Qty |\n|------|-----|\n| apple | 3 |\n| pear | 10 |\n\nAfter";
        let lines = render_markdown(md, 80, &test_theme());
        let text = all_text(&lines);
        assert_eq!(text[0], "Name │ Qty");
        assert_eq!(text[1], "─".repeat(10));
        assert_eq!(text[2], "apple │ 3");
        assert_eq!(text[3], "pear │ 10");
        assert_eq!(text[4], "");
        assert_eq!(text[5], "After");
        assert!(!text.iter().any(|l| l.contains('|')));

        let styles = MarkdownStyles::default();
        assert_eq!(lines[0].spans[0].style, styles.text.patch(styles.strong));
        assert_eq!(lines[2].spans[0].style, styles.text);
    }

    #[test]
    fn test_table_cut_off_mid_row() {
        let md = "| Name | Qty |\n|------|-----|\n| apple | 3 |\n| pe";
        let lines = render_markdown(md, 80, &test_theme());
        let text = all_text(&lines);
        assert_eq!(text[0], "Name │ Qty");
        assert_eq!(text[2], "apple │ 3");
        assert!(text[3].starts_with("pe"));
        assert_eq!(text.len(), 4);

        let theme = test_theme();
        let mut end = 0;
        for ch in md.chars() {
            end += ch.len_utf8();
            let _ = render_markdown(&md[..end], 12, &theme);
        }
    }

    #[test]
    fn test_render_empty() {
        let lines = render_markdown("", 80, &test_theme());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_render_multiple_paragraphs() {
        let md = "First paragraph.\n\nSecond paragraph.";
        let lines = render_markdown(md, 80, &test_theme());
        assert_eq!(
            all_text(&lines),
            vec!["First paragraph.", "", "Second paragraph."]
        );
    }

    #[test]
    fn test_render_template_reply() {
        let lines = render_markdown(&generate_response("hello"), 80, &test_theme());
        let text = all_text(&lines);
        assert_eq!(
            text,
            vec![
                "Here's a Markdown response to your input: \"hello\"",
                "",
                "Heading 1",
                "Heading 2",
                "• List item 1",
                "• List item 2",
                "",
                "Bold text and italic text",
                "",
                "A link (https://example.com)",
                "",
                "  javascript",
                "  console.log('Hello, World!');",
            ]
        );
    }

    #[test]
    fn test_render_is_pure() {
        let md = generate_response("twice");
        let theme = test_theme();
        assert_eq!(render_markdown(&md, 60, &theme), render_markdown(&md, 60, &theme));
    }

    #[test]
    fn test_every_prefix_renders() {
        let md = generate_response("partial");
        let theme = test_theme();
        let mut end = 0;
        for ch in md.chars() {
            end += ch.len_utf8();
            // Must not panic on any intermediate state
            let _ = render_markdown(&md[..end], 40, &theme);
        }
    }

    #[test]
    fn test_unterminated_fence_renders_as_code() {
        let lines = render_markdown("```javascript\nconsole.lo", 80, &test_theme());
        assert_eq!(all_text(&lines), vec!["  javascript", "  console.lo"]);
    }

    #[test]
    fn test_unclosed_emphasis_stays_literal() {
        let lines = render_markdown("**Bold te", 80, &test_theme());
        assert_eq!(line_text(&lines[0]), "**Bold te");
    }
}
