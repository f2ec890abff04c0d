//! Markdown to styled ratatui text for the detail panel

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use thiserror::Error;

/// Widest horizontal rule drawn regardless of panel width
const MAX_RULE_WIDTH: u16 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkdownError {
    #[error("unbalanced markup: {0} style(s) left open")]
    Unbalanced(usize),
}

/// Formats markdown source into styled text
///
/// Implementations may fail; callers fall back to the raw source.
pub trait MarkdownRender {
    fn render(&self, source: &str, width: u16) -> Result<Text<'static>, MarkdownError>;
}

/// Styles applied to each markdown element
#[derive(Debug, Clone)]
pub struct MarkdownStyles {
    pub h1: Style,
    pub h2: Style,
    pub h3: Style,
    pub code: Style,
    pub emphasis: Style,
    pub strong: Style,
    pub bullet: Style,
    pub rule: Style,
    pub quote: Style,
}

impl Default for MarkdownStyles {
    fn default() -> Self {
        Self {
            h1: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            h3: Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::Yellow),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            bullet: Style::default().fg(Color::Yellow),
            rule: Style::default().fg(Color::DarkGray),
            quote: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        }
    }
}

/// Default renderer built on pulldown-cmark
#[derive(Debug, Clone, Default)]
pub struct TermMarkdown {
    styles: MarkdownStyles,
}

impl TermMarkdown {
    pub fn new(styles: MarkdownStyles) -> Self {
        Self { styles }
    }
}

impl MarkdownRender for TermMarkdown {
    fn render(&self, source: &str, width: u16) -> Result<Text<'static>, MarkdownError> {
        let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);
        let mut state = RenderState::new(&self.styles, width.clamp(1, MAX_RULE_WIDTH));
        for event in parser {
            state.event(event);
        }
        state.finish()
    }
}

/// Render through `renderer`, falling back to the raw lines on failure
pub fn render_or_plain(renderer: &dyn MarkdownRender, source: &str, width: u16) -> Text<'static> {
    match renderer.render(source, width) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("Markdown rendering failed, showing raw text: {err}");
            Text::from(
                source
                    .lines()
                    .map(|l| Line::from(l.to_string()))
                    .collect::<Vec<_>>(),
            )
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StyleContext {
    Heading(HeadingLevel),
    Emphasis,
    Strong,
    Strikethrough,
    Quote,
}

struct RenderState<'s> {
    styles: &'s MarkdownStyles,
    rule_width: u16,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    stack: Vec<StyleContext>,
    /// `Some(n)` for ordered lists, holding the next number
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    needs_blank: bool,
}

impl<'s> RenderState<'s> {
    fn new(styles: &'s MarkdownStyles, rule_width: u16) -> Self {
        Self {
            styles,
            rule_width,
            lines: Vec::new(),
            spans: Vec::new(),
            stack: Vec::new(),
            lists: Vec::new(),
            in_code_block: false,
            needs_blank: false,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let style = self.styles.code;
                self.spans.push(Span::styled(code.to_string(), style));
            }
            Event::SoftBreak => self.spans.push(Span::raw(" ")),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_blank();
                self.lines.push(Line::styled(
                    "─".repeat(usize::from(self.rule_width)),
                    self.styles.rule,
                ));
                self.needs_blank = true;
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_blank();
                self.stack.push(StyleContext::Heading(level));
            }
            Tag::Paragraph => self.flush_blank(),
            Tag::Emphasis => self.stack.push(StyleContext::Emphasis),
            Tag::Strong => self.stack.push(StyleContext::Strong),
            Tag::Strikethrough => self.stack.push(StyleContext::Strikethrough),
            Tag::BlockQuote(_) => {
                self.flush_blank();
                self.stack.push(StyleContext::Quote);
            }
            Tag::CodeBlock(_) => {
                self.flush_blank();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush_line();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.spans
                    .push(Span::styled(format!("{indent}{marker}"), self.styles.bullet));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) | TagEnd::BlockQuote(_) => {
                self.stack.pop();
                self.flush_line();
                self.needs_blank = true;
            }
            TagEnd::Paragraph => {
                self.flush_line();
                self.needs_blank = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.stack.pop();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.needs_blank = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.flush_line();
                if self.lists.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Item => self.flush_line(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.lines
                    .push(Line::styled(format!("  {line}"), self.styles.code));
            }
            return;
        }
        let quoted = self
            .stack
            .iter()
            .any(|ctx| matches!(ctx, StyleContext::Quote));
        let content = if quoted && self.spans.is_empty() {
            format!("│ {text}")
        } else {
            text.to_string()
        };
        let style = self.current_style();
        self.spans.push(Span::styled(content, style));
    }

    fn current_style(&self) -> Style {
        self.stack.iter().fold(Style::default(), |acc, ctx| {
            let style = match ctx {
                StyleContext::Heading(HeadingLevel::H1) => self.styles.h1,
                StyleContext::Heading(HeadingLevel::H2) => self.styles.h2,
                StyleContext::Heading(_) => self.styles.h3,
                StyleContext::Emphasis => self.styles.emphasis,
                StyleContext::Strong => self.styles.strong,
                StyleContext::Strikethrough => Style::default().add_modifier(Modifier::CROSSED_OUT),
                StyleContext::Quote => self.styles.quote,
            };
            acc.patch(style)
        })
    }

    fn flush_line(&mut self) {
        if !self.spans.is_empty() {
            let spans = std::mem::take(&mut self.spans);
            self.lines.push(Line::from(spans));
        }
    }

    fn flush_blank(&mut self) {
        self.flush_line();
        if self.needs_blank && !self.lines.is_empty() {
            self.lines.push(Line::default());
            self.needs_blank = false;
        }
    }

    fn finish(mut self) -> Result<Text<'static>, MarkdownError> {
        self.flush_line();
        if !self.stack.is_empty() {
            return Err(MarkdownError::Unbalanced(self.stack.len()));
        }
        Ok(Text::from(self.lines))
    }
}
