//! Markdown rendering for assistant and error messages.
//!
//! Message text comes from the model and is untrusted.  [`to_html`] escapes any
//! raw HTML and neutralizes script-bearing link targets, so rendered output can
//! never carry executable markup.  [`to_terminal`] strips terminal control
//! sequences before styling, so output can never drive the terminal.
//!
//! Both renderers follow GitHub-flavoured conventions (tables, strikethrough,
//! task lists) and render single newlines as line breaks.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use crate::theme::Palette;

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_ITALIC: &str = "\x1b[3m";
const ANSI_UNDERLINE: &str = "\x1b[4m";
const ANSI_STRIKE: &str = "\x1b[9m";
const ANSI_RESET: &str = "\x1b[0m";

const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render markdown to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let events = Parser::new_ext(markdown, options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::SoftBreak => Event::HardBreak,
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
    {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Remove escape sequences and control characters other than newline and tab.
///
/// Handles CSI (`ESC [`), OSC (`ESC ]`, ended by BEL or ST), character-set
/// designations and single-character escapes, plus raw C1 controls.
pub fn strip_control(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek().copied() {
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') | Some('P') | Some('_') | Some('^') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b'
                            && let Some(&'\\') = chars.peek()
                        {
                            chars.next();
                            break;
                        }
                    }
                }
                Some('(') | Some(')') | Some('*') | Some('+') => {
                    chars.next();
                    chars.next();
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            }
        } else if c == '\n' || c == '\t' || !c.is_control() {
            result.push(c);
        }
    }

    result
}

/// Render markdown for display in a terminal.
///
/// With `use_color` false no escape sequences are emitted at all.
pub fn to_terminal(markdown: &str, palette: &Palette, use_color: bool) -> String {
    let clean = strip_control(markdown);
    let mut writer = TerminalWriter::new(palette, use_color);
    for event in Parser::new_ext(&clean, options()) {
        writer.event(event);
    }
    writer.finish()
}

struct TerminalWriter<'a> {
    palette: &'a Palette,
    use_color: bool,
    out: String,
    styles: Vec<&'static str>,
    lists: Vec<Option<u64>>,
    links: Vec<String>,
    quote_depth: usize,
    in_code_block: bool,
    at_line_start: bool,
    table_cell: usize,
}

impl<'a> TerminalWriter<'a> {
    fn new(palette: &'a Palette, use_color: bool) -> Self {
        Self {
            palette,
            use_color,
            out: String::new(),
            styles: Vec::new(),
            lists: Vec::new(),
            links: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            at_line_start: true,
            table_cell: 0,
        }
    }

    fn push_style(&mut self, style: &'static str) {
        self.styles.push(style);
        if self.use_color {
            self.out.push_str(style);
        }
    }

    fn pop_style(&mut self) {
        self.styles.pop();
        if self.use_color {
            self.out.push_str(ANSI_RESET);
            for style in &self.styles {
                self.out.push_str(style);
            }
        }
    }

    fn line_prefix(&mut self) {
        if self.at_line_start {
            for _ in 0..self.quote_depth {
                if self.use_color {
                    self.out.push_str(self.palette.secondary);
                    self.out.push_str("│ ");
                    self.out.push_str(ANSI_RESET);
                    for style in &self.styles {
                        self.out.push_str(style);
                    }
                } else {
                    self.out.push_str("│ ");
                }
            }
            if self.in_code_block {
                self.out.push_str("    ");
            }
            self.at_line_start = false;
        }
    }

    // Parsed events carry decoded character references, so every emitted
    // fragment is stripped again.
    fn text(&mut self, text: &str) {
        let text = strip_control(text);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.newline();
            }
            if !line.is_empty() {
                self.line_prefix();
                self.out.push_str(line);
            }
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    fn ensure_line_start(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
    }

    fn blank_line(&mut self) {
        self.ensure_line_start();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.newline();
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => self.text(&text),
            Event::Code(code) => {
                self.line_prefix();
                self.push_style(self.palette.code);
                self.out.push_str(&strip_control(&code));
                self.pop_style();
            }
            Event::SoftBreak | Event::HardBreak => self.newline(),
            Event::Rule => {
                self.blank_line();
                self.line_prefix();
                self.push_style(self.palette.secondary);
                self.out.push_str("────────────────────────");
                self.pop_style();
                self.newline();
            }
            Event::TaskListMarker(checked) => {
                self.line_prefix();
                self.out.push_str(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(name) => {
                self.line_prefix();
                self.out.push_str(&format!("[^{}]", strip_control(&name)));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.blank_line();
                self.line_prefix();
                self.push_style(ANSI_BOLD);
                self.push_style(self.palette.primary);
                if level == HeadingLevel::H1 {
                    self.push_style(ANSI_UNDERLINE);
                }
            }
            Tag::BlockQuote(_) => {
                self.blank_line();
                self.quote_depth += 1;
                self.push_style(ANSI_ITALIC);
            }
            Tag::CodeBlock(_) => {
                self.blank_line();
                self.in_code_block = true;
                self.push_style(self.palette.code);
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.ensure_line_start();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.ensure_line_start();
                self.line_prefix();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                self.out.push_str(&indent);
                match self.lists.last_mut() {
                    Some(Some(n)) => {
                        self.out.push_str(&format!("{n}. "));
                        *n += 1;
                    }
                    _ => self.out.push_str("• "),
                }
            }
            Tag::Emphasis => self.push_style(ANSI_ITALIC),
            Tag::Strong => self.push_style(ANSI_BOLD),
            Tag::Strikethrough => self.push_style(ANSI_STRIKE),
            Tag::Link { dest_url, .. } => {
                self.links.push(strip_control(&dest_url));
                self.push_style(self.palette.link);
            }
            Tag::Image { dest_url, .. } => {
                self.links.push(strip_control(&dest_url));
                self.line_prefix();
                self.out.push_str("[image: ");
            }
            Tag::TableHead | Tag::TableRow => {
                self.ensure_line_start();
                self.line_prefix();
                self.table_cell = 0;
            }
            Tag::Table(_) => self.blank_line(),
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.out.push_str(" │ ");
                }
                self.table_cell += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Heading(level) => {
                if level == HeadingLevel::H1 {
                    self.pop_style();
                }
                self.pop_style();
                self.pop_style();
                self.blank_line();
            }
            TagEnd::BlockQuote(_) => {
                self.pop_style();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank_line();
            }
            TagEnd::CodeBlock => {
                self.pop_style();
                self.in_code_block = false;
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.ensure_line_start(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.links.pop()
                    && !url.is_empty()
                {
                    self.push_style(ANSI_DIM);
                    self.out.push_str(&format!(" ({url})"));
                    self.pop_style();
                }
            }
            TagEnd::Image => {
                self.out.push(']');
                if let Some(url) = self.links.pop()
                    && !url.is_empty()
                {
                    self.out.push_str(&format!(" ({url})"));
                }
            }
            TagEnd::TableHead => {
                self.newline();
                self.line_prefix();
                self.out.push_str("───");
                self.newline();
            }
            TagEnd::TableRow => self.newline(),
            TagEnd::Table => self.blank_line(),
            _ => {}
        }
    }

    fn finish(mut self) -> String {
        if self.use_color && !self.styles.is_empty() {
            self.out.push_str(ANSI_RESET);
        }
        let trimmed = self.out.trim_end_matches('\n').len();
        self.out.truncate(trimmed);
        self.out
    }
}
