//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the REPL can
//! draw messages without knowing where they go.  The default implementation
//! writes ANSI-styled text to stdout using the palette of the active theme.

use std::io::{self, Stdout, Write};

use crate::export::sender_label;
use crate::markdown::{self, strip_control};
use crate::theme::Stylesheet;
use crate::types::{Message, Sender};
use crate::utils::time::clock;

/// ANSI escape code for bold text (used for sender labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the thinking indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Text shown while a request is outstanding.
pub const THINKING: &str = "Elemental AI is thinking...";

/// Trait for rendering chat output.
///
/// The stylesheet is passed on every call so a theme switch takes effect on
/// the very next message.
pub trait Renderer: Send {
    /// Print one conversation message.
    fn print_message(&mut self, message: &Message, stylesheet: &Stylesheet);

    /// Show the thinking indicator.
    fn print_pending(&mut self, stylesheet: &Stylesheet);

    /// Remove the thinking indicator, if shown.
    fn clear_pending(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Format `message` the way [`TerminalRenderer`] prints it.
///
/// User text is shown verbatim (minus control sequences); assistant and error
/// text is rendered as markdown.
pub fn format_message(message: &Message, stylesheet: &Stylesheet, use_color: bool) -> String {
    let palette = stylesheet.palette();
    let label = sender_label(message.sender());
    let time = clock(message.timestamp());
    let body = if message.sender().renders_markdown() {
        markdown::to_terminal(message.text(), palette, use_color)
    } else {
        strip_control(message.text())
    };
    let body = body.trim_end();

    if !use_color {
        return format!("{label} · {time}\n{body}\n");
    }

    let label_color = match message.sender() {
        Sender::User => palette.accent,
        Sender::Assistant => palette.primary,
        Sender::Error => palette.error,
    };
    let body = match message.sender() {
        Sender::Error => format!("{}{}{}", palette.error, body, ANSI_RESET),
        _ => body.to_string(),
    };
    format!(
        "{ANSI_BOLD}{label_color}{label}{ANSI_RESET} {}· {time}{ANSI_RESET}\n{body}\n",
        palette.secondary
    )
}

/// Terminal renderer with optional ANSI styling.
pub struct TerminalRenderer {
    stdout: Stdout,
    use_color: bool,
    pending: bool,
}

impl TerminalRenderer {
    /// Creates a new TerminalRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new TerminalRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            pending: false,
        }
    }

    /// Returns true if the thinking indicator is on screen.
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalRenderer {
    fn print_message(&mut self, message: &Message, stylesheet: &Stylesheet) {
        self.clear_pending();
        let text = format_message(message, stylesheet, self.use_color);
        let _ = writeln!(self.stdout, "{}", text);
        let _ = self.stdout.flush();
    }

    fn print_pending(&mut self, stylesheet: &Stylesheet) {
        if self.use_color {
            let _ = write!(
                self.stdout,
                "{}{}{}{}",
                ANSI_DIM,
                stylesheet.palette().secondary,
                THINKING,
                ANSI_RESET
            );
        } else {
            let _ = write!(self.stdout, "{}", THINKING);
        }
        let _ = self.stdout.flush();
        self.pending = true;
    }

    fn clear_pending(&mut self) {
        if !self.pending {
            return;
        }
        if self.use_color {
            let _ = write!(self.stdout, "\r\x1b[2K");
        } else {
            let _ = writeln!(self.stdout);
        }
        let _ = self.stdout.flush();
        self.pending = false;
    }

    fn print_error(&mut self, error: &str) {
        self.clear_pending();
        if self.use_color {
            let _ = writeln!(self.stdout, "{}Error: {}{}", ANSI_BOLD, error, ANSI_RESET);
        } else {
            let _ = writeln!(self.stdout, "Error: {}", error);
        }
        let _ = self.stdout.flush();
    }

    fn print_info(&mut self, info: &str) {
        self.clear_pending();
        if self.use_color {
            let _ = writeln!(self.stdout, "{}{}{}", ANSI_DIM, info, ANSI_RESET);
        } else {
            let _ = writeln!(self.stdout, "{}", info);
        }
        let _ = self.stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    #[test]
    fn renderer_creation() {
        let renderer = TerminalRenderer::new();
        assert!(renderer.use_color);
        assert!(!renderer.is_pending());

        let renderer = TerminalRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn plain_user_message_is_verbatim() {
        let stylesheet = Stylesheet::for_theme(Theme::Light);
        let message = Message::user("**not bold**\x1b[31m");
        let text = format_message(&message, &stylesheet, false);
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("You · "));
        assert_eq!(lines.next(), Some("**not bold**"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn plain_assistant_message_renders_markdown() {
        let stylesheet = Stylesheet::for_theme(Theme::Dark);
        let message = Message::assistant("**bold** and `code`");
        let text = format_message(&message, &stylesheet, false);
        assert!(text.starts_with("Elemental AI · "));
        assert!(text.contains("bold and code"));
        assert!(!text.contains("**"));
    }

    #[test]
    fn colored_output_follows_theme() {
        let message = Message::error("An error occurred: boom. Please try again.");
        let light = format_message(&message, &Stylesheet::for_theme(Theme::Light), true);
        let dark = format_message(&message, &Stylesheet::for_theme(Theme::Dark), true);
        assert!(light.contains(Stylesheet::for_theme(Theme::Light).palette().error));
        assert!(dark.contains(Stylesheet::for_theme(Theme::Dark).palette().error));
        assert_ne!(light, dark);
        assert!(light.contains("Error"));
    }
}
