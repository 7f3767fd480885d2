//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the API.

use crate::theme::Theme;

/// What a `/theme` command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChange {
    /// Report the active theme.
    Show,
    /// Switch to the other theme.
    Toggle,
    /// Switch to the given theme.
    Set(Theme),
}

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Show, toggle or set the theme.
    Theme(ThemeChange),

    /// Write the conversation to an HTML file.
    Export(String),

    /// Render the whole conversation again.
    History,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics.
    Stats,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use elemental::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/theme dark").is_some());
/// assert!(parse_command("Hello there!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "theme" => match argument {
            None => ChatCommand::Theme(ThemeChange::Show),
            Some(arg) if arg.eq_ignore_ascii_case("toggle") => {
                ChatCommand::Theme(ThemeChange::Toggle)
            }
            Some(arg) => match arg.parse::<Theme>() {
                Ok(theme) => ChatCommand::Theme(ThemeChange::Set(theme)),
                Err(_) => {
                    ChatCommand::Invalid("/theme expects 'light', 'dark', or 'toggle'".to_string())
                }
            },
        },
        "export" => match argument {
            Some(arg) => ChatCommand::Export(arg.to_string()),
            None => ChatCommand::Invalid("/export requires a file path".to_string()),
        },
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /theme                 Show the current theme
  /theme light|dark      Switch theme (saved for next time)
  /theme toggle          Switch to the other theme
  /export <file>         Save the conversation as an HTML page
  /history               Show the whole conversation again
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
