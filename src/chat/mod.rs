//! Chat application module for the Elemental AI terminal client.
//!
//! This module provides a REPL chat interface built on top of the
//! conversation and client layers. It supports:
//!
//! - One outstanding request at a time, with a thinking indicator
//! - Markdown rendering of replies in the active theme
//! - Slash commands for theme, export and statistics
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Conversation ownership and request dispatch
//! - [`commands`]: Slash command parsing
//! - [`render`]: Terminal output

mod commands;
mod config;
mod render;
mod session;

pub use commands::{ChatCommand, ThemeChange, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use render::{Renderer, THINKING, TerminalRenderer, format_message};
pub use session::{ChatSession, SessionStats};
