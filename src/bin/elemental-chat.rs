//! Interactive terminal chat with Elemental AI.
//!
//! This binary provides a REPL interface for chatting with a Gemini model.
//! Each prompt is sent on its own; replies are rendered as markdown in the
//! active theme.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! elemental-chat
//!
//! # Use a different model for this session
//! elemental-chat --model gemini-2.5-pro
//!
//! # Force the dark theme without changing the saved preference
//! elemental-chat --theme dark
//!
//! # Disable colors (useful for piping output)
//! elemental-chat --no-color
//! ```
//!
//! The API key is read from `GEMINI_API_KEY` or `API_KEY`.  Diagnostics go to
//! stderr and are filtered by `ELEMENTAL_LOG` (default `warn`).
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/theme [light|dark|toggle]` - Show or change the theme
//! - `/export <file>` - Save the conversation as HTML
//! - `/history` - Show the whole conversation again
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use elemental::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, Renderer, TerminalRenderer, ThemeChange,
    help_text, parse_command,
};
use elemental::export::APP_TITLE;
use elemental::CompletionClient;

const BUSY_NOTICE: &str = "A reply is still on its way; requests cannot be cancelled.";

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ELEMENTAL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Main entry point for the elemental-chat application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let (args, _) = ChatArgs::from_command_line_relaxed("elemental-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;
    let use_color = config.use_color;

    let mut session = ChatSession::new(&config)?;
    let mut renderer = TerminalRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Set while a request is outstanding; the line editor handles Ctrl+C otherwise.
    let in_flight = Arc::new(AtomicBool::new(false));
    let in_flight_clone = in_flight.clone();
    ctrlc::set_handler(move || {
        if in_flight_clone.load(Ordering::Relaxed) {
            eprintln!("\n{}", BUSY_NOTICE);
        }
    })?;

    println!("{} (model: {}, theme: {})", APP_TITLE, session.model(), session.theme());
    println!("Type /help for commands, /quit to exit\n");
    for message in session.conversation().messages() {
        renderer.print_message(message, session.stylesheet());
    }

    loop {
        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Theme(change) => {
                            let result = match change {
                                ThemeChange::Show => Ok(session.theme()),
                                ThemeChange::Toggle => session.toggle_theme(),
                                ThemeChange::Set(theme) => {
                                    session.set_theme(theme).map(|_| theme)
                                }
                            };
                            match result {
                                Ok(theme) => renderer.print_info(&format!("Theme: {}", theme)),
                                Err(err) => renderer.print_error(&format!(
                                    "Theme set to {} but not saved: {}",
                                    session.theme(),
                                    err
                                )),
                            }
                        }
                        ChatCommand::Export(path) => match session.export_html(&path) {
                            Ok(()) => {
                                renderer.print_info(&format!("Conversation exported to {}", path))
                            }
                            Err(err) => {
                                renderer.print_error(&format!("Failed to export: {}", err))
                            }
                        },
                        ChatCommand::History => {
                            for message in session.conversation().messages() {
                                renderer.print_message(message, session.stylesheet());
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                renderer.print_pending(session.stylesheet());
                in_flight.store(true, Ordering::Relaxed);
                let reply = session.submit(line).await.cloned();
                in_flight.store(false, Ordering::Relaxed);
                renderer.clear_pending();
                if let Some(reply) = reply {
                    renderer.print_message(&reply, session.stylesheet());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_stats<C: CompletionClient>(session: &ChatSession<C>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Theme: {}", stats.theme);
    println!("      Messages: {}", stats.message_count);
    println!("        from you: {}", stats.user_messages);
    println!("        replies: {}", stats.assistant_messages);
    println!("        errors: {}", stats.error_messages);
    println!("      Requests: {}", stats.total_requests);
    println!("      Failed requests: {}", stats.failed_requests);
}
