// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod conversation;
pub mod error;
pub mod export;
pub mod markdown;
pub mod theme;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use client::{CompletionClient, DEFAULT_MODEL, Gemini};
pub use client_logger::CompletionLogger;
pub use conversation::{Conversation, GREETING, Turn};
pub use error::{Error, FailureReason, Result};
pub use observability::register_biometrics;
pub use theme::{Stylesheet, Theme, ThemeStore};
pub use types::*;
