use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// Text typed by the person chatting.
    User,

    /// A completion returned by the model, or the session greeting.
    Assistant,

    /// A failure notice produced when a completion could not be obtained.
    Error,
}

impl Sender {
    /// Returns true for messages whose text is interpreted as markdown.
    pub fn renders_markdown(self) -> bool {
        match self {
            Sender::User => false,
            Sender::Assistant | Sender::Error => true,
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
            Sender::Error => write!(f, "error"),
        }
    }
}
