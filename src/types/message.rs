use time::OffsetDateTime;
use uuid::Uuid;

use crate::types::Sender;

/// One entry in a conversation.
///
/// Messages are immutable once created.  The identifier is a rendering key
/// only, and the timestamp is for display; conversations order messages by
/// insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: Uuid,
    text: String,
    sender: Sender,
    timestamp: OffsetDateTime,
}

impl Message {
    /// Create a new message stamped with a fresh identifier and the current time.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: crate::utils::time::now(),
        }
    }

    /// Create a user-authored message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Create an assistant-authored message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }

    /// Create an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Sender::Error, text)
    }

    /// The rendering key for this message.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The message content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Who produced the message.
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// When the message was created.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_tag_sender() {
        assert_eq!(Message::user("hi").sender(), Sender::User);
        assert_eq!(Message::assistant("hi").sender(), Sender::Assistant);
        assert_eq!(Message::error("oops").sender(), Sender::Error);
    }

    #[test]
    fn text_is_kept_verbatim() {
        let message = Message::assistant("  **bold**\n<b>x</b>  ");
        assert_eq!(message.text(), "  **bold**\n<b>x</b>  ");
    }

    #[test]
    fn ids_are_unique() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id(), b.id());
    }
}
