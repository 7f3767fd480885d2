//! Conversation state.
//!
//! A [`Conversation`] is the ordered, append-only list of messages shown in one
//! session together with the in-flight flag.  A submission is accepted with
//! [`Conversation::begin`], which hands out a [`Turn`]; the turn is later
//! consumed by [`Conversation::settle`].  While a turn is open every further
//! `begin` is rejected, so at most one request is ever outstanding.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::FailureReason;
use crate::observability::{CONVERSATION_REJECTED, CONVERSATION_TURNS};
use crate::types::{Message, Sender};

/// The greeting every conversation starts with.
pub const GREETING: &str = "Hello! How can I help you today?";

static NEXT_TURN: AtomicU64 = AtomicU64::new(1);

/// Ticket for one accepted submission.
///
/// A turn cannot be cloned; settling consumes it, so each submission settles
/// at most once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an open turn keeps the conversation busy until it is settled"]
pub struct Turn {
    serial: u64,
    prompt: String,
}

impl Turn {
    /// The prompt submitted for this turn.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// The messages of a session and whether a request is outstanding.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    in_flight: Option<u64>,
}

impl Conversation {
    /// Start a conversation holding only the assistant greeting.
    pub fn initialize() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            in_flight: None,
        }
    }

    /// Accept a submission.
    ///
    /// `text` must already be trimmed and non-empty.  When idle, appends a user
    /// message with exactly `text`, marks the conversation busy and returns the
    /// open turn.  When busy, nothing changes and `None` is returned.
    pub fn begin(&mut self, text: &str) -> Option<Turn> {
        if self.in_flight.is_some() {
            CONVERSATION_REJECTED.click();
            tracing::warn!("submission rejected: a request is already in flight");
            return None;
        }
        debug_assert!(
            !text.is_empty() && text.trim() == text,
            "submissions must be trimmed and non-empty"
        );

        let serial = NEXT_TURN.fetch_add(1, Ordering::Relaxed);
        self.messages.push(Message::user(text));
        self.in_flight = Some(serial);
        CONVERSATION_TURNS.click();
        Some(Turn {
            serial,
            prompt: text.to_string(),
        })
    }

    /// Record the outcome of `turn` and return to idle.
    ///
    /// A completion is appended as an assistant message; a failure as an error
    /// message carrying the failure's notice.  Returns the appended message, or
    /// `None` if `turn` is not the one in flight.
    pub fn settle(
        &mut self,
        turn: Turn,
        outcome: Result<String, FailureReason>,
    ) -> Option<&Message> {
        if self.in_flight != Some(turn.serial) {
            tracing::warn!(serial = turn.serial, "ignoring settlement for a turn not in flight");
            return None;
        }
        let message = match outcome {
            Ok(text) => Message::assistant(text),
            Err(reason) => Message::error(reason.to_string()),
        };
        self.messages.push(message);
        self.in_flight = None;
        self.messages.last()
    }

    /// Returns true while a request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages, including the greeting.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: a conversation holds at least its greeting.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages from `sender`.
    pub fn count(&self, sender: Sender) -> usize {
        self.messages
            .iter()
            .filter(|message| message.sender() == sender)
            .count()
    }
}

/// A clone copies the messages but never the open turn; it starts idle, so
/// an outstanding [`Turn`] can only settle the conversation that issued it.
impl Clone for Conversation {
    fn clone(&self) -> Self {
        Self {
            messages: self.messages.clone(),
            in_flight: None,
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::initialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(conversation: &Conversation) -> Vec<(Sender, String)> {
        conversation
            .messages()
            .iter()
            .map(|m| (m.sender(), m.text().to_string()))
            .collect()
    }

    #[test]
    fn initialize_holds_greeting() {
        let conversation = Conversation::initialize();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].sender(), Sender::Assistant);
        assert_eq!(conversation.messages()[0].text(), GREETING);
        assert!(!conversation.is_busy());
        assert!(!conversation.is_empty());
    }

    #[test]
    fn begin_appends_user_message_and_sets_busy() {
        let mut conversation = Conversation::initialize();
        let turn = conversation.begin("hello").unwrap();
        assert_eq!(turn.prompt(), "hello");
        assert!(conversation.is_busy());
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.last().unwrap().sender(), Sender::User);
        assert_eq!(conversation.last().unwrap().text(), "hello");
    }

    #[test]
    fn begin_while_busy_is_a_no_op() {
        let mut conversation = Conversation::initialize();
        let turn = conversation.begin("first").unwrap();
        assert!(conversation.begin("second").is_none());
        assert_eq!(conversation.len(), 2);
        assert!(conversation.is_busy());

        conversation.settle(turn, Ok("reply".to_string()));
        assert_eq!(
            summary(&conversation),
            vec![
                (Sender::Assistant, GREETING.to_string()),
                (Sender::User, "first".to_string()),
                (Sender::Assistant, "reply".to_string()),
            ]
        );
    }

    #[test]
    fn settle_success_round_trip() {
        let mut conversation = Conversation::initialize();
        let turn = conversation.begin("hello").unwrap();
        let appended = conversation.settle(turn, Ok("hi there".to_string())).unwrap();
        assert_eq!(appended.sender(), Sender::Assistant);
        assert!(!conversation.is_busy());
        assert_eq!(
            summary(&conversation),
            vec![
                (Sender::Assistant, GREETING.to_string()),
                (Sender::User, "hello".to_string()),
                (Sender::Assistant, "hi there".to_string()),
            ]
        );
    }

    #[test]
    fn settle_failure_appends_error_notice() {
        let mut conversation = Conversation::initialize();
        let turn = conversation.begin("hello").unwrap();
        conversation.settle(turn, Err(FailureReason::Configuration));
        let last = conversation.last().unwrap();
        assert_eq!(last.sender(), Sender::Error);
        assert_eq!(last.text(), crate::error::CONFIGURATION_NOTICE);
        assert!(!conversation.is_busy());
    }

    #[test]
    fn retry_after_failure() {
        let mut conversation = Conversation::initialize();
        let turn = conversation.begin("hello").unwrap();
        conversation.settle(turn, Err(FailureReason::Unknown));
        let turn = conversation.begin("hello").unwrap();
        conversation.settle(turn, Ok("hi".to_string()));
        assert_eq!(conversation.len(), 5);
        assert_eq!(conversation.count(Sender::User), 2);
        assert_eq!(conversation.count(Sender::Error), 1);
        assert_eq!(conversation.count(Sender::Assistant), 2);
    }

    #[test]
    fn foreign_turn_is_ignored() {
        let mut first = Conversation::initialize();
        let mut second = Conversation::initialize();
        let turn_a = first.begin("a").unwrap();
        let turn_b = second.begin("b").unwrap();

        assert!(second.settle(turn_a, Ok("x".to_string())).is_none());
        assert_eq!(second.len(), 2);
        assert!(second.is_busy());
        assert!(first.is_busy());

        assert!(second.settle(turn_b, Ok("y".to_string())).is_some());
        assert!(!second.is_busy());
    }

    #[test]
    fn clone_of_busy_conversation_cannot_settle_its_turn() {
        let mut original = Conversation::initialize();
        let turn = original.begin("hello").unwrap();
        let mut copy = original.clone();
        assert!(!copy.is_busy());
        assert_eq!(copy.len(), 2);

        assert!(copy.settle(turn, Ok("stolen".to_string())).is_none());
        assert_eq!(copy.len(), 2);
        assert!(original.is_busy());
    }
}
