//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation,
//! the active theme and the completion client, and drives one submission at a
//! time through them.

use std::path::Path;

use crate::chat::config::ChatConfig;
use crate::client::{CompletionClient, Gemini};
use crate::conversation::{Conversation, Turn};
use crate::error::{FailureReason, Result};
use crate::export::{APP_TITLE, write_html_page};
use crate::observability::CONVERSATION_ABANDONED;
use crate::theme::{self, Stylesheet, Theme, ThemeStore};
use crate::types::{Message, Sender};

/// A chat session that manages conversation state and API interactions.
///
/// Submission takes `&mut self`, so a session never has more than one request
/// outstanding.
pub struct ChatSession<C: CompletionClient> {
    client: C,
    conversation: Conversation,
    stylesheet: Stylesheet,
    store: Option<ThemeStore>,
    request_count: u64,
    failure_count: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: String,
    /// The active theme.
    pub theme: Theme,
    /// The number of messages in the conversation, greeting included.
    pub message_count: usize,
    /// Messages sent by the user.
    pub user_messages: usize,
    /// Completions shown.
    pub assistant_messages: usize,
    /// Failure notices shown.
    pub error_messages: usize,
    /// Total number of requests made.
    pub total_requests: u64,
    /// Requests that ended in a failure notice.
    pub failed_requests: u64,
}

/// Open turn tied to the conversation it came from.
///
/// Dropping it unsettled records the turn as an unknown failure, so a
/// cancelled or panicking request never leaves the conversation busy.
struct PendingTurn<'a> {
    conversation: &'a mut Conversation,
    turn: Option<Turn>,
}

impl PendingTurn<'_> {
    fn settle(mut self, outcome: std::result::Result<String, FailureReason>) {
        if let Some(turn) = self.turn.take() {
            self.conversation.settle(turn, outcome);
        }
    }
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if let Some(turn) = self.turn.take() {
            CONVERSATION_ABANDONED.click();
            tracing::warn!("request abandoned before it settled");
            self.conversation.settle(turn, Err(FailureReason::Unknown));
        }
    }
}

impl ChatSession<Gemini> {
    /// Creates a Gemini-backed session from a configuration.
    ///
    /// The API key comes from the environment; a missing key is reported on
    /// the first submission rather than here.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is invalid.
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = Gemini::with_options(None, config.base_url.clone(), Some(config.model.clone()))?;
        let store = config.theme_store();
        let theme = match config.theme {
            Some(theme) => theme,
            None => theme::resolve(
                store.as_ref().and_then(ThemeStore::load),
                theme::os_prefers_dark(),
            ),
        };
        Ok(Self::with_client(client, theme, store))
    }
}

impl<C: CompletionClient> ChatSession<C> {
    /// Creates a new chat session with a custom client.
    pub fn with_client(client: C, theme: Theme, store: Option<ThemeStore>) -> Self {
        Self {
            client,
            conversation: Conversation::initialize(),
            stylesheet: Stylesheet::for_theme(theme),
            store,
            request_count: 0,
            failure_count: 0,
        }
    }

    /// Submits one user message and waits for its outcome.
    ///
    /// Whitespace is trimmed; blank input changes nothing and returns `None`.
    /// Otherwise the user message is appended, exactly one request is made,
    /// and the appended assistant or error message is returned.
    pub async fn submit(&mut self, text: &str) -> Option<&Message> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let turn = self.conversation.begin(text)?;
        let prompt = turn.prompt().to_string();
        let pending = PendingTurn {
            conversation: &mut self.conversation,
            turn: Some(turn),
        };

        self.request_count += 1;
        let outcome = self.client.complete(&prompt).await;
        if outcome.is_err() {
            self.failure_count += 1;
        }
        pending.settle(outcome);
        self.conversation.last()
    }

    /// Returns the conversation.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns true while a request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.conversation.is_busy()
    }

    /// Returns the active theme.
    pub fn theme(&self) -> Theme {
        self.stylesheet.theme()
    }

    /// Returns the stylesheet of the active theme.
    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// Switches the theme and saves it as the user's preference.
    ///
    /// The theme changes even when saving fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be written.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.stylesheet = Stylesheet::for_theme(theme);
        match &self.store {
            Some(store) => store.store(theme),
            None => Ok(()),
        }
    }

    /// Switches to the other theme and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be written.
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.theme().toggle();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Writes the conversation as an HTML page in the active theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_html<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_html_page(path, &self.conversation, self.theme(), APP_TITLE)
    }

    /// Returns the current model.
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Returns session statistics.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.client.model().to_string(),
            theme: self.theme(),
            message_count: self.conversation.len(),
            user_messages: self.conversation.count(Sender::User),
            assistant_messages: self.conversation.count(Sender::Assistant),
            error_messages: self.conversation.count(Sender::Error),
            total_requests: self.request_count,
            failed_requests: self.failure_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::conversation::GREETING;

    struct Scripted {
        replies: Mutex<Vec<std::result::Result<String, FailureReason>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(mut replies: Vec<std::result::Result<String, FailureReason>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionClient for Scripted {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> std::result::Result<String, FailureReason> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FailureReason::Unknown))
        }
    }

    #[tokio::test]
    async fn submit_trims_and_appends_reply() {
        let mut session =
            ChatSession::with_client(Scripted::new(vec![Ok("hi".to_string())]), Theme::Light, None);
        let reply = session.submit("  hello \n").await.unwrap();
        assert_eq!(reply.sender(), Sender::Assistant);
        assert_eq!(reply.text(), "hi");
        assert_eq!(session.conversation().messages()[1].text(), "hello");
        assert_eq!(
            session.client.prompts.lock().unwrap().as_slice(),
            ["hello".to_string()]
        );
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn blank_submission_is_ignored() {
        let mut session = ChatSession::with_client(Scripted::new(vec![]), Theme::Light, None);
        assert!(session.submit("   \t").await.is_none());
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.conversation().messages()[0].text(), GREETING);
        assert!(session.client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_is_counted() {
        let mut session = ChatSession::with_client(
            Scripted::new(vec![Err(FailureReason::Configuration), Ok("ok".to_string())]),
            Theme::Dark,
            None,
        );
        let reply = session.submit("one").await.unwrap();
        assert_eq!(reply.sender(), Sender::Error);
        session.submit("two").await.unwrap();

        let stats = session.stats();
        assert_eq!(stats.model, "scripted");
        assert_eq!(stats.theme, Theme::Dark);
        assert_eq!(stats.message_count, 5);
        assert_eq!(stats.user_messages, 2);
        assert_eq!(stats.assistant_messages, 2);
        assert_eq!(stats.error_messages, 1);
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.failed_requests, 1);
    }

    #[test]
    fn set_theme_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(dir.path().join("settings.json"));
        let mut session =
            ChatSession::with_client(Scripted::new(vec![]), Theme::Light, Some(store.clone()));
        assert_eq!(session.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(session.theme(), Theme::Dark);
        assert_eq!(session.stylesheet().theme(), Theme::Dark);
        assert_eq!(store.load(), Some(Theme::Dark));
    }

    #[test]
    fn set_theme_without_store() {
        let mut session = ChatSession::with_client(Scripted::new(vec![]), Theme::Dark, None);
        session.set_theme(Theme::Light).unwrap();
        assert_eq!(session.theme(), Theme::Light);
    }

    #[test]
    fn export_writes_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.html");
        let session = ChatSession::with_client(Scripted::new(vec![]), Theme::Light, None);
        session.export_html(&path).unwrap();
        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.contains(GREETING));
    }
}
