//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_MODEL;
use crate::error::{Error, Result};
use crate::theme::{Theme, ThemeStore};

/// Command-line arguments for the elemental-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to send prompts to.
    #[arrrg(optional, "Model to use (default: gemini-2.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// API root, for proxies and local test servers.
    #[arrrg(optional, "API root URL (default: Gemini v1beta)", "URL")]
    pub base_url: Option<String>,

    /// Theme for this session, overriding the stored preference.
    #[arrrg(optional, "Theme for this session: light or dark", "THEME")]
    pub theme: Option<String>,

    /// Settings file holding the theme preference.
    #[arrrg(optional, "Settings file (default: <config dir>/elemental/settings.json)", "PATH")]
    pub settings: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// The model every request is sent to.
    pub model: String,

    /// Custom API root, if any.
    pub base_url: Option<String>,

    /// Theme forced for this session; `None` resolves the stored preference.
    pub theme: Option<Theme>,

    /// Settings file location; `None` uses the per-user default.
    pub settings_path: Option<PathBuf>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.5-flash
    /// - Endpoint: the public Gemini API
    /// - Theme: resolved from settings and the terminal
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            theme: None,
            settings_path: None,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Forces the session theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Sets the settings file location.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The store the theme preference is read from and written to.
    pub fn theme_store(&self) -> Option<ThemeStore> {
        match &self.settings_path {
            Some(path) => Some(ThemeStore::new(path.clone())),
            None => ThemeStore::default_location(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        let theme = args.theme.as_deref().map(str::parse::<Theme>).transpose()?;
        let model = args
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(ChatConfig {
            model,
            base_url: args.base_url,
            theme,
            settings_path: args.settings.map(PathBuf::from),
            use_color: !args.no_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.base_url.is_none());
        assert!(config.theme.is_none());
        assert!(config.settings_path.is_none());
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("gemini-2.5-pro".to_string()),
            base_url: Some("http://127.0.0.1:3000/v1beta".to_string()),
            theme: Some("dark".to_string()),
            settings: Some("/tmp/elemental.json".to_string()),
            no_color: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(
            config.base_url.as_deref(),
            Some("http://127.0.0.1:3000/v1beta")
        );
        assert_eq!(config.theme, Some(Theme::Dark));
        assert_eq!(
            config.theme_store().unwrap().path(),
            std::path::Path::new("/tmp/elemental.json")
        );
        assert!(!config.use_color);
    }

    #[test]
    fn config_from_args_rejects_unknown_theme() {
        let args = ChatArgs {
            theme: Some("sepia".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_validation());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model("gemini-2.0-flash")
            .with_base_url("http://localhost:1/")
            .with_theme(Theme::Light)
            .with_settings_path("settings.json")
            .without_color();

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:1/"));
        assert_eq!(config.theme, Some(Theme::Light));
        assert_eq!(config.settings_path, Some(PathBuf::from("settings.json")));
        assert!(!config.use_color);
    }
}
