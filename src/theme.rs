//! Light and dark presentation themes.
//!
//! The theme is chosen once per session by [`resolve`] and may be changed by
//! the user afterwards.  [`ThemeStore`] persists the choice; [`Stylesheet`]
//! maps a theme to the colours used by the terminal renderer and to the CSS
//! embedded in HTML exports.  Nothing here holds global state: callers pass the
//! active theme to whatever renders.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A presentation theme.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark text on a light background.
    #[default]
    Light,

    /// Light text on a dark background.
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(Error::validation(
                format!("unknown theme {s:?} (expected light or dark)"),
                Some("theme".to_string()),
            )),
        }
    }
}

/// Pick the session theme: a stored preference wins, then the platform's
/// dark-mode hint, then light.
pub fn resolve(stored: Option<Theme>, os_prefers_dark: bool) -> Theme {
    match stored {
        Some(theme) => theme,
        None if os_prefers_dark => Theme::Dark,
        None => Theme::Light,
    }
}

/// Whether the terminal advertises a dark background through `COLORFGBG`.
pub fn os_prefers_dark() -> bool {
    env::var("COLORFGBG")
        .ok()
        .and_then(|value| parse_colorfgbg(&value))
        .unwrap_or(false)
}

/// Interpret a `COLORFGBG` value ("fg;bg" or "fg;extra;bg").
///
/// Returns `Some(true)` for dark backgrounds, `Some(false)` for light ones, and
/// `None` when the value cannot be read.
pub fn parse_colorfgbg(value: &str) -> Option<bool> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(true),
        7 | 9..=15 => Some(false),
        _ => None,
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    theme: Theme,
}

/// Persists the theme preference as a small JSON settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    /// A store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The per-user store, `<config dir>/elemental/settings.json`.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("elemental").join("settings.json")))
    }

    /// Where the settings live.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored theme.  A missing, unreadable or malformed file reads as
    /// no preference.
    pub fn load(&self) -> Option<Theme> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "no stored theme");
                return None;
            }
        };
        match serde_json::from_str::<SettingsFile>(&contents) {
            Ok(settings) => Some(settings.theme),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring malformed settings file");
                None
            }
        }
    }

    /// Write `theme` to the settings file, creating its directory if needed.
    pub fn store(&self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|err| Error::io("failed to create settings directory", err))?;
        }
        let contents = serde_json::to_string_pretty(&SettingsFile { theme })?;
        fs::write(&self.path, contents)
            .map_err(|err| Error::io("failed to write settings file", err))
    }
}

/// ANSI sequences used by the terminal renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Sender label for user messages.
    pub accent: &'static str,
    /// Sender label for assistant messages and headings.
    pub primary: &'static str,
    /// Timestamps, quotes and other secondary text.
    pub secondary: &'static str,
    /// Sender label and body of error messages.
    pub error: &'static str,
    /// Link text.
    pub link: &'static str,
    /// Inline code and code blocks.
    pub code: &'static str,
}

const LIGHT_PALETTE: Palette = Palette {
    accent: "\x1b[38;2;0;122;255m",
    primary: "\x1b[38;2;29;29;31m",
    secondary: "\x1b[38;2;110;110;115m",
    error: "\x1b[38;2;220;38;38m",
    link: "\x1b[38;2;0;122;255m",
    code: "\x1b[38;2;175;82;222m",
};

const DARK_PALETTE: Palette = Palette {
    accent: "\x1b[38;2;10;132;255m",
    primary: "\x1b[38;2;236;236;236m",
    secondary: "\x1b[38;2;160;160;160m",
    error: "\x1b[38;2;248;113;113m",
    link: "\x1b[38;2;10;132;255m",
    code: "\x1b[38;2;191;90;242m",
};

/// CSS colour values for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CssColors {
    background: &'static str,
    text_primary: &'static str,
    text_secondary: &'static str,
    accent: &'static str,
    error: &'static str,
    link: &'static str,
    border: &'static str,
    code_background: &'static str,
    pre_background: &'static str,
    blockquote_border: &'static str,
    scrollbar_thumb: &'static str,
    scrollbar_thumb_hover: &'static str,
}

const LIGHT_CSS: CssColors = CssColors {
    background: "#FFFFFF",
    text_primary: "#1D1D1F",
    text_secondary: "#6E6E73",
    accent: "#007AFF",
    error: "#DC2626",
    link: "#007AFF",
    border: "#D1D1D6",
    code_background: "rgba(0, 0, 0, 0.04)",
    pre_background: "rgba(0, 0, 0, 0.03)",
    blockquote_border: "rgba(0, 0, 0, 0.15)",
    scrollbar_thumb: "rgba(110, 110, 115, 0.45)",
    scrollbar_thumb_hover: "rgba(110, 110, 115, 0.55)",
};

const DARK_CSS: CssColors = CssColors {
    background: "#1C1C1E",
    text_primary: "#ECECEC",
    text_secondary: "#A0A0A0",
    accent: "#0A84FF",
    error: "#F87171",
    link: "#0A84FF",
    border: "#3A3A3C",
    code_background: "rgba(255, 255, 255, 0.08)",
    pre_background: "rgba(255, 255, 255, 0.05)",
    blockquote_border: "rgba(255, 255, 255, 0.2)",
    scrollbar_thumb: "rgba(160, 160, 160, 0.45)",
    scrollbar_thumb_hover: "rgba(160, 160, 160, 0.55)",
};

/// Everything needed to present messages in one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stylesheet {
    theme: Theme,
    palette: Palette,
    css: CssColors,
}

impl Stylesheet {
    /// The stylesheet for `theme`.
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                theme,
                palette: LIGHT_PALETTE,
                css: LIGHT_CSS,
            },
            Theme::Dark => Self {
                theme,
                palette: DARK_PALETTE,
                css: DARK_CSS,
            },
        }
    }

    /// The theme this stylesheet renders.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Terminal colours.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// CSS for page layout, message prose and scrollbars.
    pub fn css(&self) -> String {
        let c = &self.css;
        format!(
            r#"body {{
  margin: 0;
  background: {background};
  color: {text_primary};
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
}}
main {{
  max-width: 48rem;
  margin: 0 auto;
  padding: 2rem 1rem;
}}
.message {{
  padding: 0.75rem 0.25rem;
}}
.message .sender {{
  font-size: 0.75rem;
  font-weight: 500;
  margin: 0 0 0.25rem 0;
}}
.message.user .sender {{ color: {accent}; }}
.message.assistant .sender {{ color: {text_primary}; }}
.message.error .sender, .message.error .body {{ color: {error}; }}
.message .time {{
  font-size: 0.75rem;
  margin: 0.375rem 0 0 0;
  color: {text_secondary};
}}
.message.user .body {{ white-space: pre-wrap; }}
.prose-elemental {{ font-size: 0.875rem; line-height: 1.625; }}
.prose-elemental p {{ margin-top: 0.5em; margin-bottom: 0.5em; }}
.prose-elemental a {{ color: {link}; text-decoration: none; }}
.prose-elemental a:hover {{ text-decoration: underline; }}
.prose-elemental strong {{ font-weight: 600; }}
.prose-elemental em {{ font-style: italic; }}
.prose-elemental code:not(pre code) {{
  background-color: {code_background};
  padding: 0.1em 0.3em;
  border-radius: 0.25rem;
  font-size: 0.875em;
  font-family: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, "Liberation Mono", "Courier New", monospace;
}}
.prose-elemental pre {{
  background-color: {pre_background};
  padding: 0.75em 1em;
  border-radius: 0.375rem;
  overflow-x: auto;
  margin-top: 1em;
  margin-bottom: 1em;
}}
.prose-elemental pre code {{ background-color: transparent; padding: 0; font-size: 0.875em; color: inherit; }}
.prose-elemental blockquote {{
  border-left: 3px solid {blockquote_border};
  padding-left: 0.75em;
  margin-left: 0;
  margin-right: 0;
  font-style: italic;
  color: {text_secondary};
  margin-top: 1em;
  margin-bottom: 1em;
}}
.prose-elemental ul, .prose-elemental ol {{ margin-top: 0.75em; margin-bottom: 0.75em; padding-left: 1.5em; }}
.prose-elemental ul {{ list-style-type: disc; }}
.prose-elemental ol {{ list-style-type: decimal; }}
.prose-elemental li {{ margin-top: 0.25em; margin-bottom: 0.25em; }}
.prose-elemental li > p {{ margin-top: 0.25em; margin-bottom: 0.25em; }}
.prose-elemental hr {{ border: 0; border-top: 1px solid {border}; margin-top: 1.5em; margin-bottom: 1.5em; }}
.prose-elemental h1, .prose-elemental h2, .prose-elemental h3, .prose-elemental h4, .prose-elemental h5, .prose-elemental h6 {{
  font-weight: 600;
  margin-top: 1.2em;
  margin-bottom: 0.6em;
}}
.prose-elemental h1 {{ font-size: 1.5em; }}
.prose-elemental h2 {{ font-size: 1.25em; }}
.prose-elemental h3 {{ font-size: 1.125em; }}
.prose-elemental table {{ border-collapse: collapse; }}
.prose-elemental th, .prose-elemental td {{ border: 1px solid {border}; padding: 0.25em 0.5em; }}
.custom-scrollbar::-webkit-scrollbar {{ width: 6px; }}
.custom-scrollbar::-webkit-scrollbar-track {{ background: transparent; }}
.custom-scrollbar::-webkit-scrollbar-thumb {{ background: {scrollbar_thumb}; border-radius: 3px; }}
.custom-scrollbar::-webkit-scrollbar-thumb:hover {{ background: {scrollbar_thumb_hover}; }}
.custom-scrollbar {{ scrollbar-width: thin; scrollbar-color: {scrollbar_thumb} transparent; }}
"#,
            background = c.background,
            text_primary = c.text_primary,
            text_secondary = c.text_secondary,
            accent = c.accent,
            error = c.error,
            link = c.link,
            border = c.border,
            code_background = c.code_background,
            pre_background = c.pre_background,
            blockquote_border = c.blockquote_border,
            scrollbar_thumb = c.scrollbar_thumb,
            scrollbar_thumb_hover = c.scrollbar_thumb_hover,
        )
    }
}
