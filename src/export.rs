//! Self-contained HTML rendering of a conversation.
//!
//! The page inlines the theme stylesheet and renders assistant and error
//! messages through [`markdown::to_html`]; user text is escaped verbatim.

use std::fs;
use std::path::Path;

use crate::conversation::Conversation;
use crate::error::{Error, Result};
use crate::markdown::{self, escape_html};
use crate::theme::{Stylesheet, Theme};
use crate::types::{Message, Sender};
use crate::utils::time::clock;

/// Display name of the assistant.
pub const APP_TITLE: &str = "Elemental AI";

/// The label shown above a message.
pub fn sender_label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "You",
        Sender::Assistant => APP_TITLE,
        Sender::Error => "Error",
    }
}

fn sender_class(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "user",
        Sender::Assistant => "assistant",
        Sender::Error => "error",
    }
}

fn message_html(message: &Message) -> String {
    let body = if message.sender().renders_markdown() {
        markdown::to_html(message.text())
    } else {
        escape_html(message.text())
    };
    let prose = if message.sender().renders_markdown() {
        " prose-elemental"
    } else {
        ""
    };
    format!(
        "<article class=\"message {class}\" id=\"m-{id}\">\n\
         <p class=\"sender\">{label}</p>\n\
         <div class=\"body{prose}\">{body}</div>\n\
         <p class=\"time\">{time}</p>\n\
         </article>\n",
        class = sender_class(message.sender()),
        id = message.id(),
        label = sender_label(message.sender()),
        time = clock(message.timestamp()),
    )
}

/// Render `conversation` as a complete HTML document in `theme`.
pub fn to_html_page(conversation: &Conversation, theme: Theme, title: &str) -> String {
    let stylesheet = Stylesheet::for_theme(theme);
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n");
    page.push_str(&format!("<html lang=\"en\" class=\"{theme}\">\n<head>\n"));
    page.push_str("<meta charset=\"utf-8\">\n");
    page.push_str(
        "<meta http-equiv=\"Content-Security-Policy\" content=\"default-src 'none'; style-src 'unsafe-inline'; img-src https: http:\">\n",
    );
    page.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    page.push_str(&format!("<style>\n{}</style>\n", stylesheet.css()));
    page.push_str("</head>\n<body class=\"custom-scrollbar\">\n<main>\n");
    page.push_str(&format!("<h1 class=\"sender\">{}</h1>\n", escape_html(title)));
    for message in conversation.messages() {
        page.push_str(&message_html(message));
    }
    page.push_str("</main>\n</body>\n</html>\n");
    page
}

/// Write the HTML rendering of `conversation` to `path`.
pub fn write_html_page<P: AsRef<Path>>(
    path: P,
    conversation: &Conversation,
    theme: Theme,
    title: &str,
) -> Result<()> {
    let page = to_html_page(conversation, theme, title);
    fs::write(path.as_ref(), page).map_err(|err| Error::io("failed to write export file", err))
}
