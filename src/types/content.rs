use serde::{Deserialize, Serialize};

/// A single piece of request content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    /// Text of this part.
    pub text: String,
}

/// A role-tagged list of parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// The author of the content, always "user" for requests.
    pub role: String,

    /// The content parts.
    pub parts: Vec<Part>,
}

impl Content {
    /// Create user content holding one text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn user_text_serialization() {
        let json = to_value(Content::user_text("hello")).unwrap();
        assert_eq!(json, json!({"role": "user", "parts": [{"text": "hello"}]}));
    }
}
