use serde::{Deserialize, Serialize};

use crate::types::{Content, ThinkingConfig};

/// Generation settings attached to every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Deliberation settings.
    pub thinking_config: ThinkingConfig,
}

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The content to complete.
    pub contents: Vec<Content>,

    /// Generation settings.
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Build a single-turn request for `prompt` with deliberation disabled.
    ///
    /// Only the given prompt is sent; no earlier turns are attached.
    pub fn single_turn(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user_text(prompt)],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig::disabled(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn single_turn_serialization() {
        let request = GenerateContentRequest::single_turn("What is Rust?");
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "What is Rust?"}]}],
                "generationConfig": {"thinkingConfig": {"thinkingBudget": 0}}
            })
        );
    }
}
