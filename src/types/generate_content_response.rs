use serde::{Deserialize, Serialize};

/// A response part.  Non-text parts deserialize with `text` unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponsePart {
    /// Text of this part, if it is a text part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Set on parts that carry model deliberation rather than the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

/// The content of a candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseContent {
    /// Parts of the candidate.
    #[serde(default)]
    pub parts: Vec<ResponsePart>,

    /// Role of the author, normally "model".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// One generated candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content, absent when generation was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ResponseContent>,

    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Body of a successful `generateContent` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Model version that served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// The text of the first candidate: its non-thought text parts joined in
    /// order.  Returns `None` when there is no text at all.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let mut text: Option<String> = None;
        for part in &content.parts {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(piece) = &part.text {
                text.get_or_insert_with(String::new).push_str(piece);
            }
        }
        text
    }
}
