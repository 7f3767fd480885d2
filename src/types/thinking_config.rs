use serde::{Deserialize, Serialize};

/// Controls how much extended deliberation the model performs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Token budget for deliberation; zero disables it.
    pub thinking_budget: u32,
}

impl ThinkingConfig {
    /// A configuration with deliberation disabled.
    pub fn disabled() -> Self {
        Self { thinking_budget: 0 }
    }
}

impl Default for ThinkingConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn disabled_serialization() {
        let json = to_value(ThinkingConfig::disabled()).unwrap();
        assert_eq!(json, json!({"thinkingBudget": 0}));
    }
}
