//! Vendor extension fields carried inside an OpenAI-shaped body.
//!
//! GCP Vertex AI fields keep their camelCase wire names; the Anthropic
//! `thinking` block keeps its snake_case ones.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GCP Vertex AI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpThinkingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_thoughts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<i64>,
}

/// `generationConfig` on a chat request routed to Gemini.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpGenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<GcpThinkingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

/// One entry of `safetySettings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcpSafetySetting {
    pub category: String,
    pub threshold: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Safety rating attached to a GCP response message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRating {
    pub category: String,
    pub probability: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

// ---------------------------------------------------------------------------
// Anthropic
// ---------------------------------------------------------------------------

/// Extended thinking toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnthropicThinking {
    Enabled { budget_tokens: i64 },
    Disabled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generation_config_camel_case() {
        let raw = json!({"thinkingConfig": {"includeThoughts": true, "thinkingBudget": 1024}});
        let config: GcpGenerationConfig = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(
            config.thinking_config.as_ref().and_then(|t| t.thinking_budget),
            Some(1024)
        );
        assert_eq!(serde_json::to_value(&config).unwrap(), raw);
    }

    #[test]
    fn test_anthropic_thinking() {
        let enabled: AnthropicThinking =
            serde_json::from_str(r#"{"type":"enabled","budget_tokens":2048}"#).unwrap();
        assert_eq!(enabled, AnthropicThinking::Enabled { budget_tokens: 2048 });
        assert_eq!(
            serde_json::to_string(&AnthropicThinking::Disabled).unwrap(),
            r#"{"type":"disabled"}"#
        );
    }
}
