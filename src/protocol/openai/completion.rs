//! Legacy `/v1/completions`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::chat::StreamOptions;
use super::response::Usage;
use super::time::UnixTime;
use super::union::{deserialize_prompt, StopUnion, TextOrTokens};
use super::{is_false, null_as_default};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    #[serde(deserialize_with = "deserialize_prompt")]
    pub prompt: TextOrTokens,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_of: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<BTreeMap<String, i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopUnion>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
}

/// Per-token log probabilities. Every list vanishes when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionLogprobs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_offset: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token_logprobs: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_logprobs: Vec<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<CompletionLogprobs>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub finish_reason: String,
}

/// A completions response, or one streamed fragment of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<UnixTime>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub system_fingerprint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_wire_shape() {
        let raw = r#"{"text":"Hello","index":0,"finish_reason":"length"}"#;
        let choice: CompletionChoice = serde_json::from_str(raw).unwrap();
        assert_eq!(choice.index, Some(0));
        assert_eq!(serde_json::to_string(&choice).unwrap(), raw);

        let no_index: CompletionChoice = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
        assert_eq!(serde_json::to_string(&no_index).unwrap(), r#"{"text":"x"}"#);
    }

    #[test]
    fn test_empty_logprobs() {
        assert_eq!(
            serde_json::to_string(&CompletionLogprobs::default()).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_prompt_errors_name_the_field() {
        let err = serde_json::from_str::<CompletionRequest>(r#"{"model":"m","prompt":true}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid prompt type"), "{err}");

        let err = serde_json::from_str::<CompletionRequest>(r#"{"model":"m","prompt":"#)
            .unwrap_err();
        assert!(err.is_eof() || err.is_syntax(), "{err}");
    }

    #[test]
    fn test_explicit_zero_parameters_are_kept() {
        let raw = r#"{"model":"m","prompt":[1,2],"max_tokens":0,"temperature":0.0}"#;
        let request: CompletionRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.prompt, TextOrTokens::Tokens(vec![1, 2]));
        assert_eq!(request.max_tokens, Some(0));
        assert_eq!(serde_json::to_string(&request).unwrap(), raw);
    }
}
