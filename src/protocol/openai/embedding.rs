use serde::{Deserialize, Deserializer, Serialize};

use super::union::{
    decode_element, decode_string, deserialize_input, deserialize_raw, skip_leading_whitespace,
    TextOrTokens,
};
use crate::error::SchemaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    #[serde(deserialize_with = "deserialize_input")]
    pub input: TextOrTokens,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
}

/// An embedding as floats, or base64 when `encoding_format` was `base64`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EmbeddingVector {
    Floats(Vec<f64>),
    Base64(String),
}

impl EmbeddingVector {
    /// # Errors
    ///
    /// Returns a shape error naming the `embedding` field.
    pub fn decode(data: &[u8]) -> Result<Self, SchemaError> {
        const FIELD: &str = "embedding";
        let idx = skip_leading_whitespace(FIELD, data, 0)?;
        match data[idx] {
            b'[' => decode_element(FIELD, "[]float64", &data[idx..]).map(Self::Floats),
            b'"' => decode_string(FIELD, &data[idx..]).map(Self::Base64),
            _ => Err(SchemaError::InvalidType {
                field: FIELD,
                expected: "array of floats or base64 string",
            }),
        }
    }

    #[must_use]
    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Self::Floats(values) => Some(values),
            Self::Base64(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for EmbeddingVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw(deserializer, Self::decode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub object: String,
    pub embedding: EmbeddingVector,
    pub index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    pub prompt_tokens: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub object: String,
    pub data: Vec<Embedding>,
    pub model: String,
    pub usage: EmbeddingUsage,
}
