//! OpenAI-compatible wire schema: chat completions, legacy completions,
//! embeddings and models, plus the vendor extension fields that Anthropic and
//! GCP flavoured clients embed in an OpenAI-shaped request.

pub mod chat;
pub mod completion;
pub mod content;
pub(crate) mod discriminator;
pub mod embedding;
pub mod message;
pub mod model;
pub mod response;
pub mod time;
pub mod union;
pub mod vendor;

pub use chat::{
    ChatCompletionRequest, FunctionDefinition, JsonSchemaFormat, NamedToolChoice, ResponseFormat,
    StreamOptions, Tool, ToolChoice, WebSearchOptions,
};
pub use completion::{CompletionChoice, CompletionLogprobs, CompletionRequest, CompletionResponse};
pub use content::{
    AssistantContent, AssistantContentPart, ContentUnion, TextPart, UserContent, UserContentPart,
};
pub use embedding::{Embedding, EmbeddingRequest, EmbeddingResponse, EmbeddingVector};
pub use message::{ChatMessage, ChatRole};
pub use model::{Model, ModelList};
pub use response::{
    Annotation, ChatCompletionResponse, ChatCompletionResponseChunk, Choice, ChunkChoice,
    ChunkDelta, ResponseMessage, ToolCall, ToolCallFunction, UrlCitation, Usage,
};
pub use time::UnixTime;
pub use union::{StopUnion, TextOrTokens};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Body entry points
// ---------------------------------------------------------------------------

fn decode_body<T: DeserializeOwned>(kind: &'static str, body: &[u8]) -> Result<T, SchemaError> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(kind, body_len = body.len(), error = %err, "schema decode failed");
        SchemaError::Json(err)
    })
}

/// Decode a `/v1/chat/completions` request body.
///
/// # Errors
///
/// Returns [`SchemaError::Json`] carrying the first shape or discriminator
/// error hit while decoding.
pub fn decode_chat_completion_request(body: &[u8]) -> Result<ChatCompletionRequest, SchemaError> {
    decode_body("chat_completion_request", body)
}

/// Decode a non-streaming chat completion response body.
///
/// # Errors
///
/// Returns [`SchemaError::Json`] when the body does not match the schema.
pub fn decode_chat_completion_response(
    body: &[u8],
) -> Result<ChatCompletionResponse, SchemaError> {
    decode_body("chat_completion_response", body)
}

/// Decode a single streamed chat completion fragment (the payload of one
/// `data:` line).
///
/// # Errors
///
/// Returns [`SchemaError::Chunk`] when the payload does not match the schema.
pub fn decode_chat_completion_chunk(
    payload: &[u8],
) -> Result<ChatCompletionResponseChunk, SchemaError> {
    serde_json::from_slice(payload).map_err(SchemaError::Chunk)
}

/// Decode a `/v1/completions` request body.
///
/// # Errors
///
/// Returns [`SchemaError::Json`] when the body does not match the schema.
pub fn decode_completion_request(body: &[u8]) -> Result<CompletionRequest, SchemaError> {
    decode_body("completion_request", body)
}

/// Decode a `/v1/embeddings` request body.
///
/// # Errors
///
/// Returns [`SchemaError::Json`] when the body does not match the schema.
pub fn decode_embedding_request(body: &[u8]) -> Result<EmbeddingRequest, SchemaError> {
    decode_body("embedding_request", body)
}

// ---------------------------------------------------------------------------
// serde helpers
// ---------------------------------------------------------------------------

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Treat an explicit `null` like an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
