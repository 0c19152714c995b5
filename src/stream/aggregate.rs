//! Fold streamed chat and completion fragments into one response.
//!
//! Per-field rules for chat streams:
//! - content: concatenation of every `delta.content` of the first choice
//! - role: first non-empty
//! - finish reason: last non-empty, `"stop"` when none was seen
//! - usage: last non-null
//! - annotations: appended in arrival order
//! - obfuscation: last non-empty
//! - id, created, model, service tier, system fingerprint: first fragment
//! - tool calls: grouped by `index`, arguments concatenated

use smallvec::SmallVec;
use tracing::debug;

use super::sse::{classify_line, SseLineDecoder, SsePayload};
use crate::error::SchemaError;
use crate::observability::log_usage;
use crate::protocol::openai::completion::{CompletionChoice, CompletionResponse};
use crate::protocol::openai::decode_chat_completion_chunk;
use crate::protocol::openai::response::{
    Annotation, ChatCompletionResponse, ChatCompletionResponseChunk, Choice, ResponseMessage,
    ToolCall, Usage,
};
use crate::protocol::openai::time::UnixTime;

/// `object` of an aggregated stream; the chunk type is kept.
pub const AGGREGATE_OBJECT: &str = "chat.completion.chunk";
const DEFAULT_FINISH_REASON: &str = "stop";

// ---------------------------------------------------------------------------
// ChatStreamAggregator
// ---------------------------------------------------------------------------

/// Incremental chat-stream fold. Memory grows with the accumulated response,
/// not with the number of fragments.
#[derive(Debug, Default)]
pub struct ChatStreamAggregator {
    chunks: usize,
    done: bool,
    id: String,
    created: Option<UnixTime>,
    model: String,
    service_tier: String,
    system_fingerprint: String,
    role: String,
    content: String,
    finish_reason: String,
    annotations: Option<Vec<Annotation>>,
    tool_calls: SmallVec<[ToolCall; 2]>,
    usage: Option<Usage>,
    obfuscation: String,
}

impl ChatStreamAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fragments folded so far.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Whether `data: [DONE]` has been seen. Later lines are ignored.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn push(&mut self, chunk: &ChatCompletionResponseChunk) {
        if self.chunks == 0 {
            self.id.clone_from(&chunk.id);
            self.created = chunk.created;
            self.model.clone_from(&chunk.model);
            self.service_tier.clone_from(&chunk.service_tier);
            self.system_fingerprint.clone_from(&chunk.system_fingerprint);
        }
        self.chunks += 1;

        if let Some(choice) = chunk.choices.first() {
            if let Some(delta) = &choice.delta {
                if let Some(content) = &delta.content {
                    self.content.push_str(content);
                }
                if self.role.is_empty() && !delta.role.is_empty() {
                    self.role.clone_from(&delta.role);
                }
                if let Some(annotations) = &delta.annotations {
                    self.annotations
                        .get_or_insert_with(Vec::new)
                        .extend_from_slice(annotations);
                }
                for (position, call) in delta.tool_calls.iter().enumerate() {
                    self.merge_tool_call(position, call);
                }
            }
            if !choice.finish_reason.is_empty() {
                self.finish_reason.clone_from(&choice.finish_reason);
            }
        }

        if chunk.usage.is_some() {
            self.usage.clone_from(&chunk.usage);
        }
        if !chunk.obfuscation.is_empty() {
            self.obfuscation.clone_from(&chunk.obfuscation);
        }
    }

    fn merge_tool_call(&mut self, position: usize, call: &ToolCall) {
        let index = call
            .index
            .unwrap_or_else(|| i64::try_from(position).unwrap_or(i64::MAX));
        let slot = match self.tool_calls.iter().position(|c| c.index == Some(index)) {
            Some(found) => &mut self.tool_calls[found],
            None => {
                self.tool_calls.push(ToolCall {
                    index: Some(index),
                    ..ToolCall::default()
                });
                let newest = self.tool_calls.len() - 1;
                &mut self.tool_calls[newest]
            }
        };

        if slot.id.is_none() {
            slot.id = call.id.clone().filter(|id| !id.is_empty());
        }
        if slot.type_.is_empty() {
            slot.type_.clone_from(&call.type_);
        }
        if slot.function.name.is_empty() {
            slot.function.name.clone_from(&call.function.name);
        }
        slot.function.arguments.push_str(&call.function.arguments);
    }

    /// Fold one SSE line (without its newline).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Chunk`] when a `data:` payload is not a chat
    /// completion chunk.
    pub fn push_sse_line(&mut self, line: &[u8]) -> Result<(), SchemaError> {
        match classify_line(line) {
            Some(payload) => self.push_payload(payload),
            None => Ok(()),
        }
    }

    fn push_payload(&mut self, payload: SsePayload<'_>) -> Result<(), SchemaError> {
        if self.done {
            return Ok(());
        }
        match payload {
            SsePayload::Done => self.done = true,
            SsePayload::Data(data) => {
                let chunk = decode_chat_completion_chunk(data)?;
                self.push(&chunk);
            }
        }
        Ok(())
    }

    /// Build the aggregated response.
    ///
    /// Without any fragment the result is a minimal response: one choice with
    /// finish reason `"stop"` and no content.
    #[must_use]
    pub fn finish(self) -> ChatCompletionResponse {
        let finish_reason = if self.finish_reason.is_empty() {
            DEFAULT_FINISH_REASON.to_string()
        } else {
            self.finish_reason
        };

        if self.chunks == 0 {
            debug!("stream carried no chunks, returning minimal response");
            return ChatCompletionResponse {
                object: AGGREGATE_OBJECT.to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: ResponseMessage {
                        role: self.role,
                        ..ResponseMessage::default()
                    },
                    finish_reason,
                    logprobs: None,
                }],
                ..ChatCompletionResponse::default()
            };
        }

        debug!(
            chunks = self.chunks,
            content_len = self.content.len(),
            tool_calls = self.tool_calls.len(),
            finish_reason = %finish_reason,
            "aggregated chat stream"
        );

        let tool_calls = self
            .tool_calls
            .into_iter()
            .map(|mut call| {
                call.index = None;
                call
            })
            .collect();

        ChatCompletionResponse {
            id: self.id,
            object: AGGREGATE_OBJECT.to_string(),
            created: self.created,
            model: self.model,
            service_tier: self.service_tier,
            system_fingerprint: self.system_fingerprint,
            choices: vec![Choice {
                index: 0,
                message: ResponseMessage {
                    content: Some(self.content),
                    role: self.role,
                    tool_calls,
                    annotations: self.annotations,
                    ..ResponseMessage::default()
                },
                finish_reason,
                logprobs: None,
            }],
            usage: self.usage,
            obfuscation: self.obfuscation,
        }
    }
}

// ---------------------------------------------------------------------------
// SseChatAggregator
// ---------------------------------------------------------------------------

/// Chat-stream fold fed with raw SSE bytes as they arrive.
#[derive(Debug, Default)]
pub struct SseChatAggregator {
    decoder: SseLineDecoder,
    inner: ChatStreamAggregator,
}

impl SseChatAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`SchemaError::Chunk`] for the first undecodable fragment.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), SchemaError> {
        let Self { decoder, inner } = self;
        decoder.feed(bytes, |payload| inner.push_payload(payload))
    }

    /// Flush any unterminated last line and build the response.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Chunk`] when the flushed line is undecodable.
    pub fn finish(self) -> Result<ChatCompletionResponse, SchemaError> {
        let Self {
            mut decoder,
            mut inner,
        } = self;
        decoder.finish(|payload| inner.push_payload(payload))?;
        Ok(inner.finish())
    }
}

// ---------------------------------------------------------------------------
// One-shot forms
// ---------------------------------------------------------------------------

/// Fold a list of decoded chat fragments.
#[must_use]
pub fn aggregate_chat_chunks(chunks: &[ChatCompletionResponseChunk]) -> ChatCompletionResponse {
    let mut aggregator = ChatStreamAggregator::new();
    for chunk in chunks {
        aggregator.push(chunk);
    }
    aggregator.finish()
}

/// Fold a complete captured SSE body into a typed response.
///
/// # Errors
///
/// Returns [`SchemaError::Chunk`] when any fragment before `[DONE]` is not
/// a chat completion chunk.
pub fn aggregate_chat_sse_response(body: &[u8]) -> Result<ChatCompletionResponse, SchemaError> {
    let mut aggregator = SseChatAggregator::new();
    aggregator.feed(body)?;
    aggregator.finish()
}

/// Fold a complete captured SSE body into a JSON-encoded response.
///
/// Empty input yields empty output.
///
/// # Errors
///
/// Returns [`SchemaError::Chunk`] when any fragment before `[DONE]` is not
/// a chat completion chunk.
pub fn aggregate_chat_sse(body: &[u8]) -> Result<Vec<u8>, SchemaError> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let response = aggregate_chat_sse_response(body)?;
    if let Some(usage) = &response.usage {
        log_usage(&response.model, usage);
    }
    Ok(serde_json::to_vec(&response)?)
}

/// Fold streamed legacy-completion fragments.
///
/// Choices are grouped by `index` (absent means 0): text is concatenated and
/// the last non-empty finish reason kept. `id`, `created` and `model` come
/// from the last fragment, usage is the last non-null, everything else from
/// the first. Returns `None` for an empty list.
#[must_use]
pub fn aggregate_completion_chunks(chunks: &[CompletionResponse]) -> Option<CompletionResponse> {
    let first = chunks.first()?;
    let last = chunks.last()?;

    let mut choices: Vec<CompletionChoice> = Vec::new();
    let mut usage = None;
    for chunk in chunks {
        for choice in &chunk.choices {
            let index = choice.index.unwrap_or(0);
            let slot = match choices.iter().position(|c| c.index.unwrap_or(0) == index) {
                Some(found) => &mut choices[found],
                None => {
                    choices.push(CompletionChoice {
                        index: choice.index,
                        ..CompletionChoice::default()
                    });
                    let newest = choices.len() - 1;
                    &mut choices[newest]
                }
            };
            slot.text.push_str(&choice.text);
            if !choice.finish_reason.is_empty() {
                slot.finish_reason.clone_from(&choice.finish_reason);
            }
            if choice.logprobs.is_some() {
                slot.logprobs.clone_from(&choice.logprobs);
            }
        }
        if chunk.usage.is_some() {
            usage.clone_from(&chunk.usage);
        }
    }

    Some(CompletionResponse {
        id: last.id.clone(),
        object: first.object.clone(),
        created: last.created,
        model: last.model.clone(),
        choices,
        usage,
        system_fingerprint: first.system_fingerprint.clone(),
    })
}
