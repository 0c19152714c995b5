pub mod config;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod stream;

pub(crate) mod json_scan;

pub use error::{ErrorCategory, SchemaError};
pub use protocol::openai::{
    decode_chat_completion_chunk, decode_chat_completion_request,
    decode_chat_completion_response, decode_completion_request, decode_embedding_request,
};
pub use stream::aggregate::{
    aggregate_chat_chunks, aggregate_chat_sse, aggregate_completion_chunks, ChatStreamAggregator,
    SseChatAggregator,
};
