//! Server-sent-event framing and folding of streamed fragments into a single
//! response.

pub mod aggregate;
pub mod sse;

pub use sse::{SseLineDecoder, SsePayload};
