/// Incremental SSE line framing for OpenAI-style streams.
///
/// Only single-line `data: ` events matter here: every other field, comment
/// or blank line is skipped, and `data: [DONE]` marks the end of the stream.
use bytes::{Buf, BytesMut};
use memchr::memchr_iter;

const DATA_PREFIX: &[u8] = b"data: ";
const DONE_SENTINEL: &[u8] = b"[DONE]";

/// The meaningful content of one SSE line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsePayload<'a> {
    /// Payload of a `data: ` line, prefix stripped.
    Data(&'a [u8]),
    /// `data: [DONE]`
    Done,
}

/// Classify one line (without its `\n`). A trailing `\r` is ignored.
#[must_use]
pub fn classify_line(line: &[u8]) -> Option<SsePayload<'_>> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;
    if payload == DONE_SENTINEL {
        return Some(SsePayload::Done);
    }
    Some(SsePayload::Data(payload))
}

/// Splits a byte stream arriving in arbitrary pieces into SSE lines.
///
/// Partial lines are buffered until their newline arrives; memory is bounded
/// by the longest line, not by the length of the stream.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: BytesMut,
    /// Bytes at the front of `buffer` already known to hold no newline.
    scanned: usize,
}

impl SseLineDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and hand every complete meaningful line to `on_line`.
    ///
    /// Stops at the first callback error; the failing line is consumed.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `on_line`.
    pub fn feed<E>(
        &mut self,
        chunk: &[u8],
        mut on_line: impl FnMut(SsePayload<'_>) -> Result<(), E>,
    ) -> Result<(), E> {
        self.buffer.extend_from_slice(chunk);
        let mut consumed = 0;
        let mut result = Ok(());
        for rel_pos in memchr_iter(b'\n', &self.buffer[self.scanned..]) {
            let line_end = self.scanned + rel_pos;
            let line = &self.buffer[consumed..line_end];
            consumed = line_end + 1;
            if let Some(payload) = classify_line(line) {
                if let Err(err) = on_line(payload) {
                    result = Err(err);
                    break;
                }
            }
        }
        self.buffer.advance(consumed);
        self.scanned = if result.is_ok() { self.buffer.len() } else { 0 };
        result
    }

    /// Flush a final line that was not newline-terminated.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `on_line`.
    pub fn finish<E>(
        &mut self,
        on_line: impl FnOnce(SsePayload<'_>) -> Result<(), E>,
    ) -> Result<(), E> {
        let rest = self.buffer.split();
        self.scanned = 0;
        match classify_line(&rest) {
            Some(payload) => on_line(payload),
            None => Ok(()),
        }
    }

    /// Bytes held back waiting for a newline.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
