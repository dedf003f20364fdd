//! Decoding of the relay's event stream: bytes to lines, lines to deltas.

use thiserror::Error;
use tracing::debug;

use crate::models::DeltaEvent;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Turns arbitrarily split byte chunks into complete lines.
///
/// Incomplete UTF-8 sequences at the end of a chunk are carried over to the
/// next one, and the trailing partial line is held back until its newline
/// arrives.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    carry: Vec<u8>,
    buffer: String,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns every line it completed, without the line
    /// terminator (`\n` or `\r\n`).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut lines = Vec::new();
        while let Some(idx) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=idx).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Flushes whatever is left once the stream has closed.
    pub fn finish(&mut self) -> Option<String> {
        if !self.carry.is_empty() {
            let rest = std::mem::take(&mut self.carry);
            self.buffer.push_str(&String::from_utf8_lossy(&rest));
        }
        let pending = std::mem::take(&mut self.buffer);
        let line = pending.strip_suffix('\r').unwrap_or(&pending);
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.carry.extend_from_slice(chunk);

        loop {
            match std::str::from_utf8(&self.carry) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.carry.clear();
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.carry[..valid]));
                    match err.error_len() {
                        // Sequence cut at the chunk boundary: wait for more bytes.
                        None => {
                            self.carry.drain(..valid);
                            return;
                        }
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.carry.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }
}

/// What a single complete line means to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Not a `data: ` line (blank separators, comments, other fields).
    Ignored,
    /// The end-of-stream sentinel. Advisory only.
    Done,
    /// A parsed event and the text it carries, if any.
    Delta(Option<String>),
}

#[derive(Debug, Error)]
pub enum LineError {
    /// Not JSON at all, typically a fragment cut at a chunk boundary.
    #[error("malformed stream fragment: {0}")]
    Malformed(#[source] serde_json::Error),
}

pub fn parse_line(line: &str) -> Result<LineEvent, LineError> {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(LineEvent::Ignored);
    };

    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return Ok(LineEvent::Done);
    }

    match serde_json::from_str::<DeltaEvent>(payload) {
        Ok(event) => Ok(LineEvent::Delta(event.into_content())),
        // Valid JSON in another shape carries no text.
        Err(err) if err.is_data() => {
            debug!("Event without delta content: {err}");
            Ok(LineEvent::Delta(None))
        }
        Err(err) => Err(LineError::Malformed(err)),
    }
}
