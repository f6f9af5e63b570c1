//! Incremental decoder for the chat API's Server-Sent-Events body.
//!
//! Bytes are buffered before any splitting happens, so a network chunk may
//! end anywhere: inside the `data: ` prefix, inside the blank-line delimiter,
//! inside the JSON payload or in the middle of a multi-byte character.
//!
//! Lines that fail to parse are dropped without surfacing an error. One bad
//! line never aborts the stream, and payload types this client does not know
//! about are skipped the same way.

use std::collections::VecDeque;

use futures_util::stream::{self, Stream, StreamExt};
use tracing::{debug, trace};

use crate::errors::ChatError;
use crate::models::{EventPayload, StreamEvent};

const EVENT_DELIMITER: &str = "\n\n";
const DATA_PREFIX: &str = "data: ";

/// Streaming SSE decoder: feed it raw chunks, get back complete events.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    /// Decoded text not yet terminated by a blank line.
    buffer: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one chunk and returns the events it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.decode_utf8(chunk);

        let mut events = Vec::new();
        while let Some(end) = self.buffer.find(EVENT_DELIMITER) {
            let block: String = self.buffer.drain(..end + EVENT_DELIMITER.len()).collect();
            parse_block(&block[..end], &mut events);
        }
        events
    }

    /// Text received after the last complete event. Never turned into an event.
    pub fn residual(&self) -> &str {
        &self.buffer
    }

    fn decode_utf8(&mut self, chunk: &[u8]) {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    rest = &[];
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    self.buffer.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(invalid) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[invalid..];
                        }
                        // Sequence cut by the chunk boundary; wait for more bytes.
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        self.pending = rest.to_vec();
    }
}

fn parse_block(block: &str, events: &mut Vec<StreamEvent>) {
    for line in block.split('\n') {
        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            continue;
        };
        match serde_json::from_str::<EventPayload>(data) {
            Ok(payload) => match payload.into_event() {
                Some(event) => events.push(event),
                None => debug!("Ignoring event payload: {data}"),
            },
            Err(e) => trace!("Skipping malformed event line ({e}): {data}"),
        }
    }
}

struct DecodeState<S> {
    body: Option<S>,
    decoder: SseDecoder,
    ready: VecDeque<StreamEvent>,
}

/// Turns a response body into a lazy stream of events.
///
/// The stream ends when the body ends; text left in the buffer at that point
/// is discarded. A body error is yielded once and ends the stream.
pub fn decode_stream<S>(body: S) -> impl Stream<Item = Result<StreamEvent, ChatError>>
where
    S: Stream<Item = Result<Vec<u8>, ChatError>> + Unpin,
{
    let state = DecodeState { body: Some(body), decoder: SseDecoder::new(), ready: VecDeque::new() };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }
            let body = state.body.as_mut()?;
            match body.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.push(&chunk);
                    state.ready.extend(events);
                }
                Some(Err(err)) => {
                    state.body = None;
                    return Some((Err(err), state));
                }
                None => {
                    if !state.decoder.residual().is_empty() {
                        debug!("Discarding {} bytes of unterminated event data", state.decoder.residual().len());
                    }
                    return None;
                }
            }
        }
    })
}
