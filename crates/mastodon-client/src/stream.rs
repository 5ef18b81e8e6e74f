//! Event framing for streaming response bodies.
//!
//! The body is a sequence of lines grouped into records separated by a blank
//! line:
//!
//! ```text
//! event: update
//! data: {"id":"1"}
//!
//! event: delete
//! data: 1
//!
//! ```
//!
//! [`LineBuffer`] turns arbitrary byte chunks into lines, [`EventFramer`]
//! turns lines into [`StreamEvent`]s, and [`decode_events`] drives both over
//! a chunk stream.

use std::collections::VecDeque;
use std::fmt::Display;

use futures::stream::{self, Stream, StreamExt};
use tracing::trace;

use crate::error::{Error, Result};
use crate::types::StreamEvent;

/// Splits byte chunks into lines.
///
/// A line may span several chunks. `\n` ends a line and one trailing `\r`
/// is dropped.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                lines.push(self.take_line());
            } else {
                self.buf.push(byte);
            }
        }
        lines
    }

    /// Return the unterminated remainder, if any, at end of input.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    fn take_line(&mut self) -> String {
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        line
    }
}

/// Record-level state machine.
///
/// `event:` and `data:` lines fill pending buffers in any order. A blank line
/// commits the record: an event is emitted only if an event name is pending,
/// and both buffers are cleared either way. Other lines are ignored.
#[derive(Debug, Default)]
pub struct EventFramer {
    pending_event: String,
    pending_data: String,
}

impl EventFramer {
    /// Create a framer with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line without its terminator.
    pub fn feed(&mut self, line: &str) -> Option<StreamEvent> {
        if line.is_empty() {
            return self.commit();
        }

        match line.split_once(':') {
            Some(("event", value)) => self.pending_event = field_value(value).to_string(),
            Some(("data", value)) => self.pending_data = field_value(value).to_string(),
            _ => trace!(line, "ignoring stream line"),
        }
        None
    }

    /// Commit whatever is pending at end of input.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        self.commit()
    }

    fn commit(&mut self) -> Option<StreamEvent> {
        let event = std::mem::take(&mut self.pending_event);
        let data = std::mem::take(&mut self.pending_data);
        if event.is_empty() {
            None
        } else {
            Some(StreamEvent { event, data })
        }
    }
}

/// Drop the single space that conventionally follows the colon.
fn field_value(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}

struct DecodeState<S> {
    body: S,
    lines: LineBuffer,
    framer: EventFramer,
    ready: VecDeque<StreamEvent>,
    done: bool,
}

impl<S> DecodeState<S> {
    fn feed_lines(&mut self, lines: Vec<String>) {
        for line in lines {
            if let Some(event) = self.framer.feed(&line) {
                trace!(event = %event.event, "framed stream event");
                self.ready.push_back(event);
            }
        }
    }
}

/// Frame a stream of byte chunks into events.
///
/// Events are yielded in body order. A chunk error is yielded once as
/// [`Error::Stream`] and ends the stream; a clean end of input commits any
/// pending record and ends the stream.
pub fn decode_events<S, B, E>(body: S) -> impl Stream<Item = Result<StreamEvent>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin + Send,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    let state = DecodeState {
        body,
        lines: LineBuffer::new(),
        framer: EventFramer::new(),
        ready: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }
            if state.done {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.lines.push(chunk.as_ref());
                    state.feed_lines(lines);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(Error::Stream(e.to_string())), state));
                }
                None => {
                    state.done = true;
                    let tail: Vec<String> = state.lines.finish().into_iter().collect();
                    state.feed_lines(tail);
                    if let Some(event) = state.framer.finish() {
                        state.ready.push_back(event);
                    }
                }
            }
        }
    })
}


/// Property-based tests for chunk boundaries.
#[cfg(test)]
mod proptests {
    use super::*;
    use futures::executor::block_on;
    use proptest::prelude::*;

    /// Records with a name, a payload and some noise lines the framer skips.
    fn body_strategy() -> impl Strategy<Value = (String, usize)> {
        let record = ("[a-z]{1,10}", "[a-zA-Z0-9 {}:\"é]{0,16}", any::<bool>());
        (prop::collection::vec(record, 0..6), any::<bool>()).prop_map(|(records, crlf)| {
            let eol = if crlf { "\r\n" } else { "\n" };
            let mut body = String::new();
            for (event, data, comment) in &records {
                if *comment {
                    body.push_str(&format!(":thump{eol}"));
                }
                body.push_str(&format!("event: {event}{eol}data: {data}{eol}{eol}"));
            }
            (body, records.len())
        })
    }

    fn decode(chunks: Vec<Vec<u8>>) -> Vec<StreamEvent> {
        let body = stream::iter(chunks.into_iter().map(Ok::<_, String>));
        block_on(decode_events(body).map(|event| event.unwrap()).collect())
    }

    proptest! {
        /// Property: splitting the body at any two byte offsets, even inside
        /// a multi-byte character or a CRLF pair, yields the same events.
        #[test]
        fn chunk_boundaries_do_not_change_events(
            input in body_strategy(),
            a in any::<prop::sample::Index>(),
            b in any::<prop::sample::Index>(),
        ) {
            let (body, records) = input;
            let bytes = body.as_bytes();
            let whole = decode(vec![bytes.to_vec()]);
            prop_assert_eq!(whole.len(), records);

            let (mut first, mut second) = (a.index(bytes.len() + 1), b.index(bytes.len() + 1));
            if first > second {
                std::mem::swap(&mut first, &mut second);
            }
            let split = decode(vec![
                bytes[..first].to_vec(),
                bytes[first..second].to_vec(),
                bytes[second..].to_vec(),
            ]);
            prop_assert_eq!(split, whole);
        }
    }
}
