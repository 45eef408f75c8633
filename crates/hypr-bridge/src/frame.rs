//! Line framing for the event stream
//!
//! The event socket is a plain byte stream, so a single read may end in the
//! middle of a record and a record may span several reads. `FrameBuffer`
//! keeps the unterminated tail between reads and only yields frames for
//! lines that have seen their `\n`.
//!
//! Frames produced by one `ingest` call come out last-line-first. Listeners
//! relying on event order within a burst observe this ordering. Lines are
//! parsed as the batch is consumed, so frames ahead of a malformed line in
//! that order are still delivered before the error.

use std::fmt;

use super::HyprError;

/// Separator between the event name and its payload
pub const EVENT_SEPARATOR: &[u8] = b">>";

/// One decoded `event>>payload` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    event: Vec<u8>,
    payload: String,
}

impl Frame {
    /// Create a frame from its parts
    pub fn new(event: impl Into<Vec<u8>>, payload: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            payload: payload.into(),
        }
    }

    /// Parse a single line (without its trailing newline)
    ///
    /// The line is split on the first `>>`; any later `>>` belongs to the
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns `HyprError::FrameFormat` if the separator is missing or the
    /// payload is not valid UTF-8.
    pub fn parse(line: &[u8]) -> Result<Self, HyprError> {
        let split_at = line
            .windows(EVENT_SEPARATOR.len())
            .position(|w| w == EVENT_SEPARATOR)
            .ok_or_else(|| HyprError::FrameFormat {
                line: String::from_utf8_lossy(line).into_owned(),
                reason: "missing `>>` separator",
            })?;

        let event = &line[..split_at];
        let payload = &line[split_at + EVENT_SEPARATOR.len()..];

        let payload = std::str::from_utf8(payload).map_err(|_| HyprError::FrameFormat {
            line: String::from_utf8_lossy(line).into_owned(),
            reason: "payload is not valid UTF-8",
        })?;

        Ok(Self::new(event, payload))
    }

    /// The raw event identifier
    pub fn event(&self) -> &[u8] {
        &self.event
    }

    /// The event identifier for display purposes
    pub fn event_name(&self) -> String {
        String::from_utf8_lossy(&self.event).into_owned()
    }

    /// The payload text following the separator
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>>{}", String::from_utf8_lossy(&self.event), self.payload)
    }
}

/// Accumulates stream bytes and splits them into complete frames
#[derive(Debug, Default)]
pub struct FrameBuffer {
    pending: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes received but not yet terminated by a newline
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Append `bytes` and return the lines completed by them
    ///
    /// The unterminated tail is kept for the next call. The returned batch
    /// yields the complete lines in reverse stream order and parses each one
    /// only when it is reached.
    pub fn ingest(&mut self, bytes: &[u8]) -> Batch {
        self.pending.extend_from_slice(bytes);

        let complete = match self.pending.iter().rposition(|&b| b == b'\n') {
            Some(last_newline) => {
                let tail = self.pending.split_off(last_newline + 1);
                std::mem::replace(&mut self.pending, tail)
            }
            None => Vec::new(),
        };

        Batch { complete }
    }
}

/// Complete lines from one `FrameBuffer::ingest` call, last line first
///
/// A malformed line yields `HyprError::FrameFormat` in its place; the lines
/// before it in the iteration have already been yielded as frames.
#[derive(Debug)]
pub struct Batch {
    /// Newline-terminated lines not yet yielded
    complete: Vec<u8>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.complete.is_empty()
    }
}

impl Iterator for Batch {
    type Item = Result<Frame, HyprError>;

    fn next(&mut self) -> Option<Self::Item> {
        // `complete` is empty or ends with '\n'
        self.complete.pop()?;
        let start = self
            .complete
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        let line = self.complete.split_off(start);
        Some(Frame::parse(&line))
    }
}
