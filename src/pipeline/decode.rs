//! Stream framing (bytes -> SSE events / NDJSON lines)
//!
//! Framing is format-level only: it knows nothing about field names. Bytes are
//! buffered until a full line is available, so multi-byte characters split across
//! transport chunks are reassembled before decoding.

use crate::types::StreamEvent;

/// A complete unit handed to the event mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Event(StreamEvent),
    Line(String),
    /// A line that is not valid UTF-8, as received.
    InvalidUtf8(Vec<u8>),
}

/// Accumulates raw bytes and yields complete `\n`-terminated lines.
///
/// Consumed bytes are released on the next `push`; the delimiter search resumes
/// where the previous one stopped.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
    start: usize,
    scanned: usize,
}

impl LineBuffer {
    pub fn push(&mut self, chunk: &[u8]) {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete line without its terminator (`\n` or `\r\n`).
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let from = self.scanned.max(self.start);
        let idx = match self.buf[from..].iter().position(|b| *b == b'\n') {
            Some(offset) => from + offset,
            None => {
                self.scanned = self.buf.len();
                return None;
            }
        };
        let mut end = idx;
        if end > self.start && self.buf[end - 1] == b'\r' {
            end -= 1;
        }
        let line = self.buf[self.start..end].to_vec();
        self.start = idx + 1;
        self.scanned = self.start;
        Some(line)
    }

    /// Whatever is left once the input is exhausted (an unterminated last line).
    pub fn take_rest(&mut self) -> Option<Vec<u8>> {
        let mut rest = self.buf.split_off(self.start.min(self.buf.len()));
        self.buf.clear();
        self.start = 0;
        self.scanned = 0;
        while rest.last() == Some(&b'\r') {
            rest.pop();
        }
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }
}

/// Server-sent-events framer.
///
/// - `event:` sets the event name, `data:` lines are joined with `\n`
/// - a blank line dispatches the pending event
/// - `:` comments, `id:` and `retry:` are ignored
#[derive(Debug, Default)]
pub struct SseFramer {
    lines: LineBuffer,
    event: Option<String>,
    data: Vec<String>,
}

impl SseFramer {
    pub fn push(&mut self, chunk: &[u8]) {
        self.lines.push(chunk);
    }

    pub fn next_frame(&mut self, eof: bool) -> Option<Frame> {
        loop {
            let raw = match self.lines.next_line() {
                Some(line) => line,
                None if eof => match self.lines.take_rest() {
                    Some(rest) => rest,
                    // End of input dispatches whatever is pending.
                    None => return self.dispatch().map(Frame::Event),
                },
                None => return None,
            };
            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    self.event = None;
                    self.data.clear();
                    return Some(Frame::InvalidUtf8(e.into_bytes()));
                }
            };

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    return Some(Frame::Event(event));
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line.as_str(), ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }
    }

    fn dispatch(&mut self) -> Option<StreamEvent> {
        if self.data.is_empty() && self.event.is_none() {
            return None;
        }
        let event = StreamEvent {
            event: self.event.take(),
            data: self.data.join("\n"),
        };
        self.data.clear();
        Some(event)
    }
}

/// Newline-delimited JSON framer. Blank lines are skipped.
#[derive(Debug, Default)]
pub struct NdjsonFramer {
    lines: LineBuffer,
}

impl NdjsonFramer {
    pub fn push(&mut self, chunk: &[u8]) {
        self.lines.push(chunk);
    }

    pub fn next_frame(&mut self, eof: bool) -> Option<Frame> {
        loop {
            let raw = match self.lines.next_line() {
                Some(line) => line,
                None if eof => self.lines.take_rest()?,
                None => return None,
            };
            if raw.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(match String::from_utf8(raw) {
                Ok(line) => Frame::Line(line),
                Err(e) => Frame::InvalidUtf8(e.into_bytes()),
            });
        }
    }
}

/// Framing selected by wire format.
#[derive(Debug)]
pub enum Framer {
    Sse(SseFramer),
    Ndjson(NdjsonFramer),
}

impl Framer {
    pub fn sse() -> Self {
        Framer::Sse(SseFramer::default())
    }

    pub fn ndjson() -> Self {
        Framer::Ndjson(NdjsonFramer::default())
    }

    pub fn push(&mut self, chunk: &[u8]) {
        match self {
            Framer::Sse(f) => f.push(chunk),
            Framer::Ndjson(f) => f.push(chunk),
        }
    }

    pub fn next_frame(&mut self, eof: bool) -> Option<Frame> {
        match self {
            Framer::Sse(f) => f.next_frame(eof),
            Framer::Ndjson(f) => f.next_frame(eof),
        }
    }
}
