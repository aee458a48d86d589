//! # Streaming Pipeline
//!
//! Incremental decoding of streamed completion bodies into [`TextDelta`]s.
//!
//! ```text
//! Raw Bytes → Framer → Event Mapper → TextDelta
//!     │          │           │
//!   HTTP     SSE events   per-variant field paths,
//!            NDJSON lines sentinel / error detection
//! ```
//!
//! [`StreamDecoder`] is a synchronous state machine: bytes are pushed in with
//! [`StreamDecoder::feed`] and deltas are pulled out with [`StreamDecoder::step`].
//! It never blocks and never spawns; the adapters in [`stream`] drive it from an
//! async byte stream or from any `std::io::Read`.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | SSE and NDJSON framing |
//! | [`event_map`] | Frame to delta mapping per wire format |
//! | [`stream`] | Async `Stream` and blocking `Iterator` adapters |

pub mod decode;
pub mod event_map;
pub mod stream;


pub use stream::{decode_stream, BlockingDeltaIter, DeltaStream};

use crate::protocol::ProtocolVariant;
use crate::types::{StreamState, TextDelta};
use crate::{Error, Result};
use decode::{Frame, Framer};
use event_map::Step;
use tracing::{debug, warn};

/// Outcome of one [`StreamDecoder::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeStep {
    Delta(TextDelta),
    /// No complete frame is buffered; feed more bytes (or signal end of input).
    NeedInput,
    /// The sequence is over. Check [`StreamDecoder::state`] for how it ended.
    End,
}

/// Pull-based decoder for one streamed response.
#[derive(Debug)]
pub struct StreamDecoder {
    variant: ProtocolVariant,
    status: u16,
    framer: Framer,
    state: StreamState,
    input_done: bool,
    emitted: usize,
}

impl StreamDecoder {
    /// `status` is the HTTP status of the response, reported with protocol errors.
    pub fn new(variant: ProtocolVariant, status: u16) -> Self {
        let framer = if variant.uses_sse() {
            Framer::sse()
        } else {
            Framer::ndjson()
        };
        Self {
            variant,
            status,
            framer,
            state: StreamState::Streaming,
            input_done: false,
            emitted: 0,
        }
    }

    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of deltas produced so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Buffer a chunk of the response body. Ignored once the sequence has ended.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.state == StreamState::Streaming {
            self.framer.push(chunk);
        }
    }

    /// Signal that the transport has no more bytes.
    pub fn finish_input(&mut self) {
        self.input_done = true;
    }

    /// Mark the sequence failed from outside (e.g. the transport broke mid-body).
    pub fn fail(&mut self) {
        self.state = StreamState::Failed;
    }

    /// Pull the next delta, if one is fully buffered.
    ///
    /// An `Err` is returned exactly once; afterwards the decoder reports [`DecodeStep::End`].
    pub fn step(&mut self) -> Result<DecodeStep> {
        loop {
            if self.state.is_terminal() {
                return Ok(DecodeStep::End);
            }

            let frame = match self.framer.next_frame(self.input_done) {
                Some(frame) => frame,
                None if self.input_done => {
                    debug!(variant = %self.variant, emitted = self.emitted, "stream body ended");
                    self.state = StreamState::Completed;
                    return Ok(DecodeStep::End);
                }
                None => return Ok(DecodeStep::NeedInput),
            };

            let mapped = match &frame {
                Frame::Event(event) => event_map::map_event(self.variant, event, self.status),
                Frame::Line(line) => event_map::map_line(self.variant, line, self.status),
                Frame::InvalidUtf8(bytes) => Err(Error::stream_protocol(
                    self.status,
                    "stream body is not valid UTF-8",
                    String::from_utf8_lossy(bytes),
                )),
            };

            match mapped {
                Ok(Step::Delta(delta)) => {
                    self.emitted += 1;
                    return Ok(DecodeStep::Delta(delta));
                }
                Ok(Step::Skip) => continue,
                Ok(Step::Done) => {
                    debug!(variant = %self.variant, emitted = self.emitted, "end-of-stream sentinel");
                    self.state = StreamState::Completed;
                    return Ok(DecodeStep::End);
                }
                Err(e) => {
                    warn!(variant = %self.variant, emitted = self.emitted, error = %e, "stream failed");
                    self.state = StreamState::Failed;
                    return Err(e);
                }
            }
        }
    }
}
