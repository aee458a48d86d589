//! Drivers for [`StreamDecoder`]: async byte streams and blocking readers

use super::{DecodeStep, StreamDecoder};
use crate::types::{StreamState, TextDelta};
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::{stream, StreamExt};
use std::io::{self, Read};

/// Lazily decoded delta sequence. `None` after an `Ok` item means the stream completed;
/// an `Err` item is always the last one.
pub type DeltaStream = BoxStream<'static, TextDelta>;

/// Drive `decoder` from an async byte stream. Bytes are read only when the consumer
/// asks for the next delta.
pub fn decode_stream(decoder: StreamDecoder, input: BoxStream<'static, Bytes>) -> DeltaStream {
    let stream = stream::unfold(Some((input, decoder)), |state| async move {
        let (mut input, mut decoder) = state?;
        loop {
            match decoder.step() {
                Ok(DecodeStep::Delta(delta)) => return Some((Ok(delta), Some((input, decoder)))),
                Ok(DecodeStep::End) => return None,
                Ok(DecodeStep::NeedInput) => match input.next().await {
                    Some(Ok(bytes)) => decoder.feed(&bytes),
                    Some(Err(e)) => {
                        decoder.fail();
                        return Some((Err(e), None));
                    }
                    None => decoder.finish_input(),
                },
                Err(e) => return Some((Err(e), None)),
            }
        }
    });
    Box::pin(stream)
}

/// Blocking delta iterator over any reader (typically a `reqwest::blocking::Response`).
pub struct BlockingDeltaIter<R> {
    reader: R,
    decoder: StreamDecoder,
    buf: Vec<u8>,
}

impl<R: Read> BlockingDeltaIter<R> {
    const CHUNK_SIZE: usize = 8 * 1024;

    pub fn new(decoder: StreamDecoder, reader: R) -> Self {
        Self {
            reader,
            decoder,
            buf: vec![0; Self::CHUNK_SIZE],
        }
    }

    pub fn state(&self) -> StreamState {
        self.decoder.state()
    }
}

impl<R: Read> Iterator for BlockingDeltaIter<R> {
    type Item = Result<TextDelta>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.decoder.step() {
                Ok(DecodeStep::Delta(delta)) => return Some(Ok(delta)),
                Ok(DecodeStep::End) => return None,
                Ok(DecodeStep::NeedInput) => match self.reader.read(&mut self.buf) {
                    Ok(0) => self.decoder.finish_input(),
                    Ok(n) => self.decoder.feed(&self.buf[..n]),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.decoder.fail();
                        return Some(Err(read_error(e)));
                    }
                },
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Surface the transport's own error when the reader wraps one.
fn read_error(e: io::Error) -> Error {
    let kind = e.kind();
    match e.into_inner() {
        Some(inner) => match inner.downcast::<reqwest::Error>() {
            Ok(http) => Error::Transport(*http),
            Err(other) => Error::Io(io::Error::new(kind, other)),
        },
        None => Error::Io(io::Error::from(kind)),
    }
}
