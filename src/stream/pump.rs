//! Pull-input / push-output session driving.
//!
//! Some callers own neither buffer: input arrives from a source they can only
//! ask for "the next chunk", output goes to a sink that accepts byte runs.
//! [`InputSource`] and [`OutputSink`] are the two narrow capability traits
//! for that shape, and [`Session::run`] drives a whole stream through them
//! with a fixed scratch budget.

use std::io::{Read, Write};

use crate::buffer::OutBuf;
use crate::stream::session::Session;
use crate::stream::types::{Progress, ZError};

/// Scratch drain budget used by [`Session::run`].
const RUN_SCRATCH_SIZE: usize = 32 * 1024;

/// Pull side: yields successive chunks of the stream being processed.
pub trait InputSource {
    /// The next chunk of input.  An empty slice signals end-of-stream; the
    /// source will not be asked again after that.
    fn next_chunk(&mut self) -> Result<&[u8], ZError>;
}

/// Push side: accepts successive runs of produced bytes, in stream order.
pub trait OutputSink {
    fn accept(&mut self, bytes: &[u8]) -> Result<(), ZError>;
}

impl Session {
    /// Drive this session from `src` to `sink` until the terminal marker.
    ///
    /// Pulls chunks on [`Progress::NeedMoreInput`], pushes every produced
    /// run, and signals `finish` when the source reports end-of-stream.
    /// Returns the total number of bytes pushed to `sink`.
    pub fn run(
        &mut self,
        src: &mut dyn InputSource,
        sink: &mut dyn OutputSink,
    ) -> Result<u64, ZError> {
        let mut scratch = vec![0u8; RUN_SCRATCH_SIZE];
        let mut produced = 0u64;
        let mut source_done = false;
        loop {
            let (written, progress) = self.drain(&mut scratch)?;
            if written > 0 {
                sink.accept(&scratch[..written])?;
                produced += written as u64;
            }
            match progress {
                Progress::StreamEnd => return Ok(produced),
                Progress::NeedMoreInput => {
                    if source_done {
                        // Input ran dry after end-of-stream was signaled:
                        // the stream is missing its terminal marker.
                        return Err(ZError::DataError);
                    }
                    let chunk = src.next_chunk()?;
                    if chunk.is_empty() {
                        source_done = true;
                        self.finish()?;
                    } else {
                        self.feed(chunk)?;
                    }
                }
                Progress::NeedMoreOutput | Progress::Ok => {}
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Source adapters
// ─────────────────────────────────────────────────────────────────────────────

/// Yields an in-memory slice in fixed-size chunks.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
    chunk: usize,
}

impl<'a> SliceSource<'a> {
    /// `chunk` is clamped to at least 1.
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        SliceSource {
            data,
            pos: 0,
            chunk: chunk.max(1),
        }
    }
}

impl InputSource for SliceSource<'_> {
    fn next_chunk(&mut self) -> Result<&[u8], ZError> {
        let remaining = self.data.len() - self.pos;
        let take = remaining.min(self.chunk);
        let chunk = &self.data[self.pos..self.pos + take];
        self.pos += take;
        Ok(chunk)
    }
}

/// Pulls chunks from any [`Read`] through an internal refill buffer.
pub struct ReadSource<R: Read> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R, buf_size: usize) -> Self {
        ReadSource {
            inner,
            buf: vec![0u8; buf_size.max(1)],
        }
    }
}

impl<R: Read> InputSource for ReadSource<R> {
    fn next_chunk(&mut self) -> Result<&[u8], ZError> {
        let n = self.inner.read(&mut self.buf).map_err(|_| ZError::IoRead)?;
        Ok(&self.buf[..n])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sink adapters
// ─────────────────────────────────────────────────────────────────────────────

impl OutputSink for Vec<u8> {
    fn accept(&mut self, bytes: &[u8]) -> Result<(), ZError> {
        self.try_reserve(bytes.len())
            .map_err(|_| ZError::ResourceExhausted)?;
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl OutputSink for OutBuf {
    fn accept(&mut self, bytes: &[u8]) -> Result<(), ZError> {
        self.ensure_capacity(bytes.len())?;
        self.append(bytes);
        Ok(())
    }
}

/// Pushes produced runs into any [`Write`].
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        WriteSink { inner }
    }

    /// Flush and return the wrapped writer.
    pub fn finish(mut self) -> Result<W, ZError> {
        self.inner.flush().map_err(|_| ZError::IoWrite)?;
        Ok(self.inner)
    }
}

impl<W: Write> OutputSink for WriteSink<W> {
    fn accept(&mut self, bytes: &[u8]) -> Result<(), ZError> {
        self.inner.write_all(bytes).map_err(|_| ZError::IoWrite)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
