//! File-level streaming adapter over the codec session.
//!
//! Provides gz-style handles around byte-oriented I/O:
//! - [`ZWriter`] — compressing writer over any `W: Write`
//! - [`ZReader`] — decompressing reader over any `R: Read`
//! - [`ZFile`]   — path-based facade with `"rb"` / `"wb"` mode selection and
//!   the classic surface: `put_byte`, `put_str`, `put_fmt`, `write_bytes`,
//!   `read_bytes`, `get_byte`, `read_line`, `tell`, `eof`, `close`.
//!
//! A handle is read-only or write-only, never both.  `tell` reports the
//! position in the *uncompressed* stream for both modes (0 on a freshly
//! opened read handle).  Read mode has conventional short-read semantics:
//! a request past end-of-stream returns the remaining bytes and a short
//! count, not an error.  Corruption surfaces as an error, never as silent
//! truncation.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::buffer::OutBuf;
use crate::stream::session::Session;
use crate::stream::types::{Mode, Params, Progress, ZError};

/// Staging threshold: compressed bytes are pushed to the underlying handle
/// once at least this much has accumulated.
const STAGING_FLUSH: usize = 64 * 1024;

/// Minimum spare drain budget established per write operation.
const DRAIN_BUDGET: usize = 16 * 1024;

/// Refill buffer size for the compressed side of a read handle.
const REFILL_SIZE: usize = 32 * 1024;

// ─────────────────────────────────────────────────────────────────────────────
// ZWriter<W>
// ─────────────────────────────────────────────────────────────────────────────

/// Compressing writer: plain bytes in, compressed stream out.
///
/// Output is staged in an internal growable buffer and flushed to the
/// underlying handle when the staging buffer fills or on [`ZWriter::finish`].
pub struct ZWriter<W: Write> {
    session: Session,
    /// Wrapped in `Option` so `finish()` can take ownership out from under
    /// the `Drop` impl.
    inner: Option<W>,
    staging: OutBuf,
    /// Sticky: once a write failed, `finish`/`Drop` stop touching the stream.
    errored: bool,
}

impl<W: Write> ZWriter<W> {
    /// Open a compressing writer with the given tuning parameters.
    pub fn open(inner: W, params: &Params) -> Result<Self, ZError> {
        Ok(ZWriter {
            session: Session::open(Mode::Encode, params)?,
            inner: Some(inner),
            staging: OutBuf::new(),
            errored: false,
        })
    }

    /// Compress and stage `buf`, flushing staged output downstream when the
    /// staging buffer is full.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<(), ZError> {
        match self.write_inner(buf) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.errored = true;
                Err(e)
            }
        }
    }

    /// Write a single byte.
    pub fn put_byte(&mut self, byte: u8) -> Result<(), ZError> {
        self.write_bytes(&[byte])
    }

    /// Write a string's bytes.
    pub fn put_str(&mut self, s: &str) -> Result<(), ZError> {
        self.write_bytes(s.as_bytes())
    }

    /// Write formatted text, printf-style: `w.put_fmt(format_args!(...))`.
    pub fn put_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), ZError> {
        self.write_bytes(args.to_string().as_bytes())
    }

    /// Uncompressed bytes accepted so far.
    pub fn tell(&self) -> u64 {
        self.session.total_in()
    }

    /// Finish the stream: flush buffered codec state, write the terminal
    /// marker, push everything downstream, and return the underlying writer.
    ///
    /// Letting the writer drop instead also finalizes, but discards errors.
    pub fn finish(mut self) -> Result<W, ZError> {
        if !self.errored {
            if let Err(e) = self.finalize() {
                self.errored = true;
                return Err(e);
            }
        }
        Ok(self.inner.take().expect("inner writer already taken"))
    }

    fn write_inner(&mut self, buf: &[u8]) -> Result<(), ZError> {
        self.session.feed(buf)?;
        let progress = self.session.drain_growing(&mut self.staging, DRAIN_BUDGET)?;
        debug_assert_eq!(progress, Progress::NeedMoreInput);
        if self.staging.len() >= STAGING_FLUSH {
            self.flush_staging()?;
        }
        Ok(())
    }

    fn flush_staging(&mut self) -> Result<(), ZError> {
        if self.staging.is_empty() {
            return Ok(());
        }
        self.inner
            .as_mut()
            .expect("inner writer already taken")
            .write_all(self.staging.as_slice())
            .map_err(|_| ZError::IoWrite)?;
        self.staging.clear();
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), ZError> {
        self.session.finish()?;
        let progress = self.session.drain_growing(&mut self.staging, DRAIN_BUDGET)?;
        debug_assert_eq!(progress, Progress::StreamEnd);
        self.flush_staging()?;
        self.inner
            .as_mut()
            .expect("inner writer already taken")
            .flush()
            .map_err(|_| ZError::IoWrite)
    }
}

impl<W: Write> Write for ZWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    /// Flushes staged compressed bytes; buffered codec state stays put until
    /// `finish`.
    fn flush(&mut self) -> io::Result<()> {
        self.flush_staging()?;
        self.inner
            .as_mut()
            .expect("inner writer already taken")
            .flush()
    }
}

impl<W: Write> Drop for ZWriter<W> {
    /// Best-effort finalization for abandoned writers; errors are discarded
    /// per Rust convention.  Call [`ZWriter::finish`] to observe them.
    fn drop(&mut self) {
        if self.inner.is_none() || self.errored {
            return;
        }
        let _ = self.finalize();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ZReader<R>
// ─────────────────────────────────────────────────────────────────────────────

/// Decompressing reader: compressed stream in, plain bytes out.
pub struct ZReader<R: Read> {
    session: Session,
    inner: R,
    refill: Vec<u8>,
    /// Terminal marker consumed and all produced bytes delivered.
    reached_end: bool,
}

impl<R: Read> ZReader<R> {
    /// Open a decompressing reader.  No bytes are pulled until the first
    /// read, so a fresh handle reports `tell() == 0`.
    pub fn open(inner: R, params: &Params) -> Result<Self, ZError> {
        Ok(ZReader {
            session: Session::open(Mode::Decode, params)?,
            inner,
            refill: vec![0u8; REFILL_SIZE],
            reached_end: false,
        })
    }

    /// Decompress into `out`, filling it completely unless end-of-stream is
    /// reached first, in which case the short count is returned with no
    /// error.  A compressed stream that ends before its terminal marker is
    /// corrupt ([`ZError::DataError`]), not short.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<usize, ZError> {
        let mut filled = 0usize;
        while filled < out.len() && !self.reached_end {
            let (written, progress) = self.session.drain(&mut out[filled..])?;
            filled += written;
            match progress {
                Progress::StreamEnd => self.reached_end = true,
                Progress::NeedMoreInput => {
                    let n = self
                        .inner
                        .read(&mut self.refill)
                        .map_err(|_| ZError::IoRead)?;
                    if n == 0 {
                        return Err(ZError::DataError);
                    }
                    self.session.feed(&self.refill[..n])?;
                }
                Progress::NeedMoreOutput | Progress::Ok => {}
            }
        }
        Ok(filled)
    }

    /// Read one byte; `None` at end-of-stream.
    pub fn get_byte(&mut self) -> Result<Option<u8>, ZError> {
        let mut byte = [0u8; 1];
        match self.read_bytes(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Append bytes up to and including the next `\n` (or end-of-stream)
    /// onto `line`; returns the number of bytes appended.  Zero means
    /// end-of-stream.
    pub fn read_line(&mut self, line: &mut Vec<u8>) -> Result<usize, ZError> {
        let mut appended = 0usize;
        while let Some(byte) = self.get_byte()? {
            line.push(byte);
            appended += 1;
            if byte == b'\n' {
                break;
            }
        }
        Ok(appended)
    }

    /// Uncompressed bytes delivered so far.
    pub fn tell(&self) -> u64 {
        self.session.total_out()
    }

    /// True once the terminal marker has been consumed and every produced
    /// byte delivered.
    pub fn eof(&self) -> bool {
        self.reached_end
    }

    /// Release the session and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ZReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_bytes(buf)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ZFile — path-based facade
// ─────────────────────────────────────────────────────────────────────────────

/// Direction of a [`ZFile`] handle, selected with a `"rb"` / `"wb"` mode
/// string at open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
}

impl FileMode {
    /// Parse a stdio-style mode string.  Only read (`"r"`/`"rb"`) and write
    /// (`"w"`/`"wb"`) are accepted — never both at once.
    pub fn parse(mode: &str) -> Result<FileMode, ZError> {
        match mode {
            "r" | "rb" => Ok(FileMode::Read),
            "w" | "wb" => Ok(FileMode::Write),
            _ => Err(ZError::ParamError),
        }
    }
}

enum Handle {
    Read(ZReader<BufReader<File>>),
    Write(ZWriter<BufWriter<File>>),
}

/// A compressed file handle, open for reading or writing (never both).
pub struct ZFile {
    handle: Handle,
}

impl fmt::Debug for ZFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.handle {
            Handle::Read(_) => "read",
            Handle::Write(_) => "write",
        };
        f.debug_struct("ZFile").field("mode", &mode).finish()
    }
}

impl ZFile {
    /// Open `path` with a stdio-style mode string and default parameters.
    pub fn open<P: AsRef<Path>>(path: P, mode: &str) -> Result<ZFile, ZError> {
        ZFile::open_with(path, mode, &Params::default())
    }

    /// Open `path` with explicit tuning parameters.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        mode: &str,
        params: &Params,
    ) -> Result<ZFile, ZError> {
        let handle = match FileMode::parse(mode)? {
            FileMode::Read => {
                let file = File::open(path).map_err(|_| ZError::IoRead)?;
                Handle::Read(ZReader::open(BufReader::new(file), params)?)
            }
            FileMode::Write => {
                let file = File::create(path).map_err(|_| ZError::IoWrite)?;
                Handle::Write(ZWriter::open(BufWriter::new(file), params)?)
            }
        };
        Ok(ZFile { handle })
    }

    /// This handle's direction.
    pub fn mode(&self) -> FileMode {
        match self.handle {
            Handle::Read(_) => FileMode::Read,
            Handle::Write(_) => FileMode::Write,
        }
    }

    /// Position in the uncompressed stream: bytes written so far (write
    /// mode) or bytes delivered so far (read mode).
    pub fn tell(&self) -> u64 {
        match &self.handle {
            Handle::Read(r) => r.tell(),
            Handle::Write(w) => w.tell(),
        }
    }

    /// End-of-stream indicator; always `false` for write handles.
    pub fn eof(&self) -> bool {
        match &self.handle {
            Handle::Read(r) => r.eof(),
            Handle::Write(_) => false,
        }
    }

    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<usize, ZError> {
        match &mut self.handle {
            Handle::Read(r) => r.read_bytes(out),
            Handle::Write(_) => Err(ZError::ParamError),
        }
    }

    pub fn get_byte(&mut self) -> Result<Option<u8>, ZError> {
        match &mut self.handle {
            Handle::Read(r) => r.get_byte(),
            Handle::Write(_) => Err(ZError::ParamError),
        }
    }

    pub fn read_line(&mut self, line: &mut Vec<u8>) -> Result<usize, ZError> {
        match &mut self.handle {
            Handle::Read(r) => r.read_line(line),
            Handle::Write(_) => Err(ZError::ParamError),
        }
    }

    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<(), ZError> {
        match &mut self.handle {
            Handle::Write(w) => w.write_bytes(buf),
            Handle::Read(_) => Err(ZError::ParamError),
        }
    }

    pub fn put_byte(&mut self, byte: u8) -> Result<(), ZError> {
        match &mut self.handle {
            Handle::Write(w) => w.put_byte(byte),
            Handle::Read(_) => Err(ZError::ParamError),
        }
    }

    pub fn put_str(&mut self, s: &str) -> Result<(), ZError> {
        match &mut self.handle {
            Handle::Write(w) => w.put_str(s),
            Handle::Read(_) => Err(ZError::ParamError),
        }
    }

    pub fn put_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), ZError> {
        match &mut self.handle {
            Handle::Write(w) => w.put_fmt(args),
            Handle::Read(_) => Err(ZError::ParamError),
        }
    }

    /// Close the handle.  Write mode finishes the stream and drains it to
    /// completion; read mode simply releases the session.  The underlying
    /// session is ended exactly once either way.
    pub fn close(self) -> Result<(), ZError> {
        match self.handle {
            Handle::Read(_) => Ok(()),
            Handle::Write(w) => {
                w.finish()?;
                Ok(())
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
