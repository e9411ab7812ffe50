//! Session-layer types: modes, phases, progress codes, errors, and tuning
//! parameters.

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Parameter ranges
// ─────────────────────────────────────────────────────────────────────────────

/// Lowest accepted compression level (store-only).
pub const LEVEL_MIN: i32 = 0;
/// Highest accepted compression level.
pub const LEVEL_MAX: i32 = 10;
/// Default compression level.
pub const LEVEL_DEFAULT: i32 = 6;

/// Smallest accepted window log (512-byte window).
pub const WINDOW_LOG_MIN: i32 = 9;
/// Largest accepted window log (32 KiB window, the DEFLATE maximum).
pub const WINDOW_LOG_MAX: i32 = 15;

// ─────────────────────────────────────────────────────────────────────────────
// Mode / Phase
// ─────────────────────────────────────────────────────────────────────────────

/// Direction of a codec session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compress plain bytes into the wrapped stream format.
    Encode,
    /// Decompress a wrapped stream back into plain bytes.
    Decode,
}

/// Lifecycle phase of a codec session.
///
/// `Ready → Active → Finishing → Done`, with `Error` absorbing from any
/// non-`Done` phase.  A session is born `Ready` (construction covers the
/// created-but-unopened state; a failed open constructs nothing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Opened, no input fed yet.
    Ready,
    /// Input attached; feed/drain cycles in progress.
    Active,
    /// End-of-input signaled; drains flush remaining state.
    Finishing,
    /// Terminal marker produced; only `end` remains.
    Done,
    /// A fatal error occurred; only `end` remains.
    Error,
}

// ─────────────────────────────────────────────────────────────────────────────
// Progress codes
// ─────────────────────────────────────────────────────────────────────────────

/// Non-error outcome of a `drain` call.
///
/// `NeedMoreInput` and `NeedMoreOutput` are control-flow signals, not errors:
/// they instruct the caller to supply more input or grow/flush output and
/// call again.  No single `drain` call guarantees completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Forward progress was made; neither cursor is exhausted.
    Ok,
    /// The terminal marker has been produced; the session is `Done`.
    StreamEnd,
    /// Input is exhausted and end-of-stream has not been signaled.
    NeedMoreInput,
    /// The output budget was exhausted while input or buffered codec state
    /// remains.
    NeedMoreOutput,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Session-layer error codes.
///
/// All are fatal to the session that reported them: the session moves to
/// [`Phase::Error`] and `end` becomes the only legal operation.  None is
/// fatal to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZError {
    /// Malformed or corrupted compressed input during decode.
    DataError,
    /// Caller misuse: invalid mode/params, feeding while undrained,
    /// operating on a terminal session, mixing checksum families.
    ParamError,
    /// A fixed destination buffer was exhausted before the terminal marker.
    DstTooSmall,
    /// Buffer growth failed to allocate.
    ResourceExhausted,
    /// The underlying handle failed to deliver compressed bytes.
    IoRead,
    /// The underlying handle failed to accept compressed bytes.
    IoWrite,
}

impl ZError {
    /// Stable, human-readable error name.
    pub fn error_name(&self) -> &'static str {
        match self {
            ZError::DataError => "ERROR_data_corrupted",
            ZError::ParamError => "ERROR_parameter_invalid",
            ZError::DstTooSmall => "ERROR_dst_too_small",
            ZError::ResourceExhausted => "ERROR_allocation_failed",
            ZError::IoRead => "ERROR_io_read",
            ZError::IoWrite => "ERROR_io_write",
        }
    }
}

impl fmt::Display for ZError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_name())
    }
}

impl std::error::Error for ZError {}

impl From<ZError> for std::io::Error {
    /// File-adapter surface: corruption is a read failure, never silent
    /// truncation.
    fn from(e: ZError) -> Self {
        let kind = match e {
            ZError::DataError => std::io::ErrorKind::InvalidData,
            ZError::ParamError | ZError::DstTooSmall => std::io::ErrorKind::InvalidInput,
            ZError::ResourceExhausted => std::io::ErrorKind::OutOfMemory,
            ZError::IoRead => std::io::ErrorKind::UnexpectedEof,
            ZError::IoWrite => std::io::ErrorKind::WriteZero,
        };
        std::io::Error::new(kind, e.error_name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tuning parameters
// ─────────────────────────────────────────────────────────────────────────────

use crate::checksum::ChecksumFamily;

/// Tuning parameters supplied at session open.
///
/// `level` and `window_log` are validated for range only and passed through
/// to the backend codec; decode sessions accept but ignore `level`.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    /// Compression level, `0..=10`; `0` stores, higher trades speed for ratio.
    pub level: i32,
    /// Match window log2, `9..=15`.
    pub window_log: i32,
    /// Optional checksum validator attached to the session, run over the
    /// uncompressed side of the stream.
    pub checksum: Option<ChecksumFamily>,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            level: LEVEL_DEFAULT,
            window_log: WINDOW_LOG_MAX,
            checksum: None,
        }
    }
}

impl Params {
    /// Range-check the tuning values.
    pub fn validate(&self) -> Result<(), ZError> {
        if !(LEVEL_MIN..=LEVEL_MAX).contains(&self.level) {
            return Err(ZError::ParamError);
        }
        if !(WINDOW_LOG_MIN..=WINDOW_LOG_MAX).contains(&self.window_log) {
            return Err(ZError::ParamError);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
