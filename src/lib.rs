//! zstream — chunked streaming compression/decompression session layer.
//!
//! Wraps an opaque DEFLATE core behind the chunked feed/drain protocol:
//! open a [`Session`], feed input, drain output in caller-sized budgets,
//! finish, end.  On top of the session sit a bounds-checked one-shot API,
//! a gz-style file adapter, pull/push capability traits, a growable output
//! buffer, and two combinable incremental checksum families.

pub mod buffer;
pub mod checksum;
pub mod stream;
pub mod zfile;

// ── Version constants ─────────────────────────────────────────────────────────
pub const ZSTREAM_VERSION_MAJOR: u32 = 0;
pub const ZSTREAM_VERSION_MINOR: u32 = 1;
pub const ZSTREAM_VERSION_RELEASE: u32 = 0;
pub const ZSTREAM_VERSION_NUMBER: u32 =
    ZSTREAM_VERSION_MAJOR * 100 * 100 + ZSTREAM_VERSION_MINOR * 100 + ZSTREAM_VERSION_RELEASE;
pub const ZSTREAM_VERSION_STRING: &str = "0.1.0";

/// Returns the runtime version number.
pub fn version_number() -> u32 {
    ZSTREAM_VERSION_NUMBER
}

/// Returns the runtime version string.
pub fn version_string() -> &'static str {
    ZSTREAM_VERSION_STRING
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use buffer::OutBuf;
pub use checksum::{Checksum, ChecksumFamily};
pub use stream::{
    compress_bound, compress_one_shot, decompress_one_shot, Mode, Params, Phase, Progress,
    Session, ZError,
};
pub use zfile::{FileMode, ZFile, ZReader, ZWriter};
