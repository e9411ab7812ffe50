//! Bounds-checked single-call compress/decompress built atop [`Session`].
//!
//! Both directions open a fresh session, feed the whole source in one call,
//! finish, and drain repeatedly into the caller-supplied fixed destination —
//! no internal growth.  The session is always ended, regardless of outcome.

use crate::stream::session::Session;
use crate::stream::types::{Mode, Params, Progress, ZError};

/// Worst-case compressed size for any input of `src_len` bytes.
///
/// Pure and deterministic; never under-estimates.  Uses the backend's own
/// pessimistic bound: the larger of a 10%-expansion estimate and a
/// stored-block estimate (5 bytes of framing per 31 KiB run), plus slack for
/// the stream wrapper.
pub fn compress_bound(src_len: usize) -> usize {
    let expand = 128 + src_len + src_len / 10;
    let stored = 128 + src_len + (src_len / (31 * 1024) + 1) * 5;
    expand.max(stored)
}

/// Compress all of `src` into the fixed buffer `dst`.
///
/// Returns the number of compressed bytes produced.  `dst` is never written
/// past its length; a destination smaller than the stream needs fails with
/// [`ZError::DstTooSmall`].  Sizing `dst` via [`compress_bound`] guarantees
/// success.
pub fn compress_one_shot(dst: &mut [u8], src: &[u8], params: &Params) -> Result<usize, ZError> {
    let mut session = Session::open(Mode::Encode, params)?;
    let result = run_to_end(&mut session, dst, src);
    session.end();
    result
}

/// Decompress all of `src` into the fixed buffer `dst`.
///
/// Returns the number of plain bytes produced.  Corrupted input surfaces as
/// [`ZError::DataError`]; `dst` is never written past its length even on
/// error, and a too-small destination fails with [`ZError::DstTooSmall`].
pub fn decompress_one_shot(dst: &mut [u8], src: &[u8]) -> Result<usize, ZError> {
    let mut session = Session::open(Mode::Decode, &Params::default())?;
    let result = run_to_end(&mut session, dst, src);
    session.end();
    result
}

/// Feed `src` whole, finish, and drain into `dst` until the terminal marker.
fn run_to_end(session: &mut Session, dst: &mut [u8], src: &[u8]) -> Result<usize, ZError> {
    session.feed(src)?;
    session.finish()?;

    let mut produced = 0usize;
    loop {
        if produced == dst.len() {
            // No budget left.  A zero-budget drain cannot tell "stream
            // already ended" from "more output pending", so probe with a
            // scratch buffer the destination never sees.
            let mut probe = [0u8; 32];
            loop {
                let (written, progress) = session.drain(&mut probe)?;
                if written > 0 {
                    return Err(ZError::DstTooSmall);
                }
                match progress {
                    Progress::StreamEnd => return Ok(produced),
                    Progress::NeedMoreInput => return Err(ZError::DataError),
                    Progress::NeedMoreOutput | Progress::Ok => continue,
                }
            }
        }
        let (written, progress) = session.drain(&mut dst[produced..])?;
        produced += written;
        match progress {
            Progress::StreamEnd => return Ok(produced),
            Progress::NeedMoreOutput => {}
            // All input was fed up front, so an input stall means the stream
            // is truncated.
            Progress::NeedMoreInput => return Err(ZError::DataError),
            Progress::Ok => {}
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(data: &[u8]) -> Vec<u8> {
        let mut compressed = vec![0u8; compress_bound(data.len())];
        let n = compress_one_shot(&mut compressed, data, &Params::default()).unwrap();
        compressed.truncate(n);

        let mut plain = vec![0u8; data.len()];
        let m = decompress_one_shot(&mut plain, &compressed).unwrap();
        assert_eq!(m, data.len());
        plain
    }

    /// Round trip, including the empty stream.
    #[test]
    fn round_trip_one_shot() {
        for data in [
            &b""[..],
            b"a",
            b"one-shot convenience api",
            &vec![0u8; 100_000][..],
        ] {
            assert_eq!(round_trip(data), data);
        }
    }

    /// A thousand repeated bytes compress well within the bound and recover
    /// exactly.
    #[test]
    fn repeated_bytes_scenario() {
        let data = vec![b'A'; 1000];
        let mut compressed = vec![0u8; compress_bound(1000)];
        let n = compress_one_shot(&mut compressed, &data, &Params::default()).unwrap();
        assert!(n <= compress_bound(1000));
        assert!(n < 1000, "repeated bytes must actually compress");
        let mut plain = vec![0u8; 1000];
        let m = decompress_one_shot(&mut plain, &compressed[..n]).unwrap();
        assert_eq!(m, 1000);
        assert_eq!(plain, data);
    }

    /// The bound is monotone and never smaller than the input.
    #[test]
    fn bound_shape() {
        let mut prev = 0usize;
        for len in [0usize, 1, 100, 31 * 1024, 1 << 20] {
            let b = compress_bound(len);
            assert!(b > len);
            assert!(b >= prev);
            prev = b;
        }
    }

    /// Destination too small: clean error, no out-of-bounds write.
    #[test]
    fn dst_too_small_is_reported() {
        let data: Vec<u8> = (0u32..4096)
            .map(|i| (i.wrapping_mul(2654435761) >> 24) as u8)
            .collect();
        let mut dst = [0u8; 8];
        assert_eq!(
            compress_one_shot(&mut dst, &data, &Params::default()).unwrap_err(),
            ZError::DstTooSmall
        );

        let mut compressed = vec![0u8; compress_bound(data.len())];
        let n = compress_one_shot(&mut compressed, &data, &Params::default()).unwrap();
        let mut small = [0u8; 100];
        assert_eq!(
            decompress_one_shot(&mut small, &compressed[..n]).unwrap_err(),
            ZError::DstTooSmall
        );
    }

    /// A truncated stream is corrupt, not short.
    #[test]
    fn truncated_stream_is_data_error() {
        let data = b"truncation test payload";
        let mut compressed = vec![0u8; compress_bound(data.len())];
        let n = compress_one_shot(&mut compressed, data, &Params::default()).unwrap();
        let mut plain = vec![0u8; data.len()];
        let err = decompress_one_shot(&mut plain, &compressed[..n / 2]).unwrap_err();
        assert_eq!(err, ZError::DataError);
    }
}
