//! The codec session state machine.
//!
//! A [`Session`] wraps one opaque backend codec state (the miniz_oxide
//! DEFLATE streaming core) behind the chunked feed/drain protocol:
//!
//! ```text
//! open ─→ Ready ─feed→ Active ─finish→ Finishing ─drain…→ Done ─end
//!            │            │                │
//!            └────────────┴── fatal error ─┴──→ Error ─end
//! ```
//!
//! `drain` never guarantees completion in one call; the caller loops, growing
//! or flushing its output between calls, until [`Progress::StreamEnd`] or an
//! error.  A session owns its backend state exclusively and is driven through
//! `&mut self` only — concurrent use requires independent sessions.

use miniz_oxide::deflate::core::{create_comp_flags_from_zip_params, CompressorOxide};
use miniz_oxide::deflate::stream::deflate;
use miniz_oxide::inflate::stream::{inflate, InflateState};
use miniz_oxide::{DataFormat, MZError, MZFlush, MZStatus};

use crate::buffer::OutBuf;
use crate::checksum::Checksum;
use crate::stream::types::{Mode, Params, Phase, Progress, ZError};

/// Default compression strategy passed to the backend (0 = default).
const STRATEGY_DEFAULT: i32 = 0;

/// The opaque backend codec state.  Exactly one per session, never shared.
enum Backend {
    Encoder(Box<CompressorOxide>),
    Decoder(Box<InflateState>),
}

/// A live encode/decode instance: backend state, input window, phase, and
/// optional attached checksum validator.
pub struct Session {
    mode: Mode,
    phase: Phase,
    backend: Backend,
    /// Owned copy of the current input window; `input_pos` is the consume
    /// offset.  `feed` is rejected until the window is fully consumed.
    input: Vec<u8>,
    input_pos: usize,
    /// Uncompressed-side checksum, updated as bytes pass through.
    checksum: Option<Checksum>,
    total_in: u64,
    total_out: u64,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("phase", &self.phase)
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .finish()
    }
}

impl Session {
    /// Open a session in the given direction.
    ///
    /// Validates `params` for range; on rejection no session is constructed.
    pub fn open(mode: Mode, params: &Params) -> Result<Session, ZError> {
        params.validate()?;
        let backend = match mode {
            Mode::Encode => {
                let flags = create_comp_flags_from_zip_params(
                    params.level,
                    params.window_log,
                    STRATEGY_DEFAULT,
                );
                Backend::Encoder(Box::new(CompressorOxide::new(flags)))
            }
            Mode::Decode => Backend::Decoder(InflateState::new_boxed(DataFormat::Zlib)),
        };
        Ok(Session {
            mode,
            phase: Phase::Ready,
            backend,
            input: Vec::new(),
            input_pos: 0,
            checksum: params.checksum.map(|family| family.init()),
            total_in: 0,
            total_out: 0,
        })
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Session direction.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Uncompressed bytes consumed (encode) — total input accepted so far.
    #[inline]
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Bytes produced so far (compressed for encode, plain for decode).
    #[inline]
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// The attached checksum validator, if one was requested at open.
    /// Covers the uncompressed side: fed bytes when encoding, produced bytes
    /// when decoding.
    #[inline]
    pub fn checksum(&self) -> Option<&Checksum> {
        self.checksum.as_ref()
    }

    /// True when the previously fed input window is fully consumed.
    #[inline]
    pub fn input_consumed(&self) -> bool {
        self.input_pos == self.input.len()
    }

    /// Attach `bytes` as the current input window.
    ///
    /// A zero-length feed is a legal no-op and does not change phase.
    /// Feeding while a previous window is not fully consumed, or after
    /// `finish`, is a caller error.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), ZError> {
        match self.phase {
            Phase::Ready | Phase::Active => {}
            _ => return self.fail(ZError::ParamError),
        }
        if bytes.is_empty() {
            return Ok(());
        }
        if !self.input_consumed() {
            return self.fail(ZError::ParamError);
        }
        self.input.clear();
        self.input.extend_from_slice(bytes);
        self.input_pos = 0;
        self.phase = Phase::Active;
        Ok(())
    }

    /// Signal that no more input will be fed.
    ///
    /// Subsequent drains flush buffered state and eventually yield
    /// [`Progress::StreamEnd`].  Idempotent while finishing.
    pub fn finish(&mut self) -> Result<(), ZError> {
        match self.phase {
            Phase::Ready | Phase::Active => {
                self.phase = Phase::Finishing;
                Ok(())
            }
            Phase::Finishing => Ok(()),
            Phase::Done | Phase::Error => self.fail(ZError::ParamError),
        }
    }

    /// Run the backend over the available input, writing at most `out.len()`
    /// bytes.  Returns the produced count and a progress code.
    ///
    /// A zero-length budget is legal and returns `NeedMoreOutput` immediately
    /// without backend progress, letting the caller grow its buffer first.
    pub fn drain(&mut self, out: &mut [u8]) -> Result<(usize, Progress), ZError> {
        match self.phase {
            Phase::Done | Phase::Error => return self.fail(ZError::ParamError),
            _ => {}
        }
        if out.is_empty() {
            return Ok((0, Progress::NeedMoreOutput));
        }

        let pending = &self.input[self.input_pos..];
        let result = match &mut self.backend {
            Backend::Encoder(comp) => {
                let flush = if self.phase == Phase::Finishing {
                    MZFlush::Finish
                } else {
                    MZFlush::None
                };
                deflate(comp, pending, out, flush)
            }
            // The decoder finds its own terminal marker in the stream; it is
            // always driven without a flush directive.
            Backend::Decoder(state) => inflate(state, pending, out, MZFlush::None),
        };

        let consumed = result.bytes_consumed;
        let written = result.bytes_written;
        if let Some(ck) = &mut self.checksum {
            match self.mode {
                Mode::Encode => ck.update(&self.input[self.input_pos..self.input_pos + consumed]),
                Mode::Decode => ck.update(&out[..written]),
            }
        }
        self.input_pos += consumed;
        self.total_in += consumed as u64;
        self.total_out += written as u64;

        match result.status {
            Ok(MZStatus::StreamEnd) => {
                self.phase = Phase::Done;
                Ok((written, Progress::StreamEnd))
            }
            Ok(_) => Ok((written, self.classify(written, out.len()))),
            // No forward progress possible with the current cursors: either
            // the output budget is the limit or more input is required.  A
            // stalled decoder always wants input; only a finishing encoder
            // holds flushable state of its own.
            Err(MZError::Buf) => {
                let progress = if written == out.len() {
                    Progress::NeedMoreOutput
                } else if self.mode == Mode::Encode && self.phase == Phase::Finishing {
                    Progress::NeedMoreOutput
                } else {
                    Progress::NeedMoreInput
                };
                Ok((written, progress))
            }
            Err(MZError::Param) => self.fail(ZError::ParamError),
            Err(_) => self.fail(ZError::DataError),
        }
    }

    /// Drain into a growable buffer until the backend stalls on input or the
    /// stream ends, doubling the buffer between calls as needed.
    ///
    /// `budget` is the minimum spare capacity established before each drain.
    /// Returns the final progress code: `StreamEnd` or `NeedMoreInput`.
    pub fn drain_growing(&mut self, out: &mut OutBuf, budget: usize) -> Result<Progress, ZError> {
        let budget = budget.max(1);
        loop {
            out.ensure_capacity(budget)?;
            let (written, progress) = {
                let spare = out.spare();
                self.drain(spare)?
            };
            out.commit(written);
            match progress {
                Progress::StreamEnd | Progress::NeedMoreInput => return Ok(progress),
                Progress::NeedMoreOutput | Progress::Ok => continue,
            }
        }
    }

    /// Release the backend state.  Always succeeds, legal in any phase
    /// (including after a fatal error); ownership makes the call
    /// exactly-once, and dropping an abandoned session releases the same
    /// resources.
    pub fn end(self) {}

    /// Classify a non-terminal successful backend step.
    fn classify(&self, written: usize, budget: usize) -> Progress {
        if written == budget {
            Progress::NeedMoreOutput
        } else if self.mode == Mode::Encode && self.phase == Phase::Finishing {
            // Buffered-but-unflushed encoder state remains until StreamEnd.
            Progress::NeedMoreOutput
        } else if self.input_consumed() {
            Progress::NeedMoreInput
        } else {
            Progress::Ok
        }
    }

    /// Move to the absorbing error phase and report `err`.
    fn fail<T>(&mut self, err: ZError) -> Result<T, ZError> {
        if self.phase != Phase::Done {
            self.phase = Phase::Error;
        }
        Err(err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{adler32_oneshot, ChecksumFamily};

    fn compress_all(data: &[u8], params: &Params) -> Vec<u8> {
        let mut session = Session::open(Mode::Encode, params).unwrap();
        session.feed(data).unwrap();
        session.finish().unwrap();
        let mut out = OutBuf::new();
        let progress = session.drain_growing(&mut out, 256).unwrap();
        assert_eq!(progress, Progress::StreamEnd);
        session.end();
        out.into_vec()
    }

    fn decompress_all(data: &[u8]) -> Vec<u8> {
        let mut session = Session::open(Mode::Decode, &Params::default()).unwrap();
        session.feed(data).unwrap();
        session.finish().unwrap();
        let mut out = OutBuf::new();
        let progress = session.drain_growing(&mut out, 256).unwrap();
        assert_eq!(progress, Progress::StreamEnd);
        session.end();
        out.into_vec()
    }

    /// Basic encode/decode round trip through the session machinery.
    #[test]
    fn round_trip_session() {
        let data: Vec<u8> = (0u32..8192).map(|i| (i % 253) as u8).collect();
        let compressed = compress_all(&data, &Params::default());
        assert!(!compressed.is_empty());
        assert_eq!(decompress_all(&compressed), data);
    }

    /// Empty stream: finish straight from Ready, drain to StreamEnd.
    #[test]
    fn round_trip_empty_stream() {
        let compressed = compress_all(b"", &Params::default());
        assert!(!compressed.is_empty(), "even an empty stream has framing");
        assert_eq!(decompress_all(&compressed), b"");
    }

    /// Zero-length feed is a no-op that does not change phase.
    #[test]
    fn zero_length_feed_is_noop() {
        let mut session = Session::open(Mode::Encode, &Params::default()).unwrap();
        assert_eq!(session.phase(), Phase::Ready);
        session.feed(b"").unwrap();
        assert_eq!(session.phase(), Phase::Ready);
        session.feed(b"x").unwrap();
        assert_eq!(session.phase(), Phase::Active);
        session.feed(b"").unwrap();
        assert_eq!(session.phase(), Phase::Active);
    }

    /// Zero-budget drain returns NeedMoreOutput without backend progress.
    #[test]
    fn zero_budget_drain() {
        let mut session = Session::open(Mode::Encode, &Params::default()).unwrap();
        session.feed(b"abc").unwrap();
        let (written, progress) = session.drain(&mut []).unwrap();
        assert_eq!(written, 0);
        assert_eq!(progress, Progress::NeedMoreOutput);
        assert_eq!(session.total_in(), 0, "no input may be consumed");
    }

    /// Feeding while the previous window is undrained is a caller error and
    /// moves the session to the absorbing Error phase.
    #[test]
    fn feed_while_undrained_is_param_error() {
        // Incompressible input, large enough that the backend cannot swallow
        // it all into internal buffers while the drain budget is tiny.
        let mut x = 0x1234_5678u32;
        let data: Vec<u8> = (0..256 * 1024)
            .map(|_| {
                x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (x >> 24) as u8
            })
            .collect();
        let mut session = Session::open(Mode::Encode, &Params::default()).unwrap();
        session.feed(&data).unwrap();
        let mut tiny = [0u8; 4];
        let _ = session.drain(&mut tiny).unwrap();
        assert!(!session.input_consumed());
        assert_eq!(session.feed(b"more").unwrap_err(), ZError::ParamError);
        assert_eq!(session.phase(), Phase::Error);
        // After a fatal error, end is the only legal operation.
        assert_eq!(session.drain(&mut tiny).unwrap_err(), ZError::ParamError);
        session.end();
    }

    /// Invalid open parameters construct nothing.
    #[test]
    fn open_rejects_bad_params() {
        let bad = Params {
            level: 99,
            ..Params::default()
        };
        assert_eq!(
            Session::open(Mode::Encode, &bad).unwrap_err(),
            ZError::ParamError
        );
    }

    /// Corrupt input during decode is a fatal DataError.
    #[test]
    fn decode_garbage_is_data_error() {
        let mut session = Session::open(Mode::Decode, &Params::default()).unwrap();
        session.feed(b"\xff\xff\xff\xffgarbage").unwrap();
        let mut out = [0u8; 64];
        let err = session.drain(&mut out).unwrap_err();
        assert_eq!(err, ZError::DataError);
        assert_eq!(session.phase(), Phase::Error);
        session.end();
    }

    /// The attached validator sees the uncompressed stream on both sides.
    #[test]
    fn attached_checksum_covers_plain_bytes() {
        let data = b"checksummed payload, fed and drained in chunks";
        let params = Params {
            checksum: Some(ChecksumFamily::Adler32),
            ..Params::default()
        };
        let expected = adler32_oneshot(data);

        let mut enc = Session::open(Mode::Encode, &params).unwrap();
        let mut out = OutBuf::new();
        for chunk in data.chunks(5) {
            enc.feed(chunk).unwrap();
            enc.drain_growing(&mut out, 64).unwrap();
        }
        enc.finish().unwrap();
        enc.drain_growing(&mut out, 64).unwrap();
        assert_eq!(enc.checksum().unwrap().value(), expected);

        let mut dec = Session::open(Mode::Decode, &params).unwrap();
        dec.feed(out.as_slice()).unwrap();
        let mut plain = OutBuf::new();
        dec.drain_growing(&mut plain, 64).unwrap();
        assert_eq!(plain.as_slice(), data);
        assert_eq!(dec.checksum().unwrap().value(), expected);
    }

    /// Drains after StreamEnd are rejected; the phase stays Done.
    #[test]
    fn drain_after_done_is_param_error() {
        let compressed = compress_all(b"tail", &Params::default());
        let mut session = Session::open(Mode::Decode, &Params::default()).unwrap();
        session.feed(&compressed).unwrap();
        let mut out = OutBuf::new();
        assert_eq!(
            session.drain_growing(&mut out, 64).unwrap(),
            Progress::StreamEnd
        );
        assert_eq!(session.phase(), Phase::Done);
        let mut buf = [0u8; 8];
        assert_eq!(session.drain(&mut buf).unwrap_err(), ZError::ParamError);
        assert_eq!(session.phase(), Phase::Done, "Done is terminal, not Error");
    }
}
