//! Growable output buffer backing the chunked drain discipline.
//!
//! [`OutBuf`] owns a byte buffer split into a produced region `[0, len)` and
//! spare capacity `[len, capacity)`.  Capacity grows geometrically (doubling,
//! or to the exact requirement when doubling is not enough) and never shrinks
//! while the buffer is alive.  Allocation failure is reported as
//! [`ZError::ResourceExhausted`] rather than aborting the process, which lets
//! the owning session fail cleanly.
//!
//! Growth reallocates: any slice previously obtained from [`OutBuf::spare`]
//! or [`OutBuf::as_slice`] must be re-fetched after a call that may grow.

use crate::stream::types::ZError;

/// Initial capacity granted by the first growth of an empty buffer.
const MIN_GROWTH: usize = 64;

/// Owned output byte buffer with explicit produced length.
///
/// The backing storage is kept fully initialized (zero-filled on growth) so
/// the spare region can be handed out as a plain `&mut [u8]` drain budget;
/// bytes in `[len, capacity)` are unspecified and must not be read back.
#[derive(Debug, Default)]
pub struct OutBuf {
    buf: Vec<u8>,
    len: usize,
}

impl OutBuf {
    /// Empty buffer with no capacity.  The first `ensure_capacity` allocates.
    pub fn new() -> Self {
        OutBuf::default()
    }

    /// Empty buffer with at least `capacity` bytes pre-allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, ZError> {
        let mut out = OutBuf::default();
        out.ensure_capacity(capacity)?;
        Ok(out)
    }

    /// Number of produced bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no bytes have been produced.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity in bytes; `len() <= capacity()` always holds.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The produced bytes `[0, len)`.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Guarantee `capacity() - len() >= min_extra` on return.
    ///
    /// Grows by doubling the current capacity, or directly to the exact
    /// requirement when doubling is insufficient.  Produced bytes `[0, len)`
    /// are preserved unchanged.  Never shrinks.
    pub fn ensure_capacity(&mut self, min_extra: usize) -> Result<(), ZError> {
        let spare = self.buf.len() - self.len;
        if spare >= min_extra {
            return Ok(());
        }
        let doubled = self.buf.len().max(MIN_GROWTH).saturating_mul(2);
        let required = self
            .len
            .checked_add(min_extra)
            .ok_or(ZError::ResourceExhausted)?;
        let new_cap = doubled.max(required);

        let grow_by = new_cap - self.buf.len();
        self.buf
            .try_reserve_exact(grow_by)
            .map_err(|_| ZError::ResourceExhausted)?;
        self.buf.resize(new_cap, 0);
        Ok(())
    }

    /// Copy `src` into the spare region.
    ///
    /// The caller must have established sufficient spare capacity through
    /// [`OutBuf::ensure_capacity`]; this is a pure copy and cannot fail.
    pub fn append(&mut self, src: &[u8]) {
        debug_assert!(
            self.buf.len() - self.len >= src.len(),
            "append without prior ensure_capacity"
        );
        self.buf[self.len..self.len + src.len()].copy_from_slice(src);
        self.len += src.len();
    }

    /// Mutable view of the spare region `[len, capacity)`, used as a drain
    /// budget.  Invalidated by any growing call.
    #[inline]
    pub fn spare(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..]
    }

    /// Mark `n` bytes of the spare region as produced (after a drain wrote
    /// into [`OutBuf::spare`]).
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.len + n <= self.buf.len(), "commit beyond capacity");
        self.len += n;
    }

    /// Discard all produced bytes, keeping the capacity.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Consume the buffer, returning exactly the produced bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.len);
        self.buf
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
