//! Incremental checksums over the uncompressed byte stream.
//!
//! Two independent families are provided, matching the two checksums a
//! zlib-wrapped DEFLATE pipeline encounters in the wild:
//! - **CRC-32** (IEEE, reflected polynomial `0xEDB88320`), backed by the
//!   `crc32fast` crate; identity accumulator `0`.
//! - **Adler-32** (RFC 1950), backed by the `adler32` crate; identity
//!   accumulator `1`.
//!
//! Both families are chunk-associative: updating with `A` then `B` equals one
//! update with `A‖B`, at any split granularity.  Accumulators over adjacent
//! ranges can be merged with the per-family `*_combine` functions, or through
//! the family-tagged [`Checksum`] type, which also carries the range length
//! the combine math needs and rejects cross-family merges.

use std::sync::OnceLock;

use crate::stream::types::ZError;

// ─────────────────────────────────────────────────────────────────────────────
// CRC-32 family
// ─────────────────────────────────────────────────────────────────────────────

/// Reflected CRC-32 (IEEE) generator polynomial.
const CRC32_POLY: u32 = 0xEDB8_8320;

/// Identity accumulator for the CRC-32 family (checksum of the empty range).
pub const CRC32_INIT: u32 = 0;

/// Fold `bytes` into a running CRC-32 accumulator.
///
/// Pure: `crc32_update(crc32_update(CRC32_INIT, a), b)` equals
/// `crc32_update(CRC32_INIT, ab)` for any split of `ab` into `a` and `b`.
pub fn crc32_update(acc: u32, bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(acc);
    hasher.update(bytes);
    hasher.finalize()
}

/// One-shot CRC-32 of a byte slice.
#[inline]
pub fn crc32_oneshot(bytes: &[u8]) -> u32 {
    crc32_update(CRC32_INIT, bytes)
}

/// A 32x32 GF(2) matrix: `mat[i]` is the image of the `i`-th basis vector.
type Gf2Matrix = [u32; 32];

/// Multiply `vec` by `mat` over GF(2).
fn gf2_matrix_times(mat: &Gf2Matrix, mut vec: u32) -> u32 {
    let mut sum = 0u32;
    let mut i = 0usize;
    while vec != 0 {
        if vec & 1 != 0 {
            sum ^= mat[i];
        }
        vec >>= 1;
        i += 1;
    }
    sum
}

/// Square a GF(2) matrix: `square = mat * mat`.
fn gf2_matrix_square(square: &mut Gf2Matrix, mat: &Gf2Matrix) {
    for n in 0..32 {
        square[n] = gf2_matrix_times(mat, mat[n]);
    }
}

/// Lazily built operators for advancing a CRC over runs of zero bytes.
///
/// `zero_operators()[k]` advances an accumulator past `2^k` zero bytes.
/// Built once per process, immutable afterwards.
static ZERO_OPERATORS: OnceLock<Box<[Gf2Matrix; 64]>> = OnceLock::new();

fn zero_operators() -> &'static [Gf2Matrix; 64] {
    &**ZERO_OPERATORS.get_or_init(|| {
        // Operator for a single zero *bit*: one step of the reflected CRC
        // shift register.
        let mut op: Gf2Matrix = [0; 32];
        op[0] = CRC32_POLY;
        let mut row = 1u32;
        for entry in op.iter_mut().skip(1) {
            *entry = row;
            row <<= 1;
        }
        // Squaring doubles the shift distance: 1 bit -> 2 -> 4 -> 8 = 1 byte.
        let mut tmp: Gf2Matrix = [0; 32];
        for _ in 0..3 {
            gf2_matrix_square(&mut tmp, &op);
            op = tmp;
        }
        let mut table = Box::new([[0u32; 32]; 64]);
        table[0] = op;
        for k in 1..64 {
            let prev = table[k - 1];
            gf2_matrix_square(&mut table[k], &prev);
        }
        table
    })
}

/// Merge two CRC-32 accumulators computed over adjacent ranges.
///
/// `crc_a` covers the first range, `crc_b` the second, `len_b` is the second
/// range's length in bytes.  Returns the CRC-32 of the concatenation.
pub fn crc32_combine(crc_a: u32, crc_b: u32, len_b: u64) -> u32 {
    if len_b == 0 {
        return crc_a;
    }
    let ops = zero_operators();
    let mut crc = crc_a;
    let mut len = len_b;
    let mut k = 0usize;
    while len != 0 {
        if len & 1 != 0 {
            crc = gf2_matrix_times(&ops[k], crc);
        }
        len >>= 1;
        k += 1;
    }
    crc ^ crc_b
}

// ─────────────────────────────────────────────────────────────────────────────
// Adler-32 family
// ─────────────────────────────────────────────────────────────────────────────

/// Largest prime smaller than 2^16; the Adler-32 modulus.
const ADLER_BASE: u64 = 65_521;

/// Identity accumulator for the Adler-32 family (checksum of the empty range).
pub const ADLER32_INIT: u32 = 1;

/// Fold `bytes` into a running Adler-32 accumulator.
pub fn adler32_update(acc: u32, bytes: &[u8]) -> u32 {
    let mut rolling = adler32::RollingAdler32::from_value(acc);
    rolling.update_buffer(bytes);
    rolling.hash()
}

/// One-shot Adler-32 of a byte slice.
#[inline]
pub fn adler32_oneshot(bytes: &[u8]) -> u32 {
    adler32_update(ADLER32_INIT, bytes)
}

/// Merge two Adler-32 accumulators computed over adjacent ranges.
///
/// `adler_a` covers the first range, `adler_b` the second, `len_b` is the
/// second range's length in bytes.
pub fn adler32_combine(adler_a: u32, adler_b: u32, len_b: u64) -> u32 {
    // The low half is a plain byte sum, so the halves recombine with modular
    // arithmetic once the first sum is replayed `len_b` times into the second
    // weighted sum.
    let rem = len_b % ADLER_BASE;
    let mut sum1 = (adler_a & 0xffff) as u64;
    let mut sum2 = (rem * sum1) % ADLER_BASE;
    sum1 += (adler_b & 0xffff) as u64 + ADLER_BASE - 1;
    sum2 += ((adler_a >> 16) & 0xffff) as u64 + ((adler_b >> 16) & 0xffff) as u64 + ADLER_BASE
        - rem;
    if sum1 >= ADLER_BASE {
        sum1 -= ADLER_BASE;
    }
    if sum1 >= ADLER_BASE {
        sum1 -= ADLER_BASE;
    }
    if sum2 >= ADLER_BASE * 2 {
        sum2 -= ADLER_BASE * 2;
    }
    if sum2 >= ADLER_BASE {
        sum2 -= ADLER_BASE;
    }
    (sum1 | (sum2 << 16)) as u32
}

// ─────────────────────────────────────────────────────────────────────────────
// Family-tagged accumulator
// ─────────────────────────────────────────────────────────────────────────────

/// Which checksum family an accumulator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumFamily {
    #[default]
    Crc32,
    Adler32,
}

impl ChecksumFamily {
    /// Fresh accumulator at the family's identity value.
    pub fn init(self) -> Checksum {
        let value = match self {
            ChecksumFamily::Crc32 => CRC32_INIT,
            ChecksumFamily::Adler32 => ADLER32_INIT,
        };
        Checksum {
            family: self,
            value,
            len: 0,
        }
    }
}

/// A running checksum: family tag, accumulator value, and the number of bytes
/// folded in so far (needed when two accumulators are merged).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    family: ChecksumFamily,
    value: u32,
    len: u64,
}

impl Checksum {
    /// Fold `bytes` into the accumulator, in stream order.
    /// An empty slice contributes the identity and is a no-op.
    pub fn update(&mut self, bytes: &[u8]) {
        self.value = match self.family {
            ChecksumFamily::Crc32 => crc32_update(self.value, bytes),
            ChecksumFamily::Adler32 => adler32_update(self.value, bytes),
        };
        self.len += bytes.len() as u64;
    }

    /// Merge `tail`, the accumulator of the range immediately following this
    /// one, producing the accumulator of the concatenation.
    ///
    /// Accumulators from different families never mix; mismatches are a
    /// caller error.
    pub fn combine(self, tail: Checksum) -> Result<Checksum, ZError> {
        if self.family != tail.family {
            return Err(ZError::ParamError);
        }
        let value = match self.family {
            ChecksumFamily::Crc32 => crc32_combine(self.value, tail.value, tail.len),
            ChecksumFamily::Adler32 => adler32_combine(self.value, tail.value, tail.len),
        };
        Ok(Checksum {
            family: self.family,
            value,
            len: self.len + tail.len,
        })
    }

    /// Current accumulator value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Number of bytes folded in so far.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when no bytes have been folded in.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The family this accumulator belongs to.
    #[inline]
    pub fn family(&self) -> ChecksumFamily {
        self.family
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
