//! Byte-level big-integer helpers.
//!
//! Every supported field fits in 576 bits (P-521's 66-byte field elements
//! are the widest), so raw big-endian values are handled uniformly as
//! [`U576`]. The curve crates own all scalar/point arithmetic; this module
//! only covers the byte-oriented work the codecs and engines need: range
//! comparisons, reduction, digest-to-integer conversion, and the
//! quadratic-residue test used by the Schnorr scheme.

use alloc::vec::Vec;
use crypto_bigint::{
    modular::runtime_mod::{DynResidue, DynResidueParams},
    Encoding, NonZero, U576,
};

/// Width of a [`U576`] in bytes.
pub(crate) const UINT_BYTES: usize = 72;

/// Interpret up to 72 big-endian bytes as an integer.
pub(crate) fn be_to_uint(bytes: &[u8]) -> U576 {
    debug_assert!(bytes.len() <= UINT_BYTES);
    let mut buf = [0u8; UINT_BYTES];
    buf[UINT_BYTES - bytes.len()..].copy_from_slice(bytes);
    U576::from_be_bytes(buf)
}

/// Serialize an integer as a fixed-length big-endian byte string.
///
/// The value must fit in `len` bytes; all supported values are bounded by
/// their curve's field or order, so a violation is a programming error.
pub(crate) fn uint_to_be(x: &U576, len: usize) -> Vec<u8> {
    let buf = x.to_be_bytes();
    debug_assert!(buf[..UINT_BYTES - len].iter().all(|&b| b == 0));
    buf[UINT_BYTES - len..].to_vec()
}

/// `x mod n` for nonzero `n`.
pub(crate) fn reduce(x: &U576, n: &U576) -> U576 {
    let n = Option::from(NonZero::new(*n)).expect("modulus is nonzero");
    let (_, rem) = x.div_rem(&n);
    rem
}

/// Convert a message digest to an integer per the ECDSA truncation rule.
///
/// At most `scalar_size` leading bytes are used; if the retained bit
/// length still exceeds `scalar_bits`, the value is shifted right so that
/// only the leftmost `scalar_bits` bits remain. The shift matters on
/// curves whose order bit length is not a multiple of 8 (P-521). The
/// result is *not* reduced modulo the order.
pub(crate) fn truncate_digest(msg: &[u8], scalar_size: usize, scalar_bits: usize) -> U576 {
    let used = core::cmp::min(msg.len(), scalar_size);
    let value = be_to_uint(&msg[..used]);

    let excess = (used * 8) as isize - scalar_bits as isize;
    if excess > 0 {
        value.shr_vartime(excess as usize)
    } else {
        value
    }
}

/// Euler-criterion quadratic-residue test: `x^((p-1)/2) == 1 (mod p)`.
///
/// `exponent` must be `(p - 1) / 2` and `p` must be an odd prime. Zero is
/// not a residue for this test, matching the strict `jacobi(x) == 1`
/// condition of the Schnorr scheme.
pub(crate) fn is_quadratic_residue(x: &U576, p: &U576, exponent: &U576) -> bool {
    if x == &U576::ZERO {
        return false;
    }

    let params = DynResidueParams::new(p);
    let result = DynResidue::new(x, params).pow(exponent).retrieve();
    result == U576::ONE
}
