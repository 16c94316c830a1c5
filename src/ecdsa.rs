//! ECDSA: deterministic signing, verification, public-key recovery, and
//! the raw/DER signature codecs.
//!
//! Messages are passed as digests. Digests longer than the scalar width
//! are truncated to the leftmost `scalar_size` bytes and bit-aligned to
//! the order length before reduction, so arbitrary digest/curve pairings
//! behave like the original engine (this matters on P-521, whose order
//! bit length is not a multiple of 8).

use alloc::vec;
use alloc::vec::Vec;

use crypto_bigint::U576;
use elliptic_curve::{
    ff::{Field, PrimeField},
    group::{Curve as _, Group},
    ops::{LinearCombination, MulByGenerator},
    point::{AffineCoordinates, DecompressPoint},
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    subtle::Choice,
    AffinePoint, FieldBytes, FieldBytesSize, ProjectivePoint, Scalar,
};
use zeroize::Zeroize;

use crate::arithmetic::{be_to_uint, reduce, truncate_digest, uint_to_be};
use crate::curve::{with_curve, CurveContext, SignatureCurve};
use crate::key::{
    private_scalar, projective_to_public, public_to_affine, scalar_from_bytes, scalar_to_bytes,
    PrivateKey, PublicKey,
};
use crate::{Error, Result};

/// An ECDSA signature: the pair `(r, s)`, each held as `scalar_size`
/// big-endian bytes, plus the recovery id assigned by
/// [`sign_recoverable`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    r: Vec<u8>,
    s: Vec<u8>,
    recovery_id: Option<u8>,
}

impl Signature {
    /// Decode a raw `r ‖ s` signature.
    ///
    /// Both integers must lie in the open interval `(0, n)`.
    pub fn from_raw(ctx: &CurveContext, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ctx.signature_size() {
            return Err(Error::InvalidSignature);
        }
        let (r, s) = bytes.split_at(ctx.scalar_size());

        for part in [r, s] {
            let value = be_to_uint(part);
            if value == U576::ZERO || &value >= ctx.order() {
                return Err(Error::InvalidSignature);
            }
        }

        Ok(Self {
            r: r.to_vec(),
            s: s.to_vec(),
            recovery_id: None,
        })
    }

    /// Encode as raw `r ‖ s` bytes.
    pub fn to_raw(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.r.len() + self.s.len());
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.s);
        out
    }

    /// Decode a DER `SEQUENCE { INTEGER r, INTEGER s }` signature.
    ///
    /// Parsing is strict about structure (tags, lengths, truncation) but
    /// deliberately reproduces one quirk of the original engine: when an
    /// integer fits its buffer byte-wise yet its value is `>= n`, decoding
    /// still succeeds and both `r` and `s` come back zeroed. Such a
    /// signature fails every subsequent range check and verification;
    /// callers that want an early rejection should re-validate with
    /// [`Signature::from_raw`].
    pub fn from_der(ctx: &CurveContext, raw: &[u8]) -> Result<Self> {
        let scalar_size = ctx.scalar_size();
        let mut pos = 0usize;

        if pos == raw.len() || raw[pos] != 0x30 {
            return Err(Error::InvalidSignature);
        }
        pos += 1;

        if pos == raw.len() {
            return Err(Error::InvalidSignature);
        }
        let lenbyte = raw[pos] as usize;
        pos += 1;
        if lenbyte & 0x80 != 0 {
            let skip = lenbyte - 0x80;
            if skip > raw.len() - pos {
                return Err(Error::InvalidSignature);
            }
            pos += skip;
        }

        let (rpos, rlen) = der_integer(raw, &mut pos)?;
        let (spos, slen) = der_integer(raw, &mut pos)?;

        let mut r = vec![0u8; scalar_size];
        let mut s = vec![0u8; scalar_size];
        let mut overflow = false;

        for ((start, len), out) in [((rpos, rlen), &mut r), ((spos, slen), &mut s)] {
            let mut start = start;
            let mut len = len;
            while len > 0 && raw[start] == 0 {
                start += 1;
                len -= 1;
            }
            if len > scalar_size {
                overflow = true;
            } else {
                out[scalar_size - len..].copy_from_slice(&raw[start..start + len]);
            }
        }

        if !overflow {
            overflow = &be_to_uint(&r) >= ctx.order() || &be_to_uint(&s) >= ctx.order();
        }

        if overflow {
            r.fill(0);
            s.fill(0);
        }

        Ok(Self {
            r,
            s,
            recovery_id: None,
        })
    }

    /// Encode as a minimal-length DER `SEQUENCE { INTEGER r, INTEGER s }`.
    pub fn to_der(&self) -> Vec<u8> {
        debug_assert!(self.r.len() < 0x7d);

        let r = trim_leading_zeros(&self.r);
        let s = trim_leading_zeros(&self.s);
        let r_pad = usize::from(r[0] & 0x80 != 0);
        let s_pad = usize::from(s[0] & 0x80 != 0);
        let seq = 2 + r_pad + r.len() + 2 + s_pad + s.len();

        let mut out = Vec::with_capacity(3 + seq);
        out.push(0x30);
        if seq >= 0x80 {
            out.push(0x81);
        }
        out.push(seq as u8);

        for (body, pad) in [(r, r_pad), (s, s_pad)] {
            out.push(0x02);
            out.push((body.len() + pad) as u8);
            if pad == 1 {
                out.push(0x00);
            }
            out.extend_from_slice(body);
        }
        out
    }

    /// The `r` component, big-endian.
    pub fn r(&self) -> &[u8] {
        &self.r
    }

    /// The `s` component, big-endian.
    pub fn s(&self) -> &[u8] {
        &self.s
    }

    /// Recovery id, present only on signatures produced by
    /// [`sign_recoverable`].
    pub fn recovery_id(&self) -> Option<u8> {
        self.recovery_id
    }

    /// `true` iff `0 < s <= n/2`.
    pub fn is_low_s(&self, ctx: &CurveContext) -> bool {
        let s = be_to_uint(&self.s);
        s != U576::ZERO && &s <= ctx.half_order()
    }

    /// Canonicalize to the low-S form: `s > n/2` becomes `n - s`, `r` is
    /// untouched. Idempotent.
    pub fn normalize(&self, ctx: &CurveContext) -> Signature {
        let s = be_to_uint(&self.s);
        if &s > ctx.half_order() {
            let flipped = ctx.order().wrapping_sub(&s);
            Signature {
                r: self.r.clone(),
                s: uint_to_be(&flipped, ctx.scalar_size()),
                recovery_id: self.recovery_id,
            }
        } else {
            self.clone()
        }
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() && bytes[start] == 0 {
        start += 1;
    }
    &bytes[start..]
}

/// Parse one DER INTEGER header, returning the body's offset and length.
fn der_integer(raw: &[u8], pos: &mut usize) -> Result<(usize, usize)> {
    if *pos == raw.len() || raw[*pos] != 0x02 {
        return Err(Error::InvalidSignature);
    }
    *pos += 1;

    if *pos == raw.len() {
        return Err(Error::InvalidSignature);
    }
    let mut lenbyte = raw[*pos] as usize;
    *pos += 1;

    let len = if lenbyte & 0x80 != 0 {
        lenbyte -= 0x80;
        if lenbyte > raw.len() - *pos {
            return Err(Error::InvalidSignature);
        }
        while lenbyte > 0 && raw[*pos] == 0 {
            *pos += 1;
            lenbyte -= 1;
        }
        if lenbyte >= core::mem::size_of::<usize>() {
            return Err(Error::InvalidSignature);
        }
        let mut len = 0usize;
        while lenbyte > 0 {
            len = (len << 8) + raw[*pos] as usize;
            *pos += 1;
            lenbyte -= 1;
        }
        len
    } else {
        lenbyte
    };

    if len > raw.len() - *pos {
        return Err(Error::InvalidSignature);
    }
    let start = *pos;
    *pos += len;
    Ok((start, len))
}

/// Reduce a message digest to a scalar per the truncation rule.
fn message_scalar<C>(ctx: &CurveContext, msg: &[u8]) -> Scalar<C>
where
    C: SignatureCurve,
{
    let e = reduce(
        &truncate_digest(msg, ctx.scalar_size(), ctx.scalar_bits()),
        ctx.order(),
    );
    scalar_from_bytes::<C>(&uint_to_be(&e, ctx.scalar_size()))
        .expect("reduced digest is within the group order")
}

fn sign_inner<C>(ctx: &CurveContext, msg: &[u8], key: &PrivateKey) -> Result<Signature>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let d = private_scalar::<C>(key)?;
    let e = message_scalar::<C>(ctx, msg);

    let mut d_repr = FieldBytes::<C>::clone_from_slice(key.as_bytes());
    let n_repr = FieldBytes::<C>::clone_from_slice(&ctx.order_bytes());
    let k_repr =
        rfc6979::generate_k::<C::Digest, FieldBytesSize<C>>(&d_repr, &n_repr, &e.to_repr(), &[]);
    d_repr.as_mut_slice().zeroize();

    let k = Option::<Scalar<C>>::from(Scalar::<C>::from_repr(k_repr)).ok_or(Error::SignFailure)?;
    if bool::from(k.is_zero()) {
        return Err(Error::SignFailure);
    }

    let r_uint = reduce(
        &be_to_uint(&ProjectivePoint::<C>::mul_by_generator(&k).to_affine().x()),
        ctx.order(),
    );
    if r_uint == U576::ZERO {
        return Err(Error::SignFailure);
    }
    let r = scalar_from_bytes::<C>(&uint_to_be(&r_uint, ctx.scalar_size()))
        .expect("reduced x-coordinate is within the group order");

    let k_inv = Option::<Scalar<C>>::from(k.invert()).ok_or(Error::SignFailure)?;
    let s = k_inv * (e + r * d);
    if bool::from(s.is_zero()) {
        return Err(Error::SignFailure);
    }

    let sig = Signature {
        r: scalar_to_bytes::<C>(&r),
        s: scalar_to_bytes::<C>(&s),
        recovery_id: None,
    };
    Ok(sig.normalize(ctx))
}

fn verify_inner<C>(ctx: &CurveContext, msg: &[u8], sig: &Signature, pk: &PublicKey) -> bool
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let r = match scalar_from_bytes::<C>(&sig.r) {
        Some(r) if !bool::from(r.is_zero()) => r,
        _ => return false,
    };
    let s = match scalar_from_bytes::<C>(&sig.s) {
        Some(s) if !bool::from(s.is_zero()) => s,
        _ => return false,
    };
    let a = match public_to_affine::<C>(pk) {
        Ok(a) => a,
        Err(_) => return false,
    };

    let e = message_scalar::<C>(ctx, msg);
    let s_inv = match Option::<Scalar<C>>::from(s.invert()) {
        Some(inv) => inv,
        None => return false,
    };

    let candidate = ProjectivePoint::<C>::lincomb(
        &ProjectivePoint::<C>::generator(),
        &(e * s_inv),
        &ProjectivePoint::<C>::from(a),
        &(r * s_inv),
    );
    if bool::from(candidate.is_identity()) {
        return false;
    }

    let x = candidate.to_affine().x();
    reduce(&be_to_uint(&x), ctx.order()) == be_to_uint(&sig.r)
}

fn recover_inner<C>(
    ctx: &CurveContext,
    msg: &[u8],
    sig: &Signature,
    recovery_id: u8,
) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: DecompressPoint<C> + FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    if recovery_id > 3 {
        return Err(Error::InvalidSignature);
    }
    let y_odd = recovery_id & 1;
    let second_key = recovery_id >> 1 == 1;

    let r = scalar_from_bytes::<C>(&sig.r)
        .filter(|r| !bool::from(r.is_zero()))
        .ok_or(Error::InvalidSignature)?;
    let s = scalar_from_bytes::<C>(&sig.s)
        .filter(|s| !bool::from(s.is_zero()))
        .ok_or(Error::InvalidSignature)?;

    // Reconstruct the nonce point's x-coordinate. When `second_key` is
    // set, `r` came from an x-coordinate that exceeded the order, so the
    // order is added back; no correction exists once `r >= p mod n`.
    let r_uint = be_to_uint(&sig.r);
    let x_uint = if second_key {
        if &r_uint >= ctx.p_mod_n() {
            return Err(Error::RecoveryFailed);
        }
        r_uint.wrapping_add(ctx.order())
    } else {
        r_uint
    };
    let x_bytes = uint_to_be(&x_uint, ctx.size());

    let r_point = Option::<AffinePoint<C>>::from(AffinePoint::<C>::decompress(
        FieldBytes::<C>::from_slice(&x_bytes),
        Choice::from(y_odd),
    ))
    .ok_or(Error::RecoveryFailed)?;

    let r_inv = Option::<Scalar<C>>::from(r.invert()).ok_or(Error::RecoveryFailed)?;
    let e = message_scalar::<C>(ctx, msg);

    let q = ProjectivePoint::<C>::lincomb(
        &ProjectivePoint::<C>::generator(),
        &(-e * r_inv),
        &ProjectivePoint::<C>::from(r_point),
        &(s * r_inv),
    );
    projective_to_public::<C>(&q)
}

/// Sign a message digest deterministically (RFC 6979 nonce).
///
/// The returned signature is always in low-S form.
pub fn sign(ctx: &CurveContext, msg: &[u8], key: &PrivateKey) -> Result<Signature> {
    with_curve!(ctx.id(), C => sign_inner::<C>(ctx, msg, key))
}

/// Sign a message digest and determine the recovery id that reproduces
/// the signer's public key.
pub fn sign_recoverable(ctx: &CurveContext, msg: &[u8], key: &PrivateKey) -> Result<Signature> {
    let mut sig = sign(ctx, msg, key)?;
    let expected = ctx.public_key(key)?;

    for id in 0..4u8 {
        match recover(ctx, msg, &sig, id) {
            Ok(candidate) if candidate == expected => {
                sig.recovery_id = Some(id);
                return Ok(sig);
            }
            _ => continue,
        }
    }
    Err(Error::RecoveryFailed)
}

/// Verify a signature over a message digest.
///
/// Returns `false` for every structural or mathematical failure; both
/// the low-S and high-S encodings of an otherwise-valid signature are
/// accepted.
pub fn verify(ctx: &CurveContext, msg: &[u8], sig: &Signature, pk: &PublicKey) -> bool {
    with_curve!(ctx.id(), C => verify_inner::<C>(ctx, msg, sig, pk))
}

/// Recover the signer's public key from a signature and recovery id.
pub fn recover(ctx: &CurveContext, msg: &[u8], sig: &Signature, recovery_id: u8) -> Result<PublicKey> {
    with_curve!(ctx.id(), C => recover_inner::<C>(ctx, msg, sig, recovery_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamedCurve;
    use hex_literal::hex;

    fn k256() -> CurveContext {
        CurveContext::new(NamedCurve::Secp256k1)
    }

    fn small_signature(ctx: &CurveContext, r: u8, s: u8) -> Signature {
        let mut raw = vec![0u8; ctx.signature_size()];
        raw[ctx.scalar_size() - 1] = r;
        raw[ctx.signature_size() - 1] = s;
        Signature::from_raw(ctx, &raw).unwrap()
    }

    #[test]
    fn der_minimal_integers() {
        let ctx = k256();
        let sig = small_signature(&ctx, 1, 2);
        assert_eq!(sig.to_der(), hex!("3006020101020102"));

        let decoded = Signature::from_der(&ctx, &hex!("3006020101020102")).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn der_pads_high_bit() {
        let ctx = k256();
        let sig = small_signature(&ctx, 0x80, 1);
        assert_eq!(sig.to_der(), hex!("300702020080020101"));
    }

    #[test]
    fn der_rejects_wrong_outer_tag() {
        let ctx = k256();
        assert_eq!(
            Signature::from_der(&ctx, &hex!("3106020101020102")),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn der_long_form_length() {
        let ctx = k256();
        let sig = small_signature(&ctx, 1, 2);
        // Same body as the minimal encoding, but with a long-form
        // sequence length; the original parser skips the length bytes.
        let decoded = Signature::from_der(&ctx, &hex!("308106020101020102")).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn der_overflow_zeroes_both_integers() {
        let ctx = k256();
        // INTEGER r = n (the group order): in-range length, out-of-range
        // value. Decode "succeeds" with r = s = 0.
        let mut der = vec![0x30, 0x26];
        der.extend_from_slice(&[0x02, 0x21, 0x00]);
        der.extend_from_slice(&hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        ));
        der.extend_from_slice(&[0x02, 0x01, 0x02]);

        let decoded = Signature::from_der(&ctx, &der).unwrap();
        assert_eq!(decoded.r(), &[0u8; 32]);
        assert_eq!(decoded.s(), &[0u8; 32]);
        assert!(Signature::from_raw(&ctx, &decoded.to_raw()).is_err());
    }

    #[test]
    fn raw_rejects_zero_and_overflow() {
        let ctx = k256();
        assert_eq!(
            Signature::from_raw(&ctx, &[0u8; 64]),
            Err(Error::InvalidSignature)
        );

        let mut raw = vec![0xffu8; 64];
        raw[63] = 0x01;
        assert_eq!(Signature::from_raw(&ctx, &raw), Err(Error::InvalidSignature));
    }

    #[test]
    fn normalize_is_idempotent() {
        let ctx = k256();
        // s = n - 1, the largest (and thus high-S) valid scalar.
        let mut raw = vec![0u8; 64];
        raw[31] = 1;
        raw[32..].copy_from_slice(&hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140"
        ));
        let sig = Signature::from_raw(&ctx, &raw).unwrap();

        assert!(!sig.is_low_s(&ctx));
        let normalized = sig.normalize(&ctx);
        assert!(normalized.is_low_s(&ctx));
        assert_eq!(normalized.r(), sig.r());
        assert_eq!(normalized.s(), &hex!("0000000000000000000000000000000000000000000000000000000000000001"));
        assert_eq!(normalized.normalize(&ctx), normalized);
    }
}
