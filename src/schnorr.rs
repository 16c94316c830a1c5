//! Schnorr signatures over the same curve family, including randomized
//! batch verification.
//!
//! The scheme signs 32-byte messages. Nonces are derived as
//! `H(d ‖ m) mod n` with the curve's bound digest, the challenge hashes
//! the nonce x-coordinate together with the *compressed* public key, and
//! the nonce's sign is chosen so that `y(R)` is a quadratic residue
//! modulo the field prime. Interoperability therefore hinges on the
//! residue test, not on a parity convention. P-224's field prime is
//! `≡ 1 (mod 4)`, which breaks the canonical-root choice, so that curve
//! is excluded (`CurveContext::has_schnorr`).

use alloc::vec;
use alloc::vec::Vec;

use crypto_bigint::U576;
use elliptic_curve::{
    ff::Field,
    group::{Curve as _, Group},
    ops::{LinearCombination, MulByGenerator},
    point::DecompressPoint,
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    subtle::Choice,
    AffinePoint, FieldBytes, FieldBytesSize, ProjectivePoint, Scalar,
};
use rand_core::CryptoRngCore;
use sha2::digest::Digest;

use crate::arithmetic::{be_to_uint, is_quadratic_residue, reduce, uint_to_be};
use crate::curve::{with_curve, CurveContext, SignatureCurve};
use crate::key::{
    private_scalar, public_to_affine, scalar_from_bytes, scalar_to_bytes, PrivateKey, PublicKey,
};
use crate::{Error, Result};

/// A Schnorr signature: the nonce point's x-coordinate `r` (`size`
/// bytes — a field element, not a full point) and the scalar `s`
/// (`scalar_size` bytes).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    r: Vec<u8>,
    s: Vec<u8>,
}

impl Signature {
    /// Decode a raw `r ‖ s` signature.
    ///
    /// Requires `r < p` and `s < n`. Unlike the ECDSA codec, zero is
    /// permitted: `r = 0` is a field element like any other here, and
    /// verification decides whether it names a usable point.
    pub fn from_bytes(ctx: &CurveContext, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ctx.schnorr_signature_size() {
            return Err(Error::InvalidSignature);
        }
        let (r, s) = bytes.split_at(ctx.size());

        if &be_to_uint(r) >= ctx.prime() || &be_to_uint(s) >= ctx.order() {
            return Err(Error::InvalidSignature);
        }

        Ok(Self {
            r: r.to_vec(),
            s: s.to_vec(),
        })
    }

    /// Encode as raw `r ‖ s` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.r.len() + self.s.len());
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.s);
        out
    }

    /// The nonce x-coordinate `r`, big-endian.
    pub fn r(&self) -> &[u8] {
        &self.r
    }

    /// The scalar `s`, big-endian.
    pub fn s(&self) -> &[u8] {
        &self.s
    }
}

/// Hash a sequence of byte strings and reduce the digest modulo `n`.
fn hash_to_scalar<C>(ctx: &CurveContext, parts: &[&[u8]]) -> Scalar<C>
where
    C: SignatureCurve,
{
    let mut digest = C::Digest::new();
    for part in parts {
        Digest::update(&mut digest, part);
    }
    let value = reduce(&be_to_uint(&digest.finalize()), ctx.order());
    scalar_from_bytes::<C>(&uint_to_be(&value, ctx.scalar_size()))
        .expect("reduced digest is within the group order")
}

/// Reconstruct the nonce point from its x-coordinate, choosing the root
/// whose y-coordinate is a quadratic residue.
fn lift_x<C>(ctx: &CurveContext, x_bytes: &[u8]) -> Option<ProjectivePoint<C>>
where
    C: SignatureCurve,
    AffinePoint<C>: DecompressPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let point = Option::<AffinePoint<C>>::from(AffinePoint::<C>::decompress(
        FieldBytes::<C>::from_slice(x_bytes),
        Choice::from(0u8),
    ))?;

    let encoded = point.to_encoded_point(false);
    let y = encoded.y()?;
    let point = ProjectivePoint::<C>::from(point);

    if is_quadratic_residue(&be_to_uint(y), ctx.prime(), ctx.qr_exponent()) {
        Some(point)
    } else {
        Some(-point)
    }
}

fn random_nonzero_scalar<C>(ctx: &CurveContext, rng: &mut impl CryptoRngCore) -> Scalar<C>
where
    C: SignatureCurve,
{
    let mut buf = vec![0u8; ctx.scalar_size()];
    loop {
        rng.fill_bytes(&mut buf);
        let value = be_to_uint(&buf);
        if value != U576::ZERO && &value < ctx.order() {
            return scalar_from_bytes::<C>(&buf).expect("sampled scalar is in range");
        }
    }
}

fn sign_inner<C>(ctx: &CurveContext, msg: &[u8; 32], key: &PrivateKey) -> Result<Signature>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let d = private_scalar::<C>(key)?;

    // k' = H(d ‖ m) mod n.
    let k_candidate = hash_to_scalar::<C>(ctx, &[key.as_bytes(), msg]);
    if bool::from(k_candidate.is_zero()) {
        return Err(Error::SignFailure);
    }

    let r_point = ProjectivePoint::<C>::mul_by_generator(&k_candidate).to_affine();
    let r_encoded = r_point.to_encoded_point(false);
    let r_bytes = r_encoded.x().ok_or(Error::SignFailure)?.to_vec();
    let y = r_encoded.y().ok_or(Error::SignFailure)?;

    let public = ProjectivePoint::<C>::mul_by_generator(&d).to_affine();
    let public_compressed = public.to_encoded_point(true);

    // e = H(r ‖ compress(A) ‖ m) mod n.
    let e = hash_to_scalar::<C>(ctx, &[&r_bytes, public_compressed.as_bytes(), msg]);

    // k = k' when y(R) is a quadratic residue, n - k' otherwise.
    let k = if is_quadratic_residue(&be_to_uint(y), ctx.prime(), ctx.qr_exponent()) {
        k_candidate
    } else {
        -k_candidate
    };

    let s = k + e * d;
    Ok(Signature {
        r: r_bytes,
        s: scalar_to_bytes::<C>(&s),
    })
}

fn verify_inner<C>(ctx: &CurveContext, msg: &[u8; 32], sig: &Signature, pk: &PublicKey) -> bool
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    if sig.r.len() != ctx.size() || &be_to_uint(&sig.r) >= ctx.prime() {
        return false;
    }
    let s = match scalar_from_bytes::<C>(&sig.s) {
        Some(s) => s,
        None => return false,
    };
    let a = match public_to_affine::<C>(pk) {
        Ok(a) => a,
        Err(_) => return false,
    };

    let a_compressed = a.to_encoded_point(true);
    let e = hash_to_scalar::<C>(ctx, &[&sig.r, a_compressed.as_bytes(), msg]);

    // R = s·G - e·A.
    let r_point = ProjectivePoint::<C>::lincomb(
        &ProjectivePoint::<C>::generator(),
        &s,
        &ProjectivePoint::<C>::from(a),
        &(-e),
    );
    if bool::from(r_point.is_identity()) {
        return false;
    }

    let encoded = r_point.to_affine().to_encoded_point(false);
    let y = match encoded.y() {
        Some(y) => y,
        None => return false,
    };
    if !is_quadratic_residue(&be_to_uint(y), ctx.prime(), ctx.qr_exponent()) {
        return false;
    }

    match encoded.x() {
        Some(x) => x.as_slice() == sig.r.as_slice(),
        None => false,
    }
}

fn verify_batch_inner<C>(
    ctx: &CurveContext,
    items: &[(&[u8; 32], &Signature, &PublicKey)],
    rng: &mut impl CryptoRngCore,
) -> bool
where
    C: SignatureCurve,
    AffinePoint<C>: DecompressPoint<C> + FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    if items.is_empty() {
        return true;
    }

    let mut sum = Scalar::<C>::ZERO;
    let mut terms: Vec<(ProjectivePoint<C>, Scalar<C>)> = Vec::with_capacity(items.len() * 2);

    for (i, (msg, sig, pk)) in items.iter().enumerate() {
        if sig.r.len() != ctx.size() || &be_to_uint(&sig.r) >= ctx.prime() {
            return false;
        }
        let mut s = match scalar_from_bytes::<C>(&sig.s) {
            Some(s) => s,
            None => return false,
        };
        let a = match public_to_affine::<C>(pk) {
            Ok(a) => a,
            Err(_) => return false,
        };

        let a_compressed = a.to_encoded_point(true);
        let mut e = hash_to_scalar::<C>(ctx, &[&sig.r, a_compressed.as_bytes(), *msg]);

        let r_point = match lift_x::<C>(ctx, &sig.r) {
            Some(point) => point,
            None => return false,
        };

        // a_0 = 1 saves one multiplication and one random draw; every
        // other item gets a random blinding coefficient in [1, n-1].
        let coefficient = if i == 0 {
            Scalar::<C>::ONE
        } else {
            let c = random_nonzero_scalar::<C>(ctx, rng);
            e *= c;
            s *= c;
            c
        };

        sum += s;
        terms.push((r_point, coefficient));
        terms.push((ProjectivePoint::<C>::from(a), e));
    }

    // Valid iff Σ a_i·R_i + Σ (a_i·e_i)·A_i - S·G is the point at
    // infinity.
    let mut acc = ProjectivePoint::<C>::mul_by_generator(&-sum);
    for (point, coefficient) in terms {
        acc += point * coefficient;
    }
    bool::from(acc.is_identity())
}

/// Sign a 32-byte message deterministically.
pub fn sign(ctx: &CurveContext, msg: &[u8; 32], key: &PrivateKey) -> Result<Signature> {
    if !ctx.has_schnorr() {
        return Err(Error::SchnorrUnsupported);
    }
    with_curve!(ctx.id(), C => sign_inner::<C>(ctx, msg, key))
}

/// Verify a signature over a 32-byte message.
///
/// Returns `false` for every structural or mathematical failure.
pub fn verify(ctx: &CurveContext, msg: &[u8; 32], sig: &Signature, pk: &PublicKey) -> Result<bool> {
    if !ctx.has_schnorr() {
        return Err(Error::SchnorrUnsupported);
    }
    Ok(with_curve!(ctx.id(), C => verify_inner::<C>(ctx, msg, sig, pk)))
}

/// Verify a batch of `(message, signature, public key)` triples with one
/// randomized multi-scalar accumulation.
///
/// An empty batch verifies trivially; any decode or lift-x failure on
/// any item fails the whole batch.
pub fn verify_batch(
    ctx: &CurveContext,
    items: &[(&[u8; 32], &Signature, &PublicKey)],
    rng: &mut impl CryptoRngCore,
) -> Result<bool> {
    if !ctx.has_schnorr() {
        return Err(Error::SchnorrUnsupported);
    }
    Ok(with_curve!(ctx.id(), C => verify_batch_inner::<C>(ctx, items, rng)))
}
