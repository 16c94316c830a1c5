//! Private and public keys, the SEC1 point codec, and validated
//! scalar/point algebra.
//!
//! All algebra goes through the curve crates; this module supplies the
//! validation the engines rely on: scalars live in `(0, n)`, decoded
//! points are finite and on-curve, and no operation reports success with
//! a zero scalar or the point at infinity as its result.

use alloc::vec::Vec;
use core::fmt::{self, Debug};

use elliptic_curve::{
    ff::{Field, PrimeField},
    generic_array::typenum::Unsigned,
    group::{Curve as _, Group},
    ops::MulByGenerator,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint},
    subtle::ConstantTimeEq,
    AffinePoint, FieldBytes, FieldBytesSize, ProjectivePoint, Scalar,
};
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::arithmetic::{be_to_uint, reduce, uint_to_be};
use crate::curve::{with_curve, CurveContext, SignatureCurve};
use crate::{Error, Result};

/// A private scalar, held as `scalar_size` big-endian bytes.
///
/// Always in the open interval `(0, n)` for the curve it was created
/// under. The backing storage is wiped on drop.
#[derive(Clone)]
pub struct PrivateKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl PrivateKey {
    pub(crate) fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Borrow the raw big-endian scalar bytes.
    ///
    /// This is key material; handle with care.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey { ... }")
    }
}

impl Eq for PrivateKey {}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

/// A public key: a finite curve point in affine coordinates, each
/// coordinate held as `size` big-endian bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    x: Vec<u8>,
    y: Vec<u8>,
}

impl PublicKey {
    pub(crate) fn from_coordinates(x: Vec<u8>, y: Vec<u8>) -> Self {
        Self { x, y }
    }

    /// Big-endian x-coordinate.
    pub fn x(&self) -> &[u8] {
        &self.x
    }

    /// Big-endian y-coordinate.
    pub fn y(&self) -> &[u8] {
        &self.y
    }

    /// SEC1 encoding: `02/03 ‖ x` when compressed, `04 ‖ x ‖ y` otherwise.
    pub fn to_bytes(&self, compress: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.x.len() + self.y.len());
        if compress {
            out.push(0x02 | (self.y[self.y.len() - 1] & 1));
            out.extend_from_slice(&self.x);
        } else {
            out.push(0x04);
            out.extend_from_slice(&self.x);
            out.extend_from_slice(&self.y);
        }
        out
    }
}

//
// Typed conversions shared with the signature engines.
//

/// Parse an exact-width scalar, rejecting values `>= n`. Zero is allowed.
pub(crate) fn scalar_from_bytes<C>(bytes: &[u8]) -> Option<Scalar<C>>
where
    C: SignatureCurve,
{
    if bytes.len() != FieldBytesSize::<C>::USIZE {
        return None;
    }
    Option::from(Scalar::<C>::from_repr(FieldBytes::<C>::clone_from_slice(
        bytes,
    )))
}

/// Serialize a scalar as `scalar_size` big-endian bytes.
pub(crate) fn scalar_to_bytes<C>(scalar: &Scalar<C>) -> Vec<u8>
where
    C: SignatureCurve,
{
    scalar.to_repr().as_slice().to_vec()
}

/// Parse a private key as a nonzero scalar.
pub(crate) fn private_scalar<C>(key: &PrivateKey) -> Result<Scalar<C>>
where
    C: SignatureCurve,
{
    let scalar = scalar_from_bytes::<C>(key.as_bytes()).ok_or(Error::InvalidPrivateKey)?;
    if bool::from(scalar.is_zero()) {
        return Err(Error::InvalidPrivateKey);
    }
    Ok(scalar)
}

/// Parse a tweak as a scalar `< n`, optionally rejecting zero.
fn tweak_scalar<C>(tweak: &[u8], allow_zero: bool) -> Result<Scalar<C>>
where
    C: SignatureCurve,
{
    let scalar = scalar_from_bytes::<C>(tweak).ok_or(Error::InvalidTweak)?;
    if !allow_zero && bool::from(scalar.is_zero()) {
        return Err(Error::InvalidTweak);
    }
    Ok(scalar)
}

/// Reconstruct the affine point behind a [`PublicKey`].
pub(crate) fn public_to_affine<C>(pk: &PublicKey) -> Result<AffinePoint<C>>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let width = FieldBytesSize::<C>::USIZE;
    if pk.x.len() != width || pk.y.len() != width {
        return Err(Error::InvalidPublicKey);
    }

    let encoded = EncodedPoint::<C>::from_affine_coordinates(
        FieldBytes::<C>::from_slice(&pk.x),
        FieldBytes::<C>::from_slice(&pk.y),
        false,
    );
    Option::from(AffinePoint::<C>::from_encoded_point(&encoded)).ok_or(Error::InvalidPublicKey)
}

/// Extract affine coordinates from a finite point.
pub(crate) fn affine_to_public<C>(point: &AffinePoint<C>) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let encoded = point.to_encoded_point(false);
    let x = encoded.x().ok_or(Error::PointAtInfinity)?;
    let y = encoded.y().ok_or(Error::PointAtInfinity)?;
    Ok(PublicKey::from_coordinates(x.to_vec(), y.to_vec()))
}

/// Extract affine coordinates, failing on the point at infinity.
pub(crate) fn projective_to_public<C>(point: &ProjectivePoint<C>) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    if bool::from(point.is_identity()) {
        return Err(Error::PointAtInfinity);
    }
    affine_to_public::<C>(&point.to_affine())
}

/// Decode a SEC1-encoded point, including the hybrid forms.
pub(crate) fn decode_point<C>(ctx: &CurveContext, raw: &[u8]) -> Result<AffinePoint<C>>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let size = ctx.size();
    if raw.len() < 1 + size {
        return Err(Error::InvalidPublicKey);
    }

    let encoded = match raw[0] {
        0x02 | 0x03 => {
            if raw.len() != 1 + size {
                return Err(Error::InvalidPublicKey);
            }
            EncodedPoint::<C>::from_bytes(raw).map_err(|_| Error::InvalidPublicKey)?
        }
        0x04 => {
            if raw.len() != 1 + size * 2 {
                return Err(Error::InvalidPublicKey);
            }
            EncodedPoint::<C>::from_bytes(raw).map_err(|_| Error::InvalidPublicKey)?
        }
        // Hybrid forms carry both coordinates plus the parity of y in the
        // tag's low bit; the tag must agree with the y it describes. The
        // `sec1` crate does not model these tags, so the point is decoded
        // through its uncompressed form after the parity check.
        0x06 | 0x07 => {
            if raw.len() != 1 + size * 2 {
                return Err(Error::InvalidPublicKey);
            }
            if raw[0] & 1 != raw[raw.len() - 1] & 1 {
                return Err(Error::InvalidPublicKey);
            }
            let mut uncompressed = raw.to_vec();
            uncompressed[0] = 0x04;
            EncodedPoint::<C>::from_bytes(&uncompressed).map_err(|_| Error::InvalidPublicKey)?
        }
        _ => return Err(Error::InvalidPublicKey),
    };

    // `from_encoded_point` performs the on-curve check; identity encodings
    // were already excluded by the tag match above.
    Option::from(AffinePoint::<C>::from_encoded_point(&encoded)).ok_or(Error::InvalidPublicKey)
}

//
// Key operations on the curve context.
//

fn create_public_inner<C>(key: &PrivateKey) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let d = private_scalar::<C>(key)?;
    projective_to_public::<C>(&ProjectivePoint::<C>::mul_by_generator(&d))
}

fn decode_public_inner<C>(ctx: &CurveContext, raw: &[u8]) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    affine_to_public::<C>(&decode_point::<C>(ctx, raw)?)
}

fn tweak_add_private_inner<C>(key: &PrivateKey, tweak: &[u8]) -> Result<PrivateKey>
where
    C: SignatureCurve,
{
    let d = private_scalar::<C>(key)?;
    let t = tweak_scalar::<C>(tweak, true)?;

    let sum = d + t;
    if bool::from(sum.is_zero()) {
        return Err(Error::InvalidPrivateKey);
    }
    Ok(PrivateKey::from_vec(scalar_to_bytes::<C>(&sum)))
}

fn tweak_mul_private_inner<C>(key: &PrivateKey, tweak: &[u8]) -> Result<PrivateKey>
where
    C: SignatureCurve,
{
    let d = private_scalar::<C>(key)?;
    let t = tweak_scalar::<C>(tweak, false)?;

    let product = d * t;
    if bool::from(product.is_zero()) {
        return Err(Error::InvalidPrivateKey);
    }
    Ok(PrivateKey::from_vec(scalar_to_bytes::<C>(&product)))
}

fn negate_private_inner<C>(key: &PrivateKey) -> Result<PrivateKey>
where
    C: SignatureCurve,
{
    let d = private_scalar::<C>(key)?;
    Ok(PrivateKey::from_vec(scalar_to_bytes::<C>(&-d)))
}

fn invert_private_inner<C>(key: &PrivateKey) -> Result<PrivateKey>
where
    C: SignatureCurve,
{
    let d = private_scalar::<C>(key)?;
    let inverse = Option::<Scalar<C>>::from(d.invert()).ok_or(Error::InvalidPrivateKey)?;
    Ok(PrivateKey::from_vec(scalar_to_bytes::<C>(&inverse)))
}

fn tweak_add_public_inner<C>(pk: &PublicKey, tweak: &[u8]) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let point = public_to_affine::<C>(pk)?;
    let t = tweak_scalar::<C>(tweak, true)?;

    let sum = ProjectivePoint::<C>::from(point) + ProjectivePoint::<C>::mul_by_generator(&t);
    projective_to_public::<C>(&sum)
}

fn add_public_inner<C>(a: &PublicKey, b: &PublicKey) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let lhs = ProjectivePoint::<C>::from(public_to_affine::<C>(a)?);
    let rhs = ProjectivePoint::<C>::from(public_to_affine::<C>(b)?);
    projective_to_public::<C>(&(lhs + rhs))
}

fn combine_public_inner<C>(keys: &[PublicKey]) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let mut acc = ProjectivePoint::<C>::identity();
    for pk in keys {
        acc += ProjectivePoint::<C>::from(public_to_affine::<C>(pk)?);
    }
    projective_to_public::<C>(&acc)
}

fn negate_public_inner<C>(pk: &PublicKey) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let point = ProjectivePoint::<C>::from(public_to_affine::<C>(pk)?);
    projective_to_public::<C>(&-point)
}

fn derive_inner<C>(pk: &PublicKey, key: &PrivateKey) -> Result<PublicKey>
where
    C: SignatureCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let d = private_scalar::<C>(key)?;
    let point = ProjectivePoint::<C>::from(public_to_affine::<C>(pk)?);
    projective_to_public::<C>(&(point * d))
}

impl CurveContext {
    fn is_valid_scalar_bytes(&self, bytes: &[u8]) -> bool {
        if bytes.len() != self.scalar_size() {
            return false;
        }
        let value = be_to_uint(bytes);
        value != crypto_bigint::U576::ZERO && &value < self.order()
    }

    /// Draw random scalars until a valid private key appears.
    ///
    /// The rejection loop is the only place the engine retries anything;
    /// for the supported curves almost every draw succeeds.
    pub fn generate_private_key(&self, rng: &mut impl CryptoRngCore) -> PrivateKey {
        let mut bytes = Zeroizing::new(alloc::vec![0u8; self.scalar_size()]);
        loop {
            rng.fill_bytes(&mut bytes);
            if self.is_valid_scalar_bytes(&bytes) {
                return PrivateKey::from_vec(bytes.to_vec());
            }
        }
    }

    /// Import a private key, rejecting zero or out-of-range scalars.
    pub fn private_key_from_bytes(&self, bytes: &[u8]) -> Result<PrivateKey> {
        if !self.is_valid_scalar_bytes(bytes) {
            return Err(Error::InvalidPrivateKey);
        }
        Ok(PrivateKey::from_vec(bytes.to_vec()))
    }

    /// Whether `bytes` is a valid private key for this curve.
    pub fn validate_private_key(&self, bytes: &[u8]) -> bool {
        self.is_valid_scalar_bytes(bytes)
    }

    /// Compute the public key `d·G`.
    pub fn public_key(&self, key: &PrivateKey) -> Result<PublicKey> {
        with_curve!(self.id(), C => create_public_inner::<C>(key))
    }

    /// Decode a SEC1-encoded public key (compressed, uncompressed or
    /// hybrid form).
    pub fn decode_public_key(&self, raw: &[u8]) -> Result<PublicKey> {
        with_curve!(self.id(), C => decode_public_inner::<C>(self, raw))
    }

    /// Whether `raw` decodes to a valid public key for this curve.
    pub fn validate_public_key(&self, raw: &[u8]) -> bool {
        self.decode_public_key(raw).is_ok()
    }

    /// `d + t mod n`; fails if the result would be zero.
    pub fn tweak_add_private(&self, key: &PrivateKey, tweak: &[u8]) -> Result<PrivateKey> {
        with_curve!(self.id(), C => tweak_add_private_inner::<C>(key, tweak))
    }

    /// `d · t mod n`; the tweak must be nonzero.
    pub fn tweak_mul_private(&self, key: &PrivateKey, tweak: &[u8]) -> Result<PrivateKey> {
        with_curve!(self.id(), C => tweak_mul_private_inner::<C>(key, tweak))
    }

    /// `n - d`.
    pub fn negate_private(&self, key: &PrivateKey) -> Result<PrivateKey> {
        with_curve!(self.id(), C => negate_private_inner::<C>(key))
    }

    /// `d⁻¹ mod n`.
    pub fn invert_private(&self, key: &PrivateKey) -> Result<PrivateKey> {
        with_curve!(self.id(), C => invert_private_inner::<C>(key))
    }

    /// Reduce arbitrary key material modulo `n`.
    ///
    /// At most `scalar_size` leading bytes are used. A zero residue is
    /// rejected so that the result always satisfies the private-key
    /// invariant.
    pub fn reduce_private(&self, bytes: &[u8]) -> Result<PrivateKey> {
        let used = core::cmp::min(bytes.len(), self.scalar_size());
        let value = reduce(&be_to_uint(&bytes[..used]), self.order());
        if value == crypto_bigint::U576::ZERO {
            return Err(Error::InvalidPrivateKey);
        }
        Ok(PrivateKey::from_vec(uint_to_be(&value, self.scalar_size())))
    }

    /// `P + t·G`; fails if the sum is the point at infinity.
    pub fn tweak_add_public(&self, pk: &PublicKey, tweak: &[u8]) -> Result<PublicKey> {
        with_curve!(self.id(), C => tweak_add_public_inner::<C>(pk, tweak))
    }

    /// `t·P`, the ECDH-style scalar multiplication by a tweak.
    pub fn tweak_mul_public(&self, pk: &PublicKey, tweak: &[u8]) -> Result<PublicKey> {
        let key = self.private_key_from_bytes(tweak).map_err(|_| Error::InvalidTweak)?;
        self.derive(pk, &key)
    }

    /// `P + Q`; fails if the sum is the point at infinity.
    pub fn add_public(&self, a: &PublicKey, b: &PublicKey) -> Result<PublicKey> {
        with_curve!(self.id(), C => add_public_inner::<C>(a, b))
    }

    /// Sum over any number of public keys; fails on the point at
    /// infinity (including the empty sum).
    pub fn combine_public(&self, keys: &[PublicKey]) -> Result<PublicKey> {
        with_curve!(self.id(), C => combine_public_inner::<C>(keys))
    }

    /// `-P`.
    pub fn negate_public(&self, pk: &PublicKey) -> Result<PublicKey> {
        with_curve!(self.id(), C => negate_public_inner::<C>(pk))
    }

    /// `d·P`, the ECDH primitive.
    pub fn derive(&self, pk: &PublicKey, key: &PrivateKey) -> Result<PublicKey> {
        with_curve!(self.id(), C => derive_inner::<C>(pk, key))
    }
}
