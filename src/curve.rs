//! Named curves and the immutable per-curve context.
//!
//! A [`CurveContext`] is built once per curve selection and threaded by
//! reference through every other operation in the crate. It owns no
//! mutable state: everything inside is derived from the fixed parameters
//! of the selected curve at construction time.

use alloc::vec::Vec;
use core::fmt::{self, Display};
use core::str::FromStr;

use crypto_bigint::{Integer, U576};
use elliptic_curve::{
    group::{Curve as _, Group},
    sec1::{ModulusSize, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytesSize, PrimeCurve, ProjectivePoint,
};
use sha2::digest::{core_api::BlockSizeUser, Digest, FixedOutputReset};
use sha2::{Sha256, Sha384, Sha512};

use crate::arithmetic::{reduce, uint_to_be};
use crate::{Error, Result};

/// Largest supported field element / scalar width in bytes (P-521).
const MAX_ELEMENT_SIZE: usize = 66;

/// The fixed set of supported curves.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum NamedCurve {
    /// NIST P-192 (secp192r1).
    P192,
    /// NIST P-224 (secp224r1).
    P224,
    /// NIST P-256 (secp256r1, prime256v1).
    P256,
    /// NIST P-384 (secp384r1).
    P384,
    /// NIST P-521 (secp521r1).
    P521,
    /// secp256k1.
    Secp256k1,
}

impl NamedCurve {
    /// All supported curves.
    pub const ALL: [NamedCurve; 6] = [
        NamedCurve::P192,
        NamedCurve::P224,
        NamedCurve::P256,
        NamedCurve::P384,
        NamedCurve::P521,
        NamedCurve::Secp256k1,
    ];

    /// Canonical name of the curve.
    pub fn as_str(&self) -> &'static str {
        match self {
            NamedCurve::P192 => "P192",
            NamedCurve::P224 => "P224",
            NamedCurve::P256 => "P256",
            NamedCurve::P384 => "P384",
            NamedCurve::P521 => "P521",
            NamedCurve::Secp256k1 => "SECP256K1",
        }
    }

    /// Look a curve up by its canonical name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "P192" => Ok(NamedCurve::P192),
            "P224" => Ok(NamedCurve::P224),
            "P256" => Ok(NamedCurve::P256),
            "P384" => Ok(NamedCurve::P384),
            "P521" => Ok(NamedCurve::P521),
            "SECP256K1" => Ok(NamedCurve::Secp256k1),
            _ => Err(Error::UnsupportedCurve),
        }
    }
}

impl Display for NamedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamedCurve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Curve arithmetic together with the curve's bound message digest.
///
/// The digest assignment follows the original engine: every curve of 256
/// bits or less is bound to SHA-256, P-384 to SHA-384 and P-521 to
/// SHA-512. The same digest drives deterministic ECDSA nonces and both
/// Schnorr hashes.
pub trait SignatureCurve: PrimeCurve + CurveArithmetic {
    /// Message digest bound to this curve.
    type Digest: Digest + BlockSizeUser + FixedOutputReset;
}

impl SignatureCurve for p192::NistP192 {
    type Digest = Sha256;
}

impl SignatureCurve for p224::NistP224 {
    type Digest = Sha256;
}

impl SignatureCurve for p256::NistP256 {
    type Digest = Sha256;
}

impl SignatureCurve for p384::NistP384 {
    type Digest = Sha384;
}

impl SignatureCurve for p521::NistP521 {
    type Digest = Sha512;
}

impl SignatureCurve for k256::Secp256k1 {
    type Digest = Sha256;
}

/// Monomorphize `$body` over the curve type selected by `$id`.
macro_rules! with_curve {
    ($id:expr, $curve:ident => $body:expr) => {
        match $id {
            $crate::NamedCurve::P192 => {
                type $curve = ::p192::NistP192;
                $body
            }
            $crate::NamedCurve::P224 => {
                type $curve = ::p224::NistP224;
                $body
            }
            $crate::NamedCurve::P256 => {
                type $curve = ::p256::NistP256;
                $body
            }
            $crate::NamedCurve::P384 => {
                type $curve = ::p384::NistP384;
                $body
            }
            $crate::NamedCurve::P521 => {
                type $curve = ::p521::NistP521;
                $body
            }
            $crate::NamedCurve::Secp256k1 => {
                type $curve = ::k256::Secp256k1;
                $body
            }
        }
    };
}

pub(crate) use with_curve;

/// Raw curve parameters, big-endian hex padded to the `U576` width.
struct RawParams {
    scalar_bits: usize,
    has_schnorr: bool,
    p: &'static str,
    n: &'static str,
    a: &'static str,
    b: &'static str,
}

/// The Schnorr scheme requires `p ≡ 3 (mod 4)` so that lift-x has a
/// canonical quadratic-residue root; P-224 (`p ≡ 1 (mod 4)`) is the one
/// supported curve excluded from it.
fn raw_params(id: NamedCurve) -> RawParams {
    match id {
        NamedCurve::P192 => RawParams {
            scalar_bits: 192,
            has_schnorr: true,
            p: "000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000fffffffffffffffffffffffffffffffeffffffffffffffff",
            n: "000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000ffffffffffffffffffffffff99def836146bc9b1b4d22831",
            a: "000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000fffffffffffffffffffffffffffffffefffffffffffffffc",
            b: "00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000064210519e59c80e70fa7e9ab72243049feb8deecc146b9b1",
        },
        NamedCurve::P224 => RawParams {
            scalar_bits: 224,
            has_schnorr: false,
            p: "0000000000000000000000000000000000000000000000000000000000000000000000000000000000000000ffffffffffffffffffffffffffffffff000000000000000000000001",
            n: "0000000000000000000000000000000000000000000000000000000000000000000000000000000000000000ffffffffffffffffffffffffffff16a2e0b8f03e13dd29455c5c2a3d",
            a: "0000000000000000000000000000000000000000000000000000000000000000000000000000000000000000fffffffffffffffffffffffffffffffefffffffffffffffffffffffe",
            b: "0000000000000000000000000000000000000000000000000000000000000000000000000000000000000000b4050a850c04b3abf54132565044b0b7d7bfd8ba270b39432355ffb4",
        },
        NamedCurve::P256 => RawParams {
            scalar_bits: 256,
            has_schnorr: true,
            p: "00000000000000000000000000000000000000000000000000000000000000000000000000000000ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
            n: "00000000000000000000000000000000000000000000000000000000000000000000000000000000ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
            a: "00000000000000000000000000000000000000000000000000000000000000000000000000000000ffffffff00000001000000000000000000000000fffffffffffffffffffffffc",
            b: "000000000000000000000000000000000000000000000000000000000000000000000000000000005ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
        },
        NamedCurve::P384 => RawParams {
            scalar_bits: 384,
            has_schnorr: true,
            p: "000000000000000000000000000000000000000000000000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff0000000000000000ffffffff",
            n: "000000000000000000000000000000000000000000000000ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf581a0db248b0a77aecec196accc52973",
            a: "000000000000000000000000000000000000000000000000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff0000000000000000fffffffc",
            b: "000000000000000000000000000000000000000000000000b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875ac656398d8a2ed19d2a85c8edd3ec2aef",
        },
        NamedCurve::P521 => RawParams {
            scalar_bits: 521,
            has_schnorr: true,
            p: "00000000000001ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            n: "00000000000001fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffa51868783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e91386409",
            a: "00000000000001fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffc",
            b: "0000000000000051953eb9618e1c9a1f929a21a0b68540eea2da725b99b315f3b8b489918ef109e156193951ec7e937b1652c0bd3bb1bf073573df883d2c34f1ef451fd46b503f00",
        },
        NamedCurve::Secp256k1 => RawParams {
            scalar_bits: 256,
            has_schnorr: true,
            p: "00000000000000000000000000000000000000000000000000000000000000000000000000000000fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f",
            n: "00000000000000000000000000000000000000000000000000000000000000000000000000000000fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
            a: "000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000",
            b: "000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000007",
        },
    }
}

fn generator_bytes<C>() -> Vec<u8>
where
    C: SignatureCurve,
    AffinePoint<C>: ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    ProjectivePoint::<C>::generator()
        .to_affine()
        .to_encoded_point(true)
        .as_bytes()
        .to_vec()
}

/// Immutable parameters of a selected curve.
///
/// Constructed once per curve selection and shared by reference; nothing
/// is mutated after construction, so a context may be used freely from
/// concurrent callers.
#[derive(Clone, Debug)]
pub struct CurveContext {
    id: NamedCurve,
    size: usize,
    scalar_bits: usize,
    scalar_size: usize,
    has_schnorr: bool,
    p: U576,
    n: U576,
    half_order: U576,
    p_mod_n: U576,
    qr_exponent: U576,
    a: U576,
    b: U576,
    generator: Vec<u8>,
}

impl CurveContext {
    /// Build the context for a named curve.
    ///
    /// Parameter-consistency violations are programming errors in the
    /// fixed curve table and abort rather than surface as recoverable
    /// errors.
    pub fn new(id: NamedCurve) -> Self {
        let raw = raw_params(id);

        let p = U576::from_be_hex(raw.p);
        let n = U576::from_be_hex(raw.n);
        let a = U576::from_be_hex(raw.a);
        let b = U576::from_be_hex(raw.b);

        let size = (p.bits() + 7) / 8;
        let scalar_size = (raw.scalar_bits + 7) / 8;

        assert!(bool::from(p.is_odd()), "field prime must be odd");
        assert_eq!(n.bits(), raw.scalar_bits, "order bit length mismatch");
        assert!(size <= MAX_ELEMENT_SIZE && scalar_size <= MAX_ELEMENT_SIZE);

        let generator = with_curve!(id, C => generator_bytes::<C>());
        assert_eq!(generator.len(), 1 + size);

        Self {
            id,
            size,
            scalar_bits: raw.scalar_bits,
            scalar_size,
            has_schnorr: raw.has_schnorr,
            p,
            n,
            half_order: n.shr_vartime(1),
            p_mod_n: reduce(&p, &n),
            qr_exponent: p.shr_vartime(1),
            a,
            b,
            generator,
        }
    }

    /// Build the context for a curve given its canonical name.
    pub fn from_name(name: &str) -> Result<Self> {
        NamedCurve::from_name(name).map(Self::new)
    }

    /// The curve this context describes.
    pub fn id(&self) -> NamedCurve {
        self.id
    }

    /// Canonical curve name.
    pub fn name(&self) -> &'static str {
        self.id.as_str()
    }

    /// Field element width in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bit length of the group order.
    pub fn scalar_bits(&self) -> usize {
        self.scalar_bits
    }

    /// Scalar width in bytes.
    pub fn scalar_size(&self) -> usize {
        self.scalar_size
    }

    /// Width of a raw ECDSA signature (`r ‖ s`).
    pub fn signature_size(&self) -> usize {
        self.scalar_size * 2
    }

    /// Width of a raw Schnorr signature (`r ‖ s`).
    pub fn schnorr_signature_size(&self) -> usize {
        self.size + self.scalar_size
    }

    /// Whether the curve supports the Schnorr signature scheme.
    pub fn has_schnorr(&self) -> bool {
        self.has_schnorr
    }

    /// Field prime `p`.
    pub fn prime(&self) -> &U576 {
        &self.p
    }

    /// Group order `n`.
    pub fn order(&self) -> &U576 {
        &self.n
    }

    /// `⌊n / 2⌋`, the low-S boundary.
    pub fn half_order(&self) -> &U576 {
        &self.half_order
    }

    /// Curve coefficient `a`.
    pub fn a(&self) -> &U576 {
        &self.a
    }

    /// Curve coefficient `b`.
    pub fn b(&self) -> &U576 {
        &self.b
    }

    /// Compressed encoding of the generator point.
    pub fn generator(&self) -> &[u8] {
        &self.generator
    }

    /// `p mod n`, the bound on `r` for second-key recovery.
    pub(crate) fn p_mod_n(&self) -> &U576 {
        &self.p_mod_n
    }

    /// `(p - 1) / 2`, the Euler-criterion exponent.
    pub(crate) fn qr_exponent(&self) -> &U576 {
        &self.qr_exponent
    }

    /// The group order as `scalar_size` big-endian bytes.
    pub(crate) fn order_bytes(&self) -> Vec<u8> {
        uint_to_be(&self.n, self.scalar_size)
    }
}
