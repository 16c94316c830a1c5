//! Error types.

use core::fmt::{self, Display};

/// Result type for signature-engine operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by the signature engine.
///
/// Verification failure is deliberately *not* represented here: the
/// `verify` family of operations returns `bool`, and `false` is a normal
/// outcome rather than an error.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The requested curve name is not in the supported set.
    UnsupportedCurve,

    /// The selected curve does not support the Schnorr signature scheme.
    SchnorrUnsupported,

    /// A private scalar was zero, out of range, or of the wrong length.
    InvalidPrivateKey,

    /// A public key failed to decode: bad tag, bad length, mismatched
    /// hybrid parity, a coordinate out of range, a point not on the
    /// curve, or the point at infinity.
    InvalidPublicKey,

    /// A tweak scalar was out of range or of the wrong length.
    InvalidTweak,

    /// A signature failed structural validation.
    InvalidSignature,

    /// A point operation produced the point at infinity where a finite
    /// point is required.
    PointAtInfinity,

    /// Nonce derivation yielded no valid signature.
    SignFailure,

    /// No recovery id reproduced the signer's public key.
    RecoveryFailed,

    /// An ASN.1 key container failed to parse or serialize.
    Asn1,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::UnsupportedCurve => "unsupported curve",
            Error::SchnorrUnsupported => "curve does not support Schnorr signatures",
            Error::InvalidPrivateKey => "invalid private key",
            Error::InvalidPublicKey => "invalid public key",
            Error::InvalidTweak => "invalid tweak scalar",
            Error::InvalidSignature => "invalid signature",
            Error::PointAtInfinity => "point at infinity",
            Error::SignFailure => "signing produced no valid signature",
            Error::RecoveryFailed => "public key recovery failed",
            Error::Asn1 => "ASN.1 encoding error",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
