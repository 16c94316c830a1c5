//! SEC1, PKCS#8 and SPKI key containers.
//!
//! The containers themselves are the business of the `sec1`/`pkcs8`/
//! `spki` collaborator crates; this module only places raw scalars and
//! SEC1 point octets inside them, dispatches the named-curve OIDs, and
//! re-validates everything on the way back in.

use alloc::vec::Vec;

use der::{
    asn1::{BitStringRef, ObjectIdentifier},
    Decode, Encode,
};
use pkcs8::PrivateKeyInfo;
use sec1::{EcParameters, EcPrivateKey};
use spki::{AlgorithmIdentifierRef, SubjectPublicKeyInfoRef};

use crate::curve::{CurveContext, NamedCurve};
use crate::key::{PrivateKey, PublicKey};
use crate::{Error, Result};

/// id-ecPublicKey from RFC 5480.
const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

fn curve_oid(id: NamedCurve) -> ObjectIdentifier {
    match id {
        NamedCurve::P192 => ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.1"),
        NamedCurve::P224 => ObjectIdentifier::new_unwrap("1.3.132.0.33"),
        NamedCurve::P256 => ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7"),
        NamedCurve::P384 => ObjectIdentifier::new_unwrap("1.3.132.0.34"),
        NamedCurve::P521 => ObjectIdentifier::new_unwrap("1.3.132.0.35"),
        NamedCurve::Secp256k1 => ObjectIdentifier::new_unwrap("1.3.132.0.10"),
    }
}

/// Check an AlgorithmIdentifier's parameters against the expected curve.
///
/// A named-curve OBJECT IDENTIFIER must match; an absent or NULL
/// parameter field is tolerated, anything else is rejected.
fn check_parameters(
    ctx: &CurveContext,
    parameters: Option<der::asn1::AnyRef<'_>>,
) -> Result<()> {
    match parameters {
        None => Ok(()),
        Some(any) if any.is_null() => Ok(()),
        Some(any) => {
            let oid = ObjectIdentifier::try_from(any).map_err(|_| Error::Asn1)?;
            if oid == curve_oid(ctx.id()) {
                Ok(())
            } else {
                Err(Error::Asn1)
            }
        }
    }
}

impl CurveContext {
    /// Interpret container scalar octets, which may be shorter than
    /// `scalar_size`, as a private key.
    fn import_scalar_octets(&self, bytes: &[u8]) -> Result<PrivateKey> {
        if bytes.len() > self.scalar_size() {
            return Err(Error::InvalidPrivateKey);
        }
        let mut padded = alloc::vec![0u8; self.scalar_size()];
        padded[self.scalar_size() - bytes.len()..].copy_from_slice(bytes);
        self.private_key_from_bytes(&padded)
    }

    /// Export a private key as a SEC1 `ECPrivateKey` structure with
    /// named-curve parameters and the embedded public point.
    pub fn export_private_key(&self, key: &PrivateKey, compress: bool) -> Result<Vec<u8>> {
        let public = self.public_key(key)?.to_bytes(compress);
        let ec = EcPrivateKey {
            private_key: key.as_bytes(),
            parameters: Some(EcParameters::NamedCurve(curve_oid(self.id()))),
            public_key: Some(&public),
        };
        ec.to_der().map_err(|_| Error::Asn1)
    }

    /// Import a private key from a SEC1 `ECPrivateKey` structure.
    ///
    /// If the structure carries named-curve parameters they must match
    /// this context's curve; the scalar is range-checked either way.
    pub fn import_private_key(&self, raw: &[u8]) -> Result<PrivateKey> {
        let ec = EcPrivateKey::from_der(raw).map_err(|_| Error::Asn1)?;

        if let Some(parameters) = &ec.parameters {
            if parameters.named_curve() != Some(curve_oid(self.id())) {
                return Err(Error::Asn1);
            }
        }

        self.import_scalar_octets(ec.private_key)
    }

    /// Export a private key as a PKCS#8 `PrivateKeyInfo` structure.
    ///
    /// The curve is named in the outer AlgorithmIdentifier; the inner
    /// `ECPrivateKey` carries no parameters of its own.
    pub fn export_private_key_pkcs8(&self, key: &PrivateKey, compress: bool) -> Result<Vec<u8>> {
        let public = self.public_key(key)?.to_bytes(compress);
        let ec = EcPrivateKey {
            private_key: key.as_bytes(),
            parameters: None,
            public_key: Some(&public),
        };
        let ec_der = ec.to_der().map_err(|_| Error::Asn1)?;

        let oid = curve_oid(self.id());
        let info = PrivateKeyInfo {
            algorithm: AlgorithmIdentifierRef {
                oid: ID_EC_PUBLIC_KEY,
                parameters: Some((&oid).into()),
            },
            private_key: &ec_der,
            public_key: None,
        };
        info.to_der().map_err(|_| Error::Asn1)
    }

    /// Import a private key from a PKCS#8 `PrivateKeyInfo` structure.
    pub fn import_private_key_pkcs8(&self, raw: &[u8]) -> Result<PrivateKey> {
        let info = PrivateKeyInfo::from_der(raw).map_err(|_| Error::Asn1)?;

        if info.algorithm.oid != ID_EC_PUBLIC_KEY {
            return Err(Error::Asn1);
        }
        check_parameters(self, info.algorithm.parameters)?;

        self.import_private_key(info.private_key)
    }

    /// Export a public key as an X.509 `SubjectPublicKeyInfo` structure.
    pub fn export_public_key_spki(&self, pk: &PublicKey, compress: bool) -> Result<Vec<u8>> {
        let point = pk.to_bytes(compress);
        let oid = curve_oid(self.id());

        let spki = SubjectPublicKeyInfoRef {
            algorithm: AlgorithmIdentifierRef {
                oid: ID_EC_PUBLIC_KEY,
                parameters: Some((&oid).into()),
            },
            subject_public_key: BitStringRef::from_bytes(&point).map_err(|_| Error::Asn1)?,
        };
        spki.to_der().map_err(|_| Error::Asn1)
    }

    /// Import a public key from an X.509 `SubjectPublicKeyInfo`
    /// structure, re-validating the embedded point.
    pub fn import_public_key_spki(&self, raw: &[u8]) -> Result<PublicKey> {
        let spki = SubjectPublicKeyInfoRef::from_der(raw).map_err(|_| Error::Asn1)?;

        if spki.algorithm.oid != ID_EC_PUBLIC_KEY {
            return Err(Error::Asn1);
        }
        check_parameters(self, spki.algorithm.parameters)?;

        let point = spki.subject_public_key.as_bytes().ok_or(Error::Asn1)?;
        self.decode_public_key(point)
    }
}
