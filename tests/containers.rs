//! SEC1, PKCS#8 and SPKI key container round trips.

use ecsig::{CurveContext, Error, NamedCurve};
use rand_core::OsRng;

#[test]
fn sec1_round_trip() {
    for id in NamedCurve::ALL {
        let ctx = CurveContext::new(id);
        let key = ctx.generate_private_key(&mut OsRng);

        for compress in [true, false] {
            let der = ctx.export_private_key(&key, compress).unwrap();
            let imported = ctx.import_private_key(&der).unwrap();
            assert_eq!(imported, key, "{id}: SEC1 round trip");
        }
    }
}

#[test]
fn pkcs8_round_trip() {
    for id in NamedCurve::ALL {
        let ctx = CurveContext::new(id);
        let key = ctx.generate_private_key(&mut OsRng);

        let der = ctx.export_private_key_pkcs8(&key, true).unwrap();
        let imported = ctx.import_private_key_pkcs8(&der).unwrap();
        assert_eq!(imported, key, "{id}: PKCS#8 round trip");
    }
}

#[test]
fn spki_round_trip() {
    for id in NamedCurve::ALL {
        let ctx = CurveContext::new(id);
        let key = ctx.generate_private_key(&mut OsRng);
        let public = ctx.public_key(&key).unwrap();

        for compress in [true, false] {
            let der = ctx.export_public_key_spki(&public, compress).unwrap();
            let imported = ctx.import_public_key_spki(&der).unwrap();
            assert_eq!(imported, public, "{id}: SPKI round trip");
        }
    }
}

#[test]
fn curve_oid_is_enforced() {
    let p256 = CurveContext::new(NamedCurve::P256);
    let k1 = CurveContext::new(NamedCurve::Secp256k1);
    let key = p256.generate_private_key(&mut OsRng);
    let public = p256.public_key(&key).unwrap();

    let sec1 = p256.export_private_key(&key, true).unwrap();
    assert_eq!(k1.import_private_key(&sec1), Err(Error::Asn1));

    let pkcs8 = p256.export_private_key_pkcs8(&key, true).unwrap();
    assert_eq!(k1.import_private_key_pkcs8(&pkcs8), Err(Error::Asn1));

    let spki = p256.export_public_key_spki(&public, true).unwrap();
    assert_eq!(k1.import_public_key_spki(&spki), Err(Error::Asn1));
}

#[test]
fn garbage_containers_are_rejected() {
    let ctx = CurveContext::new(NamedCurve::P256);

    assert_eq!(ctx.import_private_key(&[]), Err(Error::Asn1));
    assert_eq!(ctx.import_private_key(&[0x30, 0x00]), Err(Error::Asn1));
    assert_eq!(ctx.import_private_key_pkcs8(&[0xff; 16]), Err(Error::Asn1));
    assert_eq!(ctx.import_public_key_spki(&[0x02, 0x01, 0x00]), Err(Error::Asn1));
}
