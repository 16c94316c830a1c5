//! Public-key encodings: compressed, uncompressed, and hybrid forms.

use ecsig::{CurveContext, NamedCurve};
use hex_literal::hex;
use rand_core::OsRng;

#[test]
fn round_trip_all_forms() {
    for id in NamedCurve::ALL {
        let ctx = CurveContext::new(id);
        let key = ctx.generate_private_key(&mut OsRng);
        let public = ctx.public_key(&key).unwrap();

        let compressed = public.to_bytes(true);
        assert_eq!(compressed.len(), 1 + ctx.size());
        assert!(compressed[0] == 0x02 || compressed[0] == 0x03);
        assert_eq!(ctx.decode_public_key(&compressed).unwrap(), public);

        let uncompressed = public.to_bytes(false);
        assert_eq!(uncompressed.len(), 1 + 2 * ctx.size());
        assert_eq!(uncompressed[0], 0x04);
        assert_eq!(ctx.decode_public_key(&uncompressed).unwrap(), public);
    }
}

#[test]
fn hybrid_form_decodes() {
    for id in NamedCurve::ALL {
        let ctx = CurveContext::new(id);
        let key = ctx.generate_private_key(&mut OsRng);
        let public = ctx.public_key(&key).unwrap();

        let mut hybrid = public.to_bytes(false);
        hybrid[0] = 0x06 | (hybrid[hybrid.len() - 1] & 1);
        assert_eq!(ctx.decode_public_key(&hybrid).unwrap(), public);

        // The tag's parity bit must match y.
        hybrid[0] ^= 1;
        assert!(ctx.decode_public_key(&hybrid).is_err());
    }
}

#[test]
fn malformed_encodings_are_rejected() {
    let ctx = CurveContext::new(NamedCurve::Secp256k1);
    let key = ctx.generate_private_key(&mut OsRng);
    let public = ctx.public_key(&key).unwrap();
    let uncompressed = public.to_bytes(false);
    let compressed = public.to_bytes(true);

    // Empty / truncated / oversized.
    assert!(ctx.decode_public_key(&[]).is_err());
    assert!(ctx.decode_public_key(&uncompressed[..33]).is_err());
    assert!(ctx.decode_public_key(&compressed[..32]).is_err());
    let mut oversized = uncompressed.clone();
    oversized.push(0x00);
    assert!(ctx.decode_public_key(&oversized).is_err());

    // Unknown tags, including the identity encoding.
    assert!(ctx.decode_public_key(&[0x00]).is_err());
    let mut bad_tag = uncompressed.clone();
    bad_tag[0] = 0x05;
    assert!(ctx.decode_public_key(&bad_tag).is_err());

    // A y-coordinate off the curve.
    let mut off_curve = uncompressed.clone();
    let last = off_curve.len() - 1;
    off_curve[last] ^= 0x02;
    assert!(ctx.decode_public_key(&off_curve).is_err());

    // Compressed x not on the curve at all (x = p - 1 works for
    // secp256k1: (p-1)^3 + 7 is a non-residue).
    let mut bad_x = vec![0x02u8];
    bad_x.extend_from_slice(&hex!(
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2e"
    ));
    assert!(ctx.decode_public_key(&bad_x).is_err());

    // x >= p is out of range regardless of tag.
    let mut big_x = vec![0x02u8];
    big_x.extend_from_slice(&hex!(
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f"
    ));
    assert!(ctx.decode_public_key(&big_x).is_err());
}

#[test]
fn known_generator_point() {
    let ctx = CurveContext::new(NamedCurve::Secp256k1);

    let uncompressed = hex!(
        "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
    );
    let public = ctx.decode_public_key(&uncompressed).unwrap();

    assert_eq!(
        public.x(),
        hex!("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
    );
    assert_eq!(
        public.y(),
        hex!("483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8")
    );
    assert_eq!(public.to_bytes(true), ctx.generator());

    // Decompression recovers the full point from the compressed form.
    let decompressed = ctx.decode_public_key(ctx.generator()).unwrap();
    assert_eq!(decompressed, public);
}

#[test]
fn validate_public_key_matches_decode() {
    let ctx = CurveContext::new(NamedCurve::P384);
    let key = ctx.generate_private_key(&mut OsRng);
    let public = ctx.public_key(&key).unwrap();

    assert!(ctx.validate_public_key(&public.to_bytes(true)));
    assert!(ctx.validate_public_key(&public.to_bytes(false)));
    assert!(!ctx.validate_public_key(&[0x04; 97]));
}
