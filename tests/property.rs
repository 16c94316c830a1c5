//! Property tests over the signature codecs and engines.

use ecsig::{ecdsa, CurveContext, NamedCurve};
use proptest::prelude::*;
use sha2::{Digest, Sha256};

fn k256() -> CurveContext {
    CurveContext::new(NamedCurve::Secp256k1)
}

/// Map arbitrary bytes onto a valid nonzero scalar.
fn valid_scalar(ctx: &CurveContext, bytes: &[u8; 32]) -> Vec<u8> {
    ctx.reduce_private(bytes)
        .map(|key| key.as_bytes().to_vec())
        .unwrap_or_else(|_| {
            let mut one = vec![0u8; ctx.scalar_size()];
            one[ctx.scalar_size() - 1] = 1;
            one
        })
}

proptest! {
    #[test]
    fn der_round_trip(r_seed in any::<[u8; 32]>(), s_seed in any::<[u8; 32]>()) {
        let ctx = k256();
        let mut raw = valid_scalar(&ctx, &r_seed);
        raw.extend_from_slice(&valid_scalar(&ctx, &s_seed));

        let sig = ecdsa::Signature::from_raw(&ctx, &raw).unwrap();
        let decoded = ecdsa::Signature::from_der(&ctx, &sig.to_der()).unwrap();
        prop_assert_eq!(decoded, sig);
    }

    #[test]
    fn raw_round_trip(r_seed in any::<[u8; 32]>(), s_seed in any::<[u8; 32]>()) {
        let ctx = k256();
        let mut raw = valid_scalar(&ctx, &r_seed);
        raw.extend_from_slice(&valid_scalar(&ctx, &s_seed));

        let sig = ecdsa::Signature::from_raw(&ctx, &raw).unwrap();
        prop_assert_eq!(sig.to_raw(), raw);
    }

    #[test]
    fn normalize_is_idempotent_and_low_s(r_seed in any::<[u8; 32]>(), s_seed in any::<[u8; 32]>()) {
        let ctx = k256();
        let mut raw = valid_scalar(&ctx, &r_seed);
        raw.extend_from_slice(&valid_scalar(&ctx, &s_seed));
        let sig = ecdsa::Signature::from_raw(&ctx, &raw).unwrap();

        let normalized = sig.normalize(&ctx);
        prop_assert!(normalized.is_low_s(&ctx));
        prop_assert_eq!(normalized.r(), sig.r());
        prop_assert_eq!(normalized.normalize(&ctx), normalized.clone());

        // Normalization is the identity exactly on low-S input.
        if sig.is_low_s(&ctx) {
            prop_assert_eq!(&normalized, &sig);
        } else {
            prop_assert_ne!(normalized.s(), sig.s());
        }
    }

    #[test]
    fn reduced_material_is_always_valid(seed in any::<[u8; 48]>()) {
        let ctx = k256();
        if let Ok(key) = ctx.reduce_private(&seed) {
            prop_assert!(ctx.validate_private_key(key.as_bytes()));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn sign_verify_holds(key_seed in any::<[u8; 32]>(), msg in any::<[u8; 32]>()) {
        let ctx = k256();
        let key = ctx.private_key_from_bytes(&valid_scalar(&ctx, &key_seed)).unwrap();
        let public = ctx.public_key(&key).unwrap();
        let digest = Sha256::digest(msg);

        let sig = ecdsa::sign(&ctx, &digest, &key).unwrap();
        prop_assert!(sig.is_low_s(&ctx));
        prop_assert!(ecdsa::verify(&ctx, &digest, &sig, &public));
    }
}
