//! Signature engine benchmarks.

use criterion::{criterion_group, criterion_main, Criterion};
use ecsig::{ecdsa, schnorr, CurveContext, NamedCurve};
use rand_core::OsRng;
use sha2::{Digest, Sha256};

fn bench_ecdsa(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecdsa");

    for id in [NamedCurve::P256, NamedCurve::Secp256k1] {
        let ctx = CurveContext::new(id);
        let key = ctx.generate_private_key(&mut OsRng);
        let public = ctx.public_key(&key).unwrap();
        let digest = Sha256::digest(b"benchmark message");
        let sig = ecdsa::sign(&ctx, &digest, &key).unwrap();
        let recoverable = ecdsa::sign_recoverable(&ctx, &digest, &key).unwrap();
        let recovery_id = recoverable.recovery_id().unwrap();

        group.bench_function(format!("sign/{id}"), |b| {
            b.iter(|| ecdsa::sign(&ctx, &digest, &key).unwrap())
        });
        group.bench_function(format!("verify/{id}"), |b| {
            b.iter(|| assert!(ecdsa::verify(&ctx, &digest, &sig, &public)))
        });
        group.bench_function(format!("recover/{id}"), |b| {
            b.iter(|| ecdsa::recover(&ctx, &digest, &recoverable, recovery_id).unwrap())
        });
    }

    group.finish();
}

fn bench_schnorr(c: &mut Criterion) {
    let mut group = c.benchmark_group("schnorr");
    let ctx = CurveContext::new(NamedCurve::Secp256k1);

    let key = ctx.generate_private_key(&mut OsRng);
    let public = ctx.public_key(&key).unwrap();
    let msg = [0x42u8; 32];
    let sig = schnorr::sign(&ctx, &msg, &key).unwrap();

    group.bench_function("sign", |b| {
        b.iter(|| schnorr::sign(&ctx, &msg, &key).unwrap())
    });
    group.bench_function("verify", |b| {
        b.iter(|| assert!(schnorr::verify(&ctx, &msg, &sig, &public).unwrap()))
    });

    let mut msgs = Vec::new();
    let mut sigs = Vec::new();
    let mut pubs = Vec::new();
    for i in 0..4u8 {
        let key = ctx.generate_private_key(&mut OsRng);
        let msg: [u8; 32] = Sha256::digest([i]).into();
        sigs.push(schnorr::sign(&ctx, &msg, &key).unwrap());
        pubs.push(ctx.public_key(&key).unwrap());
        msgs.push(msg);
    }
    let items: Vec<_> = (0..4).map(|i| (&msgs[i], &sigs[i], &pubs[i])).collect();

    group.bench_function("verify_batch/4", |b| {
        b.iter(|| assert!(schnorr::verify_batch(&ctx, &items, &mut OsRng).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_ecdsa, bench_schnorr);
criterion_main!(benches);
