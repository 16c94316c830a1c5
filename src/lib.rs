#![no_std]
#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

//! # Usage
//!
//! ```
//! use ecsig::{ecdsa, CurveContext, NamedCurve};
//! use rand_core::OsRng;
//! use sha2::{Digest, Sha256};
//!
//! # fn main() -> Result<(), ecsig::Error> {
//! let ctx = CurveContext::new(NamedCurve::Secp256k1);
//!
//! let private_key = ctx.generate_private_key(&mut OsRng);
//! let public_key = ctx.public_key(&private_key)?;
//!
//! let digest = Sha256::digest(b"message");
//! let signature = ecdsa::sign(&ctx, &digest, &private_key)?;
//!
//! assert!(signature.is_low_s(&ctx));
//! assert!(ecdsa::verify(&ctx, &digest, &signature, &public_key));
//! # Ok(())
//! # }
//! ```
//!
//! Schnorr signing and batch verification follow the same shape over
//! 32-byte messages:
//!
//! ```
//! use ecsig::{schnorr, CurveContext, NamedCurve};
//! use rand_core::OsRng;
//!
//! # fn main() -> Result<(), ecsig::Error> {
//! let ctx = CurveContext::new(NamedCurve::Secp256k1);
//! let private_key = ctx.generate_private_key(&mut OsRng);
//! let public_key = ctx.public_key(&private_key)?;
//!
//! let msg = [0xabu8; 32];
//! let signature = schnorr::sign(&ctx, &msg, &private_key)?;
//!
//! assert!(schnorr::verify(&ctx, &msg, &signature, &public_key)?);
//! assert!(schnorr::verify_batch(
//!     &ctx,
//!     &[(&msg, &signature, &public_key)],
//!     &mut OsRng,
//! )?);
//! # Ok(())
//! # }
//! ```

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod arithmetic;
mod asn1;
mod curve;
mod error;
mod key;

pub mod ecdsa;
pub mod schnorr;

pub use crate::{
    curve::{CurveContext, NamedCurve, SignatureCurve},
    error::{Error, Result},
    key::{PrivateKey, PublicKey},
};

pub use crypto_bigint::U576;
pub use elliptic_curve;
pub use rand_core;
pub use sha2;
