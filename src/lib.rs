//! # jwtseal - Sign, Verify and Revoke JSON Web Tokens
//!
//! > Compact JWS tokens with an explicit algorithm policy and a revocation cache.
//!
//! **jwtseal** issues and verifies compact JSON Web Tokens
//! (`base64url(header).base64url(payload).base64url(signature)`) and keeps a
//! concurrent blocklist of revoked tokens.
//!
//! ## Quick Start
//!
//! ```ignore
//! use jwtseal::*;
//! use std::time::Duration;
//!
//! let key = SigningKey::symmetric(secret);
//! let signer = Signer::new(AlgorithmId::HS256, key.clone())?;
//!
//! let token = signer.sign(
//!     &ClaimsSet::new()
//!         .merge(StandardClaims::new().subject("user-42"))?
//!         .max_age(Duration::from_secs(900)),
//! )?;
//!
//! let verifier = Verifier::new(key.verifying_key())
//!     .algorithms(AlgorithmPolicy::only(AlgorithmId::HS256));
//!
//! let verified = verifier.verify(&token)?;
//! println!("Subject: {:?}", verified.claims().subject);
//! ```
//!
//! ## Verification Flow
//!
//! ```text
//! ParseHeader        split, base64url-decode, parse header JSON
//!     │
//! SelectAlgorithm    alg -> AlgorithmId, policy, key fit
//!     │
//! VerifySignature    over the literal "header.payload" text
//!     │
//! CheckRevocation    blocklist lookup (optional)
//!     │
//! ValidateTimeClaims exp / nbf with leeway
//!     ▼
//! VerifiedToken
//! ```
//!
//! The first failing stage decides the single returned error. Only
//! [`Verifier::verify`] produces a [`VerifiedToken`].
//!
//! ## Algorithm Support
//!
//! - **HMAC**: HS256, HS384, HS512
//! - **RSA PKCS#1 v1.5**: RS256, RS384, RS512 (modulus of at least 2048 bits)
//! - **RSA-PSS**: PS256, PS384, PS512
//! - **ECDSA**: ES256 (P-256), ES384 (P-384), ES512 (P-521)
//! - **EdDSA**: Ed25519
//!
//! `"none"` is never accepted, in any letter case.
//!
//! ## Decoding Claims
//!
//! ```ignore
//! #[derive(Debug, Default, ClaimsRecord)]
//! struct Session {
//!     #[claim(required)]
//!     user: String,
//!     scopes: Vec<String>,
//! }
//!
//! let session: Session = verified.decode(DecodeMode::Strict)?;
//! let extra: CustomClaims = verified.decode(DecodeMode::Lenient)?;
//! ```
//!
//! ## Revocation
//!
//! ```ignore
//! let blocklist = Blocklist::new();
//! let sweeper = blocklist.spawn_sweeper();
//! let verifier = Verifier::new(key).blocklist(&blocklist);
//!
//! blocklist.invalidate_token(&verified)?;
//! // verifier.verify(&token) now fails with Error::TokenBlocked
//!
//! sweeper.shutdown().await;
//! ```
//!
//! ## Logging
//!
//! Events are emitted through [`tracing`] under the `jwtseal.verifier`,
//! `jwtseal.signer` and `jwtseal.blocklist` targets. Rejections are logged at
//! `debug` with the failing stage; key material and token text never are.
//!
//! ## References
//!
//! - [RFC 7515](https://datatracker.ietf.org/doc/html/rfc7515) JSON Web Signature (JWS)
//! - [RFC 7519](https://datatracker.ietf.org/doc/html/rfc7519) JSON Web Token (JWT)
//! - [RFC 8725](https://datatracker.ietf.org/doc/html/rfc8725) JSON Web Token Best Current Practices

// Lets `#[derive(ClaimsRecord)]` expand to `::jwtseal::` paths inside this crate
extern crate self as jwtseal;

// Core modules
pub mod error;
pub(crate) mod limits;
pub mod time;
pub mod utils;

// Algorithms and keys
pub mod algorithm;
pub mod keys;

// Claims
pub mod claims;

// Tokens
pub mod token;

// Issuance, verification and revocation
pub mod blocklist;
pub mod signer;
pub mod verifier;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use algorithm::{AlgorithmId, AlgorithmPolicy, Scheme, ShaSize};
pub use keys::{
    EcdsaCurve, EcdsaPrivateKey, EcdsaPublicKey, Ed25519PrivateKey, Ed25519PublicKey,
    RsaPrivateKey, RsaPublicKey, SecretKey, SigningKey, VerifyingKey,
};

pub use claims::{
    Audience, ClaimsRecord, ClaimsSet, ClaimsSource, CustomClaims, DecodeClaims, DecodeMode,
    Field, FromClaimValue, Record, StandardClaims, ValidationConfig,
};
pub use jwtseal_derive::ClaimsRecord;

pub use token::{peek_header, TokenHeader, TokenId, VerifiedToken};

pub use blocklist::{Blocklist, BlocklistConfig, SweeperHandle};
pub use signer::{sign, Signer};
pub use verifier::{Revocation, Stage, Verifier};

pub use error::{Error, Result};
pub use limits::MAX_LEEWAY_SECONDS;
pub use time::{Clock, ManualClock, SystemClock};

pub use miniserde::json::{Object, Value};
