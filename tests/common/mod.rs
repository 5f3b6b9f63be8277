//! Shared key material and token helpers for integration tests

#![allow(dead_code)]

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{
    EcdsaKeyPair, Ed25519KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING,
    ECDSA_P384_SHA384_FIXED_SIGNING, ECDSA_P521_SHA512_FIXED_SIGNING,
};
use jwtseal::*;
use std::sync::OnceLock;

pub const NOW: i64 = 1_700_000_000;

pub const HS256_SECRET: &[u8] = b"hs256-secret-that-is-32-bytes-!!";

/// 2048-bit RSA key, generated once per test binary
pub fn rsa_key() -> &'static SigningKey {
    static KEY: OnceLock<SigningKey> = OnceLock::new();
    KEY.get_or_init(|| {
        use rsa::pkcs8::EncodePrivateKey;

        let private = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 2048)
            .expect("Failed to generate key");
        let pkcs8 = private.to_pkcs8_der().expect("Failed to serialize to PKCS#8");
        SigningKey::rsa_pkcs8(pkcs8.as_bytes()).expect("Failed to load key")
    })
}

pub fn ecdsa_key(curve: EcdsaCurve) -> SigningKey {
    let algorithm = match curve {
        EcdsaCurve::P256 => &ECDSA_P256_SHA256_FIXED_SIGNING,
        EcdsaCurve::P384 => &ECDSA_P384_SHA384_FIXED_SIGNING,
        EcdsaCurve::P521 => &ECDSA_P521_SHA512_FIXED_SIGNING,
    };
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(algorithm, &SystemRandom::new())
        .expect("Failed to generate key");
    SigningKey::ecdsa_pkcs8(curve, pkcs8.as_ref()).expect("Failed to load key")
}

pub fn ed25519_key() -> SigningKey {
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&SystemRandom::new()).expect("Failed to generate key");
    SigningKey::ed25519_pkcs8(pkcs8.as_ref()).expect("Failed to load key")
}

/// A signing key that fits `algorithm`
pub fn key_for(algorithm: AlgorithmId) -> SigningKey {
    match algorithm.scheme() {
        Scheme::Hmac(_) => SigningKey::symmetric(vec![0x5a; 64]),
        Scheme::RsaPkcs1(_) | Scheme::RsaPss(_) => rsa_key().clone(),
        Scheme::Ecdsa(curve) => ecdsa_key(curve),
        Scheme::Ed25519 => ed25519_key(),
    }
}

pub fn hs256_signer(clock: &ManualClock) -> Signer {
    Signer::new(AlgorithmId::HS256, SigningKey::symmetric(HS256_SECRET))
        .expect("HS256 key")
        .with_clock(clock.clone())
}

pub fn hs256_verifier(clock: &ManualClock) -> Verifier {
    Verifier::new(VerifyingKey::symmetric(HS256_SECRET))
        .algorithms(AlgorithmPolicy::only(AlgorithmId::HS256))
        .validation(ValidationConfig::default().clock(clock.clone()))
}

pub fn claims(standard: StandardClaims) -> ClaimsSet {
    ClaimsSet::new().merge(standard).expect("standard claims merge")
}

/// Assemble a token from raw header and payload JSON, HMAC-SHA256 signed
pub fn raw_hs256_token(header: &str, payload: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let signing_input = format!(
        "{}.{}",
        utils::encode_bytes(header),
        utils::encode_bytes(payload)
    );

    let mut mac = Hmac::<Sha256>::new_from_slice(HS256_SECRET).unwrap();
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();

    format!("{}.{}", signing_input, utils::encode_bytes(signature))
}
