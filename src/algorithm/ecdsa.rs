use crate::algorithm::AlgorithmId;
use crate::error::{Error, Result};
use crate::keys::{EcdsaCurve, EcdsaPrivateKey, EcdsaPublicKey};

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{self, UnparsedPublicKey, VerificationAlgorithm};

/// JWS signatures use the fixed-width `R || S` encoding (RFC 7518 Section 3.4)
fn parameters(curve: EcdsaCurve) -> &'static dyn VerificationAlgorithm {
    match curve {
        EcdsaCurve::P256 => &signature::ECDSA_P256_SHA256_FIXED,
        EcdsaCurve::P384 => &signature::ECDSA_P384_SHA384_FIXED,
        EcdsaCurve::P521 => &signature::ECDSA_P521_SHA512_FIXED,
    }
}

fn check_curve(algorithm: AlgorithmId, expected: EcdsaCurve, found: EcdsaCurve) -> Result<()> {
    if expected != found {
        return Err(Error::KeyMismatch {
            algorithm: algorithm.to_string(),
            expected: expected.name().to_string(),
            found: found.name().to_string(),
        });
    }
    Ok(())
}

pub(crate) fn check_private_key(
    algorithm: AlgorithmId,
    curve: EcdsaCurve,
    key: &EcdsaPrivateKey,
) -> Result<()> {
    check_curve(algorithm, curve, key.curve())
}

pub(crate) fn check_public_key(
    algorithm: AlgorithmId,
    curve: EcdsaCurve,
    key: &EcdsaPublicKey,
) -> Result<()> {
    check_curve(algorithm, curve, key.curve())
}

pub(crate) fn sign(
    algorithm: AlgorithmId,
    curve: EcdsaCurve,
    key: &EcdsaPrivateKey,
    message: &[u8],
) -> Result<Vec<u8>> {
    check_private_key(algorithm, curve, key)?;

    let signature = key
        .keypair()
        .sign(&SystemRandom::new(), message)
        .map_err(|_| Error::SigningFailed(algorithm.to_string()))?;

    Ok(signature.as_ref().to_vec())
}

pub(crate) fn verify(
    algorithm: AlgorithmId,
    curve: EcdsaCurve,
    key: &EcdsaPublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    check_public_key(algorithm, curve, key)?;

    UnparsedPublicKey::new(parameters(curve), key.as_bytes())
        .verify(message, signature)
        .map_err(|_| Error::SignatureInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lc_rs::signature::EcdsaKeyPair;

    fn generate(curve: EcdsaCurve) -> EcdsaPrivateKey {
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(curve.signing_algorithm(), &SystemRandom::new())
            .expect("Failed to generate key");
        EcdsaPrivateKey::from_pkcs8(curve, pkcs8.as_ref()).expect("Failed to load key")
    }

    #[test]
    fn test_ecdsa_round_trips_fixed_width() {
        for (algorithm, curve, width) in [
            (AlgorithmId::ES256, EcdsaCurve::P256, 64),
            (AlgorithmId::ES384, EcdsaCurve::P384, 96),
            (AlgorithmId::ES512, EcdsaCurve::P521, 132),
        ] {
            let key = generate(curve);
            let signature = sign(algorithm, curve, &key, b"header.payload").unwrap();
            assert_eq!(signature.len(), width, "{algorithm}");

            verify(algorithm, curve, &key.public_key(), b"header.payload", &signature)
                .unwrap_or_else(|e| panic!("{algorithm}: {e}"));
        }
    }

    #[test]
    fn test_ecdsa_curve_mismatch() {
        let key = generate(EcdsaCurve::P256);

        let result = sign(AlgorithmId::ES384, EcdsaCurve::P384, &key, b"message");
        assert!(matches!(result, Err(Error::KeyMismatch { .. })));

        let result = verify(AlgorithmId::ES384, EcdsaCurve::P384, &key.public_key(), b"message", &[0; 96]);
        assert!(matches!(result, Err(Error::KeyMismatch { .. })));
    }

    #[test]
    fn test_ecdsa_tampered_signature() {
        let key = generate(EcdsaCurve::P256);
        let mut signature = sign(AlgorithmId::ES256, EcdsaCurve::P256, &key, b"message").unwrap();
        signature[10] ^= 0x01;

        let result = verify(AlgorithmId::ES256, EcdsaCurve::P256, &key.public_key(), b"message", &signature);
        assert!(matches!(result, Err(Error::SignatureInvalid)));
    }
}
