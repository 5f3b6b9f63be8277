use crate::algorithm::{AlgorithmId, ShaSize};
use crate::error::{Error, Result};
use crate::keys::{RsaPrivateKey, RsaPublicKey};
use crate::limits::MIN_RSA_MODULUS_BITS;
use crate::utils::der;

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{self, RsaEncoding, UnparsedPublicKey, VerificationAlgorithm};

/// RSA signature padding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Padding {
    /// PKCS#1 v1.5 (RS*)
    Pkcs1,
    /// PSS with MGF1 and salt length equal to the hash output (PS*)
    Pss,
}

fn encoding(padding: Padding, hash: ShaSize) -> &'static dyn RsaEncoding {
    match (padding, hash) {
        (Padding::Pkcs1, ShaSize::Sha256) => &signature::RSA_PKCS1_SHA256,
        (Padding::Pkcs1, ShaSize::Sha384) => &signature::RSA_PKCS1_SHA384,
        (Padding::Pkcs1, ShaSize::Sha512) => &signature::RSA_PKCS1_SHA512,
        (Padding::Pss, ShaSize::Sha256) => &signature::RSA_PSS_SHA256,
        (Padding::Pss, ShaSize::Sha384) => &signature::RSA_PSS_SHA384,
        (Padding::Pss, ShaSize::Sha512) => &signature::RSA_PSS_SHA512,
    }
}

fn parameters(padding: Padding, hash: ShaSize) -> &'static dyn VerificationAlgorithm {
    match (padding, hash) {
        (Padding::Pkcs1, ShaSize::Sha256) => &signature::RSA_PKCS1_2048_8192_SHA256,
        (Padding::Pkcs1, ShaSize::Sha384) => &signature::RSA_PKCS1_2048_8192_SHA384,
        (Padding::Pkcs1, ShaSize::Sha512) => &signature::RSA_PKCS1_2048_8192_SHA512,
        (Padding::Pss, ShaSize::Sha256) => &signature::RSA_PSS_2048_8192_SHA256,
        (Padding::Pss, ShaSize::Sha384) => &signature::RSA_PSS_2048_8192_SHA384,
        (Padding::Pss, ShaSize::Sha512) => &signature::RSA_PSS_2048_8192_SHA512,
    }
}

fn check_modulus(algorithm: AlgorithmId, bits: usize) -> Result<()> {
    if bits < MIN_RSA_MODULUS_BITS {
        return Err(Error::KeyMismatch {
            algorithm: algorithm.to_string(),
            expected: format!("RSA key of at least {MIN_RSA_MODULUS_BITS} bits"),
            found: format!("{bits} bit RSA key"),
        });
    }
    Ok(())
}

pub(crate) fn check_private_key(algorithm: AlgorithmId, key: &RsaPrivateKey) -> Result<()> {
    check_modulus(algorithm, key.modulus_bits())
}

/// Public keys whose size cannot be read are left for the backend to reject
pub(crate) fn check_public_key(algorithm: AlgorithmId, key: &RsaPublicKey) -> Result<()> {
    match der::rsa_modulus_bits(key.as_der()) {
        Some(bits) => check_modulus(algorithm, bits),
        None => Ok(()),
    }
}

pub(crate) fn sign(
    algorithm: AlgorithmId,
    padding: Padding,
    hash: ShaSize,
    key: &RsaPrivateKey,
    message: &[u8],
) -> Result<Vec<u8>> {
    check_private_key(algorithm, key)?;

    let keypair = key.keypair();
    let mut signature = vec![0u8; keypair.public_modulus_len()];
    keypair
        .sign(encoding(padding, hash), &SystemRandom::new(), message, &mut signature)
        .map_err(|_| Error::SigningFailed(algorithm.to_string()))?;

    Ok(signature)
}

pub(crate) fn verify(
    algorithm: AlgorithmId,
    padding: Padding,
    hash: ShaSize,
    key: &RsaPublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    check_public_key(algorithm, key)?;

    UnparsedPublicKey::new(parameters(padding, hash), key.as_der())
        .verify(message, signature)
        .map_err(|_| Error::SignatureInvalid)
}
