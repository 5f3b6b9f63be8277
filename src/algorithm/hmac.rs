use crate::algorithm::{AlgorithmId, ShaSize};
use crate::error::{Error, Result};
use crate::keys::SecretKey;

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

/// A secret must be at least as long as the hash output (RFC 7518 Section 3.2)
pub(crate) fn check_key(algorithm: AlgorithmId, hash: ShaSize, secret: &SecretKey) -> Result<()> {
    let min = hash.output_len();
    if secret.len() < min {
        return Err(Error::KeyMismatch {
            algorithm: algorithm.to_string(),
            expected: format!("secret of at least {min} bytes"),
            found: format!("{} byte secret", secret.len()),
        });
    }
    Ok(())
}

pub(crate) fn sign(
    algorithm: AlgorithmId,
    hash: ShaSize,
    secret: &SecretKey,
    message: &[u8],
) -> Result<Vec<u8>> {
    check_key(algorithm, hash, secret)?;
    compute(algorithm, hash, secret.as_bytes(), message)
}

/// Verify an HMAC signature with constant-time comparison
pub(crate) fn verify(
    algorithm: AlgorithmId,
    hash: ShaSize,
    secret: &SecretKey,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    check_key(algorithm, hash, secret)?;
    let expected = compute(algorithm, hash, secret.as_bytes(), message)?;

    if signature.len() != expected.len() {
        return Err(Error::SignatureInvalid);
    }

    if constant_time_eq(signature, &expected) {
        Ok(())
    } else {
        Err(Error::SignatureInvalid)
    }
}

macro_rules! hmac_digest {
    ($digest:ty, $algorithm:expr, $secret:expr, $message:expr) => {{
        let mut mac = Hmac::<$digest>::new_from_slice($secret)
            .map_err(|_| Error::SigningFailed($algorithm.to_string()))?;
        mac.update($message);
        mac.finalize().into_bytes().to_vec()
    }};
}

fn compute(algorithm: AlgorithmId, hash: ShaSize, secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let tag = match hash {
        ShaSize::Sha256 => hmac_digest!(Sha256, algorithm, secret, message),
        ShaSize::Sha384 => hmac_digest!(Sha384, algorithm, secret, message),
        ShaSize::Sha512 => hmac_digest!(Sha512, algorithm, secret, message),
    };
    Ok(tag)
}
