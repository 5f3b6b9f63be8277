//! Algorithm registry
//!
//! Every supported JWS algorithm is a variant of [`AlgorithmId`]. Each variant maps
//! to a [`Scheme`] that carries only the parameters its family needs (hash size or
//! curve), and [`AlgorithmId::sign`] / [`AlgorithmId::verify`] dispatch on that
//! scheme. The codec and verifier only ever see `AlgorithmId`, so adding a variant
//! stays local to this module.

mod ecdsa;
mod eddsa;
mod hmac;
mod rsa;

use crate::error::{Error, Result};
use crate::keys::{EcdsaCurve, SigningKey, VerifyingKey};
use crate::limits::MAX_ALG_LENGTH;
use crate::utils::bounds::validate_field_size;

use self::rsa::Padding;
use std::fmt;
use std::str::FromStr;

/// Algorithm identifier from JWT header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    /// HMAC with SHA-256
    HS256,

    /// HMAC with SHA-384
    HS384,

    /// HMAC with SHA-512
    HS512,

    /// RSASSA-PKCS1-v1_5 with SHA-256
    RS256,

    /// RSASSA-PKCS1-v1_5 with SHA-384
    RS384,

    /// RSASSA-PKCS1-v1_5 with SHA-512
    RS512,

    /// RSASSA-PSS with SHA-256
    PS256,

    /// RSASSA-PSS with SHA-384
    PS384,

    /// RSASSA-PSS with SHA-512
    PS512,

    /// ECDSA with P-256 and SHA-256
    ES256,

    /// ECDSA with P-384 and SHA-384
    ES384,

    /// ECDSA with P-521 and SHA-512
    ES512,

    /// Ed25519 signatures
    EdDSA,
}

/// SHA-2 output size used by HMAC and RSA schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaSize {
    Sha256,
    Sha384,
    Sha512,
}

impl ShaSize {
    /// Digest length in bytes
    pub fn output_len(&self) -> usize {
        match self {
            ShaSize::Sha256 => 32,
            ShaSize::Sha384 => 48,
            ShaSize::Sha512 => 64,
        }
    }
}

/// Signature scheme behind an algorithm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Hmac(ShaSize),
    RsaPkcs1(ShaSize),
    RsaPss(ShaSize),
    Ecdsa(EcdsaCurve),
    Ed25519,
}

impl AlgorithmId {
    /// Every supported algorithm, in registry order
    pub const ALL: [AlgorithmId; 13] = [
        AlgorithmId::HS256,
        AlgorithmId::HS384,
        AlgorithmId::HS512,
        AlgorithmId::RS256,
        AlgorithmId::RS384,
        AlgorithmId::RS512,
        AlgorithmId::PS256,
        AlgorithmId::PS384,
        AlgorithmId::PS512,
        AlgorithmId::ES256,
        AlgorithmId::ES384,
        AlgorithmId::ES512,
        AlgorithmId::EdDSA,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::HS256 => "HS256",
            AlgorithmId::HS384 => "HS384",
            AlgorithmId::HS512 => "HS512",
            AlgorithmId::RS256 => "RS256",
            AlgorithmId::RS384 => "RS384",
            AlgorithmId::RS512 => "RS512",
            AlgorithmId::PS256 => "PS256",
            AlgorithmId::PS384 => "PS384",
            AlgorithmId::PS512 => "PS512",
            AlgorithmId::ES256 => "ES256",
            AlgorithmId::ES384 => "ES384",
            AlgorithmId::ES512 => "ES512",
            AlgorithmId::EdDSA => "EdDSA",
        }
    }

    /// The scheme and parameters behind this identifier
    pub fn scheme(&self) -> Scheme {
        match self {
            AlgorithmId::HS256 => Scheme::Hmac(ShaSize::Sha256),
            AlgorithmId::HS384 => Scheme::Hmac(ShaSize::Sha384),
            AlgorithmId::HS512 => Scheme::Hmac(ShaSize::Sha512),
            AlgorithmId::RS256 => Scheme::RsaPkcs1(ShaSize::Sha256),
            AlgorithmId::RS384 => Scheme::RsaPkcs1(ShaSize::Sha384),
            AlgorithmId::RS512 => Scheme::RsaPkcs1(ShaSize::Sha512),
            AlgorithmId::PS256 => Scheme::RsaPss(ShaSize::Sha256),
            AlgorithmId::PS384 => Scheme::RsaPss(ShaSize::Sha384),
            AlgorithmId::PS512 => Scheme::RsaPss(ShaSize::Sha512),
            AlgorithmId::ES256 => Scheme::Ecdsa(EcdsaCurve::P256),
            AlgorithmId::ES384 => Scheme::Ecdsa(EcdsaCurve::P384),
            AlgorithmId::ES512 => Scheme::Ecdsa(EcdsaCurve::P521),
            AlgorithmId::EdDSA => Scheme::Ed25519,
        }
    }

    /// Check if algorithm is HMAC-based (symmetric)
    pub fn is_symmetric(&self) -> bool {
        matches!(self.scheme(), Scheme::Hmac(_))
    }

    /// Check if algorithm is asymmetric (RSA/ECDSA/EdDSA)
    pub fn is_asymmetric(&self) -> bool {
        !self.is_symmetric()
    }

    /// Key type this algorithm needs, for error messages
    fn expected_key_type(&self) -> &'static str {
        match self.scheme() {
            Scheme::Hmac(_) => "Symmetric",
            Scheme::RsaPkcs1(_) | Scheme::RsaPss(_) => "RSA",
            Scheme::Ecdsa(curve) => curve.name(),
            Scheme::Ed25519 => "Ed25519",
        }
    }

    fn key_mismatch(&self, found: &str) -> Error {
        Error::KeyMismatch {
            algorithm: self.to_string(),
            expected: self.expected_key_type().to_string(),
            found: found.to_string(),
        }
    }

    /// Check that `key` can sign with this algorithm, without signing anything
    pub fn check_signing_key(&self, key: &SigningKey) -> Result<()> {
        match (self.scheme(), key) {
            (Scheme::Hmac(hash), SigningKey::Symmetric(secret)) => {
                hmac::check_key(*self, hash, secret)
            }
            (Scheme::RsaPkcs1(_) | Scheme::RsaPss(_), SigningKey::Rsa(rsa)) => {
                rsa::check_private_key(*self, rsa)
            }
            (Scheme::Ecdsa(curve), SigningKey::Ecdsa(ec)) => {
                ecdsa::check_private_key(*self, curve, ec)
            }
            (Scheme::Ed25519, SigningKey::Ed25519(_)) => Ok(()),
            (_, key) => Err(self.key_mismatch(key.key_type())),
        }
    }

    /// Check that `key` can verify this algorithm, without verifying anything
    pub fn check_verifying_key(&self, key: &VerifyingKey) -> Result<()> {
        match (self.scheme(), key) {
            (Scheme::Hmac(hash), VerifyingKey::Symmetric(secret)) => {
                hmac::check_key(*self, hash, secret)
            }
            (Scheme::RsaPkcs1(_) | Scheme::RsaPss(_), VerifyingKey::Rsa(rsa)) => {
                rsa::check_public_key(*self, rsa)
            }
            (Scheme::Ecdsa(curve), VerifyingKey::Ecdsa(ec)) => {
                ecdsa::check_public_key(*self, curve, ec)
            }
            (Scheme::Ed25519, VerifyingKey::Ed25519(_)) => Ok(()),
            (_, key) => Err(self.key_mismatch(key.key_type())),
        }
    }

    /// Sign `message` (the encoded `header.payload`) and return the raw signature
    ///
    /// # Errors
    ///
    /// - `Error::KeyMismatch` if the key family, curve or size does not fit
    /// - `Error::SigningFailed` if the backend fails to produce a signature
    pub fn sign(&self, key: &SigningKey, message: &[u8]) -> Result<Vec<u8>> {
        match (self.scheme(), key) {
            (Scheme::Hmac(hash), SigningKey::Symmetric(secret)) => {
                hmac::sign(*self, hash, secret, message)
            }
            (Scheme::RsaPkcs1(hash), SigningKey::Rsa(rsa)) => {
                rsa::sign(*self, Padding::Pkcs1, hash, rsa, message)
            }
            (Scheme::RsaPss(hash), SigningKey::Rsa(rsa)) => {
                rsa::sign(*self, Padding::Pss, hash, rsa, message)
            }
            (Scheme::Ecdsa(curve), SigningKey::Ecdsa(ec)) => ecdsa::sign(*self, curve, ec, message),
            (Scheme::Ed25519, SigningKey::Ed25519(ed)) => Ok(eddsa::sign(ed, message)),
            (_, key) => Err(self.key_mismatch(key.key_type())),
        }
    }

    /// Verify a raw `signature` over `message`
    ///
    /// # Errors
    ///
    /// - `Error::KeyMismatch` if the key family, curve or size does not fit
    /// - `Error::SignatureInvalid` for any signature mismatch
    pub fn verify(&self, key: &VerifyingKey, message: &[u8], signature: &[u8]) -> Result<()> {
        match (self.scheme(), key) {
            (Scheme::Hmac(hash), VerifyingKey::Symmetric(secret)) => {
                hmac::verify(*self, hash, secret, message, signature)
            }
            (Scheme::RsaPkcs1(hash), VerifyingKey::Rsa(rsa)) => {
                rsa::verify(*self, Padding::Pkcs1, hash, rsa, message, signature)
            }
            (Scheme::RsaPss(hash), VerifyingKey::Rsa(rsa)) => {
                rsa::verify(*self, Padding::Pss, hash, rsa, message, signature)
            }
            (Scheme::Ecdsa(curve), VerifyingKey::Ecdsa(ec)) => {
                ecdsa::verify(*self, curve, ec, message, signature)
            }
            (Scheme::Ed25519, VerifyingKey::Ed25519(ed)) => eddsa::verify(ed, message, signature),
            (_, key) => Err(self.key_mismatch(key.key_type())),
        }
    }
}

impl FromStr for AlgorithmId {
    type Err = Error;

    /// Parse algorithm string from JWT header
    fn from_str(s: &str) -> Result<Self> {
        validate_field_size("alg", s, MAX_ALG_LENGTH)?;

        if s.eq_ignore_ascii_case("none") {
            return Err(Error::AlgorithmNoneRejected);
        }

        AlgorithmId::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| Error::AlgorithmUnsupported(s.to_string()))
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for allowed algorithms
#[derive(Debug, Clone)]
pub struct AlgorithmPolicy {
    allowed: Vec<AlgorithmId>,
}

impl AlgorithmPolicy {
    /// Create a policy that allows only specific algorithms
    pub fn allow_only(algorithms: Vec<AlgorithmId>) -> Self {
        Self {
            allowed: algorithms,
        }
    }

    /// Create a policy that allows every supported algorithm
    ///
    /// The verifying key still has to fit the algorithm, so this only widens the
    /// set within the key's family.
    pub fn allow_all() -> Self {
        Self::allow_only(AlgorithmId::ALL.to_vec())
    }

    /// Policy that allows exactly one algorithm
    pub fn only(algorithm: AlgorithmId) -> Self {
        Self::allow_only(vec![algorithm])
    }

    /// Policy that allows any HMAC algorithm (HS256, HS384, HS512)
    ///
    /// # Security Warning
    ///
    /// Using multiple HMAC variants with the same key is not recommended.
    /// Prefer [`only()`](Self::only) with a single variant.
    pub fn hmac_any() -> Self {
        Self::allow_only(vec![
            AlgorithmId::HS256,
            AlgorithmId::HS384,
            AlgorithmId::HS512,
        ])
    }

    /// Policy that allows any RSA PKCS#1 v1.5 algorithm (RS256, RS384, RS512)
    pub fn rsa_any() -> Self {
        Self::allow_only(vec![
            AlgorithmId::RS256,
            AlgorithmId::RS384,
            AlgorithmId::RS512,
        ])
    }

    /// Policy that allows any RSA-PSS algorithm (PS256, PS384, PS512)
    pub fn rsa_pss_any() -> Self {
        Self::allow_only(vec![
            AlgorithmId::PS256,
            AlgorithmId::PS384,
            AlgorithmId::PS512,
        ])
    }

    /// Policy that allows any ECDSA algorithm (ES256, ES384, ES512)
    pub fn ecdsa_any() -> Self {
        Self::allow_only(vec![
            AlgorithmId::ES256,
            AlgorithmId::ES384,
            AlgorithmId::ES512,
        ])
    }

    /// Policy that allows recommended asymmetric algorithms (RS256, ES256, EdDSA)
    pub fn recommended_asymmetric() -> Self {
        Self::allow_only(vec![
            AlgorithmId::RS256,
            AlgorithmId::ES256,
            AlgorithmId::EdDSA,
        ])
    }

    /// Check if an algorithm is allowed
    pub fn is_allowed(&self, algorithm: &AlgorithmId) -> bool {
        self.allowed.contains(algorithm)
    }

    /// Validate algorithm against policy
    pub fn validate(&self, algorithm: &AlgorithmId) -> Result<()> {
        if self.is_allowed(algorithm) {
            Ok(())
        } else {
            Err(Error::AlgorithmNotAllowed {
                found: algorithm.to_string(),
                allowed: self.allowed.iter().map(|a| a.to_string()).collect(),
            })
        }
    }

    /// Get list of allowed algorithms
    pub fn allowed_algorithms(&self) -> &[AlgorithmId] {
        &self.allowed
    }
}

impl Default for AlgorithmPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_from_str() {
        assert!(matches!(
            "none".parse::<AlgorithmId>(),
            Err(Error::AlgorithmNoneRejected)
        ));
        assert!(matches!(
            "NoNe".parse::<AlgorithmId>(),
            Err(Error::AlgorithmNoneRejected)
        ));
        assert!(matches!(
            "UNKNOWN".parse::<AlgorithmId>(),
            Err(Error::AlgorithmUnsupported(_))
        ));
        assert!(matches!(
            "hs256".parse::<AlgorithmId>(),
            Err(Error::AlgorithmUnsupported(_))
        ));
        assert!(matches!(
            "HS256-with-a-very-long-suffix".parse::<AlgorithmId>(),
            Err(Error::HeaderFieldTooLong { .. })
        ));

        for alg in AlgorithmId::ALL {
            assert_eq!(alg.as_str().parse::<AlgorithmId>().unwrap(), alg);
        }
    }

    #[test]
    fn test_schemes() {
        assert_eq!(AlgorithmId::HS384.scheme(), Scheme::Hmac(ShaSize::Sha384));
        assert_eq!(AlgorithmId::PS512.scheme(), Scheme::RsaPss(ShaSize::Sha512));
        assert_eq!(AlgorithmId::ES512.scheme(), Scheme::Ecdsa(EcdsaCurve::P521));
        assert_eq!(AlgorithmId::EdDSA.scheme(), Scheme::Ed25519);

        assert!(AlgorithmId::HS256.is_symmetric());
        assert!(AlgorithmId::EdDSA.is_asymmetric());
    }

    #[test]
    fn test_key_family_mismatch() {
        let secret = SigningKey::symmetric(vec![0u8; 64]);
        let result = AlgorithmId::RS256.sign(&secret, b"message");
        match result {
            Err(Error::KeyMismatch {
                algorithm,
                expected,
                found,
            }) => {
                assert_eq!(algorithm, "RS256");
                assert_eq!(expected, "RSA");
                assert_eq!(found, "Symmetric");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let public = VerifyingKey::ecdsa_public(EcdsaCurve::P256, vec![4; 65]);
        assert!(matches!(
            AlgorithmId::HS256.verify(&public, b"message", &[0; 32]),
            Err(Error::KeyMismatch { .. })
        ));
        assert!(matches!(
            AlgorithmId::EdDSA.check_verifying_key(&public),
            Err(Error::KeyMismatch { .. })
        ));
    }

    #[test]
    fn test_hmac_dispatch() {
        let key = SigningKey::symmetric(vec![7u8; 32]);
        let signature = AlgorithmId::HS256.sign(&key, b"message").unwrap();
        assert!(AlgorithmId::HS256
            .verify(&key.verifying_key(), b"message", &signature)
            .is_ok());
        assert!(matches!(
            AlgorithmId::HS256.verify(&key.verifying_key(), b"other", &signature),
            Err(Error::SignatureInvalid)
        ));
    }

    #[test]
    fn test_algorithm_policy() {
        let policy = AlgorithmPolicy::only(AlgorithmId::HS256);
        assert!(policy.is_allowed(&AlgorithmId::HS256));
        assert!(!policy.is_allowed(&AlgorithmId::HS384));
        assert!(policy.validate(&AlgorithmId::HS256).is_ok());
        assert!(matches!(
            policy.validate(&AlgorithmId::HS384),
            Err(Error::AlgorithmNotAllowed { .. })
        ));

        let policy_all = AlgorithmPolicy::allow_all();
        assert_eq!(policy_all.allowed_algorithms().len(), 13);
        assert!(AlgorithmPolicy::rsa_pss_any().is_allowed(&AlgorithmId::PS384));
        assert!(!AlgorithmPolicy::ecdsa_any().is_allowed(&AlgorithmId::EdDSA));
    }
}
