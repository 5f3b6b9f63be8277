//! Key types for JWT signing and verification
//!
//! Signing and verifying keys are separate enums so that a public key can never
//! be handed to a signer. Each variant wraps one algorithm family:
//! - Symmetric secrets (HMAC)
//! - RSA key pairs / public keys (PKCS#1 v1.5 and PSS)
//! - ECDSA key pairs / public keys (P-256, P-384, P-521)
//! - Ed25519 key pairs / public keys (EdDSA)
//!
//! Parsing PEM files or reading keys from disk is left to the caller; the
//! constructors here accept DER bytes.
use crate::error::{Error, Result};

use aws_lc_rs::signature::{
    EcdsaKeyPair, EcdsaSigningAlgorithm, Ed25519KeyPair, KeyPair, RsaKeyPair,
    ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED_SIGNING,
    ECDSA_P521_SHA512_FIXED_SIGNING,
};
use std::fmt;
use std::sync::Arc;

/// A key that can produce signatures
#[derive(Debug, Clone)]
pub enum SigningKey {
    /// Shared secret for HMAC algorithms
    Symmetric(SecretKey),

    /// RSA private key for RS* and PS* algorithms
    Rsa(RsaPrivateKey),

    /// ECDSA private key for ES* algorithms
    Ecdsa(EcdsaPrivateKey),

    /// Ed25519 private key for EdDSA
    Ed25519(Ed25519PrivateKey),
}

impl SigningKey {
    /// Create a symmetric key from bytes
    pub fn symmetric(secret: impl Into<Vec<u8>>) -> Self {
        SigningKey::Symmetric(SecretKey::new(secret.into()))
    }

    /// Load an RSA private key from PKCS#8 DER
    pub fn rsa_pkcs8(der: &[u8]) -> Result<Self> {
        RsaPrivateKey::from_pkcs8(der).map(SigningKey::Rsa)
    }

    /// Load an ECDSA private key for `curve` from PKCS#8 DER
    pub fn ecdsa_pkcs8(curve: EcdsaCurve, der: &[u8]) -> Result<Self> {
        EcdsaPrivateKey::from_pkcs8(curve, der).map(SigningKey::Ecdsa)
    }

    /// Load an Ed25519 private key from PKCS#8 DER (v1 or v2)
    pub fn ed25519_pkcs8(der: &[u8]) -> Result<Self> {
        Ed25519PrivateKey::from_pkcs8(der).map(SigningKey::Ed25519)
    }

    /// Get key type name for error messages
    pub fn key_type(&self) -> &'static str {
        match self {
            SigningKey::Symmetric(_) => "Symmetric",
            SigningKey::Rsa(_) => "RSA",
            SigningKey::Ecdsa(key) => key.curve().name(),
            SigningKey::Ed25519(_) => "Ed25519",
        }
    }

    /// Derive the matching verifying key
    pub fn verifying_key(&self) -> VerifyingKey {
        match self {
            SigningKey::Symmetric(secret) => VerifyingKey::Symmetric(secret.clone()),
            SigningKey::Rsa(key) => VerifyingKey::Rsa(key.public_key()),
            SigningKey::Ecdsa(key) => VerifyingKey::Ecdsa(key.public_key()),
            SigningKey::Ed25519(key) => VerifyingKey::Ed25519(key.public_key()),
        }
    }
}

/// A key that can check signatures
#[derive(Debug, Clone)]
pub enum VerifyingKey {
    /// Shared secret for HMAC algorithms
    Symmetric(SecretKey),

    /// RSA public key for RS* and PS* algorithms
    Rsa(RsaPublicKey),

    /// ECDSA public key for ES* algorithms
    Ecdsa(EcdsaPublicKey),

    /// Ed25519 public key for EdDSA
    Ed25519(Ed25519PublicKey),
}

impl VerifyingKey {
    /// Create a symmetric key from bytes
    pub fn symmetric(secret: impl Into<Vec<u8>>) -> Self {
        VerifyingKey::Symmetric(SecretKey::new(secret.into()))
    }

    /// Create an RSA public key from DER (PKCS#1 `RSAPublicKey` or SubjectPublicKeyInfo)
    pub fn rsa_public(der: impl Into<Vec<u8>>) -> Self {
        VerifyingKey::Rsa(RsaPublicKey::new(der.into()))
    }

    /// Create an ECDSA public key from an uncompressed SEC1 point
    pub fn ecdsa_public(curve: EcdsaCurve, point: impl Into<Vec<u8>>) -> Self {
        VerifyingKey::Ecdsa(EcdsaPublicKey::new(curve, point.into()))
    }

    /// Create an Ed25519 public key from its 32 raw bytes
    pub fn ed25519_public(bytes: &[u8]) -> Result<Self> {
        Ed25519PublicKey::from_bytes(bytes).map(VerifyingKey::Ed25519)
    }

    /// Get key type name for error messages
    pub fn key_type(&self) -> &'static str {
        match self {
            VerifyingKey::Symmetric(_) => "Symmetric",
            VerifyingKey::Rsa(_) => "RSA",
            VerifyingKey::Ecdsa(key) => key.curve().name(),
            VerifyingKey::Ed25519(_) => "Ed25519",
        }
    }
}

/// Symmetric key for HMAC algorithms
#[derive(Clone)]
pub struct SecretKey {
    secret: Vec<u8>,
}

impl SecretKey {
    /// Create a new symmetric key
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    /// Get the secret bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.secret
    }

    /// Secret length in bytes
    pub fn len(&self) -> usize {
        self.secret.len()
    }

    /// Whether the secret is empty
    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("len", &self.secret.len())
            .finish_non_exhaustive()
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(secret: Vec<u8>) -> Self {
        Self::new(secret)
    }
}

impl From<&[u8]> for SecretKey {
    fn from(secret: &[u8]) -> Self {
        Self::new(secret.to_vec())
    }
}

impl From<&str> for SecretKey {
    fn from(secret: &str) -> Self {
        Self::new(secret.as_bytes().to_vec())
    }
}

/// RSA private key
#[derive(Clone)]
pub struct RsaPrivateKey {
    keypair: Arc<RsaKeyPair>,
}

impl RsaPrivateKey {
    /// Load from PKCS#8 DER
    pub fn from_pkcs8(der: &[u8]) -> Result<Self> {
        let keypair = RsaKeyPair::from_pkcs8(der).map_err(|e| Error::KeyRejected(e.to_string()))?;
        Ok(Self {
            keypair: Arc::new(keypair),
        })
    }

    /// Modulus size in bits
    pub fn modulus_bits(&self) -> usize {
        self.keypair.public_modulus_len() * 8
    }

    /// The public half as DER
    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey::new(self.keypair.public_key().as_ref().to_vec())
    }

    pub(crate) fn keypair(&self) -> &RsaKeyPair {
        &self.keypair
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("modulus_bits", &self.modulus_bits())
            .finish_non_exhaustive()
    }
}

/// RSA public key (DER-encoded)
#[derive(Debug, Clone)]
pub struct RsaPublicKey {
    der: Vec<u8>,
}

impl RsaPublicKey {
    /// Create a new RSA public key from DER bytes
    pub fn new(der: Vec<u8>) -> Self {
        Self { der }
    }

    /// Get the DER-encoded key bytes
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
}

/// ECDSA curve identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcdsaCurve {
    /// P-256 (secp256r1) curve
    P256,
    /// P-384 (secp384r1) curve
    P384,
    /// P-521 (secp521r1) curve
    P521,
}

impl EcdsaCurve {
    /// Human readable curve name
    pub fn name(&self) -> &'static str {
        match self {
            EcdsaCurve::P256 => "ECDSA P-256",
            EcdsaCurve::P384 => "ECDSA P-384",
            EcdsaCurve::P521 => "ECDSA P-521",
        }
    }

    /// JWS signatures use the fixed-width `R || S` encoding (RFC 7518 Section 3.4)
    pub(crate) fn signing_algorithm(&self) -> &'static EcdsaSigningAlgorithm {
        match self {
            EcdsaCurve::P256 => &ECDSA_P256_SHA256_FIXED_SIGNING,
            EcdsaCurve::P384 => &ECDSA_P384_SHA384_FIXED_SIGNING,
            EcdsaCurve::P521 => &ECDSA_P521_SHA512_FIXED_SIGNING,
        }
    }
}

/// ECDSA private key bound to its curve
#[derive(Clone)]
pub struct EcdsaPrivateKey {
    curve: EcdsaCurve,
    keypair: Arc<EcdsaKeyPair>,
}

impl EcdsaPrivateKey {
    /// Load from PKCS#8 DER; fails if the key is not on `curve`
    pub fn from_pkcs8(curve: EcdsaCurve, der: &[u8]) -> Result<Self> {
        let keypair = EcdsaKeyPair::from_pkcs8(curve.signing_algorithm(), der)
            .map_err(|e| Error::KeyRejected(e.to_string()))?;
        Ok(Self {
            curve,
            keypair: Arc::new(keypair),
        })
    }

    /// Get the curve
    pub fn curve(&self) -> EcdsaCurve {
        self.curve
    }

    /// The public point
    pub fn public_key(&self) -> EcdsaPublicKey {
        EcdsaPublicKey::new(self.curve, self.keypair.public_key().as_ref().to_vec())
    }

    pub(crate) fn keypair(&self) -> &EcdsaKeyPair {
        &self.keypair
    }
}

impl fmt::Debug for EcdsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaPrivateKey")
            .field("curve", &self.curve)
            .finish_non_exhaustive()
    }
}

/// ECDSA public key (uncompressed SEC1 point)
#[derive(Debug, Clone)]
pub struct EcdsaPublicKey {
    curve: EcdsaCurve,
    point: Vec<u8>,
}

impl EcdsaPublicKey {
    /// Create a new ECDSA public key
    pub fn new(curve: EcdsaCurve, point: Vec<u8>) -> Self {
        Self { curve, point }
    }

    /// Get the encoded point
    pub fn as_bytes(&self) -> &[u8] {
        &self.point
    }

    /// Get the curve
    pub fn curve(&self) -> EcdsaCurve {
        self.curve
    }
}

/// Ed25519 private key
#[derive(Clone)]
pub struct Ed25519PrivateKey {
    keypair: Arc<Ed25519KeyPair>,
}

impl Ed25519PrivateKey {
    /// Load from PKCS#8 DER
    pub fn from_pkcs8(der: &[u8]) -> Result<Self> {
        let keypair =
            Ed25519KeyPair::from_pkcs8(der).map_err(|e| Error::KeyRejected(e.to_string()))?;
        Ok(Self {
            keypair: Arc::new(keypair),
        })
    }

    /// The public key
    pub fn public_key(&self) -> Ed25519PublicKey {
        let mut bytes = [0u8; ED25519_PUBLIC_KEY_LEN];
        bytes.copy_from_slice(self.keypair.public_key().as_ref());
        Ed25519PublicKey { bytes }
    }

    pub(crate) fn keypair(&self) -> &Ed25519KeyPair {
        &self.keypair
    }
}

impl fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519PrivateKey").finish_non_exhaustive()
    }
}

const ED25519_PUBLIC_KEY_LEN: usize = 32;

/// Ed25519 public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    bytes: [u8; ED25519_PUBLIC_KEY_LEN],
}

impl Ed25519PublicKey {
    /// Create from the 32 raw key bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; ED25519_PUBLIC_KEY_LEN] = bytes.try_into().map_err(|_| {
            Error::KeyRejected(format!(
                "Ed25519 public key must be {ED25519_PUBLIC_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
