//! Token issuance
//!
//! Sign pipeline: merge claims, encode header and payload, sign the encoded
//! `header.payload` prefix, append the signature. Any failure aborts the whole
//! operation; no partial token is ever returned.

use crate::algorithm::AlgorithmId;
use crate::claims::ClaimsSet;
use crate::error::Result;
use crate::keys::SigningKey;
use crate::time::{system_clock, Clock, SharedClock};
use crate::token::codec;

use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Issues compact tokens with one algorithm and key
///
/// # Example
///
/// ```ignore
/// use jwtseal::*;
/// use std::time::Duration;
///
/// let signer = Signer::new(AlgorithmId::HS256, SigningKey::symmetric(secret))?;
/// let token = signer.sign(
///     &ClaimsSet::new()
///         .merge(StandardClaims::new().subject("user-42"))?
///         .max_age(Duration::from_secs(900)),
/// )?;
/// ```
#[derive(Clone)]
pub struct Signer {
    algorithm: AlgorithmId,
    key: SigningKey,
    clock: SharedClock,
}

impl Signer {
    /// Create a signer, checking up front that `key` fits `algorithm`
    ///
    /// # Errors
    ///
    /// `Error::KeyMismatch` if the key family, curve or size does not fit.
    pub fn new(algorithm: AlgorithmId, key: SigningKey) -> Result<Self> {
        algorithm.check_signing_key(&key)?;
        Ok(Self {
            algorithm,
            key,
            clock: system_clock(),
        })
    }

    /// Read the current time from `clock` when filling `max_age` claims
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The signing algorithm
    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// Sign `claims` and return the compact token
    pub fn sign(&self, claims: &ClaimsSet) -> Result<String> {
        let payload = claims.to_payload(self.clock.now())?;
        let signing_input = codec::encode_signing_input(self.algorithm, &payload);
        let signature = self.algorithm.sign(&self.key, signing_input.as_bytes())?;

        trace!(
            target: "jwtseal.signer",
            algorithm = %self.algorithm,
            claims = payload.len(),
            "Token signed"
        );

        Ok(codec::append_signature(signing_input, &signature))
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("algorithm", &self.algorithm)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Sign `claims` once with the system clock
pub fn sign(algorithm: AlgorithmId, key: &SigningKey, claims: &ClaimsSet) -> Result<String> {
    Signer::new(algorithm, key.clone())?.sign(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::StandardClaims;
    use crate::error::Error;
    use crate::time::ManualClock;
    use crate::token::codec::decode;
    use crate::token::parse_payload;
    use std::time::Duration;

    #[test]
    fn test_signer_checks_key_up_front() {
        let result = Signer::new(AlgorithmId::HS256, SigningKey::symmetric(vec![0u8; 16]));
        assert!(matches!(result, Err(Error::KeyMismatch { .. })));

        let result = Signer::new(AlgorithmId::EdDSA, SigningKey::symmetric(vec![0u8; 32]));
        assert!(matches!(result, Err(Error::KeyMismatch { .. })));
    }

    #[test]
    fn test_sign_fills_max_age_from_clock() {
        let signer = Signer::new(AlgorithmId::HS256, SigningKey::symmetric(vec![1u8; 32]))
            .unwrap()
            .with_clock(ManualClock::new(1_700_000_000));

        let token = signer
            .sign(&ClaimsSet::new().max_age(Duration::from_secs(900)))
            .unwrap();
        assert_eq!(token.matches('.').count(), 2);

        let decoded = decode(&token).unwrap();
        let claims = StandardClaims::from_object(&parse_payload(&decoded.payload_bytes).unwrap()).unwrap();
        assert_eq!(claims.issued_at, Some(1_700_000_000));
        assert_eq!(claims.expiration, Some(1_700_000_900));
    }

    #[test]
    fn test_sign_refuses_claims_the_verifier_would_reject() {
        let signer = Signer::new(AlgorithmId::HS256, SigningKey::symmetric(vec![1u8; 32]))
            .unwrap()
            .with_clock(ManualClock::new(1_700_000_000));

        let far_future = ClaimsSet::new().max_age(Duration::from_secs(100 * 365 * 86_400));
        assert!(matches!(
            signer.sign(&far_future),
            Err(Error::TimestampOutOfBounds { .. })
        ));

        let long_subject = ClaimsSet::new()
            .merge(StandardClaims::new().subject("s".repeat(4096)))
            .unwrap();
        assert!(matches!(
            signer.sign(&long_subject),
            Err(Error::ClaimStringTooLong { ref claim, length: 4096, .. }) if claim == "sub"
        ));
    }

    #[test]
    fn test_hmac_signatures_are_deterministic() {
        let key = SigningKey::symmetric(vec![9u8; 64]);
        let claims = ClaimsSet::new()
            .merge(StandardClaims::new().subject("user").expiration(2_000_000_000))
            .unwrap();

        let a = sign(AlgorithmId::HS512, &key, &claims).unwrap();
        let b = sign(AlgorithmId::HS512, &key, &claims).unwrap();
        assert_eq!(a, b);
    }
}
