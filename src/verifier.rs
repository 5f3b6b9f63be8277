//! Token verification
//!
//! A [`Verifier`] runs every token through the same stages, in order:
//!
//! 1. **ParseHeader**: split into three segments, base64url-decode them, parse
//!    the header JSON
//! 2. **SelectAlgorithm**: map `alg` to an [`AlgorithmId`], apply the
//!    [`AlgorithmPolicy`], check the key fits
//! 3. **VerifySignature**: verify over the literal `header.payload` text
//! 4. **CheckRevocation**: consult the revocation collaborator, if one is set
//! 5. **ValidateTimeClaims**: parse the payload, check `exp`/`nbf` (plus any
//!    opt-in `iat` and expected-claim rules)
//!
//! The first failing stage decides the single error returned. Claims are never
//! handed out from a token that failed any stage.

use crate::algorithm::{AlgorithmId, AlgorithmPolicy};
use crate::blocklist::Blocklist;
use crate::claims::{validate_claims, StandardClaims, ValidationConfig};
use crate::error::{Error, Result};
use crate::keys::VerifyingKey;
use crate::token::{codec, parse_payload, TokenId, VerifiedToken};

use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Lookup of revoked token ids
pub trait Revocation: Send + Sync {
    /// Whether `id` is currently revoked
    fn is_blocked(&self, id: &TokenId) -> bool;
}

/// Verification stage, reported in rejection logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParseHeader,
    SelectAlgorithm,
    VerifySignature,
    CheckRevocation,
    ValidateTimeClaims,
}

impl Stage {
    /// Stage name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ParseHeader => "parse_header",
            Stage::SelectAlgorithm => "select_algorithm",
            Stage::VerifySignature => "verify_signature",
            Stage::CheckRevocation => "check_revocation",
            Stage::ValidateTimeClaims => "validate_time_claims",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verifies compact tokens against one key
///
/// `Verifier` is cheap to clone and safe to share between threads.
///
/// # Example
///
/// ```ignore
/// use jwtseal::*;
///
/// let verifier = Verifier::new(VerifyingKey::symmetric(secret))
///     .algorithms(AlgorithmPolicy::only(AlgorithmId::HS256))
///     .validation(ValidationConfig::default().leeway(30))
///     .blocklist(&blocklist);
///
/// let token = verifier.verify(&text)?;
/// println!("Subject: {:?}", token.claims().subject);
/// ```
#[derive(Clone)]
pub struct Verifier {
    key: VerifyingKey,
    policy: AlgorithmPolicy,
    validation: ValidationConfig,
    revocation: Option<Arc<dyn Revocation>>,
}

impl Verifier {
    /// Verify with `key`, every algorithm allowed, default validation and no
    /// revocation check
    pub fn new(key: VerifyingKey) -> Self {
        Self {
            key,
            policy: AlgorithmPolicy::default(),
            validation: ValidationConfig::default(),
            revocation: None,
        }
    }

    /// Restrict which algorithms are allowed (recommended)
    ///
    /// This prevents algorithm confusion attacks by only allowing algorithms you
    /// explicitly trust.
    pub fn algorithms(mut self, policy: AlgorithmPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set claims validation (leeway, clock, expectations)
    ///
    /// The bounds are checked on every `verify`; use
    /// [`Verifier::try_validation`] to reject an out-of-range leeway or
    /// max age here instead.
    pub fn validation(mut self, config: ValidationConfig) -> Self {
        self.validation = config;
        self
    }

    /// Set claims validation after checking its bounds
    ///
    /// # Errors
    /// [`Error::LeewayTooLarge`] or [`Error::MaxAgeTooLarge`].
    pub fn try_validation(self, config: ValidationConfig) -> Result<Self> {
        config.validate()?;
        Ok(self.validation(config))
    }

    /// Reject tokens that `revocation` reports as blocked
    pub fn revocation(mut self, revocation: Arc<dyn Revocation>) -> Self {
        self.revocation = Some(revocation);
        self
    }

    /// Reject tokens present in `blocklist`
    pub fn blocklist(self, blocklist: &Blocklist) -> Self {
        self.revocation(Arc::new(blocklist.clone()))
    }

    /// Run every stage on `token`
    ///
    /// # Errors
    ///
    /// The error of the first failing stage, for example:
    /// - `Error::FormatInvalid` / `Error::FormatInvalidBase64` (ParseHeader)
    /// - `Error::AlgorithmUnsupported` / `Error::KeyMismatch` (SelectAlgorithm)
    /// - `Error::SignatureInvalid` (VerifySignature)
    /// - `Error::TokenBlocked` (CheckRevocation)
    /// - `Error::TokenExpired` / `Error::TokenNotYetValid` (ValidateTimeClaims)
    pub fn verify(&self, token: &str) -> Result<VerifiedToken> {
        match self.run(token) {
            Ok(verified) => {
                trace!(
                    target: "jwtseal.verifier",
                    algorithm = %verified.algorithm(),
                    token_id = %verified.id(),
                    "Token verified"
                );
                Ok(verified)
            }
            Err((stage, error)) => {
                debug!(
                    target: "jwtseal.verifier",
                    stage = %stage,
                    error = %error,
                    "Token rejected"
                );
                Err(error)
            }
        }
    }

    fn run(&self, token: &str) -> std::result::Result<VerifiedToken, (Stage, Error)> {
        let decoded = codec::decode(token).map_err(at(Stage::ParseHeader))?;

        let algorithm = self
            .select_algorithm(&decoded.header.algorithm)
            .map_err(at(Stage::SelectAlgorithm))?;

        algorithm
            .verify(
                &self.key,
                decoded.signing_input().as_bytes(),
                &decoded.signature,
            )
            .map_err(at(Stage::VerifySignature))?;

        if let Some(revocation) = &self.revocation {
            if revocation.is_blocked(&TokenId::from_signature(&decoded.signature)) {
                return Err((Stage::CheckRevocation, Error::TokenBlocked));
            }
        }

        let (payload, claims) = parse_payload(&decoded.payload_bytes)
            .and_then(|payload| {
                let claims = StandardClaims::from_object(&payload)?;
                validate_claims(&claims, &self.validation)?;
                Ok((payload, claims))
            })
            .map_err(at(Stage::ValidateTimeClaims))?;

        Ok(VerifiedToken::new(
            decoded.header,
            algorithm,
            decoded.header_bytes,
            decoded.payload_bytes,
            decoded.signature,
            payload,
            claims,
        ))
    }

    fn select_algorithm(&self, alg: &str) -> Result<AlgorithmId> {
        let algorithm: AlgorithmId = alg.parse()?;
        self.policy.validate(&algorithm)?;
        algorithm.check_verifying_key(&self.key)?;
        Ok(algorithm)
    }
}

fn at(stage: Stage) -> impl FnOnce(Error) -> (Stage, Error) {
    move |error| (stage, error)
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("key", &self.key)
            .field("policy", &self.policy)
            .field("validation", &self.validation)
            .field("revocation", &self.revocation.is_some())
            .finish()
    }
}
