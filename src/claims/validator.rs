//! Time and expectation checks on verified claims
//!
//! `exp` and `nbf` are always checked when present. `iat` is informational
//! unless the configuration opts into [`ValidationConfig::reject_future_iat`]
//! or [`ValidationConfig::max_age`].

use crate::claims::{StandardClaims, AUDIENCE, ISSUED_AT, ISSUER, JWT_ID, SUBJECT};
use crate::error::{Error, Result};
use crate::limits::{MAX_LEEWAY_SECONDS, MAX_MAX_AGE_SECONDS};
use crate::time::{system_clock, Clock, SharedClock};
use crate::utils::bounds::{apply_leeway, validate_timestamp_bounds};

use std::fmt;
use std::sync::Arc;

type CustomValidator = Arc<dyn Fn(&StandardClaims) -> Result<()> + Send + Sync>;

/// Configuration for claims validation
#[derive(Clone)]
pub struct ValidationConfig {
    validate_exp: bool,
    validate_nbf: bool,
    reject_future_iat: bool,
    leeway_seconds: u64,
    max_age_seconds: Option<u64>,
    expected_issuer: Option<String>,
    expected_subject: Option<String>,
    expected_audience: Option<String>,
    expected_jwt_id: Option<String>,
    clock: SharedClock,
    custom_validator: Option<CustomValidator>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_exp: true,
            validate_nbf: true,
            reject_future_iat: false,
            leeway_seconds: 0,
            max_age_seconds: None,
            expected_issuer: None,
            expected_subject: None,
            expected_audience: None,
            expected_jwt_id: None,
            clock: system_clock(),
            custom_validator: None,
        }
    }
}

impl fmt::Debug for ValidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationConfig")
            .field("validate_exp", &self.validate_exp)
            .field("validate_nbf", &self.validate_nbf)
            .field("reject_future_iat", &self.reject_future_iat)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("max_age_seconds", &self.max_age_seconds)
            .field("expected_issuer", &self.expected_issuer)
            .field("expected_subject", &self.expected_subject)
            .field("expected_audience", &self.expected_audience)
            .field("expected_jwt_id", &self.expected_jwt_id)
            .field("custom_validator", &self.custom_validator.is_some())
            .finish_non_exhaustive()
    }
}

impl ValidationConfig {
    /// Create a new validation config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the leeway applied around `exp`, `nbf` and `iat`
    ///
    /// # Security
    /// Leeway is limited to prevent effectively disabling expiration checks.
    /// Maximum allowed value is 300 seconds (5 minutes). A larger value makes
    /// [`ValidationConfig::validate`] and [`Verifier::try_validation`] fail, and
    /// every `verify` made with it returns [`Error::LeewayTooLarge`].
    ///
    /// [`Verifier::try_validation`]: crate::Verifier::try_validation
    pub fn leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// Read the current time from `clock` instead of the system clock
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Reject tokens older than `iat + seconds`
    ///
    /// Tokens without `iat` are rejected once this is set.
    ///
    /// # Security
    /// Maximum allowed value is 31,536,000 seconds (1 year).
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age_seconds = Some(seconds);
        self
    }

    /// Reject tokens whose `iat` lies in the future
    pub fn reject_future_iat(mut self) -> Self {
        self.reject_future_iat = true;
        self
    }

    /// Require a specific issuer
    pub fn require_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    /// Require a specific subject
    pub fn require_subject(mut self, subject: impl Into<String>) -> Self {
        self.expected_subject = Some(subject.into());
        self
    }

    /// Require the token audience to contain `audience`
    pub fn require_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = Some(audience.into());
        self
    }

    /// Require a specific token id
    pub fn require_jwt_id(mut self, id: impl Into<String>) -> Self {
        self.expected_jwt_id = Some(id.into());
        self
    }

    /// Disable expiration validation
    pub fn no_exp_validation(mut self) -> Self {
        self.validate_exp = false;
        self
    }

    /// Disable not-before validation
    pub fn no_nbf_validation(mut self) -> Self {
        self.validate_nbf = false;
        self
    }

    /// Add custom validation function, run after every built-in check
    pub fn custom<F>(mut self, validator: F) -> Self
    where
        F: Fn(&StandardClaims) -> Result<()> + Send + Sync + 'static,
    {
        self.custom_validator = Some(Arc::new(validator));
        self
    }

    /// Configured leeway in seconds
    pub fn leeway_seconds(&self) -> u64 {
        self.leeway_seconds
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Reject configuration values that would disable the checks they tune
    ///
    /// # Errors
    /// [`Error::LeewayTooLarge`] or [`Error::MaxAgeTooLarge`].
    pub fn validate(&self) -> Result<()> {
        if self.leeway_seconds > MAX_LEEWAY_SECONDS {
            return Err(Error::LeewayTooLarge {
                value: self.leeway_seconds,
                max: MAX_LEEWAY_SECONDS,
            });
        }
        if let Some(max_age) = self.max_age_seconds {
            if max_age > MAX_MAX_AGE_SECONDS {
                return Err(Error::MaxAgeTooLarge {
                    value: max_age,
                    max: MAX_MAX_AGE_SECONDS,
                });
            }
        }
        Ok(())
    }
}

/// Validate claims according to configuration
pub(crate) fn validate_claims(claims: &StandardClaims, config: &ValidationConfig) -> Result<()> {
    config.validate()?;

    let now = config.now();
    let leeway = config.leeway_seconds;

    claims.validate_time_bounds()?;

    // iat only matters when a policy reads it
    if config.reject_future_iat || config.max_age_seconds.is_some() {
        if let Some(iat) = claims.issued_at {
            validate_timestamp_bounds(iat)?;
        }
    }

    // Equality with exp or nbf is still valid
    if config.validate_exp {
        if let Some(exp) = claims.expiration {
            if now > apply_leeway(exp, leeway, true)? {
                return Err(Error::TokenExpired {
                    expired_at: exp,
                    now,
                    leeway,
                });
            }
        }
    }

    if config.validate_nbf {
        if let Some(nbf) = claims.not_before {
            if now < apply_leeway(nbf, leeway, false)? {
                return Err(Error::TokenNotYetValid {
                    not_before: nbf,
                    now,
                    leeway,
                });
            }
        }
    }

    if config.reject_future_iat {
        if let Some(iat) = claims.issued_at {
            if apply_leeway(iat, leeway, false)? > now {
                return Err(Error::TokenIssuedInFuture {
                    issued_at: iat,
                    now,
                    leeway,
                });
            }
        }
    }

    if let Some(max_age) = config.max_age_seconds {
        let iat = claims
            .issued_at
            .ok_or_else(|| Error::TokenMissingClaim(ISSUED_AT.into()))?;
        let oldest = apply_leeway(apply_leeway(iat, max_age, true)?, leeway, true)?;
        if now > oldest {
            return Err(Error::TokenTooOld {
                issued_at: iat,
                now,
                max_age,
            });
        }
    }

    expect_claim(ISSUER, claims.issuer.as_deref(), config.expected_issuer.as_deref())?;
    expect_claim(SUBJECT, claims.subject.as_deref(), config.expected_subject.as_deref())?;
    expect_claim(JWT_ID, claims.jwt_id.as_deref(), config.expected_jwt_id.as_deref())?;

    if let Some(expected) = &config.expected_audience {
        match &claims.audience {
            Some(aud) if aud.contains(expected) => {}
            Some(aud) => {
                return Err(Error::TokenAudienceMismatch {
                    expected: expected.clone(),
                    found: aud.as_slice().to_vec(),
                });
            }
            None => return Err(Error::TokenMissingClaim(AUDIENCE.into())),
        }
    }

    if let Some(validator) = &config.custom_validator {
        validator(claims)?;
    }

    Ok(())
}

fn expect_claim(claim: &str, found: Option<&str>, expected: Option<&str>) -> Result<()> {
    match (expected, found) {
        (None, _) => Ok(()),
        (Some(expected), Some(found)) if expected == found => Ok(()),
        (Some(expected), Some(found)) => Err(Error::TokenClaimMismatch {
            claim: claim.into(),
            expected: expected.into(),
            found: found.into(),
        }),
        (Some(_), None) => Err(Error::TokenMissingClaim(claim.into())),
    }
}
