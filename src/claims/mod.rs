//! Claims model
//!
//! [`StandardClaims`] holds the registered claims from
//! [RFC 7519 Section 4.1](https://datatracker.ietf.org/doc/html/rfc7519#section-4.1).
//! [`ClaimsSet`] combines them with an open custom payload and is what a
//! [`Signer`](crate::Signer) encodes.
//!
//! # Merge policy
//!
//! Sources are applied in call order:
//! - a [`StandardClaims`] source overrides only the fields it sets
//! - an [`Object`] or [`Record`] source merges key-wise, last writer wins; keys
//!   naming a registered claim are routed into the typed standard field and
//!   `null` values are skipped
//!
//! ```ignore
//! use jwtseal::*;
//!
//! let claims = ClaimsSet::new()
//!     .merge(StandardClaims::new().subject("user-42"))?
//!     .merge(Record(&session))?
//!     .max_age(Duration::from_secs(900));
//! ```

mod decode;
mod validator;

pub use decode::{ClaimsRecord, CustomClaims, DecodeClaims, DecodeMode, Field, FromClaimValue};
pub use validator::ValidationConfig;
pub(crate) use validator::validate_claims;

use crate::error::{Error, Result};
use crate::utils::bounds::{validate_claim_string, validate_timestamp_bounds};

use miniserde::json::{self, Array, Number, Object, Value};
use std::time::Duration;

pub(crate) const ISSUER: &str = "iss";
pub(crate) const SUBJECT: &str = "sub";
pub(crate) const AUDIENCE: &str = "aud";
pub(crate) const EXPIRATION: &str = "exp";
pub(crate) const NOT_BEFORE: &str = "nbf";
pub(crate) const ISSUED_AT: &str = "iat";
pub(crate) const JWT_ID: &str = "jti";

/// Standard JWT claims as defined in RFC 7519 Section 4.1
///
/// Every field is optional; `None` means the claim is not asserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardClaims {
    /// Issuer (iss) - identifies the principal that issued the JWT
    pub issuer: Option<String>,

    /// Subject (sub) - identifies the principal that is the subject of the JWT
    pub subject: Option<String>,

    /// Audience (aud) - identifies the recipients that the JWT is intended for
    pub audience: Option<Audience>,

    /// Expiration Time (exp) - identifies the expiration time (seconds since Unix epoch)
    pub expiration: Option<i64>,

    /// Not Before (nbf) - identifies the time before which the JWT MUST NOT be accepted
    pub not_before: Option<i64>,

    /// Issued At (iat) - identifies the time at which the JWT was issued
    pub issued_at: Option<i64>,

    /// JWT ID (jti) - provides a unique identifier for the JWT
    pub jwt_id: Option<String>,
}

impl StandardClaims {
    /// Empty claims, nothing asserted
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the issuer
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the subject
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the audience
    pub fn audience(mut self, audience: impl Into<Audience>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set the expiration timestamp
    pub fn expiration(mut self, timestamp: i64) -> Self {
        self.expiration = Some(timestamp);
        self
    }

    /// Set the not-before timestamp
    pub fn not_before(mut self, timestamp: i64) -> Self {
        self.not_before = Some(timestamp);
        self
    }

    /// Set the issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.issued_at = Some(timestamp);
        self
    }

    /// Set the token id
    pub fn jwt_id(mut self, id: impl Into<String>) -> Self {
        self.jwt_id = Some(id.into());
        self
    }

    /// Copy every field that `other` sets, leave the rest untouched
    pub fn merge_from(&mut self, other: &StandardClaims) {
        if other.issuer.is_some() {
            self.issuer.clone_from(&other.issuer);
        }
        if other.subject.is_some() {
            self.subject.clone_from(&other.subject);
        }
        if other.audience.is_some() {
            self.audience.clone_from(&other.audience);
        }
        if other.expiration.is_some() {
            self.expiration = other.expiration;
        }
        if other.not_before.is_some() {
            self.not_before = other.not_before;
        }
        if other.issued_at.is_some() {
            self.issued_at = other.issued_at;
        }
        if other.jwt_id.is_some() {
            self.jwt_id.clone_from(&other.jwt_id);
        }
    }

    /// Extract the registered claims from a decoded payload object
    ///
    /// Unknown keys are ignored. A registered claim holding the wrong JSON type
    /// fails with `Error::ClaimInvalidType`.
    pub fn from_object(object: &Object) -> Result<Self> {
        let mut claims = Self::default();
        for (key, value) in object.iter() {
            claims.assign(key, value)?;
        }
        Ok(claims)
    }

    /// Route one JSON member into its standard slot
    ///
    /// Returns `false` if `key` is not a registered claim. `null` leaves the slot
    /// untouched.
    pub(crate) fn assign(&mut self, key: &str, value: &Value) -> Result<bool> {
        match key {
            ISSUER => set(&mut self.issuer, string_claim(key, value)?),
            SUBJECT => set(&mut self.subject, string_claim(key, value)?),
            JWT_ID => set(&mut self.jwt_id, string_claim(key, value)?),
            AUDIENCE => set(&mut self.audience, Audience::from_value(value)?),
            EXPIRATION => set(&mut self.expiration, timestamp_claim(key, value)?),
            NOT_BEFORE => set(&mut self.not_before, timestamp_claim(key, value)?),
            ISSUED_AT => set(&mut self.issued_at, timestamp_claim(key, value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Write every set field into `object`, replacing existing members
    pub(crate) fn write_into(&self, object: &mut Object) {
        if let Some(iss) = &self.issuer {
            object.insert(ISSUER.to_string(), Value::String(iss.clone()));
        }
        if let Some(sub) = &self.subject {
            object.insert(SUBJECT.to_string(), Value::String(sub.clone()));
        }
        if let Some(aud) = &self.audience {
            object.insert(AUDIENCE.to_string(), aud.to_value());
        }
        if let Some(exp) = self.expiration {
            object.insert(EXPIRATION.to_string(), timestamp_value(exp));
        }
        if let Some(nbf) = self.not_before {
            object.insert(NOT_BEFORE.to_string(), timestamp_value(nbf));
        }
        if let Some(iat) = self.issued_at {
            object.insert(ISSUED_AT.to_string(), timestamp_value(iat));
        }
        if let Some(jti) = &self.jwt_id {
            object.insert(JWT_ID.to_string(), Value::String(jti.clone()));
        }
    }
}

impl StandardClaims {
    /// Range check for `exp` and `nbf`
    pub(crate) fn validate_time_bounds(&self) -> Result<()> {
        for timestamp in [self.expiration, self.not_before].into_iter().flatten() {
            validate_timestamp_bounds(timestamp)?;
        }
        Ok(())
    }

    /// Length check for every string claim
    pub(crate) fn validate_strings(&self) -> Result<()> {
        for (claim, value) in [
            (ISSUER, &self.issuer),
            (SUBJECT, &self.subject),
            (JWT_ID, &self.jwt_id),
        ] {
            if let Some(value) = value {
                validate_claim_string(claim, value)?;
            }
        }
        if let Some(audience) = &self.audience {
            for value in audience.as_slice() {
                validate_claim_string(AUDIENCE, value)?;
            }
        }
        Ok(())
    }
}

fn set<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn string_claim(claim: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => {
            validate_claim_string(claim, s)?;
            Ok(Some(s.clone()))
        }
        _ => Err(Error::ClaimInvalidType {
            claim: claim.to_string(),
            expected: "string",
        }),
    }
}

/// NumericDate values; fractional seconds are truncated
fn timestamp_claim(claim: &str, value: &Value) -> Result<Option<i64>> {
    let invalid = || Error::ClaimInvalidType {
        claim: claim.to_string(),
        expected: "integer timestamp",
    };

    match value {
        Value::Null => Ok(None),
        Value::Number(Number::U64(n)) => i64::try_from(*n).map(Some).map_err(|_| invalid()),
        Value::Number(Number::I64(n)) => Ok(Some(*n)),
        Value::Number(Number::F64(n)) if n.is_finite() && n.abs() < i64::MAX as f64 => {
            Ok(Some(n.trunc() as i64))
        }
        _ => Err(invalid()),
    }
}

pub(crate) fn timestamp_value(timestamp: i64) -> Value {
    match u64::try_from(timestamp) {
        Ok(n) => Value::Number(Number::U64(n)),
        Err(_) => Value::Number(Number::I64(timestamp)),
    }
}

/// Audience claim: one or more recipients
///
/// Decodes from a string or an array of strings. A single audience is encoded
/// as a plain string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audience(Vec<String>);

impl Audience {
    /// A single recipient
    pub fn single(audience: impl Into<String>) -> Self {
        Self(vec![audience.into()])
    }

    /// Several recipients
    pub fn many<I, S>(audiences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(audiences.into_iter().map(Into::into).collect())
    }

    /// Whether `audience` is one of the recipients
    pub fn contains(&self, audience: &str) -> bool {
        self.0.iter().any(|a| a == audience)
    }

    /// All recipients
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    fn from_value(value: &Value) -> Result<Option<Self>> {
        let invalid = || Error::ClaimInvalidType {
            claim: AUDIENCE.to_string(),
            expected: "string or array of strings",
        };

        match value {
            Value::Null => Ok(None),
            Value::String(s) => {
                validate_claim_string(AUDIENCE, s)?;
                Ok(Some(Self::single(s.clone())))
            }
            Value::Array(items) => {
                let mut audiences = Vec::with_capacity(items.len());
                for item in items.iter() {
                    match item {
                        Value::String(s) => {
                            validate_claim_string(AUDIENCE, s)?;
                            audiences.push(s.clone());
                        }
                        _ => return Err(invalid()),
                    }
                }
                Ok(Some(Self(audiences)))
            }
            _ => Err(invalid()),
        }
    }

    fn to_value(&self) -> Value {
        match self.0.as_slice() {
            [single] => Value::String(single.clone()),
            many => {
                let mut array = Array::new();
                for audience in many {
                    array.push(Value::String(audience.clone()));
                }
                Value::Array(array)
            }
        }
    }
}

impl From<&str> for Audience {
    fn from(audience: &str) -> Self {
        Self::single(audience)
    }
}

impl From<String> for Audience {
    fn from(audience: String) -> Self {
        Self::single(audience)
    }
}

impl From<Vec<String>> for Audience {
    fn from(audiences: Vec<String>) -> Self {
        Self(audiences)
    }
}

/// Something that can be merged into a [`ClaimsSet`]
pub trait ClaimsSource {
    /// Apply this source on top of `claims`
    fn merge_into(self, claims: &mut ClaimsSet) -> Result<()>;
}

impl ClaimsSource for StandardClaims {
    fn merge_into(self, claims: &mut ClaimsSet) -> Result<()> {
        claims.standard.merge_from(&self);
        Ok(())
    }
}

impl ClaimsSource for Object {
    fn merge_into(mut self, claims: &mut ClaimsSet) -> Result<()> {
        for (key, value) in std::mem::take(&mut *self) {
            if matches!(value, Value::Null) {
                continue;
            }
            if claims.standard.assign(&key, &value)? {
                continue;
            }
            claims.custom.insert(key, value);
        }
        Ok(())
    }
}

/// A structured record merged through its JSON form
///
/// The record has to serialize to a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a, T: ?Sized>(pub &'a T);

impl<T> ClaimsSource for Record<'_, T>
where
    T: miniserde::Serialize + ?Sized,
{
    fn merge_into(self, claims: &mut ClaimsSet) -> Result<()> {
        let text = json::to_string(self.0);
        match json::from_str::<Value>(&text) {
            Ok(Value::Object(object)) => object.merge_into(claims),
            Ok(_) => Err(Error::ClaimsDecode(
                "claims record must serialize to a JSON object".to_string(),
            )),
            Err(_) => Err(Error::ClaimsDecode(
                "claims record produced invalid JSON".to_string(),
            )),
        }
    }
}

/// Claims to be signed: standard fields plus an open custom payload
#[derive(Debug, Clone, Default)]
pub struct ClaimsSet {
    standard: StandardClaims,
    custom: Object,
    max_age: Option<Duration>,
}

impl ClaimsSet {
    /// Empty claims set
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a source on top of the current claims
    ///
    /// # Errors
    ///
    /// `Error::ClaimInvalidType` if a mapping source puts the wrong JSON type into
    /// a registered claim.
    pub fn merge(mut self, source: impl ClaimsSource) -> Result<Self> {
        source.merge_into(&mut self)?;
        Ok(self)
    }

    /// Fill `iat = now` and `exp = now + max_age` at signing time
    ///
    /// Explicitly set `iat`/`exp` values are kept.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// The standard claims merged so far
    pub fn standard(&self) -> &StandardClaims {
        &self.standard
    }

    /// The custom (non-registered) claims merged so far
    pub fn custom(&self) -> &Object {
        &self.custom
    }

    /// Build the payload object as of `now`
    pub(crate) fn to_payload(&self, now: i64) -> Result<Object> {
        let mut standard = self.standard.clone();

        if let Some(max_age) = self.max_age {
            let seconds = i64::try_from(max_age.as_secs()).map_err(|_| Error::TimestampOverflow)?;
            if standard.issued_at.is_none() {
                standard.issued_at = Some(now);
            }
            if standard.expiration.is_none() {
                standard.expiration = Some(now.checked_add(seconds).ok_or(Error::TimestampOverflow)?);
            }
        }

        // Refuse what a verifier would refuse
        standard.validate_time_bounds()?;
        standard.validate_strings()?;

        let mut payload = self.custom.clone();
        standard.write_into(&mut payload);
        Ok(payload)
    }
}
