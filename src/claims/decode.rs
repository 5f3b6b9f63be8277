//! Decoding verified payloads into caller-chosen destinations
//!
//! The payload is parsed once into a generic JSON tree. Destinations then read
//! from that tree:
//! - [`Object`] receives the whole payload
//! - [`CustomClaims`] receives the payload minus the registered claims
//! - [`StandardClaims`] receives the registered claims
//! - any [`ClaimsRecord`] is filled through its [`Field`] descriptor list
//!
//! Records are usually described with `#[derive(ClaimsRecord)]`.

use crate::claims::{
    StandardClaims, AUDIENCE, EXPIRATION, ISSUED_AT, ISSUER, JWT_ID, NOT_BEFORE, SUBJECT,
};
use crate::error::{Error, Result};

use miniserde::json::{Number, Object, Value};

/// How missing and empty fields are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// Unknown or missing fields are ignored
    #[default]
    Lenient,

    /// Required fields must be present and hold a non-zero value
    Strict,
}

/// Descriptor for one record field: JSON name, required flag and target slot
pub struct Field<T> {
    name: &'static str,
    required: bool,
    assign: fn(&mut T, &Value) -> Result<()>,
}

impl<T> Field<T> {
    /// Create a descriptor
    pub fn new(name: &'static str, required: bool, assign: fn(&mut T, &Value) -> Result<()>) -> Self {
        Self {
            name,
            required,
            assign,
        }
    }

    /// A field that may be absent
    pub fn optional(name: &'static str, assign: fn(&mut T, &Value) -> Result<()>) -> Self {
        Self::new(name, false, assign)
    }

    /// A field that strict decoding insists on
    pub fn required(name: &'static str, assign: fn(&mut T, &Value) -> Result<()>) -> Self {
        Self::new(name, true, assign)
    }

    /// JSON member name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether strict decoding requires this field
    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish()
    }
}

/// A structured record described by a field list
pub trait ClaimsRecord: Default {
    /// The record's fields, in decode order
    fn fields() -> Vec<Field<Self>>;
}

/// A destination a verified payload can be decoded into
pub trait DecodeClaims: Sized {
    /// Decode from the parsed payload
    ///
    /// `standard` holds the registered claims already extracted during verification.
    fn decode_claims(payload: &Object, standard: &StandardClaims, mode: DecodeMode) -> Result<Self>;
}

impl<T: ClaimsRecord> DecodeClaims for T {
    fn decode_claims(payload: &Object, _standard: &StandardClaims, mode: DecodeMode) -> Result<Self> {
        let mut record = T::default();

        for field in T::fields() {
            let value = payload.get(field.name);

            if mode == DecodeMode::Strict && field.required && value.map_or(true, is_zero_value) {
                return Err(Error::ClaimMissingField(field.name.to_string()));
            }

            match value {
                None | Some(Value::Null) => {}
                Some(value) => (field.assign)(&mut record, value).map_err(|e| match e {
                    Error::ClaimsDecode(reason) => {
                        Error::ClaimsDecode(format!("field '{}': {reason}", field.name))
                    }
                    other => other,
                })?,
            }
        }

        Ok(record)
    }
}

impl DecodeClaims for Object {
    fn decode_claims(payload: &Object, _standard: &StandardClaims, _mode: DecodeMode) -> Result<Self> {
        Ok(payload.clone())
    }
}

impl DecodeClaims for StandardClaims {
    fn decode_claims(_payload: &Object, standard: &StandardClaims, _mode: DecodeMode) -> Result<Self> {
        Ok(standard.clone())
    }
}

/// The payload without the registered claims
#[derive(Debug, Clone, Default)]
pub struct CustomClaims(pub Object);

impl CustomClaims {
    /// Look up a custom claim
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Number of custom claims
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no custom claims
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap the inner object
    pub fn into_inner(self) -> Object {
        self.0
    }
}

impl DecodeClaims for CustomClaims {
    fn decode_claims(payload: &Object, _standard: &StandardClaims, _mode: DecodeMode) -> Result<Self> {
        const REGISTERED: [&str; 7] = [
            ISSUER, SUBJECT, AUDIENCE, EXPIRATION, NOT_BEFORE, ISSUED_AT, JWT_ID,
        ];

        let mut custom = Object::new();
        for (key, value) in payload.iter() {
            if !REGISTERED.contains(&key.as_str()) {
                custom.insert(key.clone(), value.clone());
            }
        }
        Ok(CustomClaims(custom))
    }
}

/// `null`, `""`, `0`, `false`, `[]` and `{}`
pub(crate) fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(Number::U64(n)) => *n == 0,
        Value::Number(Number::I64(n)) => *n == 0,
        Value::Number(Number::F64(n)) => *n == 0.0,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(members) => members.is_empty(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(expected: &str, value: &Value) -> Error {
    Error::ClaimsDecode(format!("expected {expected}, found {}", kind(value)))
}

/// Conversion from a JSON value into a record field
pub trait FromClaimValue: Sized {
    /// Convert, failing with `Error::ClaimsDecode` on a type mismatch
    fn from_claim_value(value: &Value) -> Result<Self>;
}

impl FromClaimValue for String {
    fn from_claim_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(type_error("string", other)),
        }
    }
}

impl FromClaimValue for bool {
    fn from_claim_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(type_error("boolean", other)),
        }
    }
}

impl FromClaimValue for i64 {
    fn from_claim_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(Number::I64(n)) => Ok(*n),
            Value::Number(Number::U64(n)) => {
                i64::try_from(*n).map_err(|_| Error::ClaimsDecode(format!("{n} out of range for i64")))
            }
            other => Err(type_error("integer", other)),
        }
    }
}

impl FromClaimValue for u64 {
    fn from_claim_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(Number::U64(n)) => Ok(*n),
            other => Err(type_error("non-negative integer", other)),
        }
    }
}

impl FromClaimValue for f64 {
    fn from_claim_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(Number::F64(n)) => Ok(*n),
            Value::Number(Number::I64(n)) => Ok(*n as f64),
            Value::Number(Number::U64(n)) => Ok(*n as f64),
            other => Err(type_error("number", other)),
        }
    }
}

impl<T: FromClaimValue> FromClaimValue for Vec<T> {
    fn from_claim_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_claim_value).collect(),
            other => Err(type_error("array", other)),
        }
    }
}

impl<T: FromClaimValue> FromClaimValue for Option<T> {
    fn from_claim_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_claim_value(other).map(Some),
        }
    }
}

impl FromClaimValue for Object {
    fn from_claim_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(members) => Ok(members.clone()),
            other => Err(type_error("object", other)),
        }
    }
}

impl FromClaimValue for Value {
    fn from_claim_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniserde::json;

    #[derive(Debug, Default)]
    struct Session {
        user: String,
        admin: bool,
        scopes: Vec<String>,
    }

    impl ClaimsRecord for Session {
        fn fields() -> Vec<Field<Self>> {
            vec![
                Field::required("user", |s: &mut Session, v| {
                    s.user = FromClaimValue::from_claim_value(v)?;
                    Ok(())
                }),
                Field::optional("admin", |s: &mut Session, v| {
                    s.admin = FromClaimValue::from_claim_value(v)?;
                    Ok(())
                }),
                Field::optional("scopes", |s: &mut Session, v| {
                    s.scopes = FromClaimValue::from_claim_value(v)?;
                    Ok(())
                }),
            ]
        }
    }

    fn payload(text: &str) -> Object {
        match json::from_str::<Value>(text).unwrap() {
            Value::Object(object) => object,
            other => panic!("not an object: {other:?}"),
        }
    }

    fn decode<T: DecodeClaims>(text: &str, mode: DecodeMode) -> Result<T> {
        let payload = payload(text);
        let standard = StandardClaims::from_object(&payload).unwrap();
        T::decode_claims(&payload, &standard, mode)
    }

    #[test]
    fn test_record_decode() {
        let session: Session = decode(
            r#"{"user":"alice","admin":true,"scopes":["read","write"],"extra":1}"#,
            DecodeMode::Strict,
        )
        .unwrap();

        assert_eq!(session.user, "alice");
        assert!(session.admin);
        assert_eq!(session.scopes, vec!["read", "write"]);
    }

    #[test]
    fn test_strict_missing_required_field() {
        let result = decode::<Session>(r#"{"admin":true}"#, DecodeMode::Strict);
        assert!(matches!(result, Err(Error::ClaimMissingField(ref f)) if f == "user"));

        let session: Session = decode(r#"{"admin":true}"#, DecodeMode::Lenient).unwrap();
        assert_eq!(session.user, "");
        assert!(session.admin);
    }

    #[test]
    fn test_strict_zero_value_counts_as_missing() {
        let result = decode::<Session>(r#"{"user":""}"#, DecodeMode::Strict);
        assert!(matches!(result, Err(Error::ClaimMissingField(_))));

        let result = decode::<Session>(r#"{"user":null}"#, DecodeMode::Strict);
        assert!(matches!(result, Err(Error::ClaimMissingField(_))));
    }

    #[test]
    fn test_wrong_type_fails_in_both_modes() {
        for mode in [DecodeMode::Lenient, DecodeMode::Strict] {
            let result = decode::<Session>(r#"{"user":"bob","admin":"yes"}"#, mode);
            match result {
                Err(Error::ClaimsDecode(reason)) => assert!(reason.contains("admin")),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_mapping_and_custom_destinations() {
        let text = r#"{"foo":"bar","exp":100,"iat":10}"#;

        let object: Object = decode(text, DecodeMode::Lenient).unwrap();
        assert_eq!(object.len(), 3);

        let custom: CustomClaims = decode(text, DecodeMode::Lenient).unwrap();
        assert_eq!(json::to_string(&custom.0), r#"{"foo":"bar"}"#);

        let standard: StandardClaims = decode(text, DecodeMode::Strict).unwrap();
        assert_eq!(standard.expiration, Some(100));
        assert_eq!(standard.issued_at, Some(10));
    }

    #[test]
    fn test_zero_values() {
        for text in ["null", "\"\"", "0", "0.0", "false", "[]", "{}"] {
            let value = json::from_str::<Value>(text).unwrap();
            assert!(is_zero_value(&value), "{text}");
        }
        for text in ["\"x\"", "1", "-1", "true", "[0]", "{\"a\":null}"] {
            let value = json::from_str::<Value>(text).unwrap();
            assert!(!is_zero_value(&value), "{text}");
        }
    }

    #[test]
    fn test_scalar_conversions() {
        let value = json::from_str::<Value>("-3").unwrap();
        assert_eq!(i64::from_claim_value(&value).unwrap(), -3);
        assert!(u64::from_claim_value(&value).is_err());
        assert_eq!(f64::from_claim_value(&value).unwrap(), -3.0);

        let value = json::from_str::<Value>("null").unwrap();
        assert_eq!(Option::<String>::from_claim_value(&value).unwrap(), None);
    }
}
