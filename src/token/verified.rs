use crate::algorithm::AlgorithmId;
use crate::claims::{DecodeClaims, DecodeMode, StandardClaims};
use crate::error::{Error, Result};
use crate::token::{TokenHeader, TokenId};

use miniserde::json::{self, Object, Value};

/// A token that passed every verification stage
///
/// Only [`Verifier::verify`](crate::Verifier::verify) produces this type, so
/// holding one means signature, revocation and time checks all succeeded.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    header: TokenHeader,
    algorithm: AlgorithmId,
    header_bytes: Vec<u8>,
    payload_bytes: Vec<u8>,
    signature: Vec<u8>,
    payload: Object,
    claims: StandardClaims,
    id: TokenId,
}

impl VerifiedToken {
    pub(crate) fn new(
        header: TokenHeader,
        algorithm: AlgorithmId,
        header_bytes: Vec<u8>,
        payload_bytes: Vec<u8>,
        signature: Vec<u8>,
        payload: Object,
        claims: StandardClaims,
    ) -> Self {
        let id = TokenId::from_signature(&signature);
        Self {
            header,
            algorithm,
            header_bytes,
            payload_bytes,
            signature,
            payload,
            claims,
            id,
        }
    }

    /// Get the token header
    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// Get the algorithm
    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// The registered claims
    pub fn claims(&self) -> &StandardClaims {
        &self.claims
    }

    /// Revocation identifier
    pub fn id(&self) -> &TokenId {
        &self.id
    }

    /// Decoded header JSON
    pub fn header_bytes(&self) -> &[u8] {
        &self.header_bytes
    }

    /// Decoded payload JSON
    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload_bytes
    }

    /// Decoded signature
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The whole payload as a JSON object
    pub fn payload(&self) -> &Object {
        &self.payload
    }

    /// Decode the payload into `T`
    ///
    /// # Errors
    ///
    /// - `Error::ClaimMissingField` in strict mode when a required field is
    ///   absent or empty
    /// - `Error::ClaimsDecode` when a present field has the wrong JSON type
    pub fn decode<T: DecodeClaims>(&self, mode: DecodeMode) -> Result<T> {
        T::decode_claims(&self.payload, &self.claims, mode)
    }
}

/// Parse verified payload bytes; the payload must be a JSON object
pub(crate) fn parse_payload(bytes: &[u8]) -> Result<Object> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::FormatInvalidJson("Payload is not valid UTF-8".to_string()))?;

    match json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(Error::FormatInvalidJson(
            "Payload is not a JSON object".to_string(),
        )),
        Err(e) => Err(Error::FormatInvalidJson(format!("Failed to parse payload: {e}"))),
    }
}
