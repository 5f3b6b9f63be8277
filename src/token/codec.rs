//! Compact serialization (RFC 7515 Section 7.1)
//!
//! `base64url(header) . base64url(payload) . base64url(signature)`, no padding.
//! The signing input is always the literal `header.payload` text as transmitted;
//! nothing is re-serialized on the verify path.

use crate::algorithm::AlgorithmId;
use crate::error::{Error, Result};
use crate::limits::{
    MAX_DECODED_HEADER_SIZE, MAX_DECODED_PAYLOAD_SIZE, MAX_DECODED_SIGNATURE_SIZE,
    MAX_TOKEN_LENGTH,
};
use crate::token::TokenHeader;
use crate::utils::base64url;

use miniserde::json::{self, Object};

/// The three encoded segments of a compact token
#[derive(Debug, Clone, Copy)]
pub struct Segments<'a> {
    /// Encoded header
    pub header: &'a str,
    /// Encoded payload
    pub payload: &'a str,
    /// Encoded signature
    pub signature: &'a str,
    signing_input: &'a str,
}

impl<'a> Segments<'a> {
    /// The literal `header.payload` prefix the signature covers
    pub fn signing_input(&self) -> &'a str {
        self.signing_input
    }
}

/// A compact token with every segment decoded
#[derive(Debug, Clone)]
pub struct DecodedToken<'a> {
    /// Parsed header
    pub header: TokenHeader,
    /// Decoded header JSON bytes
    pub header_bytes: Vec<u8>,
    /// Decoded payload JSON bytes (not yet trusted)
    pub payload_bytes: Vec<u8>,
    /// Decoded signature bytes
    pub signature: Vec<u8>,
    signing_input: &'a str,
}

impl<'a> DecodedToken<'a> {
    /// The literal `header.payload` prefix the signature covers
    pub fn signing_input(&self) -> &'a str {
        self.signing_input
    }
}

/// Split a token into its segments without decoding them
///
/// # Errors
///
/// - `Error::TokenTooLarge` if the token exceeds 64KB
/// - `Error::FormatInvalid` unless there are exactly two `.` delimiters
pub fn split(token: &str) -> Result<Segments<'_>> {
    if token.len() > MAX_TOKEN_LENGTH {
        return Err(Error::TokenTooLarge {
            size: token.len(),
            max: MAX_TOKEN_LENGTH,
        });
    }

    let mut parts = token.splitn(3, '.');
    let (Some(header), Some(payload), Some(signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::FormatInvalid);
    };

    if signature.contains('.') {
        return Err(Error::FormatInvalid);
    }

    Ok(Segments {
        header,
        payload,
        signature,
        signing_input: &token[..header.len() + 1 + payload.len()],
    })
}

/// Split and base64url-decode every segment, then parse the header
///
/// The payload is left as bytes; it is only parsed once the signature has been
/// verified.
///
/// # Errors
///
/// - `Error::FormatInvalid` on a wrong delimiter count
/// - `Error::FormatInvalidBase64` on bad alphabet, padding, non-canonical
///   trailing bits or oversized segments
/// - `Error::FormatInvalidJson` if the header is not a JSON object with `alg`
pub fn decode(token: &str) -> Result<DecodedToken<'_>> {
    let segments = split(token)?;

    let header_bytes = base64url::decode_bytes(segments.header, MAX_DECODED_HEADER_SIZE)?;
    let payload_bytes = base64url::decode_bytes(segments.payload, MAX_DECODED_PAYLOAD_SIZE)?;
    let signature = base64url::decode_bytes(segments.signature, MAX_DECODED_SIGNATURE_SIZE)?;

    let header = TokenHeader::from_json(&header_bytes)?;

    Ok(DecodedToken {
        header,
        header_bytes,
        payload_bytes,
        signature,
        signing_input: segments.signing_input,
    })
}

/// Encode header and payload into the signing input `header.payload`
pub fn encode_signing_input(algorithm: AlgorithmId, payload: &Object) -> String {
    let header = TokenHeader::new(algorithm).to_json();
    let payload = json::to_string(payload);

    let mut out = base64url::encode_bytes(header);
    out.push('.');
    out.push_str(&base64url::encode_bytes(payload));
    out
}

/// Append the encoded signature to a signing input
pub fn append_signature(mut signing_input: String, signature: &[u8]) -> String {
    signing_input.push('.');
    signing_input.push_str(&base64url::encode_bytes(signature));
    signing_input
}
