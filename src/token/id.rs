use crate::error::Result;
use crate::limits::MAX_DECODED_SIGNATURE_SIZE;
use crate::token::codec;
use crate::utils::base64url;

use sha2::{Digest, Sha256};
use std::fmt;

/// Revocation identifier of a token
///
/// SHA-256 of the decoded signature bytes, base64url encoded (43 characters).
/// Memory per entry is fixed regardless of payload or signature size, and two
/// tokens only share an id if they share a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(String);

impl TokenId {
    /// Derive the id from raw signature bytes
    pub fn from_signature(signature: &[u8]) -> Self {
        Self(base64url::encode_bytes(Sha256::digest(signature)))
    }

    /// Derive the id from compact token text
    ///
    /// Only the signature segment is decoded; nothing is verified.
    pub fn from_token(token: &str) -> Result<Self> {
        let segments = codec::split(token)?;
        let signature = base64url::decode_bytes(segments.signature, MAX_DECODED_SIGNATURE_SIZE)?;
        Ok(Self::from_signature(&signature))
    }

    /// The encoded id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TokenId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
