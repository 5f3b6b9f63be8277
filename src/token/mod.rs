//! Compact token codec and token types

pub mod codec;
mod header;
mod id;
mod verified;

pub use header::TokenHeader;
pub use id::TokenId;
pub use verified::VerifiedToken;

pub(crate) use verified::parse_payload;

use crate::error::Result;
use crate::limits::MAX_DECODED_HEADER_SIZE;
use crate::utils::base64url;

/// Read a token's header without verifying anything
///
/// Useful to pick a key by algorithm. The result is untrusted until the
/// token passes [`Verifier::verify`](crate::Verifier::verify).
pub fn peek_header(token: &str) -> Result<TokenHeader> {
    let segments = codec::split(token)?;
    let bytes = base64url::decode_bytes(segments.header, MAX_DECODED_HEADER_SIZE)?;
    TokenHeader::from_json(&bytes)
}
