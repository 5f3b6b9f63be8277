//! Size limit constants for input validation

/// Maximum length for a JWT token string (64KB)
pub(crate) const MAX_TOKEN_LENGTH: usize = 64 * 1024;

// ============================================================================
// Decoded segment size limits
// ============================================================================

/// Maximum size for decoded JWT header JSON (8KB)
/// Headers are typically small (< 1KB), but we allow reasonable margin
pub(crate) const MAX_DECODED_HEADER_SIZE: usize = 8 * 1024;

/// Maximum size for decoded JWT payload JSON (64KB)
/// Payloads can contain custom claims, but must be bounded to prevent DoS
pub(crate) const MAX_DECODED_PAYLOAD_SIZE: usize = 64 * 1024;

/// Maximum size for decoded signature bytes (1KB)
/// RSA-8192 signatures are 1024 bytes, the largest supported scheme
pub(crate) const MAX_DECODED_SIGNATURE_SIZE: usize = 1024;

// ============================================================================
// Claim and header limits
// ============================================================================

/// Maximum length for claim string values (2048 bytes)
/// Applies to iss, sub, aud entries and jti
pub(crate) const MAX_CLAIM_STRING_LENGTH: usize = 2048;

/// Maximum length for algorithm (alg) field in JWT header (16 bytes)
pub(crate) const MAX_ALG_LENGTH: usize = 16;

/// Minimum valid Unix timestamp (1970-01-01 00:00:00 UTC)
pub(crate) const MIN_TIMESTAMP: i64 = 0;

/// Maximum valid Unix timestamp (2100-01-01 00:00:00 UTC)
pub(crate) const MAX_TIMESTAMP: i64 = 4_102_444_800;

// ============================================================================
// Validation bounds
// ============================================================================

/// Maximum leeway (300 seconds = 5 minutes)
/// Larger values would effectively disable expiration checks
pub const MAX_LEEWAY_SECONDS: u64 = 300;

/// Maximum token age (1 year)
pub(crate) const MAX_MAX_AGE_SECONDS: u64 = 86400 * 365;

/// Minimum RSA modulus size accepted for signing and verification
pub(crate) const MIN_RSA_MODULUS_BITS: usize = 2048;
