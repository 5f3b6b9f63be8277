//! Bounds validation utilities
//!
//! Timestamp range checks, leeway arithmetic with overflow protection and
//! field size limits.

use crate::error::{Error, Result};
use crate::limits::{MAX_CLAIM_STRING_LENGTH, MAX_TIMESTAMP, MIN_TIMESTAMP};

/// Check if timestamp is within acceptable bounds
pub(crate) fn validate_timestamp_bounds(value: i64) -> Result<()> {
    if !(MIN_TIMESTAMP..=MAX_TIMESTAMP).contains(&value) {
        return Err(Error::TimestampOutOfBounds {
            value,
            min: MIN_TIMESTAMP,
            max: MAX_TIMESTAMP,
        });
    }
    Ok(())
}

/// Apply leeway to a timestamp with overflow protection
pub(crate) fn apply_leeway(timestamp: i64, leeway_seconds: u64, add: bool) -> Result<i64> {
    let leeway = i64::try_from(leeway_seconds).map_err(|_| Error::TimestampOverflow)?;
    if add {
        timestamp.checked_add(leeway)
    } else {
        timestamp.checked_sub(leeway)
    }
    .ok_or(Error::TimestampOverflow)
}

/// Validate header field size
pub(crate) fn validate_field_size(field: &str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::HeaderFieldTooLong {
            field: field.into(),
            length: value.len(),
            max,
        });
    }
    Ok(())
}

/// Validate a claim string length
pub(crate) fn validate_claim_string(claim: &str, value: &str) -> Result<()> {
    if value.len() > MAX_CLAIM_STRING_LENGTH {
        return Err(Error::ClaimStringTooLong {
            claim: claim.into(),
            length: value.len(),
            max: MAX_CLAIM_STRING_LENGTH,
        });
    }
    Ok(())
}
