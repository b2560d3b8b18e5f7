//! Binary encoding of the persisted check collection.
//!
//! The file body is the bincode (standard config) encoding of `Vec<Check>`.
//! A zero-length body is a valid, empty collection.

use models::Check;

use crate::errors::StoreError;

/// Upper bound on bytes a decode may claim, so a bad length prefix cannot
/// request an unbounded allocation.
pub const MAX_DECODE_BYTES: usize = 64 * 1024 * 1024;

pub fn encode(checks: &[Check]) -> Result<Vec<u8>, StoreError> {
    bincode::serde::encode_to_vec(checks, bincode::config::standard())
        .map_err(|e| StoreError::Encode(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<Vec<Check>, StoreError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let (checks, read): (Vec<Check>, usize) =
        bincode::serde::decode_from_slice(bytes, bincode::config::standard().with_limit::<MAX_DECODE_BYTES>())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    if read != bytes.len() {
        return Err(StoreError::Corrupt(format!(
            "{} trailing bytes after {} checks",
            bytes.len() - read,
            checks.len()
        )));
    }
    Ok(checks)
}
