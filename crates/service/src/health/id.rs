use sha2::{Digest, Sha256};

/// Prefix mixed into every id so ids are not plain endpoint digests.
const ID_SALT: &[u8] = b"health-registry/v1:";

/// Length of a rendered id: hex of a SHA-256 digest.
pub const ID_LEN: usize = 64;

/// Derive the content-addressed id of a normalized endpoint.
pub fn derive_id(endpoint: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ID_SALT);
    hasher.update(endpoint.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether `id` has the shape produced by [`derive_id`].
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
