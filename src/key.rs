//! Canonical IDs and the keys derived from them.

use uuid::Uuid;

/// Length of a hyphenated UUID, e.g. `3fa85f64-5717-4562-b3fc-2c963f66afa6`.
pub const CANONICAL_ID_LEN: usize = 36;

/// Strip every non-alphanumeric byte (hyphens, in practice) from an ID.
///
/// Over the hex alphabet of canonical IDs this is injective: two distinct
/// UUIDs never normalize to the same key.
pub fn normalize(id: &str) -> Vec<u8> {
    id.bytes().filter(u8::is_ascii_alphanumeric).collect()
}

/// Whether `input` is a full, hyphenated UUID.
pub fn is_canonical_id(input: &str) -> bool {
    input.len() == CANONICAL_ID_LEN && Uuid::try_parse(input).is_ok()
}

/// The first `len` bytes of a normalized key, as a string.
pub fn short_id(key: &[u8], len: usize) -> String {
    String::from_utf8_lossy(&key[..len.min(key.len())]).into_owned()
}
