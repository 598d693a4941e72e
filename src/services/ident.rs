//! Short random identifiers for browsers, upload sessions, and chats.

use rand::Rng;

pub const ID_LEN: usize = 10;
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a 10-character alphanumeric identifier.
#[must_use]
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ID_ALPHABET.len());
            ID_ALPHABET[idx] as char
        })
        .collect()
}

/// Whether `raw` has the shape of an identifier produced by [`generate_id`].
#[must_use]
pub fn is_valid_id(raw: &str) -> bool {
    raw.len() == ID_LEN && raw.bytes().all(|b| ID_ALPHABET.contains(&b))
}

/// Keep `raw` when it is a well-formed id, otherwise mint a fresh one.
#[must_use]
pub fn reuse_or_generate(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(id) if is_valid_id(id) => id.to_owned(),
        _ => generate_id(),
    }
}

#[cfg(test)]
#[path = "ident_test.rs"]
mod tests;
