use super::*;

#[test]
fn alphabet_is_62_alphanumerics() {
    assert_eq!(ID_ALPHABET.len(), 62);
    assert!(ID_ALPHABET.iter().all(u8::is_ascii_alphanumeric));
}

#[test]
fn generate_id_is_10_chars() {
    assert_eq!(generate_id().len(), ID_LEN);
}

#[test]
fn generate_id_draws_from_alphabet() {
    for _ in 0..50 {
        let id = generate_id();
        assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)), "unexpected char in {id}");
    }
}

#[test]
fn generate_id_two_calls_differ() {
    assert_ne!(generate_id(), generate_id());
}

#[test]
fn is_valid_id_accepts_generated() {
    assert!(is_valid_id(&generate_id()));
}

#[test]
fn is_valid_id_rejects_wrong_length() {
    assert!(!is_valid_id("abc"));
    assert!(!is_valid_id("abcdefghijk"));
    assert!(!is_valid_id(""));
}

#[test]
fn is_valid_id_rejects_symbols() {
    assert!(!is_valid_id("abcde-ghij"));
    assert!(!is_valid_id("abcdé_ghi"));
}

#[test]
fn reuse_or_generate_keeps_valid() {
    assert_eq!(reuse_or_generate(Some("Ab3dEf7hIj")), "Ab3dEf7hIj");
}

#[test]
fn reuse_or_generate_trims_input() {
    assert_eq!(reuse_or_generate(Some("  Ab3dEf7hIj ")), "Ab3dEf7hIj");
}

#[test]
fn reuse_or_generate_replaces_invalid() {
    let id = reuse_or_generate(Some("nope"));
    assert_ne!(id, "nope");
    assert!(is_valid_id(&id));
}

#[test]
fn reuse_or_generate_fills_missing() {
    assert!(is_valid_id(&reuse_or_generate(None)));
}
