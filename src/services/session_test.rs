use super::*;

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_is_unique() {
    assert_ne!(generate_token(), generate_token());
}

#[test]
fn hash_token_is_stable_and_distinct() {
    let a = hash_token("abc");
    let b = hash_token("abc");
    let c = hash_token("abd");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
}

#[test]
fn hash_token_differs_from_input() {
    let token = generate_token();
    assert_ne!(hash_token(&token), token);
}

#[test]
fn bytes_to_hex_known_value() {
    assert_eq!(bytes_to_hex(&[0x00, 0xff, 0x10]), "00ff10");
    assert_eq!(bytes_to_hex(&[]), "");
}
