use super::*;

#[test]
fn accepts_basic_names() {
    assert!(is_valid_username("demo_user"));
    assert!(is_valid_username("abc"));
    assert!(is_valid_username("A_1"));
    assert!(is_valid_username("ryuza2024"));
}

#[test]
fn boundary_lengths() {
    assert_eq!(validate_username("ab"), Err(UsernameError::TooShort)); // 2
    assert!(validate_username("abc").is_ok()); // 3
    assert!(validate_username(&"a".repeat(30)).is_ok()); // 30
    assert_eq!(validate_username(&"a".repeat(31)), Err(UsernameError::TooLong)); // 31
}

#[test]
fn rejects_bad_characters() {
    assert_eq!(validate_username("demo user"), Err(UsernameError::BadCharacter));
    assert_eq!(validate_username("demo-user"), Err(UsernameError::BadCharacter));
    assert_eq!(validate_username("démo"), Err(UsernameError::BadCharacter));
    assert_eq!(validate_username("demo!"), Err(UsernameError::BadCharacter));
    assert_eq!(validate_username("   "), Err(UsernameError::BadCharacter));
}

#[test]
fn rejects_empty() {
    assert_eq!(validate_username(""), Err(UsernameError::TooShort));
}

#[test]
fn custom_max_length() {
    let name = "a".repeat(25);
    assert!(validate_username_with_max(&name, 30).is_ok());
    assert_eq!(validate_username_with_max(&name, 20), Err(UsernameError::TooLong));
    assert!(validate_username_with_max(&"a".repeat(20), 20).is_ok());
}

#[test]
fn underscore_only_is_accepted() {
    assert!(is_valid_username("___"));
}
