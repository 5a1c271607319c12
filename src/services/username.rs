//! Username syntax rules.
//!
//! Usernames are validated locally before any availability lookup or claim
//! request so malformed names never cost a network round-trip. The accepted
//! shape is alphanumeric plus underscore, with a configurable length bound.

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameError {
    TooShort,
    TooLong,
    BadCharacter,
}

impl std::fmt::Display for UsernameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort => write!(f, "username must be at least {USERNAME_MIN_LEN} characters"),
            Self::TooLong => write!(f, "username is too long"),
            Self::BadCharacter => write!(f, "username may only contain letters, digits, and underscore"),
        }
    }
}

/// Validate a username against the default length bound.
///
/// # Errors
///
/// Returns the first rule the candidate violates.
pub fn validate_username(candidate: &str) -> Result<(), UsernameError> {
    validate_username_with_max(candidate, USERNAME_MAX_LEN)
}

/// Validate a username against an explicit maximum length.
///
/// The hosted deployment historically capped usernames at 20 characters
/// while the REST backend allows 30, so the bound is a parameter.
///
/// # Errors
///
/// Returns the first rule the candidate violates.
pub fn validate_username_with_max(candidate: &str, max_len: usize) -> Result<(), UsernameError> {
    if candidate.len() < USERNAME_MIN_LEN {
        return Err(UsernameError::TooShort);
    }
    if candidate.len() > max_len {
        return Err(UsernameError::TooLong);
    }
    if !candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(UsernameError::BadCharacter);
    }
    Ok(())
}

#[must_use]
pub fn is_valid_username(candidate: &str) -> bool {
    validate_username(candidate).is_ok()
}

#[cfg(test)]
#[path = "username_test.rs"]
mod tests;
