// ABOUTME: Password composition policy plus Argon2id hashing and verification
// ABOUTME: Hashing runs on the blocking pool so request handlers never stall the runtime
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # Passwords
//!
//! A password is accepted when it is 8 to 16 characters long, uses only ASCII
//! letters, decimal digits (any script) and the symbols `@$!%*?&`, and
//! contains at least one of each class (lowercase, uppercase, digit, symbol).
//! The same rule applies at signup and when a password is changed.
//!
//! Accepted passwords are stored as salted Argon2id PHC strings.

use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Symbols accepted (and one of which is required) in a password
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

const fn is_password_symbol(c: char) -> bool {
    matches!(c, '@' | '$' | '!' | '%' | '*' | '?' | '&')
}

static PASSWORD_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^[A-Za-z\d{}]{{{},{}}}$",
        regex::escape(PASSWORD_SYMBOLS),
        limits::PASSWORD_MIN_CHARS,
        limits::PASSWORD_MAX_CHARS
    ))
    .ok()
});

static DIGIT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d").ok());

fn is_match(pattern: &'static LazyLock<Option<Regex>>, text: &str) -> bool {
    LazyLock::force(pattern)
        .as_ref()
        .is_some_and(|regex| regex.is_match(text))
}

/// Check a candidate password against the composition policy
#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    is_match(&PASSWORD_PATTERN, password)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && is_match(&DIGIT_PATTERN, password)
        && password.chars().any(is_password_symbol)
}

/// Hash a password with Argon2id and a random salt, returning a PHC string
///
/// # Errors
///
/// Returns an internal error if hashing fails
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Check a password against a stored PHC string
///
/// # Errors
///
/// Returns an internal error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("Invalid stored password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// [`hash_password`] on the blocking thread pool
///
/// # Errors
///
/// Returns an internal error if hashing fails or the blocking task panics
pub async fn hash_password_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking thread pool
///
/// # Errors
///
/// Returns an internal error if the hash is malformed or the blocking task panics
pub async fn verify_password_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_accepts_minimal_valid_password() {
        assert!(is_valid_password("Abcdef1!"));
        assert!(is_valid_password("Zz9&Zz9&Zz9&Zz9&"));
    }

    #[test]
    fn test_policy_rejects_missing_classes() {
        assert!(!is_valid_password("abcdefgh"));
        assert!(!is_valid_password("ABCDEFG1!"));
        assert!(!is_valid_password("abcdefg1!"));
        assert!(!is_valid_password("Abcdefgh!"));
        assert!(!is_valid_password("Abcdefg12"));
    }

    #[test]
    fn test_policy_enforces_length() {
        assert!(!is_valid_password("A1!bcde"));
        assert!(!is_valid_password("Abcdefgh1!abcdefg"));
        assert!(!is_valid_password(""));
    }

    #[test]
    fn test_policy_rejects_foreign_characters() {
        assert!(!is_valid_password("Abcdef1! "));
        assert!(!is_valid_password("Abcdef1#"));
        assert!(!is_valid_password("Abcdéf1!"));
    }

    #[test]
    fn test_policy_counts_any_decimal_digit() {
        assert!(is_valid_password("Abcdef١!"));
        assert!(is_valid_password("Abcdef१२!"));
        assert!(!is_valid_password("Abcdefg½!"));
        assert!(!is_valid_password("Abcdef١١١١١١١١١١!"));
    }

    #[test]
    fn test_hash_roundtrip() {
        let hash = hash_password("Abcdef1!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Abcdef1!", &hash).unwrap());
        assert!(!verify_password("Abcdef1?", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("Abcdef1!").unwrap();
        let second = hash_password("Abcdef1!").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("Abcdef1!", "plaintext").is_err());
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("Abcdef1!".into()).await.unwrap();
        assert!(verify_password_blocking("Abcdef1!".into(), hash)
            .await
            .unwrap());
    }
}
