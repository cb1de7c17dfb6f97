// ABOUTME: Field validation for the signup and edit-profile forms
// ABOUTME: Letters-only names, alphanumeric usernames, title casing and numeric range checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! Form field checks. Each `ensure_*` helper returns an [`AppError`] tagged
//! with the offending field so clients can highlight it.

use crate::errors::{AppError, AppResult};
use std::fmt::Display;
use std::str::FromStr;

/// A name is valid when, ignoring spaces, it is non-empty and all letters
#[must_use]
pub fn is_letters_only_name(name: &str) -> bool {
    let mut letters = name.chars().filter(|c| *c != ' ').peekable();
    letters.peek().is_some() && letters.all(char::is_alphabetic)
}

/// A username is valid when it is non-empty and all letters or digits
#[must_use]
pub fn is_alphanumeric_username(username: &str) -> bool {
    !username.is_empty() && username.chars().all(char::is_alphanumeric)
}

/// Uppercase the first letter of every word and lowercase the rest
///
/// A word starts at any letter not preceded by another letter, so
/// `"mary-jane o'neil"` becomes `"Mary-Jane O'Neil"`.
#[must_use]
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_is_letter = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// A numeric form field counts as unfilled when blank or equal to zero
///
/// Text that is not a number is treated as filled; [`parse_number`] reports it.
#[must_use]
pub fn is_blank_or_zero(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().is_ok_and(|value| value == 0.0)
}

/// Parse an optional numeric form field; blank input yields `None`
///
/// # Errors
///
/// Returns `INVALID_FORMAT` when the input is present but not a number
pub fn parse_number<T: FromStr>(field: &str, raw: &str) -> AppResult<Option<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(|_| {
        AppError::invalid_format(format!("{} should be a number", capitalize(field)))
            .with_field(field)
    })
}

/// Reject values outside `bounds` (inclusive); NaN is always rejected
///
/// # Errors
///
/// Returns `VALUE_OUT_OF_RANGE` naming the accepted bounds
pub fn ensure_in_range<T: PartialOrd + Display + Copy>(
    field: &str,
    value: T,
    bounds: (T, T),
) -> AppResult<()> {
    let (min, max) = bounds;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(AppError::out_of_range(format!(
            "{} should be between {min} and {max}",
            capitalize(field)
        ))
        .with_field(field))
    }
}

/// Reject text longer than `max` characters
///
/// # Errors
///
/// Returns `VALUE_OUT_OF_RANGE` naming the limit
pub fn ensure_max_chars(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() <= max {
        Ok(())
    } else {
        Err(AppError::out_of_range(format!(
            "{} should be at most {max} characters",
            capitalize(field)
        ))
        .with_field(field))
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
