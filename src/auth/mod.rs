// ABOUTME: Account credential handling for NutriFind
// ABOUTME: Groups the password policy, Argon2 hashing and signup/profile form validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! Credential and form-field checks shared by signup and profile editing.

/// Password policy and Argon2id hashing
pub mod password;
/// Name, username and numeric field validation
pub mod validation;

pub use password::{hash_password, is_valid_password, verify_password};
pub use validation::{is_alphanumeric_username, is_letters_only_name, title_case};
