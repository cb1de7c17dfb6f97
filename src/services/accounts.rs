// ABOUTME: Account service implementing signup, login and profile editing rules
// ABOUTME: Validates form input in a fixed order and writes through the DatabaseProvider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password_blocking, is_valid_password};
use crate::auth::validation::{
    ensure_in_range, ensure_max_chars, is_alphanumeric_username, is_blank_or_zero,
    is_letters_only_name, parse_number, title_case,
};
use crate::constants::{error_messages, limits};
use crate::database::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{ProfileUpdate, User, UserProfile};

/// Signup form fields; numbers arrive as text so blanks can be reported
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    /// Display name
    pub name: String,
    /// Login name
    pub username: String,
    /// Chosen password
    pub password: String,
    /// Repeated password
    pub confirm_password: String,
    /// Weight in kilograms
    pub weight: String,
    /// Height in centimetres
    pub height: String,
    /// Age in years
    pub age: String,
}

/// Login form fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

/// Edit-profile form fields; an empty password keeps the current one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditProfileForm {
    /// Display name
    pub name: String,
    /// New password, or empty
    pub password: String,
    /// Weight in kilograms
    pub weight: String,
    /// Height in centimetres
    pub height: String,
    /// Age in years
    pub age: String,
}

/// Parsed biometric fields
struct Measurements {
    weight: f64,
    height: f64,
    age: u32,
}

impl Measurements {
    /// True when any of the three is blank or zero
    fn any_unfilled(weight: &str, height: &str, age: &str) -> bool {
        [weight, height, age].into_iter().any(is_blank_or_zero)
    }

    /// Parse all three once they are known to be filled
    fn parse(weight: &str, height: &str, age: &str) -> AppResult<Self> {
        let weight = parse_number::<f64>("weight", weight)?.ok_or_else(fill_all_fields)?;
        let height = parse_number::<f64>("height", height)?.ok_or_else(fill_all_fields)?;
        let age = parse_number::<u32>("age", age)?.ok_or_else(fill_all_fields)?;
        Ok(Self {
            weight,
            height,
            age,
        })
    }

    fn ensure_limits(&self) -> AppResult<()> {
        ensure_in_range("weight", self.weight, limits::WEIGHT_KG)?;
        ensure_in_range("height", self.height, limits::HEIGHT_CM)?;
        ensure_in_range("age", self.age, limits::AGE_YEARS)
    }
}

fn fill_all_fields() -> AppError {
    AppError::missing_field(error_messages::FILL_ALL_FIELDS)
}

fn name_letters_only() -> AppError {
    AppError::invalid_input(error_messages::NAME_LETTERS_ONLY).with_field("name")
}

fn password_policy() -> AppError {
    AppError::invalid_input(error_messages::PASSWORD_POLICY).with_field("password")
}

/// Account lifecycle operations
#[derive(Clone)]
pub struct AccountService {
    database: Arc<dyn DatabaseProvider>,
}

impl AccountService {
    /// Create a service over a credential store
    #[must_use]
    pub fn new(database: Arc<dyn DatabaseProvider>) -> Self {
        Self { database }
    }

    /// Register a new account
    ///
    /// Checks run in order and the first failure is reported: all fields
    /// present (blank or zero measurements count as missing), name
    /// letters-only, username alphanumeric, password policy, passwords
    /// match, measurements numeric, field limits, username free. The account is not
    /// logged in.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, `RESOURCE_ALREADY_EXISTS` for a
    /// taken username, or a storage error
    pub async fn signup(&self, form: SignupForm) -> AppResult<UserProfile> {
        info!(username = %form.username, "User signup attempt");

        let text_fields = [
            &form.name,
            &form.username,
            &form.password,
            &form.confirm_password,
        ];
        if text_fields.iter().any(|field| field.is_empty())
            || Measurements::any_unfilled(&form.weight, &form.height, &form.age)
        {
            return Err(fill_all_fields());
        }

        if !is_letters_only_name(&form.name) {
            return Err(name_letters_only());
        }
        if !is_alphanumeric_username(&form.username) {
            return Err(
                AppError::invalid_input(error_messages::USERNAME_ALPHANUMERIC)
                    .with_field("username"),
            );
        }
        if !is_valid_password(&form.password) {
            return Err(password_policy());
        }
        if form.password != form.confirm_password {
            return Err(
                AppError::invalid_input(error_messages::PASSWORDS_DO_NOT_MATCH)
                    .with_field("confirm_password"),
            );
        }

        let measurements = Measurements::parse(&form.weight, &form.height, &form.age)?;
        ensure_max_chars("name", &form.name, limits::NAME_MAX_CHARS)?;
        ensure_max_chars("username", &form.username, limits::USERNAME_MAX_CHARS)?;
        measurements.ensure_limits()?;

        if self
            .database
            .find_user_by_username(&form.username)
            .await?
            .is_some()
        {
            AppLogger::log_auth_event(&form.username, "signup", false, Some("username taken"));
            return Err(
                AppError::already_exists(error_messages::USERNAME_EXISTS).with_field("username")
            );
        }

        let password_hash = hash_password_blocking(form.password).await?;
        let user = User::new(
            title_case(&form.name),
            form.username,
            password_hash,
            measurements.weight,
            measurements.height,
            measurements.age,
        );
        self.database.insert_user(&user).await?;

        AppLogger::log_auth_event(&user.username, "signup", true, None);
        Ok(user.to_profile())
    }

    /// Check credentials and return the matching profile
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` when no user matches the pair, without saying
    /// which half was wrong
    pub async fn login(&self, form: &LoginForm) -> AppResult<UserProfile> {
        info!(username = %form.username, "User login attempt");

        let user = self
            .database
            .find_user_by_credentials(&form.username, &form.password)
            .await?;

        match user {
            Some(user) => {
                AppLogger::log_auth_event(&user.username, "login", true, None);
                Ok(user.to_profile())
            }
            None => {
                AppLogger::log_auth_event(&form.username, "login", false, None);
                Err(AppError::auth_invalid(error_messages::INVALID_CREDENTIALS))
            }
        }
    }

    /// Stored profile for a session's username
    ///
    /// # Errors
    ///
    /// Returns `AUTH_REQUIRED` when there is no username or it no longer
    /// names a stored user
    pub async fn current_user(&self, username: Option<&str>) -> AppResult<UserProfile> {
        let username = username.ok_or_else(AppError::auth_required)?;
        self.database
            .find_user_by_username(username)
            .await?
            .map(|user| user.to_profile())
            .ok_or_else(AppError::auth_required)
    }

    /// Apply an edit-profile submission for a logged-in user
    ///
    /// Name, weight, height and age are always written (name title-cased);
    /// the password hash changes only when a non-empty password is given.
    /// A rejected submission writes nothing.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure or a storage error
    pub async fn edit_profile(
        &self,
        username: &str,
        form: EditProfileForm,
    ) -> AppResult<UserProfile> {
        if !is_letters_only_name(&form.name) {
            return Err(name_letters_only());
        }
        if !form.password.is_empty() && !is_valid_password(&form.password) {
            return Err(password_policy());
        }

        if Measurements::any_unfilled(&form.weight, &form.height, &form.age) {
            return Err(fill_all_fields());
        }
        let measurements = Measurements::parse(&form.weight, &form.height, &form.age)?;
        ensure_max_chars("name", &form.name, limits::NAME_MAX_CHARS)?;
        measurements.ensure_limits()?;

        let password_hash = if form.password.is_empty() {
            None
        } else {
            Some(hash_password_blocking(form.password).await?)
        };
        let changed_password = password_hash.is_some();

        let update = ProfileUpdate {
            name: Some(title_case(&form.name)),
            password_hash,
            weight: Some(measurements.weight),
            height: Some(measurements.height),
            age: Some(measurements.age),
        };
        let user = self.database.update_user(username, &update).await?;

        AppLogger::log_auth_event(
            username,
            "profile_update",
            true,
            changed_password.then_some("password changed"),
        );
        Ok(user.to_profile())
    }
}
