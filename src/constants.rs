// ABOUTME: System-wide constants for NutriFind user messages, form limits and defaults
// ABOUTME: Keeps user-facing strings and numeric bounds in one place for handlers and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # Constants Module
//!
//! Hardcoded values shared by the services, routes and configuration loader.

/// Service identity used in logs
pub mod service_names {
    /// Name reported by the server binary and logging setup
    pub const NUTRIFIND_SERVER: &str = "nutrifind-server";
    /// Product name shown on the login page
    pub const PRODUCT_NAME: &str = "NutriFind";
}

/// Messages reported inline to the user
pub mod error_messages {
    /// Any signup field left empty
    pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";
    /// Name contains something other than letters and spaces
    pub const NAME_LETTERS_ONLY: &str = "Name should contain only letters";
    /// Username contains something other than letters and digits
    pub const USERNAME_ALPHANUMERIC: &str = "Username should be alphanumeric";
    /// Password fails the composition policy
    pub const PASSWORD_POLICY: &str =
        "Password should contain upper, lower, numbers and symbols. Length 8 to 16.";
    /// Password and confirmation differ
    pub const PASSWORDS_DO_NOT_MATCH: &str = "The passwords do not match";
    /// Username taken
    pub const USERNAME_EXISTS: &str = "Username already exists. Please choose a different one.";
    /// Login failed, deliberately not saying which field was wrong
    pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";
    /// Analysis requested without a file
    pub const NO_IMAGE_UPLOADED: &str = "No Image Uploaded.";
    /// Upload with a type other than jpg/jpeg/png/webp
    pub const UNSUPPORTED_IMAGE_TYPE: &str =
        "Unsupported image type. Please upload a jpg, jpeg, png or webp file.";
    /// Tracking endpoint hit with the feature switched off
    pub const TRACKING_DISABLED: &str = "Nutrition tracking is disabled";
    /// Tracking endpoint hit before any analysis in this session
    pub const NO_ANALYSIS_TO_TRACK: &str = "Analyze a food image before storing nutritional data";
}

/// Messages reported on success
pub mod success_messages {
    /// Signup stored the user
    pub const USER_REGISTERED: &str = "User registered successfully! Go back to Login";
    /// Login matched a user
    pub const LOGIN_SUCCESSFUL: &str = "Login successful!";
    /// Profile update persisted
    pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
    /// Session destroyed
    pub const LOGGED_OUT: &str = "Logged out";
    /// Nutrition totals persisted
    pub const NUTRITION_STORED: &str = "Nutritional data stored successfully";
}

/// Bounds carried over from the signup and profile forms
pub mod limits {
    /// Maximum characters in a display name
    pub const NAME_MAX_CHARS: usize = 50;
    /// Maximum characters in a username
    pub const USERNAME_MAX_CHARS: usize = 16;
    /// Minimum password length
    pub const PASSWORD_MIN_CHARS: usize = 8;
    /// Maximum password length
    pub const PASSWORD_MAX_CHARS: usize = 16;
    /// Weight bounds in kilograms
    pub const WEIGHT_KG: (f64, f64) = (1.0, 300.0);
    /// Height bounds in centimetres
    pub const HEIGHT_CM: (f64, f64) = (50.0, 250.0);
    /// Age bounds in years
    pub const AGE_YEARS: (u32, u32) = (1, 120);
    /// Default upload limit (10 MiB)
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
}

/// Session cookie and store defaults
pub mod session {
    /// Cookie carrying the opaque session token
    pub const COOKIE_NAME: &str = "nutrifind_session";
    /// Default inactivity expiry (one day)
    pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;
    /// Longest accepted inactivity expiry (one year)
    pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;
    /// Default upper bound on live sessions
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
}

/// Upload surface
pub mod uploads {
    /// Multipart field carrying the food photo
    pub const IMAGE_FIELD: &str = "image";
    /// File extensions accepted by the uploader
    pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
}

/// Environment variable defaults
pub mod defaults {
    /// HTTP port
    pub const HTTP_PORT: u16 = 8080;
    /// Bind address
    pub const HOST: &str = "0.0.0.0";
    /// Credential store location
    pub const DATABASE_URL: &str = "sqlite:./data/nutrifind.db";
    /// Vision model
    pub const GEMINI_MODEL: &str = "gemini-2.5-flash";
    /// Generative Language API base URL
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
}
