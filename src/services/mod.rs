// ABOUTME: Business logic behind the NutriFind pages
// ABOUTME: Account lifecycle (signup, login, profile edits) and food image analysis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! Services hold the rules; route handlers only translate HTTP to service
//! calls and update the session.

/// Signup, login and profile editing
pub mod accounts;
/// Food image analysis and nutrition tracking
pub mod analysis;

pub use accounts::{AccountService, EditProfileForm, LoginForm, SignupForm};
pub use analysis::{AnalysisOutcome, AnalysisService, ImageUpload};
