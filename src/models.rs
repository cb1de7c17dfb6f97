// ABOUTME: Core data models for NutriFind accounts, sessions and nutrition records
// ABOUTME: Defines User, the client-safe UserProfile, partial profile updates and stored nutrition data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # Data Models
//!
//! Records persisted by the credential store plus the projections handed to
//! sessions and HTTP clients. The password hash lives only on [`User`] and is
//! never serialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered account
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, stored title-cased
    pub name: String,
    /// Unique login name
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: String,
    /// Weight in kilograms
    pub weight: f64,
    /// Height in centimetres
    pub height: f64,
    /// Age in years
    pub age: u32,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the profile last changed
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new account from already validated and hashed inputs
    #[must_use]
    pub fn new(
        name: String,
        username: String,
        password_hash: String,
        weight: f64,
        height: f64,
        age: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            username,
            password_hash,
            weight,
            height,
            age,
            created_at: now,
            updated_at: now,
        }
    }

    /// Project to the client-safe profile
    #[must_use]
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            name: self.name.clone(),
            username: self.username.clone(),
            weight: self.weight,
            height: self.height,
            age: self.age,
        }
    }
}

/// Profile snapshot held in a session and returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name
    pub name: String,
    /// Login name
    pub username: String,
    /// Weight in kilograms
    pub weight: f64,
    /// Height in centimetres
    pub height: f64,
    /// Age in years
    pub age: u32,
}

/// Partial profile change; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New Argon2id hash
    pub password_hash: Option<String>,
    /// New weight
    pub weight: Option<f64>,
    /// New height
    pub height: Option<f64>,
    /// New age
    pub age: Option<u32>,
}

/// Nutrient totals extracted from one model response
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    /// Grams of protein
    pub protein: f64,
    /// Grams of carbohydrates
    pub carbs: f64,
    /// Kilocalories
    pub calories: u64,
}

/// Stored totals for one tracked meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub username: String,
    /// Extracted totals
    pub totals: NutritionTotals,
    /// When the record was stored
    pub recorded_at: DateTime<Utc>,
}

/// Stored upload together with what the model said about it
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisImageRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub username: String,
    /// Raw image bytes as uploaded
    pub image: Vec<u8>,
    /// MIME type of the upload
    pub mime_type: String,
    /// Model response text
    pub response: String,
    /// Totals extracted from the response
    pub totals: NutritionTotals,
    /// When the record was stored
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_projection_drops_hash() {
        let user = User::new(
            "Bob Smith".into(),
            "bob1".into(),
            "$argon2id$v=19$secret".into(),
            70.0,
            175.0,
            30,
        );
        let profile = user.to_profile();
        assert_eq!(profile.username, "bob1");
        assert_eq!(profile.age, 30);

        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
    }
}
