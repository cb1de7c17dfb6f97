// ABOUTME: Nutrient extraction from free-text vision model output
// ABOUTME: Sums protein grams, carbohydrate grams and calories found by three independent patterns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # Nutrient Extractor
//!
//! The model answers in prose, so totals are recovered with loose patterns:
//!
//! - protein: `<number> grams protein`
//! - carbohydrates: `Carbohydrates (<number>g)`
//! - calories: `<integer> calories`
//!
//! Matching is case-insensitive. Every match in a category is summed; the
//! categories are independent and overlapping mentions are not de-duplicated.
//! A category with no match contributes zero.

use crate::models::NutritionTotals;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static PROTEIN_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: 10.5 grams protein, 3 GRAMS Protein
    Regex::new(r"(?i)([0-9]+\.?[0-9]*)\s*grams\s*protein").ok()
});

static CARBS_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: Carbohydrates (20g), carbohydrates(4.5G)
    Regex::new(r"(?i)Carbohydrates\s*\(([0-9]+\.?[0-9]*)g\)").ok()
});

static CALORIES_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: 300 calories, 52Calories
    Regex::new(r"(?i)([0-9]+)\s*calories").ok()
});

fn captures<'t>(
    pattern: &'static LazyLock<Option<Regex>>,
    text: &'t str,
) -> impl Iterator<Item = &'t str> {
    if pattern.is_none() {
        warn!("Nutrient pattern failed to compile; category reported as zero");
    }
    LazyLock::force(pattern)
        .as_ref()
        .into_iter()
        .flat_map(move |regex| regex.captures_iter(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

fn sum_grams(pattern: &'static LazyLock<Option<Regex>>, text: &str) -> f64 {
    captures(pattern, text)
        .filter_map(|value| value.parse::<f64>().ok())
        .sum()
}

/// Extract summed nutrient totals from model output
#[must_use]
pub fn extract_nutritional_values(text: &str) -> NutritionTotals {
    let calories = captures(&CALORIES_PATTERN, text)
        // Digits only, so the sole parse failure is overflow
        .map(|value| value.parse::<u64>().unwrap_or(u64::MAX))
        .fold(0_u64, u64::saturating_add);

    NutritionTotals {
        protein: sum_grams(&PROTEIN_PATTERN, text),
        carbs: sum_grams(&CARBS_PATTERN, text),
        calories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_each_category() {
        let totals = extract_nutritional_values(
            "Item A has 10.5 grams protein and Carbohydrates (20g) and 300 calories",
        );
        assert!((totals.protein - 10.5).abs() < f64::EPSILON);
        assert!((totals.carbs - 20.0).abs() < f64::EPSILON);
        assert_eq!(totals.calories, 300);
    }

    #[test]
    fn test_no_matches_yields_zero() {
        assert_eq!(
            extract_nutritional_values("A lovely salad with no numbers"),
            NutritionTotals::default()
        );
        assert_eq!(extract_nutritional_values(""), NutritionTotals::default());
    }

    #[test]
    fn test_sums_every_match() {
        let text = "1. Rice: 4 grams protein, Carbohydrates (45g), 200 calories\n\
                    2. Chicken: 25.5 grams protein, Carbohydrates (0g), 165 calories\n\
                    Total: 365 Calories";
        let totals = extract_nutritional_values(text);
        assert!((totals.protein - 29.5).abs() < 1e-9);
        assert!((totals.carbs - 45.0).abs() < 1e-9);
        assert_eq!(totals.calories, 730);
    }

    #[test]
    fn test_case_insensitive_and_compact_spacing() {
        let totals =
            extract_nutritional_values("3GRAMS PROTEIN carbohydrates(2.5G) 52calories");
        assert!((totals.protein - 3.0).abs() < f64::EPSILON);
        assert!((totals.carbs - 2.5).abs() < f64::EPSILON);
        assert_eq!(totals.calories, 52);
    }

    #[test]
    fn test_calorie_overflow_saturates() {
        let totals = extract_nutritional_values("99999999999999999999999 calories and 5 calories");
        assert_eq!(totals.calories, u64::MAX);
    }

    #[test]
    fn test_unrelated_units_are_ignored() {
        let totals = extract_nutritional_values("12 g protein, carbs 30g, 200 kcal");
        assert_eq!(totals, NutritionTotals::default());
    }
}
