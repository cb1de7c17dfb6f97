// ABOUTME: Prompt templates for the vision model
// ABOUTME: Builds the nutritionist instruction personalised with the user's weight, height and age
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

/// Render a measurement the way the profile form shows it (`70.0`, `70.5`)
fn format_measure(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Nutritionist instructions sent alongside every food image
#[must_use]
pub fn nutrition_analysis_prompt(weight: f64, height: f64, age: u32) -> String {
    let weight = format_measure(weight);
    let height = format_measure(height);
    format!(
        "Based on the provided weight ({weight} kg), height ({height} cm), and age ({age}), \
you will act as an expert nutritionist and analyze the food items from the image. Your task is to:

1. Identify and list each food item in the image.
2. For each item, provide the following details in a tabular format:
   - Item name
   - Approximate serving size (in grams)
   - Calories per serving
   - Protein content per serving
   - Other notable nutrients (vitamins, minerals, etc.)

3. Provide an overall assessment of the nutritional value and healthiness of the meal.
4. Suggest potential modifications or substitutions to make the meal more balanced and nutritious, if applicable.
5. Estimate the amount of physical activity required to burn off the calories from the meal.
6. Offer any additional relevant advice or tips regarding digestion, portion control, or meal timing.

Please ensure that your analysis is comprehensive, accurate, and tailored to the provided personal details \
(weight, height, and age). If any crucial information is missing from the image, kindly request \
clarification or additional details from the user."
    )
}
