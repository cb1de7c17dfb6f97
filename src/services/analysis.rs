// ABOUTME: Analysis service turning an uploaded food photo into the model's nutrition report
// ABOUTME: Builds the personalised prompt, calls the VisionAnalyzer and optionally logs totals and images
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::FeatureFlags;
use crate::constants::{error_messages, uploads};
use crate::database::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::llm::{
    nutrition_analysis_prompt, AnalysisRequest, ImageInput, ImageMimeType, VisionAnalyzer,
};
use crate::logging::AppLogger;
use crate::models::{AnalysisImageRecord, NutritionRecord, NutritionTotals, UserProfile};
use crate::nutrition::extract_nutritional_values;

/// Uploaded file as received from the multipart form
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    /// File bytes
    pub data: Bytes,
    /// Declared content type, if any
    pub content_type: Option<String>,
    /// Client file name, if any
    pub file_name: Option<String>,
}

/// Result of one analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    /// Model text, verbatim
    pub response: String,
    /// Extracted totals when nutrition tracking is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionTotals>,
}

/// Food image analysis and nutrition logging
#[derive(Clone)]
pub struct AnalysisService {
    analyzer: Arc<dyn VisionAnalyzer>,
    database: Arc<dyn DatabaseProvider>,
    features: FeatureFlags,
}

impl AnalysisService {
    /// Create a service
    #[must_use]
    pub fn new(
        analyzer: Arc<dyn VisionAnalyzer>,
        database: Arc<dyn DatabaseProvider>,
        features: FeatureFlags,
    ) -> Self {
        Self {
            analyzer,
            database,
            features,
        }
    }

    /// Analyse one upload for the given user
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` for a missing or empty upload,
    /// `INVALID_FORMAT` for an unsupported type, any error raised by the
    /// vision model, or a storage error when image storage is enabled
    pub async fn analyze(
        &self,
        profile: &UserProfile,
        upload: Option<ImageUpload>,
    ) -> AppResult<AnalysisOutcome> {
        let upload = upload
            .filter(|upload| !upload.data.is_empty())
            .ok_or_else(|| {
                AppError::missing_field(error_messages::NO_IMAGE_UPLOADED)
                    .with_field(uploads::IMAGE_FIELD)
            })?;

        let mime =
            ImageMimeType::detect(upload.content_type.as_deref(), upload.file_name.as_deref())
                .ok_or_else(|| {
                    AppError::invalid_format(error_messages::UNSUPPORTED_IMAGE_TYPE)
                        .with_field(uploads::IMAGE_FIELD)
                })?;

        let request = AnalysisRequest {
            prompt: nutrition_analysis_prompt(profile.weight, profile.height, profile.age),
            image: ImageInput::new(upload.data, mime),
        };

        debug!(
            username = %profile.username,
            mime = %mime,
            bytes = request.image.data.len(),
            "Submitting food image for analysis"
        );

        let started = Instant::now();
        let result = self.analyzer.analyze(&request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_analysis(
            &profile.username,
            self.analyzer.name(),
            result.is_ok(),
            elapsed_ms,
        );
        let response = result?;

        let totals = (self.features.nutrition_tracking || self.features.store_analysis_images)
            .then(|| extract_nutritional_values(&response));

        if self.features.store_analysis_images {
            let record = AnalysisImageRecord {
                id: Uuid::new_v4(),
                username: profile.username.clone(),
                image: request.image.data.to_vec(),
                mime_type: mime.as_str().to_owned(),
                response: response.clone(),
                totals: totals.unwrap_or_default(),
                created_at: Utc::now(),
            };
            self.database.store_analysis_image(&record).await?;
            info!(username = %profile.username, "Stored analysed image");
        }

        Ok(AnalysisOutcome {
            response,
            nutrition: totals.filter(|_| self.features.nutrition_tracking),
        })
    }

    /// Store the totals of the session's latest analysis
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` when tracking is switched off,
    /// `INVALID_INPUT` when nothing has been analysed yet, or a storage error
    pub async fn track(
        &self,
        username: &str,
        last_analysis: Option<NutritionTotals>,
    ) -> AppResult<NutritionRecord> {
        if !self.features.nutrition_tracking {
            return Err(AppError::unavailable(error_messages::TRACKING_DISABLED));
        }
        let totals = last_analysis
            .ok_or_else(|| AppError::invalid_input(error_messages::NO_ANALYSIS_TO_TRACK))?;

        let record = NutritionRecord {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            totals,
            recorded_at: Utc::now(),
        };
        self.database.record_nutrition(&record).await?;

        info!(username = %username, calories = totals.calories, "Stored nutrition record");
        Ok(record)
    }

    /// Previously tracked meals
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` when tracking is switched off, or a storage error
    pub async fn history(&self, username: &str) -> AppResult<Vec<NutritionRecord>> {
        if !self.features.nutrition_tracking {
            return Err(AppError::unavailable(error_messages::TRACKING_DISABLED));
        }
        self.database.list_nutrition_records(username).await
    }
}
