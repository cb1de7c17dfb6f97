// ABOUTME: Analysis routes for food photo upload, nutrition tracking and tracked history
// ABOUTME: Parses the multipart upload, delegates to AnalysisService and keeps the latest totals in the session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::debug;

use crate::constants::{success_messages, uploads};
use crate::errors::{AppError, AppResult};
use crate::models::{NutritionRecord, UserProfile};
use crate::resources::ServerResources;
use crate::services::ImageUpload;
use crate::session::SessionHandle;

/// Body returned after storing totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackResponse {
    /// Confirmation message
    pub message: String,
    /// Stored record
    pub record: NutritionRecord,
}

/// Body listing tracked meals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Records, oldest first
    pub records: Vec<NutritionRecord>,
}

/// Analysis routes
pub struct AnalysisRoutes;

impl AnalysisRoutes {
    /// Create all analysis routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let upload_limit = resources.config.max_upload_bytes;

        let upload = Router::new()
            .route("/app/analyze", post(Self::handle_analyze))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(upload_limit));

        Router::new()
            .merge(upload)
            .route("/app/track", post(Self::handle_track))
            .route("/app/history", get(Self::handle_history))
            .with_state(resources)
    }

    /// Analyse the uploaded food photo
    async fn handle_analyze(
        State(resources): State<Arc<ServerResources>>,
        session: SessionHandle,
        multipart: Multipart,
    ) -> Result<Response, AppError> {
        let profile = logged_in_profile(&resources, &session).await?;
        let upload = read_image_field(multipart).await?;

        let outcome = resources.analysis().analyze(&profile, upload).await?;
        if let Some(totals) = outcome.nutrition {
            session.set_last_analysis(totals).await?;
        }

        Ok((StatusCode::OK, Json(outcome)).into_response())
    }

    /// Store the totals of the latest analysis
    async fn handle_track(
        State(resources): State<Arc<ServerResources>>,
        session: SessionHandle,
    ) -> Result<Response, AppError> {
        let profile = logged_in_profile(&resources, &session).await?;
        let last_analysis = session.snapshot().await.last_analysis;

        let record = resources
            .analysis()
            .track(&profile.username, last_analysis)
            .await?;

        let body = TrackResponse {
            message: success_messages::NUTRITION_STORED.to_owned(),
            record,
        };
        Ok((StatusCode::CREATED, Json(body)).into_response())
    }

    /// List tracked meals
    async fn handle_history(
        State(resources): State<Arc<ServerResources>>,
        session: SessionHandle,
    ) -> Result<Response, AppError> {
        let profile = logged_in_profile(&resources, &session).await?;
        let records = resources.analysis().history(&profile.username).await?;

        Ok((StatusCode::OK, Json(HistoryResponse { records })).into_response())
    }
}

async fn logged_in_profile(
    resources: &ServerResources,
    session: &SessionHandle,
) -> AppResult<UserProfile> {
    let username = session.snapshot().await.username;
    resources.accounts().current_user(username.as_deref()).await
}

/// First `image` field of the form, if present
async fn read_image_field(mut multipart: Multipart) -> AppResult<Option<ImageUpload>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(uploads::IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let data = field.bytes().await.map_err(multipart_error)?;
        debug!(
            file_name = ?file_name,
            content_type = ?content_type,
            bytes = data.len(),
            "Received image upload"
        );

        return Ok(Some(ImageUpload {
            data,
            content_type,
            file_name,
        }));
    }
    Ok(None)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::out_of_range("Uploaded image is too large").with_field(uploads::IMAGE_FIELD)
    } else {
        AppError::invalid_input(format!("Malformed upload: {}", err.body_text()))
    }
}
