// ABOUTME: Profile routes for the edit-profile form submission
// ABOUTME: Requires a logged-in session and refreshes the session snapshot after a successful save
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};

use crate::constants::success_messages;
use crate::errors::AppError;
use crate::pages::Page;
use crate::resources::ServerResources;
use crate::routes::ActionResponse;
use crate::services::EditProfileForm;
use crate::session::SessionHandle;

/// Profile routes
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// Create all profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/edit_profile", post(Self::handle_edit_profile))
            .with_state(resources)
    }

    /// Apply an edit and return to the profile page
    async fn handle_edit_profile(
        State(resources): State<Arc<ServerResources>>,
        session: SessionHandle,
        Form(form): Form<EditProfileForm>,
    ) -> Result<Response, AppError> {
        let accounts = resources.accounts();
        let snapshot = session.snapshot().await;
        let current = accounts.current_user(snapshot.username.as_deref()).await?;

        let profile = accounts.edit_profile(&current.username, form).await?;
        session.refresh_profile(profile.clone()).await?;

        let body = ActionResponse::new(success_messages::PROFILE_UPDATED, Page::Profile)
            .with_profile(profile);
        Ok((StatusCode::OK, Json(body)).into_response())
    }
}
