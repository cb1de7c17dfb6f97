// ABOUTME: Route module organization for the NutriFind HTTP surface
// ABOUTME: Assembles page, account, profile, analysis and health routes into one axum Router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! Route module for `NutriFind`
//!
//! Each domain module contains only route definitions and thin handlers that
//! delegate to the services. Every route except health checks runs behind the
//! session middleware.

/// Page-rendering routes (`GET /?page=`)
pub mod pages;
/// Login, signup and logout
pub mod auth;
/// Profile editing
pub mod profile;
/// Food image analysis and tracking
pub mod analysis;
/// Health check routes
pub mod health;

pub use analysis::AnalysisRoutes;
pub use auth::AuthRoutes;
pub use health::HealthRoutes;
pub use pages::{PageRoutes, PageView};
pub use profile::ProfileRoutes;

use std::sync::Arc;

use axum::{middleware, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::models::UserProfile;
use crate::pages::Page;
use crate::resources::ServerResources;
use crate::session::session_middleware;

/// Body returned by form actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Message shown to the user
    pub message: String,
    /// Page the client should navigate to next
    pub page: Page,
    /// Profile after the action, where relevant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

impl ActionResponse {
    /// Message plus next page
    #[must_use]
    pub fn new(message: impl Into<String>, page: Page) -> Self {
        Self {
            message: message.into(),
            page,
            profile: None,
        }
    }

    /// Attach the resulting profile
    #[must_use]
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Build the complete application router
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let session_layer =
        middleware::from_fn_with_state(Arc::clone(&resources.sessions), session_middleware);

    let app_routes = Router::new()
        .merge(PageRoutes::routes(Arc::clone(resources)))
        .merge(AuthRoutes::routes(Arc::clone(resources)))
        .merge(ProfileRoutes::routes(Arc::clone(resources)))
        .merge(AnalysisRoutes::routes(Arc::clone(resources)))
        .layer(session_layer);

    Router::new()
        .merge(app_routes)
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .layer(TraceLayer::new_for_http())
}
