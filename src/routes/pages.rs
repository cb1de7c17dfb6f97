// ABOUTME: Page routes rendering the view chosen by the page controller
// ABOUTME: GET / resolves ?page= against the session and returns the matching view model as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{service_names, uploads};
use crate::errors::{AppError, ErrorCode};
use crate::models::{NutritionTotals, UserProfile};
use crate::pages::{AuthState, Page};
use crate::resources::ServerResources;
use crate::session::SessionHandle;

/// `?page=` query
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Requested page identifier
    pub page: Option<String>,
}

/// View model for each page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    /// Login form
    Login {
        /// Product title shown above the form
        title: String,
    },
    /// Registration form
    Signup,
    /// Read-only profile
    Profile {
        /// Stored profile
        profile: UserProfile,
    },
    /// Edit form pre-filled with stored values
    EditProfile {
        /// Current display name
        name: String,
        /// Current weight
        weight: f64,
        /// Current height
        height: f64,
        /// Current age
        age: u32,
    },
    /// Food image analysis
    #[serde(rename = "app")]
    Main {
        /// Logged-in user
        username: String,
        /// Extensions the uploader accepts
        accepted_types: Vec<String>,
        /// Whether totals can be stored
        nutrition_tracking: bool,
        /// Totals from the latest analysis in this session
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_analysis: Option<NutritionTotals>,
    },
}

impl PageView {
    /// Page this view renders
    #[must_use]
    pub const fn page(&self) -> Page {
        match self {
            Self::Login { .. } => Page::Login,
            Self::Signup => Page::Signup,
            Self::Profile { .. } => Page::Profile,
            Self::EditProfile { .. } => Page::EditProfile,
            Self::Main { .. } => Page::Main,
        }
    }
}

/// Page routes
pub struct PageRoutes;

impl PageRoutes {
    /// Create all page routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::handle_page))
            .with_state(resources)
    }

    /// Resolve and render the requested page
    async fn handle_page(
        State(resources): State<Arc<ServerResources>>,
        session: SessionHandle,
        Query(query): Query<PageQuery>,
    ) -> Result<Response, AppError> {
        let snapshot = session.snapshot().await;

        // A username whose account has gone counts as anonymous
        let profile = match resources
            .accounts()
            .current_user(snapshot.username.as_deref())
            .await
        {
            Ok(profile) => Some(profile),
            Err(err) if err.code == ErrorCode::AuthRequired => None,
            Err(err) => return Err(err),
        };

        let auth = AuthState::from_flag(profile.is_some());
        let page = Page::resolve(query.page.as_deref(), auth);
        debug!(requested = ?query.page, auth = ?auth, page = %page, "Resolved page");

        let member = profile.filter(|_| page.requires_auth());
        let view = match (page, member) {
            (Page::Signup, _) => PageView::Signup,
            (Page::Profile, Some(profile)) => PageView::Profile { profile },
            (Page::EditProfile, Some(profile)) => PageView::EditProfile {
                name: profile.name,
                weight: profile.weight,
                height: profile.height,
                age: profile.age,
            },
            (Page::Main, Some(profile)) => PageView::Main {
                username: profile.username,
                accepted_types: uploads::ACCEPTED_EXTENSIONS
                    .iter()
                    .map(|ext| (*ext).to_owned())
                    .collect(),
                nutrition_tracking: resources.config.features.nutrition_tracking,
                last_analysis: snapshot.last_analysis,
            },
            (Page::Login | Page::Profile | Page::EditProfile | Page::Main, _) => PageView::Login {
                title: service_names::PRODUCT_NAME.to_owned(),
            },
        };

        Ok((StatusCode::OK, Json(view)).into_response())
    }
}
