// ABOUTME: Account routes for login, signup and logout form submissions
// ABOUTME: Thin handlers over AccountService that move the session between anonymous and logged in
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
use http::HeaderMap;

use crate::constants::success_messages;
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::pages::Page;
use crate::resources::ServerResources;
use crate::routes::ActionResponse;
use crate::services::{LoginForm, SignupForm};
use crate::session::SessionHandle;

/// Account routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all account routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/login", post(Self::handle_login))
            .route("/signup", post(Self::handle_signup))
            .route("/logout", post(Self::handle_logout))
            .with_state(resources)
    }

    /// Handle login; success sends the client to the app page under a new session token
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        session: SessionHandle,
        Form(form): Form<LoginForm>,
    ) -> Result<Response, AppError> {
        let profile = resources.accounts().login(&form).await?;
        let token = session.login(profile.clone()).await?;

        let mut headers = HeaderMap::new();
        resources.sessions.cookie_for(&token).append_to(&mut headers);

        let body = ActionResponse::new(success_messages::LOGIN_SUCCESSFUL, Page::Main)
            .with_profile(profile);
        Ok((StatusCode::OK, headers, Json(body)).into_response())
    }

    /// Handle signup; the session stays anonymous
    async fn handle_signup(
        State(resources): State<Arc<ServerResources>>,
        Form(form): Form<SignupForm>,
    ) -> Result<Response, AppError> {
        resources.accounts().signup(form).await?;

        let body = ActionResponse::new(success_messages::USER_REGISTERED, Page::Login);
        Ok((StatusCode::CREATED, Json(body)).into_response())
    }

    /// Destroy the session and clear the cookie
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        session: SessionHandle,
    ) -> Result<Response, AppError> {
        if let Some(username) = session.snapshot().await.username {
            AppLogger::log_auth_event(&username, "logout", true, None);
        }
        session.logout().await;

        let mut headers = HeaderMap::new();
        resources.sessions.expired_cookie().append_to(&mut headers);

        let body = ActionResponse::new(success_messages::LOGGED_OUT, Page::Login);
        Ok((StatusCode::OK, headers, Json(body)).into_response())
    }
}
