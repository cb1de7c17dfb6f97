// ABOUTME: Axum middleware attaching a server-side session to every request
// ABOUTME: Issues the session cookie on first contact and exposes SessionHandle to route handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! Session middleware
//!
//! The middleware never rejects a request. It resolves the cookie token to a
//! live session (creating one if the cookie is missing, unknown or expired),
//! inserts a [`SessionHandle`] into the request extensions, and appends a
//! `Set-Cookie` header to the response when it created the session.
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use nutrifind::session::{session_middleware, SessionHandle, SessionStore};
//! use std::sync::Arc;
//!
//! # async fn handler(_session: SessionHandle) -> &'static str { "" }
//! # fn example(store: Arc<SessionStore>) {
//! let app: Router = Router::new()
//!     .route("/", get(handler))
//!     .layer(middleware::from_fn_with_state(store, session_middleware));
//! # }
//! ```

use super::{Session, SessionStore};
use crate::constants::session::COOKIE_NAME;
use crate::errors::{AppError, AppResult};
use crate::models::{NutritionTotals, UserProfile};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use super::cookies::get_cookie_value;

/// Handle to the current request's session
#[derive(Clone)]
pub struct SessionHandle {
    token: String,
    store: Arc<SessionStore>,
}

impl SessionHandle {
    /// Current session state; a session destroyed mid-request reads as empty
    pub async fn snapshot(&self) -> Session {
        self.store.get(&self.token).await.unwrap_or_default()
    }

    /// Mark the session logged in with a fresh profile snapshot
    ///
    /// The session moves to a new token, which is returned; this handle's
    /// token is dead afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AUTH_REQUIRED` if the session expired during the request
    pub async fn login(&self, profile: UserProfile) -> AppResult<String> {
        self.store
            .update(&self.token, move |session| {
                session.username = Some(profile.username.clone());
                session.user_info = Some(profile);
                session.last_analysis = None;
            })
            .await
            .ok_or_else(AppError::auth_required)?;
        self.store
            .rotate(&self.token)
            .await
            .ok_or_else(AppError::auth_required)
    }

    /// Replace the profile snapshot after an edit
    ///
    /// # Errors
    ///
    /// Returns `AUTH_REQUIRED` if the session expired during the request
    pub async fn refresh_profile(&self, profile: UserProfile) -> AppResult<()> {
        self.store
            .update(&self.token, move |session| session.user_info = Some(profile))
            .await
            .ok_or_else(AppError::auth_required)
    }

    /// Remember the totals of the latest analysis
    ///
    /// # Errors
    ///
    /// Returns `AUTH_REQUIRED` if the session expired during the request
    pub async fn set_last_analysis(&self, totals: NutritionTotals) -> AppResult<()> {
        self.store
            .update(&self.token, move |session| {
                session.last_analysis = Some(totals);
            })
            .await
            .ok_or_else(AppError::auth_required)
    }

    /// Destroy the session
    pub async fn logout(&self) {
        self.store.destroy(&self.token).await;
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::internal("Session middleware is not installed"))
    }
}

/// Resolve or create the session for this request
pub async fn session_middleware(
    State(store): State<Arc<SessionStore>>,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = match get_cookie_value(req.headers(), COOKIE_NAME) {
        Some(token) if store.touch(&token).await => Some(token),
        Some(_) => {
            debug!("Unknown or expired session cookie, starting a new session");
            None
        }
        None => None,
    };

    let (token, created) = match existing {
        Some(token) => (token, false),
        None => (store.create().await, true),
    };

    req.extensions_mut().insert(SessionHandle {
        token: token.clone(),
        store: Arc::clone(&store),
    });

    let mut response = next.run(req).await;

    // Handlers that destroy or rotate the new session (logout, login) set their own cookie
    if created && store.contains(&token).await {
        store.cookie_for(&token).append_to(response.headers_mut());
    }

    response
}
