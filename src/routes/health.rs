// ABOUTME: Health check routes for liveness and readiness probes
// ABOUTME: Readiness pings the credential store; neither route needs a session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tracing::warn;

use crate::constants::service_names;
use crate::resources::ServerResources;

/// Health check routes
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health() -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": service_names::NUTRIFIND_SERVER,
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
    }

    async fn handle_ready(State(resources): State<Arc<ServerResources>>) -> impl IntoResponse {
        match resources.database.health_check().await {
            Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
            Err(err) => {
                warn!(error = %err, "Readiness check failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "status": "not_ready", "error": err.message })),
                )
            }
        }
    }
}
