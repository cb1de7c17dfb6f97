// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, a scripted vision analyzer and user creation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `nutrifind`

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use nutrifind::{
    config::{FeatureFlags, ServerConfig},
    database::{Database, DatabaseProvider},
    errors::{AppError, AppResult},
    llm::{AnalysisRequest, VisionAnalyzer},
    resources::ServerResources,
    routes::build_router,
    services::SignupForm,
};

static INIT_LOGGER: Once = Once::new();

/// Password satisfying the policy
pub const GOOD_PASSWORD: &str = "Abcdef1!";

/// Model reply containing one of each nutrient
pub const SAMPLE_RESPONSE: &str = "Chicken breast: 31 grams protein, \
    Carbohydrates (0g), 165 calories.\nRice: 4.3 grams protein, \
    Carbohydrates (45.5g), 206 calories.";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Vision analyzer that replays a fixed reply and remembers prompts
#[derive(Default)]
pub struct StubAnalyzer {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubAnalyzer {
    /// Analyzer answering every request with `reply`
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_owned()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Analyzer failing every request as an unreachable service
    pub fn failing() -> Self {
        Self::default()
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionAnalyzer for StubAnalyzer {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> AppResult<String> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.reply.clone().ok_or_else(|| {
            AppError::external_service("Gemini", "Vision model is unavailable")
        })
    }
}

/// Test environment: resources plus handles on the concrete parts
pub struct TestContext {
    pub resources: Arc<ServerResources>,
    pub database: Arc<Database>,
    pub analyzer: Arc<StubAnalyzer>,
}

impl TestContext {
    /// Fresh router over these resources
    pub fn router(&self) -> axum::Router {
        build_router(&self.resources)
    }
}

/// In-memory resources with the given feature flags and analyzer
pub async fn create_test_context_with(
    features: FeatureFlags,
    analyzer: StubAnalyzer,
) -> TestContext {
    init_test_logging();
    let database = Arc::new(Database::in_memory().await.unwrap());
    let analyzer = Arc::new(analyzer);

    let config = ServerConfig {
        features,
        ..ServerConfig::default()
    };

    let provider: Arc<dyn DatabaseProvider> = database.clone();
    let vision: Arc<dyn VisionAnalyzer> = analyzer.clone();
    let resources = Arc::new(ServerResources::new(provider, vision, Arc::new(config)));

    TestContext {
        resources,
        database,
        analyzer,
    }
}

/// In-memory resources with all features off and a replying analyzer
pub async fn create_test_context() -> TestContext {
    create_test_context_with(
        FeatureFlags::default(),
        StubAnalyzer::replying(SAMPLE_RESPONSE),
    )
    .await
}

/// Valid signup form for `username`
pub fn signup_form(username: &str) -> SignupForm {
    SignupForm {
        name: "jane doe".to_owned(),
        username: username.to_owned(),
        password: GOOD_PASSWORD.to_owned(),
        confirm_password: GOOD_PASSWORD.to_owned(),
        weight: "70".to_owned(),
        height: "175".to_owned(),
        age: "30".to_owned(),
    }
}

/// Register `username` through the account service
pub async fn create_test_user(ctx: &TestContext, username: &str) {
    ctx.resources
        .accounts()
        .signup(signup_form(username))
        .await
        .unwrap();
}
