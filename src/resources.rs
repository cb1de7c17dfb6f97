// ABOUTME: Shared server state handed to every route
// ABOUTME: Bundles the credential store, vision client, session store and configuration behind Arcs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! Server resources shared across handlers

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::database::DatabaseProvider;
use crate::llm::VisionAnalyzer;
use crate::services::{AccountService, AnalysisService};
use crate::session::SessionStore;

/// Everything a request handler may need
#[derive(Clone)]
pub struct ServerResources {
    /// Credential store and nutrition log
    pub database: Arc<dyn DatabaseProvider>,
    /// Vision model client
    pub analyzer: Arc<dyn VisionAnalyzer>,
    /// Live sessions
    pub sessions: Arc<SessionStore>,
    /// Startup configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Assemble resources; the session store is built from `config`
    #[must_use]
    pub fn new(
        database: Arc<dyn DatabaseProvider>,
        analyzer: Arc<dyn VisionAnalyzer>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            database,
            analyzer,
            sessions: Arc::new(SessionStore::new(&config.session)),
            config,
        }
    }

    /// Account service over the shared store
    #[must_use]
    pub fn accounts(&self) -> AccountService {
        AccountService::new(Arc::clone(&self.database))
    }

    /// Analysis service with the configured feature flags
    #[must_use]
    pub fn analysis(&self) -> AnalysisService {
        AnalysisService::new(
            Arc::clone(&self.analyzer),
            Arc::clone(&self.database),
            self.config.features,
        )
    }
}
