// ABOUTME: Configuration module for centralized server settings
// ABOUTME: Re-exports the environment-driven ServerConfig and its parts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! Configuration for the `NutriFind` server, loaded once at startup from
//! environment variables (and an optional `.env` file).

/// Environment and server configuration
pub mod environment;

pub use environment::{
    DatabaseConfig, DatabaseUrl, Environment, FeatureFlags, GeminiConfig, LogLevel, ServerConfig,
    SessionConfig,
};
