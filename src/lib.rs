// ABOUTME: Main library entry point for the NutriFind food analysis service
// ABOUTME: Exposes session-authenticated account pages and Gemini-backed food photo analysis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

#![deny(unsafe_code)]

//! # `NutriFind`
//!
//! A small web service where a user signs up with their body measurements,
//! logs in, and uploads a photo of a meal. The photo is sent to a
//! vision-language model together with a prompt personalised from the stored
//! profile, and the model's nutrition report is returned verbatim.
//!
//! ## Architecture
//!
//! - **Pages**: a finite page controller decides which view a request renders
//! - **Sessions**: an in-memory, cookie-keyed store holds the logged-in user
//! - **Database**: `SQLite` credential store with Argon2id password hashes
//! - **LLM**: a `VisionAnalyzer` trait with a Gemini implementation
//! - **Nutrition**: regex extraction of protein, carbohydrates and calories
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use nutrifind::config::ServerConfig;
//! use nutrifind::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("NutriFind configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Password policy, hashing and form field validation
pub mod auth;

/// Environment-driven server configuration
pub mod config;

/// User-facing messages, limits and defaults
pub mod constants;

/// `SQLite` credential store and nutrition log
pub mod database;

/// Unified error handling
pub mod errors;

/// Vision model abstraction and the Gemini client
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Domain models
pub mod models;

/// Nutrient extraction from model output
pub mod nutrition;

/// Page controller
pub mod pages;

/// Shared server state
pub mod resources;

/// `HTTP` routes
pub mod routes;

/// Account and analysis services
pub mod services;

/// Cookie-keyed session store and middleware
pub mod session;
