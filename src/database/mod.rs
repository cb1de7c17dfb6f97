// ABOUTME: Credential store and nutrition log persistence on SQLite
// ABOUTME: Defines the DatabaseProvider trait used by services and its sqlx-backed implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # Database
//!
//! Services talk to storage through [`DatabaseProvider`] so tests and
//! alternative backends can stand in for [`Database`]. The bundled
//! implementation keeps everything in one `SQLite` file (or in memory) and
//! creates its tables on startup.

/// Nutrition records and stored analysis images
mod tracking;
/// User account queries
mod users;

use crate::auth::password::verify_password_blocking;
use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult};
use crate::models::{AnalysisImageRecord, NutritionRecord, ProfileUpdate, User};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{info, warn};

/// Storage operations needed by the account and analysis services
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    /// Exact-match lookup by username
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Lookup by username that also verifies the password; any mismatch is `None`
    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<User>>;

    /// Insert a new user; fails with `RESOURCE_ALREADY_EXISTS` on a taken username
    async fn insert_user(&self, user: &User) -> AppResult<()>;

    /// Merge the provided fields into a stored user and return the result
    async fn update_user(&self, username: &str, update: &ProfileUpdate) -> AppResult<User>;

    /// Append a tracked meal
    async fn record_nutrition(&self, record: &NutritionRecord) -> AppResult<()>;

    /// Tracked meals for a user, oldest first
    async fn list_nutrition_records(&self, username: &str) -> AppResult<Vec<NutritionRecord>>;

    /// Persist an analysed upload
    async fn store_analysis_image(&self, record: &AnalysisImageRecord) -> AppResult<()>;

    /// Stored uploads for a user, oldest first
    async fn list_analysis_images(&self, username: &str) -> AppResult<Vec<AnalysisImageRecord>>;

    /// Cheap query proving the store is reachable
    async fn health_check(&self) -> AppResult<()>;
}

/// `SQLite` implementation of [`DatabaseProvider`]
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the database directory cannot be created, the
    /// connection fails, or a migration fails
    pub async fn new(url: &DatabaseUrl) -> AppResult<Self> {
        let pool = match url {
            // Every in-memory connection is a separate database, so keep exactly one alive
            DatabaseUrl::Memory => {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect(&url.to_connection_string())
                    .await?
            }
            DatabaseUrl::SQLite { path } => {
                ensure_parent_dir(path)?;
                SqlitePoolOptions::new()
                    .connect(&format!("{}?mode=rwc", url.to_connection_string()))
                    .await?
            }
        };

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %url, "Database ready");
        Ok(db)
    }

    /// Fresh in-memory database, used by tests
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migrations fail
    pub async fn in_memory() -> AppResult<Self> {
        Self::new(&DatabaseUrl::Memory).await
    }

    /// Create all tables
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_tracking().await?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| {
                AppError::database(format!(
                    "Cannot create database directory {}: {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}

#[async_trait]
impl DatabaseProvider for Database {
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.get_user_by_username(username).await
    }

    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<User>> {
        let Some(user) = self.get_user_by_username(username).await? else {
            return Ok(None);
        };

        match verify_password_blocking(password.to_owned(), user.password_hash.clone()).await {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(e) => {
                warn!(username = %username, error = %e, "Stored password hash is unreadable");
                Ok(None)
            }
        }
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        self.create_user(user).await
    }

    async fn update_user(&self, username: &str, update: &ProfileUpdate) -> AppResult<User> {
        self.update_user_profile(username, update).await
    }

    async fn record_nutrition(&self, record: &NutritionRecord) -> AppResult<()> {
        self.insert_nutrition_record(record).await
    }

    async fn list_nutrition_records(&self, username: &str) -> AppResult<Vec<NutritionRecord>> {
        self.get_nutrition_records(username).await
    }

    async fn store_analysis_image(&self, record: &AnalysisImageRecord) -> AppResult<()> {
        self.insert_analysis_image(record).await
    }

    async fn list_analysis_images(&self, username: &str) -> AppResult<Vec<AnalysisImageRecord>> {
        self.get_analysis_images(username).await
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
