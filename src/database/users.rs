// ABOUTME: User account database operations
// ABOUTME: Registration inserts, username lookups and partial profile updates

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{ProfileUpdate, User};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                weight REAL NOT NULL,
                height REAL NOT NULL,
                age INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if the username is taken, or a
    /// database error if the insert fails
    pub async fn create_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, name, username, password_hash, weight, height, age, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.weight)
        .bind(user.height)
        .bind(i64::from(user.age))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Exact-match lookup by username
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails or the row is malformed
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, name, username, password_hash, weight, height, age, created_at, updated_at
            FROM users WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Apply a partial update; absent fields keep their stored values
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if no such user exists, or a database error
    pub async fn update_user_profile(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> AppResult<User> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                name = COALESCE($1, name),
                password_hash = COALESCE($2, password_hash),
                weight = COALESCE($3, weight),
                height = COALESCE($4, height),
                age = COALESCE($5, age),
                updated_at = $6
            WHERE username = $7
            ",
        )
        .bind(update.name.as_deref())
        .bind(update.password_hash.as_deref())
        .bind(update.weight)
        .bind(update.height)
        .bind(update.age.map(i64::from))
        .bind(Utc::now())
        .bind(username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }

        self.get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    fn row_to_user(row: &SqliteRow) -> AppResult<User> {
        let id: String = row.try_get("id")?;
        let age: i64 = row.try_get("age")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::database(format!("Invalid user id {id}: {e}")))?,
            name: row.try_get("name")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            weight: row.try_get("weight")?,
            height: row.try_get("height")?,
            age: u32::try_from(age)
                .map_err(|_| AppError::database(format!("Invalid stored age {age}")))?,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn sample_user(username: &str) -> User {
        User::new(
            "Bob Smith".into(),
            username.into(),
            "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            70.0,
            175.0,
            30,
        )
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = Database::in_memory().await.unwrap();
        let user = sample_user("bob1");
        db.create_user(&user).await.unwrap();

        let found = db.get_user_by_username("bob1").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.name, "Bob Smith");
        assert_eq!(found.age, 30);
        assert!(db.get_user_by_username("BOB1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let db = Database::in_memory().await.unwrap();
        db.create_user(&sample_user("bob1")).await.unwrap();
        let err = db.create_user(&sample_user("bob1")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = Database::in_memory().await.unwrap();
        let user = sample_user("bob1");
        db.create_user(&user).await.unwrap();

        let updated = db
            .update_user_profile(
                "bob1",
                &ProfileUpdate {
                    weight: Some(72.5),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!((updated.weight - 72.5).abs() < f64::EPSILON);
        assert_eq!(updated.password_hash, user.password_hash);
        assert_eq!(updated.name, user.name);
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let db = Database::in_memory().await.unwrap();
        let err = db
            .update_user_profile("ghost", &ProfileUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
    }
}
