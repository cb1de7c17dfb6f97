// ABOUTME: Nutrition log database operations
// ABOUTME: Stores tracked meal totals and analysed upload images per user

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{AnalysisImageRecord, NutritionRecord, NutritionTotals};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Calories are unsigned in the model and signed in `SQLite`
fn calories_to_db(calories: u64) -> i64 {
    i64::try_from(calories).unwrap_or(i64::MAX)
}

fn calories_from_db(calories: i64) -> u64 {
    u64::try_from(calories).unwrap_or(0)
}

fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| AppError::database(format!("Invalid record id {id}: {e}")))
}

impl Database {
    /// Create the nutrition log tables
    pub(super) async fn migrate_tracking(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS nutrition_records (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL REFERENCES users(username),
                protein REAL NOT NULL,
                carbs REAL NOT NULL,
                calories INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS analysis_images (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL REFERENCES users(username),
                image BLOB NOT NULL,
                mime_type TEXT NOT NULL,
                response TEXT NOT NULL,
                protein REAL NOT NULL,
                carbs REAL NOT NULL,
                calories INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_nutrition_records_username ON nutrition_records(username)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_analysis_images_username ON analysis_images(username)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append a tracked meal
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails
    pub async fn insert_nutrition_record(&self, record: &NutritionRecord) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO nutrition_records (id, username, protein, carbs, calories, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(record.id.to_string())
        .bind(&record.username)
        .bind(record.totals.protein)
        .bind(record.totals.carbs)
        .bind(calories_to_db(record.totals.calories))
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Tracked meals for a user, oldest first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails or a row is malformed
    pub async fn get_nutrition_records(&self, username: &str) -> AppResult<Vec<NutritionRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, username, protein, carbs, calories, recorded_at
            FROM nutrition_records WHERE username = $1
            ORDER BY recorded_at ASC
            ",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_nutrition_record).collect()
    }

    /// Persist an analysed upload
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails
    pub async fn insert_analysis_image(&self, record: &AnalysisImageRecord) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO analysis_images
                (id, username, image, mime_type, response, protein, carbs, calories, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(record.id.to_string())
        .bind(&record.username)
        .bind(&record.image)
        .bind(&record.mime_type)
        .bind(&record.response)
        .bind(record.totals.protein)
        .bind(record.totals.carbs)
        .bind(calories_to_db(record.totals.calories))
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stored uploads for a user, oldest first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails or a row is malformed
    pub async fn get_analysis_images(&self, username: &str) -> AppResult<Vec<AnalysisImageRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, username, image, mime_type, response, protein, carbs, calories, created_at
            FROM analysis_images WHERE username = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_analysis_image).collect()
    }

    fn row_to_analysis_image(row: &SqliteRow) -> AppResult<AnalysisImageRecord> {
        let id: String = row.try_get("id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(AnalysisImageRecord {
            id: parse_id(&id)?,
            username: row.try_get("username")?,
            image: row.try_get("image")?,
            mime_type: row.try_get("mime_type")?,
            response: row.try_get("response")?,
            totals: Self::row_to_totals(row)?,
            created_at,
        })
    }

    fn row_to_nutrition_record(row: &SqliteRow) -> AppResult<NutritionRecord> {
        let id: String = row.try_get("id")?;
        let recorded_at: DateTime<Utc> = row.try_get("recorded_at")?;
        Ok(NutritionRecord {
            id: parse_id(&id)?,
            username: row.try_get("username")?,
            totals: Self::row_to_totals(row)?,
            recorded_at,
        })
    }

    fn row_to_totals(row: &SqliteRow) -> AppResult<NutritionTotals> {
        let calories: i64 = row.try_get("calories")?;
        Ok(NutritionTotals {
            protein: row.try_get("protein")?,
            carbs: row.try_get("carbs")?,
            calories: calories_from_db(calories),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    async fn db_with_user() -> Database {
        let db = Database::in_memory().await.unwrap();
        let user = User::new(
            "Bob".into(),
            "bob1".into(),
            "$argon2id$placeholder".into(),
            70.0,
            175.0,
            30,
        );
        db.create_user(&user).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_nutrition_records_roundtrip_in_order() {
        let db = db_with_user().await;
        for calories in [300, 450] {
            db.insert_nutrition_record(&NutritionRecord {
                id: Uuid::new_v4(),
                username: "bob1".into(),
                totals: NutritionTotals {
                    protein: 10.5,
                    carbs: 20.0,
                    calories,
                },
                recorded_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        let records = db.get_nutrition_records("bob1").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].totals.calories, 300);
        assert_eq!(records[1].totals.calories, 450);
        assert!(db.get_nutrition_records("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analysis_image_keeps_bytes() {
        let db = db_with_user().await;
        let image = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        db.insert_analysis_image(&AnalysisImageRecord {
            id: Uuid::new_v4(),
            username: "bob1".into(),
            image: image.clone(),
            mime_type: "image/jpeg".into(),
            response: "300 calories".into(),
            totals: NutritionTotals {
                protein: 0.0,
                carbs: 0.0,
                calories: 300,
            },
            created_at: Utc::now(),
        })
        .await
        .unwrap();

        let stored = db.get_analysis_images("bob1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].image, image);
        assert_eq!(stored[0].mime_type, "image/jpeg");
    }

    #[test]
    fn test_calorie_conversion_saturates() {
        assert_eq!(calories_to_db(u64::MAX), i64::MAX);
        assert_eq!(calories_from_db(-1), 0);
    }
}
